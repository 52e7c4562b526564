//! Go-side naming: identifier casing, package names and output paths.

use crate::domain::model::{FileDescriptor, PathsMode};
use crate::domain::ports::ConfigProvider;
use std::collections::HashSet;

const GO_KEYWORDS: [&str; 25] = [
    "break",
    "case",
    "chan",
    "const",
    "continue",
    "default",
    "defer",
    "else",
    "fallthrough",
    "for",
    "func",
    "go",
    "goto",
    "if",
    "import",
    "interface",
    "map",
    "package",
    "range",
    "return",
    "select",
    "struct",
    "switch",
    "type",
    "var",
];

/// Suffix appended to the proto stem to name the output file.
pub const OUTPUT_SUFFIX: &str = "_grpcx.pb.go";

pub fn is_go_keyword(name: &str) -> bool {
    GO_KEYWORDS.contains(&name)
}

/// Converts a proto identifier to an exported Go identifier.
///
/// A leading underscore becomes `X`, an underscore followed by a lower-case
/// letter is removed and the letter capitalised, and every lower-case letter
/// that starts a word is capitalised. Digits and other bytes pass through.
pub fn camel_case(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = String::with_capacity(bytes.len() + 1);
    let mut i = 0;

    if bytes.first() == Some(&b'_') {
        out.push('X');
        i += 1;
    }

    while i < bytes.len() {
        let c = bytes[i];
        if c == b'_' && i + 1 < bytes.len() && bytes[i + 1].is_ascii_lowercase() {
            i += 1;
            continue;
        }
        if c.is_ascii_digit() {
            out.push(c as char);
            i += 1;
            continue;
        }
        if c.is_ascii() {
            out.push(c.to_ascii_uppercase() as char);
        } else {
            // Multi-byte sequences are copied through whole.
            let ch = s[i..].chars().next().unwrap_or('_');
            out.push(ch);
            i += ch.len_utf8();
            continue;
        }
        while i + 1 < bytes.len() && bytes[i + 1].is_ascii_lowercase() {
            i += 1;
            out.push(bytes[i] as char);
        }
        i += 1;
    }

    out
}

/// Turns an arbitrary string into a legal Go package name.
pub fn clean_package_name(name: &str) -> String {
    let mut cleaned: String = name
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect();

    if is_go_keyword(&cleaned) {
        cleaned.insert(0, '_');
    }
    if cleaned.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        cleaned.insert(0, '_');
    }
    if cleaned.is_empty() {
        cleaned.push('_');
    }
    cleaned
}

/// Package aliases in use by the current generation run.
#[derive(Debug, Default, Clone)]
pub struct PackageNames {
    in_use: HashSet<String>,
}

impl PackageNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a name as taken without handing it out, e.g. the package being generated.
    pub fn reserve(&mut self, name: &str) {
        self.in_use.insert(name.to_string());
    }

    /// Registers `preferred` (cleaned) or, if taken, the first free `preferredN`.
    pub fn register_unique(&mut self, preferred: &str) -> String {
        let orig = clean_package_name(preferred);
        let mut name = orig.clone();
        let mut i = 1;
        while self.in_use.contains(&name) {
            name = format!("{}{}", orig, i);
            i += 1;
        }
        self.in_use.insert(name.clone());
        name
    }
}

/// The Go package a proto file's generated code lives in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoPackage {
    pub import_path: Option<String>,
    pub name: String,
}

fn last_path_element(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Splits `path;name`. An empty name falls back to the last path element,
/// then to `fallback`.
fn split_go_package(value: &str, fallback: &str) -> GoPackage {
    let (path, name) = match value.split_once(';') {
        Some((path, name)) => (path, name),
        None if value.contains('/') => (value, ""),
        None => ("", value),
    };

    let name = [name, last_path_element(path), fallback]
        .into_iter()
        .find(|n| !n.is_empty())
        .unwrap_or_default();

    GoPackage {
        import_path: Some(path.to_string()).filter(|p| !p.is_empty()),
        name: clean_package_name(name),
    }
}

/// Resolves the Go package for `file`: `M` mapping, then `go_package`,
/// then the proto package, then the file stem.
pub fn resolve_go_package(file: &FileDescriptor, config: &dyn ConfigProvider) -> GoPackage {
    let fallback = if file.package.is_empty() {
        file.stem().to_string()
    } else {
        file.package.replace('.', "_")
    };

    if let Some(mapped) = config.import_mapping(&file.name) {
        let mut pkg = split_go_package(mapped, &fallback);
        if pkg.import_path.is_none() {
            pkg.import_path = Some(mapped.to_string());
        }
        return pkg;
    }

    if let Some(go_package) = &file.go_package {
        return split_go_package(go_package, &fallback);
    }

    GoPackage {
        import_path: None,
        name: clean_package_name(&fallback),
    }
}

/// Output path of the generated file, relative to the output root.
pub fn output_path(file: &FileDescriptor, pkg: &GoPackage, mode: PathsMode) -> String {
    let file_name = format!("{}{}", file.stem(), OUTPUT_SUFFIX);
    let dir = match (mode, &pkg.import_path) {
        (PathsMode::Import, Some(import_path)) => import_path.as_str(),
        _ => file.dir(),
    };

    if dir.is_empty() {
        file_name
    } else {
        format!("{}/{}", dir.trim_end_matches('/'), file_name)
    }
}

/// Joins an import prefix and a path the way Go's `path.Join` would.
pub fn join_import_path(prefix: &str, path: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", prefix, path.trim_start_matches('/'))
    }
}

/// Quotes `s` as a Go interpreted string literal.
pub fn go_quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
