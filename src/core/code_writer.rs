//! Line printer for generated Go source.
//!
//! Callers emit unindented lines built from fragments, the same way the Go
//! generator's `P(...)` works, and the writer lays them out the way gofmt
//! would: tab indentation driven by `{`/`(` at line end and `}`/`)` at line
//! start, and never more than one blank line in a row.
//!
//! ```
//! use protoc_gen_grpcx::core::code_writer::CodeWriter;
//!
//! let mut w = CodeWriter::new();
//! w.p(&["func Start(port int) error {"]);
//! w.p(&["return nil"]);
//! w.p(&["}"]);
//! assert_eq!(w.finish(), "func Start(port int) error {\n\treturn nil\n}\n");
//! ```

#[derive(Debug, Clone)]
pub struct CodeWriter {
    buf: String,
    indent_level: usize,
    last_blank: bool,
}

impl Default for CodeWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeWriter {
    /// Creates a writer that indents with tabs, as gofmt does.
    pub fn new() -> Self {
        Self {
            buf: String::new(),
            indent_level: 0,
            // Suppresses leading blank lines.
            last_blank: true,
        }
    }

    /// Writes the concatenation of `parts` as one line. No parts writes a blank line.
    pub fn p(&mut self, parts: &[&str]) {
        let line: String = parts.concat();
        let trimmed = line.trim();

        if trimmed.is_empty() {
            self.blank_line();
            return;
        }

        let is_comment = trimmed.starts_with("//") || trimmed.starts_with("/*");
        if !is_comment && (trimmed.starts_with('}') || trimmed.starts_with(')')) {
            self.indent_level = self.indent_level.saturating_sub(1);
        }

        for _ in 0..self.indent_level {
            self.buf.push('\t');
        }
        self.buf.push_str(trimmed);
        self.buf.push('\n');
        self.last_blank = false;

        if !is_comment && (trimmed.ends_with('{') || trimmed.ends_with('(')) {
            self.indent_level += 1;
        }
    }

    pub fn blank_line(&mut self) {
        if !self.last_blank {
            self.buf.push('\n');
            self.last_blank = true;
        }
    }

    /// Writes two-column rows with the second column aligned, as gofmt does
    /// for consecutive specs in a `var` or `const` block.
    pub fn p_aligned(&mut self, rows: &[(&str, &str)]) {
        let width = rows.iter().map(|(left, _)| left.len()).max().unwrap_or(0);
        for (left, right) in rows {
            let padded = format!("{:<width$} {}", left, right, width = width);
            self.p(&[padded.as_str()]);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Appends everything another writer produced, keeping its layout.
    pub fn append(&mut self, other: &CodeWriter) {
        if other.is_empty() {
            return;
        }
        self.buf.push_str(&other.buf);
        self.last_blank = other.last_blank;
    }

    /// Returns the source with exactly one trailing newline.
    pub fn finish(self) -> String {
        let mut out = self.buf.trim_end_matches('\n').to_string();
        out.push('\n');
        out
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_blocks_are_indented_with_tabs() {
        let mut w = CodeWriter::new();
        w.p(&["func NewServer() Server {"]);
        w.p(&["register := func(s *grpc.Server) {"]);
        w.p(&["Register", "Greeter", "Server(s, srv)"]);
        w.p(&["}"]);
        w.p(&["return Server{"]);
        w.p(&["Server: pool.NewServer(name, \"\", port, register),"]);
        w.p(&["}"]);
        w.p(&["}"]);

        let expected = "func NewServer() Server {\n\
\tregister := func(s *grpc.Server) {\n\
\t\tRegisterGreeterServer(s, srv)\n\
\t}\n\
\treturn Server{\n\
\t\tServer: pool.NewServer(name, \"\", port, register),\n\
\t}\n\
}\n";
        assert_eq!(w.finish(), expected);
    }

    #[test]
    fn test_paren_blocks() {
        let mut w = CodeWriter::new();
        w.p(&["import ("]);
        w.p(&["\"sync\""]);
        w.p(&[]);
        w.p(&["pool \"example.com/pool\""]);
        w.p(&[")"]);
        assert_eq!(
            w.finish(),
            "import (\n\t\"sync\"\n\n\tpool \"example.com/pool\"\n)\n"
        );
    }

    #[test]
    fn test_blank_lines_collapse() {
        let mut w = CodeWriter::new();
        w.p(&[]);
        w.p(&["a"]);
        w.p(&[]);
        w.p(&[]);
        w.p(&["b"]);
        w.p(&[]);
        assert_eq!(w.finish(), "a\n\nb\n");
    }

    #[test]
    fn test_comment_lines_do_not_change_indent() {
        let mut w = CodeWriter::new();
        w.p(&["// opens a block {"]);
        w.p(&["x"]);
        assert_eq!(w.indent_level, 0);
        assert_eq!(w.finish(), "// opens a block {\nx\n");
    }

    #[test]
    fn test_aligned_rows() {
        let mut w = CodeWriter::new();
        w.p(&["var ("]);
        w.p_aligned(&[("__aMutex", "sync.Mutex"), ("__a", "unsafe.Pointer")]);
        w.p(&[")"]);
        assert_eq!(
            w.finish(),
            "var (\n\t__aMutex sync.Mutex\n\t__a      unsafe.Pointer\n)\n"
        );
    }

    #[test]
    fn test_append_merges_blank_lines() {
        let mut head = CodeWriter::new();
        head.p(&["package x"]);
        head.p(&[]);

        let mut body = CodeWriter::new();
        body.p(&["const A = 1"]);

        head.append(&body);
        assert_eq!(head.finish(), "package x\n\nconst A = 1\n");
    }
}
