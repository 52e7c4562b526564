use crate::core::generator::{generate_request, request_from_descriptor_set};
use crate::domain::model::GeneratedFile;
use crate::domain::ports::Storage;
use crate::utils::error::{GenError, Result};
use crate::utils::validation::{validate_non_empty_string, Validate};
use clap::Parser;
use prost_types::FileDescriptorSet;
use serde::Serialize;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Arguments of the standalone `grpcx-gen` binary.
#[derive(Debug, Clone, Parser)]
#[command(name = "grpcx-gen")]
#[command(about = "Generate grpcx Go wrappers from a FileDescriptorSet without protoc")]
pub struct CliConfig {
    /// Serialized FileDescriptorSet, e.g. from `protoc --include_imports -o set.pb`
    #[arg(short, long)]
    pub descriptor_set: PathBuf,

    /// Output root directory
    #[arg(short, long, default_value = ".")]
    pub out: PathBuf,

    /// Proto files to generate (default: every file in the set)
    #[arg(short, long)]
    pub file: Vec<String>,

    /// Plugin parameter string, same syntax as --grpcx_opt
    #[arg(short, long, default_value = "")]
    pub parameter: String,

    /// TOML config file, same as the config= parameter
    #[arg(short, long)]
    pub config: Option<String>,

    /// Print a JSON manifest of what would be written instead of writing
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl CliConfig {
    /// Merges `--config` into the parameter string.
    pub fn effective_parameter(&self) -> String {
        match &self.config {
            Some(path) if self.parameter.is_empty() => format!("config={}", path),
            Some(path) => format!("config={},{}", path, self.parameter),
            None => self.parameter.clone(),
        }
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string(
            "descriptor_set",
            &self.descriptor_set.to_string_lossy(),
        )?;
        validate_non_empty_string("out", &self.out.to_string_lossy())?;
        for file in &self.file {
            validate_non_empty_string("file", file)?;
        }
        Ok(())
    }
}

/// Files a `grpcx-gen` run wrote, or would write with `--dry-run`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Manifest {
    pub out: String,
    pub files: Vec<ManifestEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestEntry {
    pub name: String,
    pub bytes: usize,
}

impl Manifest {
    pub fn from_files(out: &Path, files: &[GeneratedFile]) -> Self {
        Self {
            out: out.display().to_string(),
            files: files
                .iter()
                .map(|f| ManifestEntry {
                    name: f.name.clone(),
                    bytes: f.content.len(),
                })
                .collect(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Generates `set` and writes the files below `config.out`, or only reports
/// them when `config.dry_run` is set. A failed run writes nothing.
pub fn generate_descriptor_set(config: &CliConfig, set: FileDescriptorSet) -> Result<Manifest> {
    let request = request_from_descriptor_set(set, &config.file, &config.effective_parameter());
    let files = generate_request(&request)?;
    let manifest = Manifest::from_files(&config.out, &files);

    if config.dry_run {
        tracing::info!("🔍 DRY RUN MODE - nothing will be written");
        return Ok(manifest);
    }

    LocalStorage::new(config.out.clone()).write_all(&files)?;
    Ok(manifest)
}

/// Writes generated files below a base directory.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new<P: Into<PathBuf>>(base_path: P) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn full_path(&self, path: &str) -> PathBuf {
        self.base_path.join(path)
    }

    /// Writes all of `files` or none of them. Everything is staged in a
    /// scratch directory under the base path first, then renamed into place.
    pub fn write_all(&self, files: &[GeneratedFile]) -> Result<Vec<PathBuf>> {
        if files.is_empty() {
            return Ok(Vec::new());
        }

        fs::create_dir_all(&self.base_path)?;
        let staging_dir = tempfile::Builder::new()
            .prefix(".grpcx-staging-")
            .tempdir_in(&self.base_path)?;
        let staging = LocalStorage::new(staging_dir.path());

        for file in files {
            staging.write_file(&file.name, file.content.as_bytes())?;
        }

        let mut written = Vec::with_capacity(files.len());
        for file in files {
            let target = self.full_path(&file.name);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::rename(staging.full_path(&file.name), &target)?;
            tracing::info!("✅ Wrote {}", target.display());
            written.push(target);
        }

        Ok(written)
    }
}

impl Storage for LocalStorage {
    fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let relative = Path::new(path);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(GenError::InvalidConfigValueError {
                field: "output_path".to_string(),
                value: path.to_string(),
                reason: "Generated file path must stay inside the output directory".to_string(),
            });
        }

        let full_path = self.base_path.join(relative);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(full_path, data)?;
        Ok(())
    }
}
