use crate::core::code_writer::CodeWriter;
use crate::core::names::{GoPackage, PackageNames};
use crate::domain::model::{FileDescriptor, PathsMode};
use crate::utils::error::Result;

pub trait Storage {
    fn write_file(&self, path: &str, data: &[u8]) -> Result<()>;
}

pub trait ConfigProvider {
    /// Prepended to every non-standard-library import path.
    fn import_prefix(&self) -> &str;
    fn paths_mode(&self) -> PathsMode;
    /// Selected plugin names; `None` runs every registered plugin.
    fn plugins(&self) -> Option<&[String]>;
    fn pool_package_path(&self) -> &str;
    fn pool_package_name(&self) -> &str;
    /// Go import path forced for a proto file by an `M` parameter.
    fn import_mapping(&self, proto_file: &str) -> Option<&str>;
    /// Name the service registers under with the pool package.
    fn service_registry_name(&self, service: &str) -> Option<&str>;
}

/// Handed to [`Plugin::init`] once per run.
pub struct InitContext<'a> {
    pub config: &'a dyn ConfigProvider,
    pub names: &'a mut PackageNames,
}

/// Handed to the per-file hooks.
pub struct FileContext<'a> {
    pub file: &'a FileDescriptor,
    pub go_package: &'a GoPackage,
    pub config: &'a dyn ConfigProvider,
}

/// A named unit of generation logic driven by the [`Generator`](crate::core::generator::Generator).
///
/// For every file the host calls all `generate_imports` hooks first and then
/// all `generate` hooks, so imports always precede code.
pub trait Plugin {
    /// Fixed identifier matched against the `plugins=` parameter.
    fn name(&self) -> &str;

    fn init(&mut self, ctx: &mut InitContext<'_>);

    fn generate_imports(&self, ctx: &FileContext<'_>, out: &mut CodeWriter) -> Result<()>;

    fn generate(&self, ctx: &FileContext<'_>, out: &mut CodeWriter) -> Result<()>;
}
