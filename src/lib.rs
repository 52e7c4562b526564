pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::{generate_descriptor_set, CliConfig, LocalStorage, Manifest};

pub use config::{toml_config::TomlConfig, PluginConfig};
pub use core::generator::{
    generate_request, generate_response, request_from_descriptor_set, run, Generator,
};
pub use core::grpcx::GrpcxPlugin;
pub use utils::error::{GenError, Result};
