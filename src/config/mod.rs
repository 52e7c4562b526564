#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::domain::model::PathsMode;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{GenError, Result};
use crate::utils::validation::{
    validate_go_identifier, validate_import_path, validate_import_prefix,
    validate_non_empty_string, Validate,
};
use serde::Serialize;
use std::collections::BTreeMap;
use toml_config::TomlConfig;

/// Connection/pooling library the generated wrappers call into.
pub const DEFAULT_POOL_PACKAGE_PATH: &str = "code.aliyun.com/qschou/go_common/grpc/internal/grpc";
pub const DEFAULT_POOL_PACKAGE_NAME: &str = "qscgrpc";

/// Prefix of the per-service registry name parameter, `service_name.<Service>=<name>`.
const SERVICE_NAME_KEY_PREFIX: &str = "service_name.";

/// Generation settings resolved from the protoc parameter string and an
/// optional TOML file. Parameters win over the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginConfig {
    pub import_prefix: String,
    pub paths: PathsMode,
    pub plugins: Option<Vec<String>>,
    pub pool_package_path: String,
    pub pool_package_name: String,
    pub config_file: Option<String>,
    pub import_map: BTreeMap<String, String>,
    pub service_names: BTreeMap<String, String>,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            import_prefix: String::new(),
            paths: PathsMode::default(),
            plugins: None,
            pool_package_path: DEFAULT_POOL_PACKAGE_PATH.to_string(),
            pool_package_name: DEFAULT_POOL_PACKAGE_NAME.to_string(),
            config_file: None,
            import_map: BTreeMap::new(),
            service_names: BTreeMap::new(),
        }
    }
}

/// Splits `k1=v1,k2=v2` into pairs. A key without `=` gets an empty value.
pub fn parse_parameter(parameter: &str) -> Vec<(String, String)> {
    parameter
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| match p.split_once('=') {
            Some((k, v)) => (k.trim().to_string(), v.trim().to_string()),
            None => (p.to_string(), String::new()),
        })
        .collect()
}

impl PluginConfig {
    /// Builds the configuration for one protoc invocation.
    pub fn from_parameter(parameter: &str) -> Result<Self> {
        let pairs = parse_parameter(parameter);

        let mut config = match pairs.iter().find(|(k, _)| k == "config") {
            Some((_, path)) if path.is_empty() => {
                return Err(GenError::MissingConfigError {
                    field: "config".to_string(),
                })
            }
            Some((_, path)) => {
                tracing::debug!("Loading grpcx config file: {}", path);
                let toml = TomlConfig::from_file(path)?;
                toml.validate()?;
                let mut config = Self::from_toml(&toml)?;
                config.config_file = Some(path.clone());
                config
            }
            None => Self::default(),
        };

        for (key, value) in &pairs {
            config.apply(key, value)?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(toml: &TomlConfig) -> Result<Self> {
        let mut config = Self::default();

        if let Some(prefix) = &toml.generator.import_prefix {
            config.import_prefix = prefix.clone();
        }
        if let Some(paths) = &toml.generator.paths {
            config.paths = parse_paths("generator.paths", paths)?;
        }
        if let Some(plugins) = &toml.generator.plugins {
            config.plugins = Some(plugins.clone());
        }
        if let Some(path) = &toml.pool.package_path {
            config.pool_package_path = path.clone();
        }
        if let Some(name) = &toml.pool.package_name {
            config.pool_package_name = name.clone();
        }
        config.import_map = toml.import_map.clone();
        config.service_names = toml.services.clone();

        Ok(config)
    }

    fn apply(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "import_prefix" => self.import_prefix = value.to_string(),
            "paths" => self.paths = parse_paths("paths", value)?,
            "plugins" => {
                let names: Vec<String> = value
                    .split('+')
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .map(str::to_string)
                    .collect();
                self.plugins = if names.is_empty() { None } else { Some(names) };
            }
            "pool_pkg" => self.pool_package_path = value.to_string(),
            "pool_name" => self.pool_package_name = value.to_string(),
            "config" => {}
            _ => {
                if let Some(service) = key.strip_prefix(SERVICE_NAME_KEY_PREFIX) {
                    self.service_names
                        .insert(service.to_string(), value.to_string());
                } else if let Some(proto_file) = key.strip_prefix('M') {
                    self.import_map
                        .insert(proto_file.to_string(), value.to_string());
                } else {
                    tracing::warn!("Ignoring unknown plugin parameter '{}'", key);
                }
            }
        }
        Ok(())
    }
}

fn parse_paths(field: &str, value: &str) -> Result<PathsMode> {
    PathsMode::parse(value).ok_or_else(|| GenError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.to_string(),
        reason: format!("Valid values: {}", PathsMode::VALUES.join(", ")),
    })
}

impl Validate for PluginConfig {
    fn validate(&self) -> Result<()> {
        validate_import_prefix("import_prefix", &self.import_prefix)?;
        validate_import_path("pool_pkg", &self.pool_package_path)?;
        validate_go_identifier("pool_name", &self.pool_package_name)?;

        if let Some(plugins) = &self.plugins {
            for name in plugins {
                validate_non_empty_string("plugins", name)?;
            }
        }

        for (proto_file, import_path) in &self.import_map {
            validate_import_path(&format!("M{}", proto_file), import_path)?;
        }

        for (service, name) in &self.service_names {
            validate_non_empty_string(&format!("{}{}", SERVICE_NAME_KEY_PREFIX, service), name)?;
        }

        Ok(())
    }
}

impl ConfigProvider for PluginConfig {
    fn import_prefix(&self) -> &str {
        &self.import_prefix
    }

    fn paths_mode(&self) -> PathsMode {
        self.paths
    }

    fn plugins(&self) -> Option<&[String]> {
        self.plugins.as_deref()
    }

    fn pool_package_path(&self) -> &str {
        &self.pool_package_path
    }

    fn pool_package_name(&self) -> &str {
        &self.pool_package_name
    }

    fn import_mapping(&self, proto_file: &str) -> Option<&str> {
        self.import_map.get(proto_file).map(String::as_str)
    }

    fn service_registry_name(&self, service: &str) -> Option<&str> {
        self.service_names.get(service).map(String::as_str)
    }
}
