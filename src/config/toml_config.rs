use crate::domain::model::PathsMode;
use crate::utils::error::{GenError, Result};
use crate::utils::validation::{
    validate_go_identifier, validate_import_path, validate_import_prefix,
    validate_non_empty_string, validate_one_of, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Contents of the file named by the `config=` plugin parameter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub generator: GeneratorSection,
    #[serde(default)]
    pub pool: PoolSection,
    /// Proto service name -> name it registers under with the pool package.
    #[serde(default)]
    pub services: BTreeMap<String, String>,
    /// Proto file -> Go import path, same as `M` parameters.
    #[serde(default)]
    pub import_map: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorSection {
    pub import_prefix: Option<String>,
    pub paths: Option<String>,
    pub plugins: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSection {
    pub package_path: Option<String>,
    pub package_name: Option<String>,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(GenError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| GenError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the variable's value; unset variables stay as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| GenError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        if let Some(prefix) = &self.generator.import_prefix {
            validate_import_prefix("generator.import_prefix", prefix)?;
        }

        if let Some(paths) = &self.generator.paths {
            validate_one_of("generator.paths", paths, &PathsMode::VALUES)?;
        }

        if let Some(plugins) = &self.generator.plugins {
            for name in plugins {
                validate_non_empty_string("generator.plugins", name)?;
            }
        }

        if let Some(path) = &self.pool.package_path {
            validate_import_path("pool.package_path", path)?;
        }

        if let Some(name) = &self.pool.package_name {
            validate_go_identifier("pool.package_name", name)?;
        }

        for (service, name) in &self.services {
            validate_non_empty_string(&format!("services.{}", service), name)?;
        }

        for (proto_file, import_path) in &self.import_map {
            validate_import_path(&format!("import_map.{}", proto_file), import_path)?;
        }

        Ok(())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
