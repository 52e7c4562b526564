use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenError {
    #[error("Failed to decode protobuf input: {0}")]
    DecodeError(#[from] prost::DecodeError),

    #[error("Failed to encode protobuf output: {0}")]
    EncodeError(#[from] prost::EncodeError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration '{field}'")]
    MissingConfigError { field: String },

    #[error("Unknown plugin '{name}'")]
    UnknownPlugin { name: String },

    #[error("No descriptor supplied for file '{name}'")]
    MissingFile { name: String },

    #[error("plugin grpcx only supports one service proto: {file} declares {count} services")]
    MultipleServices { file: String, count: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Output,
    Configuration,
    Descriptor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl GenError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            GenError::DecodeError(_) => ErrorCategory::Input,
            GenError::EncodeError(_) | GenError::SerializationError(_) | GenError::IoError(_) => {
                ErrorCategory::Output
            }
            GenError::ConfigValidationError { .. }
            | GenError::InvalidConfigValueError { .. }
            | GenError::MissingConfigError { .. }
            | GenError::UnknownPlugin { .. } => ErrorCategory::Configuration,
            GenError::MissingFile { .. } | GenError::MultipleServices { .. } => {
                ErrorCategory::Descriptor
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Configuration => ErrorSeverity::Medium,
            ErrorCategory::Descriptor => ErrorSeverity::High,
            ErrorCategory::Input | ErrorCategory::Output => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            GenError::DecodeError(_) => {
                "Run this binary as a protoc plugin (--grpcx_out) or pass a FileDescriptorSet built with `protoc -o`".to_string()
            }
            GenError::EncodeError(_) | GenError::SerializationError(_) | GenError::IoError(_) => {
                "Check that the output location is writable and retry".to_string()
            }
            GenError::ConfigValidationError { field, .. }
            | GenError::InvalidConfigValueError { field, .. } => {
                format!("Fix the value of '{}' in the plugin parameters or config file", field)
            }
            GenError::MissingConfigError { field } => {
                format!("Set '{}' in the plugin parameters or config file", field)
            }
            GenError::UnknownPlugin { .. } => {
                "Use plugins=grpcx or drop the plugins parameter".to_string()
            }
            GenError::MissingFile { .. } => {
                "Make sure every file passed for generation is part of the descriptor set".to_string()
            }
            GenError::MultipleServices { .. } => {
                "Split the services into separate .proto files, one service per file".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            GenError::MultipleServices { file, count } => format!(
                "{} declares {} services but grpcx generates code for exactly one",
                file, count
            ),
            GenError::UnknownPlugin { name } => {
                format!("No plugin named '{}' is registered", name)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiple_services_is_descriptor_error() {
        let err = GenError::MultipleServices {
            file: "a.proto".to_string(),
            count: 2,
        };
        assert_eq!(err.category(), ErrorCategory::Descriptor);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(err.to_string().contains("only supports one service proto"));
        assert!(err.user_friendly_message().contains("a.proto"));
    }

    #[test]
    fn test_config_errors_are_medium() {
        let err = GenError::UnknownPlugin {
            name: "grpc".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.severity(), ErrorSeverity::Medium);
    }
}
