//! Provider configuration errors.

use std::path::PathBuf;

/// Errors raised while loading provider configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("provider config not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("I/O error reading provider config: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error in {path}: {source}")]
    YamlParse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("provider '{subtype}': invalid timeExpiration '{value}'")]
    InvalidDuration { subtype: String, value: String },

    #[error("provider '{subtype}': unsupported response schema type '{schema_type}'")]
    UnsupportedSchemaType { subtype: String, schema_type: String },

    #[error("provider '{subtype}': response property '{property}' cannot be refreshed")]
    ReservedProperty { subtype: String, property: String },
}
