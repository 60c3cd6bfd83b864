//! # Provider Configuration
//!
//! YAML document keyed by credential subtype. Each entry says where to
//! fetch fresh attribute values and how to pick them out of the response.
//!
//! ```yaml
//! KYCAgeCredential:
//!   settings:
//!     timeExpiration: 5m
//!   provider:
//!     url: "https://api.example.com/users/{{ credentialSubject.id }}"
//!     method: GET
//!   responseSchema:
//!     type: json
//!     properties:
//!       birthday:
//!         type: integer
//!         match: data.birthday
//! ```

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// All provider entries, by credential subtype.
pub type ProvidersConfig = HashMap<String, ProviderSpec>;

/// One provider entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderSpec {
    #[serde(default)]
    pub settings: Settings,
    pub provider: HttpSpec,
    pub response_schema: ResponseSchema,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Validity of refreshed credentials, e.g. `5m`. Unset means the
    /// engine default.
    #[serde(default)]
    pub time_expiration: Option<String>,
}

/// Upstream request template.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpSpec {
    pub url: String,
    #[serde(default)]
    pub method: HttpMethod,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub body: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
}

/// How to read fields out of the upstream response.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseSchema {
    #[serde(rename = "type", default = "default_schema_type")]
    pub schema_type: String,
    #[serde(default)]
    pub properties: BTreeMap<String, FieldSpec>,
}

fn default_schema_type() -> String {
    "json".to_string()
}

/// A subject field read from the response.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldSpec {
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Dotted path into the response body. Numeric segments index arrays.
    #[serde(rename = "match")]
    pub path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Integer,
    Number,
    Boolean,
    Object,
}

/// Parse provider configuration from a YAML string.
pub fn parse_providers(yaml: &str) -> Result<ProvidersConfig, ConfigError> {
    Ok(serde_yaml::from_str(yaml)?)
}

/// Load provider configuration from a YAML file.
pub fn load_providers(path: &Path) -> Result<ProvidersConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ConfigError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            ConfigError::Io(e)
        }
    })?;
    serde_yaml::from_str(&content).map_err(|e| ConfigError::YamlParse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Parse a validity such as `30s`, `5m`, `2h`, `1d`, or bare seconds.
///
/// Returns `None` for anything else.
pub fn parse_duration(raw: &str) -> Option<Duration> {
    let raw = raw.trim();
    let (digits, unit) = match raw.char_indices().last()? {
        (i, c) if c.is_ascii_alphabetic() => (&raw[..i], c),
        _ => (raw, 's'),
    };
    let value: u64 = digits.trim().parse().ok()?;
    let multiplier = match unit {
        's' => 1,
        'm' => 60,
        'h' => 60 * 60,
        'd' => 24 * 60 * 60,
        _ => return None,
    };
    value.checked_mul(multiplier).map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
KYCAgeCredential:
  settings:
    timeExpiration: 5m
  provider:
    url: "https://api.example.com/users/{{ credentialSubject.id }}"
    method: POST
    headers:
      Authorization: "Bearer token"
    body: '{"id": "{{ credentialSubject.id }}"}'
  responseSchema:
    type: json
    properties:
      birthday:
        type: integer
        match: data.birthday
"#;

    #[test]
    fn parses_sample_config() {
        let cfg = parse_providers(SAMPLE).unwrap();
        let spec = &cfg["KYCAgeCredential"];
        assert_eq!(spec.settings.time_expiration.as_deref(), Some("5m"));
        assert_eq!(spec.provider.method, HttpMethod::Post);
        assert_eq!(spec.provider.headers["Authorization"], "Bearer token");
        assert!(spec.provider.body.is_some());
        assert_eq!(spec.response_schema.schema_type, "json");
        let birthday = &spec.response_schema.properties["birthday"];
        assert_eq!(birthday.field_type, FieldType::Integer);
        assert_eq!(birthday.path, "data.birthday");
    }

    #[test]
    fn method_defaults_to_get() {
        let cfg = parse_providers(
            "T:\n  provider:\n    url: https://x\n  responseSchema:\n    properties: {}\n",
        )
        .unwrap();
        assert_eq!(cfg["T"].provider.method, HttpMethod::Get);
        assert!(cfg["T"].settings.time_expiration.is_none());
    }

    #[test]
    fn unknown_field_type_is_rejected() {
        let yaml = "T:\n  provider:\n    url: https://x\n  responseSchema:\n    properties:\n      a: {type: date, match: a}\n";
        assert!(parse_providers(yaml).is_err());
    }

    #[test]
    fn durations() {
        assert_eq!(parse_duration("30s"), Some(Duration::from_secs(30)));
        assert_eq!(parse_duration("5m"), Some(Duration::from_secs(300)));
        assert_eq!(parse_duration("2h"), Some(Duration::from_secs(7200)));
        assert_eq!(parse_duration("1d"), Some(Duration::from_secs(86_400)));
        assert_eq!(parse_duration("90"), Some(Duration::from_secs(90)));
        assert_eq!(parse_duration(""), None);
        assert_eq!(parse_duration("5w"), None);
        assert_eq!(parse_duration("m"), None);
        assert_eq!(parse_duration("-5m"), None);
    }

    #[test]
    fn missing_file_is_reported() {
        let err = load_providers(Path::new("/nonexistent/providers.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }
}
