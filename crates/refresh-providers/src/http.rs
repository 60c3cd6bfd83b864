//! Provider that fetches fresh attribute values from a configured HTTP
//! endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue};
use serde_json::Value;

use refresh_engine::{Provider, ProviderError};
use refresh_vc::Subject;

use crate::config::{parse_duration, HttpMethod, ProviderSpec};
use crate::error::ConfigError;
use crate::extract::{coerce, lookup};
use crate::template::render;

/// HTTP provider for one credential subtype.
#[derive(Debug, Clone)]
pub struct FlexibleHttpProvider {
    subtype: String,
    spec: ProviderSpec,
    validity: Duration,
    http: reqwest::Client,
}

impl FlexibleHttpProvider {
    /// Validate `spec` and build the provider.
    pub fn new(
        subtype: impl Into<String>,
        spec: ProviderSpec,
        http: reqwest::Client,
    ) -> Result<Self, ConfigError> {
        let subtype = subtype.into();

        if spec.response_schema.schema_type != "json" {
            return Err(ConfigError::UnsupportedSchemaType {
                subtype,
                schema_type: spec.response_schema.schema_type.clone(),
            });
        }

        if let Some(property) = ["id", "type"]
            .into_iter()
            .find(|p| spec.response_schema.properties.contains_key(*p))
        {
            return Err(ConfigError::ReservedProperty {
                subtype,
                property: property.to_string(),
            });
        }

        let validity = match spec.settings.time_expiration.as_deref() {
            None => Duration::ZERO,
            Some(raw) => parse_duration(raw).ok_or_else(|| ConfigError::InvalidDuration {
                subtype: subtype.clone(),
                value: raw.to_string(),
            })?,
        };

        if spec.provider.method == HttpMethod::Get && spec.provider.body.is_some() {
            tracing::warn!(subtype = %subtype, "body is ignored for GET providers");
        }

        Ok(Self {
            subtype,
            spec,
            validity,
            http,
        })
    }

    async fn call_upstream(&self, subject: &Subject) -> Result<Value, ProviderError> {
        let target = &self.spec.provider;
        let url = render(&target.url, subject)?;

        let mut req = match target.method {
            HttpMethod::Get => self.http.get(&url),
            HttpMethod::Post => {
                let req = self.http.post(&url);
                match &target.body {
                    Some(body) => req
                        .header(reqwest::header::CONTENT_TYPE, "application/json")
                        .body(render(body, subject)?),
                    None => req,
                }
            }
        };

        for (name, value) in &target.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ProviderError::Template(format!("header name '{name}': {e}")))?;
            let value = HeaderValue::from_str(&render(value, subject)?)
                .map_err(|e| ProviderError::Template(format!("header '{name}': {e}")))?;
            req = req.header(name, value);
        }

        tracing::debug!(subtype = %self.subtype, url = %url, "calling provider upstream");
        let resp = req
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(ProviderError::Upstream { status, body });
        }

        resp.json()
            .await
            .map_err(|e| ProviderError::Response(format!("body is not JSON: {e}")))
    }
}

#[async_trait]
impl Provider for FlexibleHttpProvider {
    async fn provide(&self, subject: &Subject) -> Result<Option<Subject>, ProviderError> {
        let body = self.call_upstream(subject).await?;

        let mut fields = Subject::new();
        for (field, spec) in &self.spec.response_schema.properties {
            let raw = lookup(&body, &spec.path).ok_or_else(|| {
                ProviderError::Response(format!("field '{field}': no value at '{}'", spec.path))
            })?;
            fields.insert(field.clone(), coerce(field, raw, spec.field_type)?);
        }

        tracing::debug!(subtype = %self.subtype, fields = fields.len(), "provider returned fields");
        Ok(Some(fields))
    }

    fn validity(&self) -> Duration {
        self.validity
    }
}
