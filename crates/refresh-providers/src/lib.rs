//! # refresh-providers: Attribute Providers
//!
//! Sources of fresh attribute values for the refresh engine.
//!
//! Providers are declared in a YAML document keyed by credential subtype
//! (see [`config`]). Each entry becomes a [`FlexibleHttpProvider`] that
//! renders a request from the current credential subject, calls the
//! upstream, and maps fields out of the JSON response. The
//! [`ProviderRegistry`] implements [`refresh_engine::ProviderFactory`].

pub mod config;
pub mod error;
pub mod extract;
pub mod http;
pub mod registry;
pub mod template;

pub use config::{parse_duration, FieldType, HttpMethod, ProviderSpec, ProvidersConfig};
pub use error::ConfigError;
pub use http::FlexibleHttpProvider;
pub use registry::ProviderRegistry;
