//! `{{ credentialSubject.<field> }}` placeholder substitution.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;

use refresh_engine::ProviderError;
use refresh_vc::Subject;

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{\s*credentialSubject\.([A-Za-z0-9_@$\-]+)\s*\}\}")
        .expect("placeholder pattern compiles")
});

/// Substitute subject fields into `template`.
///
/// Strings are inserted verbatim, other values as compact JSON. A field the
/// subject does not have is an error.
pub fn render(template: &str, subject: &Subject) -> Result<String, ProviderError> {
    let mut missing: Option<String> = None;

    let rendered = PLACEHOLDER.replace_all(template, |caps: &Captures<'_>| {
        let field = &caps[1];
        match subject.get(field) {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => {
                missing.get_or_insert_with(|| field.to_string());
                String::new()
            }
        }
    });

    match missing {
        Some(field) => Err(ProviderError::Template(format!(
            "credentialSubject.{field} is not present"
        ))),
        None => Ok(rendered.into_owned()),
    }
}
