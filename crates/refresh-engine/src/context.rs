//! # JSON-LD Context Aggregation
//!
//! Merges the `@context` bodies of a credential's context documents into a
//! single `{"@context": [...]}` document for slot lookups.
//!
//! Aggregation is best effort: a URI that fails to load, or whose document
//! has the wrong shape, is skipped with a warning. The aggregate never
//! fails. Dropping the future cancels the remaining loads.

use std::sync::Arc;

use serde_json::{json, Value};

use crate::traits::DocumentLoader;

/// Best-effort merger of JSON-LD context documents.
#[derive(Clone)]
pub struct ContextAggregator {
    loader: Arc<dyn DocumentLoader>,
}

impl std::fmt::Debug for ContextAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextAggregator").finish_non_exhaustive()
    }
}

impl ContextAggregator {
    pub fn new(loader: Arc<dyn DocumentLoader>) -> Self {
        Self { loader }
    }

    /// Load every URI and merge the `@context` entries in order.
    ///
    /// Array-valued `@context` entries are flattened; any other value is
    /// appended as-is.
    pub async fn aggregate(&self, uris: &[String]) -> Value {
        let mut merged: Vec<Value> = Vec::new();

        if uris.is_empty() {
            tracing::warn!("credential has no JSON-LD contexts, using empty @context");
        }

        for uri in uris {
            if uri.is_empty() {
                tracing::warn!("empty context URI, skipping");
                continue;
            }

            let remote = match self.loader.load(uri).await {
                Ok(remote) => remote,
                Err(e) => {
                    tracing::warn!(uri = %uri, "failed to load context: {e}");
                    continue;
                }
            };

            let Value::Object(mut document) = remote.document else {
                tracing::warn!(uri = %uri, "context document is not a JSON object, skipping");
                continue;
            };

            match document.remove("@context") {
                Some(Value::Array(entries)) => merged.extend(entries),
                Some(entry) => merged.push(entry),
                None => {
                    tracing::warn!(uri = %uri, "@context key not found in document, skipping");
                }
            }
        }

        json!({ "@context": merged })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use crate::traits::RemoteDocument;
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct MapLoader(HashMap<String, Value>);

    #[async_trait]
    impl DocumentLoader for MapLoader {
        async fn load(&self, uri: &str) -> Result<RemoteDocument, ServiceError> {
            self.0
                .get(uri)
                .cloned()
                .map(|document| RemoteDocument {
                    document_url: uri.to_string(),
                    document,
                })
                .ok_or_else(|| ServiceError::NotFound {
                    resource: uri.to_string(),
                })
        }
    }

    fn aggregator(docs: Vec<(&str, Value)>) -> ContextAggregator {
        let map = docs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        ContextAggregator::new(Arc::new(MapLoader(map)))
    }

    #[tokio::test]
    async fn empty_list_yields_empty_context_array() {
        let agg = aggregator(vec![]);
        assert_eq!(agg.aggregate(&[]).await, json!({"@context": []}));
    }

    #[tokio::test]
    async fn arrays_are_flattened_and_scalars_appended() {
        let agg = aggregator(vec![
            ("https://a", json!({"@context": [{"a": 1}, {"b": 2}]})),
            ("https://b", json!({"@context": {"c": 3}})),
            ("https://c", json!({"@context": "https://www.w3.org/2018/credentials/v1"})),
        ]);
        let uris = vec!["https://a".into(), "https://b".into(), "https://c".into()];
        assert_eq!(
            agg.aggregate(&uris).await,
            json!({"@context": [{"a": 1}, {"b": 2}, {"c": 3}, "https://www.w3.org/2018/credentials/v1"]})
        );
    }

    #[tokio::test]
    async fn failing_uri_is_skipped() {
        let agg = aggregator(vec![("https://ok", json!({"@context": [{"ok": true}]}))]);
        let uris = vec!["https://missing".into(), "https://ok".into()];
        assert_eq!(agg.aggregate(&uris).await, json!({"@context": [{"ok": true}]}));
    }

    #[tokio::test]
    async fn wrong_shapes_are_skipped() {
        let agg = aggregator(vec![
            ("https://array", json!([1, 2, 3])),
            ("https://no-context", json!({"@vocab": "x"})),
            ("https://ok", json!({"@context": {"kept": 1}})),
        ]);
        let uris = vec![
            "".into(),
            "https://array".into(),
            "https://no-context".into(),
            "https://ok".into(),
        ];
        assert_eq!(agg.aggregate(&uris).await, json!({"@context": [{"kept": 1}]}));
    }

    #[tokio::test]
    async fn two_of_three_resolving_still_merges_both() {
        let agg = aggregator(vec![
            ("https://one", json!({"@context": [{"one": 1}]})),
            ("https://three", json!({"@context": [{"three": 3}]})),
        ]);
        let uris = vec![
            "https://one".into(),
            "https://two".into(),
            "https://three".into(),
        ];
        assert_eq!(
            agg.aggregate(&uris).await,
            json!({"@context": [{"one": 1}, {"three": 3}]})
        );
    }
}
