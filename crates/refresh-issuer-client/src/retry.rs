//! Backoff for idempotent reads against issuer nodes and context hosts.
//!
//! Only transport failures are retried. An HTTP response of any status goes
//! straight back to the caller, and so does a request that reqwest could not
//! build (a bad URL derived from an issuer DID will not get better).

use std::future::Future;
use std::time::Duration;

/// Attempts after the first one.
const MAX_RETRIES: u32 = 3;

/// Delay before the first retry, doubled for each further one.
const BASE_DELAY: Duration = Duration::from_millis(200);

/// Send a GET built by `send`, retrying transport failures.
///
/// `endpoint` names the call in log output, e.g.
/// `GET /v2/identities/{did}/credentials/{id}`.
pub(crate) async fn retry_send<F, Fut>(
    endpoint: &str,
    send: F,
) -> Result<reqwest::Response, reqwest::Error>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<reqwest::Response, reqwest::Error>>,
{
    let mut delay = BASE_DELAY;
    let mut attempt = 0;
    loop {
        let err = match send().await {
            Ok(resp) => return Ok(resp),
            Err(e) if e.is_builder() || attempt == MAX_RETRIES => {
                tracing::warn!(endpoint = %endpoint, attempts = attempt + 1, "giving up: {e}");
                return Err(e);
            }
            Err(e) => e,
        };
        attempt += 1;
        tracing::warn!(
            endpoint = %endpoint,
            attempt,
            max_retries = MAX_RETRIES,
            "transport error, retrying in {delay:?}: {err}"
        );
        tokio::time::sleep(delay).await;
        delay *= 2;
    }
}
