//! Best-effort reachability probe against the OAuth provider.

use std::time::Duration;

use {
    serde::{Deserialize, Serialize},
    tracing::debug,
    url::Url,
};

/// Static resource on the provider's domain used purely as a reachability
/// target. No authentication, no payload expectations.
pub const DEFAULT_PROBE_TARGET: &str = "https://accounts.google.com/favicon.ico";

/// Upper bound for a single probe request. Expiry classifies as
/// [`Reachability::Unknown`], not as a failure.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(4);

/// Tri-state reachability verdict.
///
/// "Blocked by policy" and "down" are different answers, so this is never
/// collapsed to a boolean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reachability {
    Reachable,
    Unreachable,
    Unknown,
}

impl std::fmt::Display for Reachability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reachable => write!(f, "reachable"),
            Self::Unreachable => write!(f, "unreachable"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Probe `target` with the default timeout.
pub async fn probe(client: &reqwest::Client, target: &Url) -> Reachability {
    probe_with_timeout(client, target, DEFAULT_PROBE_TIMEOUT).await
}

/// Probe `target` once. Any HTTP response at all — whatever the status —
/// counts as reachable, because the question is "is the network path
/// open", not "did the endpoint return 200". Only a clearly classified
/// connection failure (DNS, refused) is `Unreachable`; timeouts and
/// ambiguous transport errors stay `Unknown`.
pub async fn probe_with_timeout(
    client: &reqwest::Client,
    target: &Url,
    timeout: Duration,
) -> Reachability {
    match client.get(target.as_str()).timeout(timeout).send().await {
        Ok(resp) => {
            debug!(target = %target, status = %resp.status(), "probe target responded");
            Reachability::Reachable
        },
        Err(err) if err.is_timeout() => {
            debug!(target = %target, "probe timed out");
            Reachability::Unknown
        },
        Err(err) if err.is_connect() => {
            debug!(target = %target, error = %err, "probe connection failed");
            Reachability::Unreachable
        },
        Err(err) => {
            debug!(target = %target, error = %err, "probe inconclusive");
            Reachability::Unknown
        },
    }
}
