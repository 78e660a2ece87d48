//! Client id resolution across configured sources.

use std::sync::Arc;

use {
    secrecy::{ExposeSecret, Secret},
    tracing::{debug, warn},
};

use crate::{
    Error, Result,
    sources::{CredentialSource, EnvCredentialSource, FileCredentialSource},
};

/// Number of client id characters exposed in diagnostic output.
pub const CLIENT_ID_PREVIEW_LEN: usize = 12;

/// Redacted prefix of a client id, safe to show an operator.
///
/// Never yields the full identifier once it exceeds
/// [`CLIENT_ID_PREVIEW_LEN`] characters.
#[must_use]
pub fn client_id_preview(client_id: &Secret<String>) -> String {
    let prefix: String = client_id
        .expose_secret()
        .chars()
        .take(CLIENT_ID_PREVIEW_LEN)
        .collect();
    format!("{prefix}...")
}

/// Resolves OAuth client ids by walking sources in priority order.
pub struct CredentialResolver {
    sources: Vec<Arc<dyn CredentialSource>>,
}

impl CredentialResolver {
    /// Resolver over an explicit source chain, highest priority first.
    #[must_use]
    pub fn new(sources: Vec<Arc<dyn CredentialSource>>) -> Self {
        Self { sources }
    }

    /// The default chain: environment variables, then the config file.
    #[must_use]
    pub fn default_chain() -> Self {
        Self::new(vec![
            Arc::new(EnvCredentialSource),
            Arc::new(FileCredentialSource::new()),
        ])
    }

    /// Append a source with lowest priority (e.g. a remote config service).
    #[must_use]
    pub fn with_source(mut self, source: Arc<dyn CredentialSource>) -> Self {
        self.sources.push(source);
        self
    }

    /// Resolve the client id for `feature`.
    ///
    /// A failing source is logged and the walk continues with the next one;
    /// only when every source yields nothing does this fail with
    /// [`Error::CredentialUnavailable`]. Repeated calls with the same
    /// feature return the same logical value barring reconfiguration.
    pub async fn resolve(&self, feature: &str) -> Result<Secret<String>> {
        for source in &self.sources {
            match source.lookup(feature).await {
                Ok(Some(client_id)) => {
                    debug!(feature, source = source.name(), "resolved client id");
                    return Ok(client_id);
                },
                Ok(None) => {},
                Err(err) => {
                    warn!(feature, source = source.name(), error = %err, "credential source failed, trying next");
                },
            }
        }
        Err(Error::CredentialUnavailable {
            feature: feature.to_string(),
        })
    }
}
