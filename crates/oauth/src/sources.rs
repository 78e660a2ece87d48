//! Credential configuration sources.
//!
//! A [`CredentialSource`] answers "what OAuth client id is configured for
//! this feature?" and nothing more; resolution order and failure semantics
//! live in [`crate::resolver`].

use std::{collections::HashMap, path::PathBuf};

use {async_trait::async_trait, secrecy::Secret, tracing::debug, url::Url};

use crate::{Error, Result, error::Context};

/// Asynchronous `feature → client id` lookup.
#[async_trait]
pub trait CredentialSource: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Returns the configured client id for `feature`, or `None` when this
    /// source has no entry. An `Err` is a transport failure, not absence.
    async fn lookup(&self, feature: &str) -> Result<Option<Secret<String>>>;
}

// ── Environment variables ───────────────────────────────────────────────────

/// The environment variable carrying the client id for a feature,
/// e.g. `SCRIPTONY_OAUTH_DRIVE_CLIENT_ID`.
#[must_use]
pub fn client_id_env_var(feature: &str) -> String {
    format!(
        "SCRIPTONY_OAUTH_{}_CLIENT_ID",
        feature.to_uppercase().replace('-', "_")
    )
}

/// Reads client ids from `SCRIPTONY_OAUTH_<FEATURE>_CLIENT_ID` variables.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvCredentialSource;

#[async_trait]
impl CredentialSource for EnvCredentialSource {
    fn name(&self) -> &'static str {
        "env"
    }

    async fn lookup(&self, feature: &str) -> Result<Option<Secret<String>>> {
        let var = client_id_env_var(feature);
        match std::env::var(&var) {
            Ok(value) if !value.trim().is_empty() => {
                debug!(%var, "client id found in environment");
                Ok(Some(Secret::new(value)))
            },
            _ => Ok(None),
        }
    }
}

// ── Config file ─────────────────────────────────────────────────────────────

/// Reads a `feature → client id` JSON object from `oauth_clients.json`.
#[derive(Debug, Clone)]
pub struct FileCredentialSource {
    path: PathBuf,
}

impl FileCredentialSource {
    /// Source backed by `oauth_clients.json` in the Scriptony config directory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            path: scriptony_common::paths::config_dir().join("oauth_clients.json"),
        }
    }

    /// Source backed by an explicit file path.
    #[must_use]
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for FileCredentialSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialSource for FileCredentialSource {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn lookup(&self, feature: &str) -> Result<Option<Secret<String>>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let data = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        let entries: HashMap<String, String> = serde_json::from_str(&data)
            .with_context(|| format!("invalid client id map in {}", self.path.display()))?;
        Ok(entries
            .get(feature)
            .filter(|id| !id.trim().is_empty())
            .map(|id| Secret::new(id.clone())))
    }
}

// ── Remote configuration service ────────────────────────────────────────────

/// Fetches the client id map from a remote configuration endpoint.
///
/// The endpoint returns a JSON object mapping feature keys to client ids,
/// e.g. `{"drive": "1234-abcd.apps.googleusercontent.com"}`.
pub struct HttpCredentialSource {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpCredentialSource {
    #[must_use]
    pub fn new(client: reqwest::Client, endpoint: Url) -> Self {
        Self { client, endpoint }
    }
}

#[async_trait]
impl CredentialSource for HttpCredentialSource {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn lookup(&self, feature: &str) -> Result<Option<Secret<String>>> {
        debug!(endpoint = %self.endpoint, feature, "fetching client id map");

        let resp = self
            .client
            .get(self.endpoint.as_str())
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|source| Error::external("failed to fetch client id map", source))?;

        if !resp.status().is_success() {
            let status = resp.status();
            return Err(Error::message(format!(
                "client id endpoint returned HTTP {status}"
            )));
        }

        let entries: HashMap<String, String> = resp
            .json()
            .await
            .map_err(|source| Error::external("failed to parse client id map", source))?;

        Ok(entries
            .get(feature)
            .filter(|id| !id.trim().is_empty())
            .map(|id| Secret::new(id.clone())))
    }
}
