//! Diagnostic run orchestration.
//!
//! A run classifies the environment, then resolves the feature's client id
//! and probes provider reachability concurrently, and assembles a complete
//! [`DiagnosticReport`]. Each sub-check fails independently; `run` only
//! rejects a malformed feature key.

use std::{
    sync::{
        Arc, Mutex, MutexGuard,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use {
    tokio::sync::watch,
    tracing::{debug, info, warn},
    url::Url,
};

use {
    scriptony_environment::{DomainRules, classify_with_rules},
    scriptony_oauth::{CredentialResolver, client_id_preview},
};

use crate::{
    Error, Result,
    probe::{DEFAULT_PROBE_TARGET, DEFAULT_PROBE_TIMEOUT, probe_with_timeout},
    report::{CredentialProbe, CredentialStatus, DiagnosticReport, LastError},
};

/// Lifecycle of a diagnostic run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Complete,
}

/// Orchestrates diagnostic runs and publishes the newest report.
///
/// Concurrent-run policy: a run started while another is in flight
/// supersedes it. Each run takes a generation ticket; a run whose ticket is
/// stale by the time it finishes still returns its report to its own
/// caller, but is not published to [`DiagnosticsRunner::subscribe`]
/// observers — the shared view only ever reflects the newest run, and a
/// published report is replaced whole, never mutated.
pub struct DiagnosticsRunner {
    resolver: CredentialResolver,
    rules: DomainRules,
    http: reqwest::Client,
    probe_target: Url,
    probe_timeout: Duration,
    generation: AtomicU64,
    state: Mutex<RunState>,
    latest: watch::Sender<Option<Arc<DiagnosticReport>>>,
}

impl DiagnosticsRunner {
    /// Runner with the loaded rule set and the default probe target.
    #[must_use]
    pub fn new(resolver: CredentialResolver) -> Self {
        let (latest, _) = watch::channel(None);
        Self {
            resolver,
            rules: DomainRules::load(),
            http: reqwest::Client::new(),
            probe_target: default_probe_target(),
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            generation: AtomicU64::new(0),
            state: Mutex::new(RunState::Idle),
            latest,
        }
    }

    #[must_use]
    pub fn with_rules(mut self, rules: DomainRules) -> Self {
        self.rules = rules;
        self
    }

    #[must_use]
    pub fn with_probe_target(mut self, target: Url) -> Self {
        self.probe_target = target;
        self
    }

    #[must_use]
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> RunState {
        *self.lock_state()
    }

    /// Observe the newest published report. Superseded runs never appear
    /// here, and a dropped receiver simply stops observing — in-flight
    /// runs are abandoned, not applied.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<DiagnosticReport>>> {
        self.latest.subscribe()
    }

    /// Run the full diagnostic battery for `feature` against `hostname`.
    ///
    /// Always resolves with a complete report when the feature key is well
    /// formed; credential and connectivity failures degrade their own
    /// fields instead of propagating.
    pub async fn run(
        &self,
        feature: &str,
        hostname: &str,
        last_error: Option<LastError>,
    ) -> Result<DiagnosticReport> {
        validate_feature(feature)?;

        // Entering Running resets any Complete left by the previous run.
        *self.lock_state() = RunState::Running;
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        info!(feature, hostname, "running OAuth diagnostics");

        let environment = classify_with_rules(hostname, &self.rules);

        let credential = async {
            match self.resolver.resolve(feature).await {
                Ok(client_id) => CredentialProbe {
                    feature: feature.to_string(),
                    status: CredentialStatus::Available,
                    preview: Some(client_id_preview(&client_id)),
                },
                Err(err) => {
                    warn!(feature, error = %err, "client id unavailable");
                    CredentialProbe {
                        feature: feature.to_string(),
                        status: CredentialStatus::Unavailable,
                        preview: None,
                    }
                },
            }
        };
        let connectivity = probe_with_timeout(&self.http, &self.probe_target, self.probe_timeout);

        let (credential, connectivity) = tokio::join!(credential, connectivity);

        let report = DiagnosticReport {
            environment,
            credential,
            connectivity,
            last_error,
        };

        if self.generation.load(Ordering::SeqCst) == generation {
            self.latest.send_replace(Some(Arc::new(report.clone())));
            *self.lock_state() = RunState::Complete;
        } else {
            debug!(feature, "run superseded, stale report not published");
        }

        Ok(report)
    }

    fn lock_state(&self) -> MutexGuard<'_, RunState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Feature keys are lowercase `[a-z0-9-]`; anything else is a caller bug,
/// not a diagnosable condition.
fn validate_feature(feature: &str) -> Result<()> {
    let well_formed = !feature.is_empty()
        && feature
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-');
    if well_formed {
        Ok(())
    } else {
        Err(Error::invalid_feature(feature))
    }
}

fn default_probe_target() -> Url {
    match Url::parse(DEFAULT_PROBE_TARGET) {
        Ok(url) => url,
        Err(_) => unreachable!("default probe target is a valid URL"),
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use {
        async_trait::async_trait,
        secrecy::Secret,
        scriptony_oauth::{CredentialSource, Error as OauthError},
    };

    use {super::*, crate::probe::Reachability};

    struct StubSource {
        client_id: Option<&'static str>,
        delay: Duration,
    }

    impl StubSource {
        fn available(client_id: &'static str) -> Self {
            Self {
                client_id: Some(client_id),
                delay: Duration::ZERO,
            }
        }

        fn unavailable() -> Self {
            Self {
                client_id: None,
                delay: Duration::ZERO,
            }
        }
    }

    #[async_trait]
    impl CredentialSource for StubSource {
        fn name(&self) -> &'static str {
            "stub"
        }

        async fn lookup(&self, _feature: &str) -> scriptony_oauth::Result<Option<Secret<String>>> {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            match self.client_id {
                Some(id) => Ok(Some(Secret::new(id.to_string()))),
                None => Err(OauthError::message("stub backend offline")),
            }
        }
    }

    fn runner_with(source: StubSource, probe_url: &str) -> DiagnosticsRunner {
        DiagnosticsRunner::new(CredentialResolver::new(vec![Arc::new(source)]))
            .with_probe_target(Url::parse(probe_url).unwrap())
            .with_probe_timeout(Duration::from_secs(2))
    }

    #[tokio::test]
    async fn successful_run_produces_full_report() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server.mock("GET", "/ping").with_status(204).create_async().await;

        let runner = runner_with(
            StubSource::available("123456789012-abcdef.apps.googleusercontent.com"),
            &format!("{}/ping", server.url()),
        );
        let report = runner.run("drive", "localhost:5173", None).await.unwrap();

        assert_eq!(report.credential.status, CredentialStatus::Available);
        assert_eq!(report.credential.preview.as_deref(), Some("123456789012..."));
        assert_eq!(report.connectivity, Reachability::Reachable);
        assert_eq!(report.environment.origin_url, "http://localhost:5173");
        assert_eq!(runner.state(), RunState::Complete);
    }

    #[tokio::test]
    async fn both_failures_still_resolve() {
        // Unavailable credential source and a dead probe target.
        let runner = runner_with(StubSource::unavailable(), "http://127.0.0.1:1/ping");
        let report = runner
            .run("drive", "app.scriptony.de", None)
            .await
            .unwrap();

        assert_eq!(report.credential.status, CredentialStatus::Unavailable);
        assert!(report.credential.preview.is_none());
        assert_eq!(report.connectivity, Reachability::Unreachable);
    }

    #[tokio::test]
    async fn last_error_is_carried_verbatim() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server.mock("GET", "/ping").with_status(200).create_async().await;

        let runner = runner_with(
            StubSource::available("client-id"),
            &format!("{}/ping", server.url()),
        );
        let last_error = LastError {
            code: "redirect_uri_mismatch".to_string(),
            details: "redirect URI not registered".to_string(),
        };
        let report = runner
            .run("drive", "app.scriptony.de", Some(last_error.clone()))
            .await
            .unwrap();

        assert_eq!(report.last_error, Some(last_error));
    }

    #[tokio::test]
    async fn malformed_feature_keys_reject() {
        let runner = runner_with(StubSource::unavailable(), "http://127.0.0.1:1/ping");

        for feature in ["", "Drive", "drive!", "drive key"] {
            let err = runner.run(feature, "localhost", None).await.unwrap_err();
            assert!(matches!(err, Error::InvalidFeature { .. }), "{feature:?}");
        }
    }

    #[tokio::test]
    async fn rerun_reports_identical_environment() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/ping")
            .with_status(200)
            .expect_at_least(2)
            .create_async()
            .await;

        let runner = runner_with(
            StubSource::available("client-id"),
            &format!("{}/ping", server.url()),
        );
        let first = runner.run("drive", "preview.scriptony.de", None).await.unwrap();
        let second = runner.run("drive", "preview.scriptony.de", None).await.unwrap();

        assert_eq!(first.environment, second.environment);
    }

    #[tokio::test]
    async fn superseded_run_is_not_published() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/ping")
            .with_status(200)
            .expect_at_least(2)
            .create_async()
            .await;

        let runner = Arc::new(
            DiagnosticsRunner::new(CredentialResolver::new(vec![Arc::new(StubSource {
                client_id: Some("client-id"),
                delay: Duration::from_millis(200),
            })]))
            .with_probe_target(Url::parse(&format!("{}/ping", server.url())).unwrap()),
        );
        let mut reports = runner.subscribe();

        // Start a slow run, then supersede it before it finishes.
        let first = tokio::spawn({
            let runner = Arc::clone(&runner);
            async move { runner.run("drive", "localhost:5173", None).await }
        });
        tokio::time::sleep(Duration::from_millis(50)).await;
        let second = runner.run("drive", "app.scriptony.de", None).await.unwrap();
        let first = first.await.unwrap().unwrap();

        // Both callers got their own report...
        assert_eq!(first.environment.hostname, "localhost:5173");
        assert_eq!(second.environment.hostname, "app.scriptony.de");

        // ...but observers only ever saw the newest one.
        let published = reports.borrow_and_update().clone().unwrap();
        assert_eq!(published.environment.hostname, "app.scriptony.de");
    }

    #[tokio::test]
    async fn fresh_runner_is_idle() {
        let runner = runner_with(StubSource::unavailable(), "http://127.0.0.1:1/ping");
        assert_eq!(runner.state(), RunState::Idle);
    }

    #[test]
    fn feature_key_validation() {
        assert!(validate_feature("drive").is_ok());
        assert!(validate_feature("drive-backup").is_ok());
        assert!(validate_feature("auth2").is_ok());
        assert!(validate_feature("").is_err());
        assert!(validate_feature("Drive").is_err());
        assert!(validate_feature("drive_backup").is_err());
    }
}
