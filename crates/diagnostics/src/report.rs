//! The diagnostic report assembled by a run, plus the provider-console
//! checklist derived from it.

use serde::{Deserialize, Serialize};

use scriptony_environment::{CANONICAL_ORIGINS, DRIVE_SETTINGS_PATH, EnvironmentInfo};

use crate::probe::Reachability;

/// Where the provider-side configuration is reviewed.
pub const GOOGLE_CONSOLE_CREDENTIALS_URL: &str =
    "https://console.cloud.google.com/apis/credentials";

/// Outcome of resolving the OAuth client id for a feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialStatus {
    Available,
    Unavailable,
}

/// Client id resolution result, redacted for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialProbe {
    pub feature: String,
    pub status: CredentialStatus,
    /// Fixed-length prefix of the resolved id; never present when
    /// resolution failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
}

/// The most recent real-world failure the operator saw, carried verbatim
/// into the report for context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastError {
    pub code: String,
    pub details: String,
}

/// Aggregated snapshot of one diagnostic run.
///
/// Ephemeral: rebuilt from scratch on every run and never merged with a
/// previous report. Serializable so any renderer (CLI, log line, JSON
/// consumer) reads the same structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticReport {
    pub environment: EnvironmentInfo,
    pub credential: CredentialProbe,
    pub connectivity: Reachability,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<LastError>,
}

/// Expected provider-console configuration for an environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleChecklist {
    /// Authorized JavaScript origins.
    pub authorized_origins: Vec<String>,
    /// Authorized redirect URIs.
    pub redirect_uris: Vec<String>,
}

/// Build the console checklist: the current origin plus the canonical
/// Scriptony origins, and the drive redirect URI for each of them,
/// deduplicated while preserving order.
#[must_use]
pub fn console_checklist(environment: &EnvironmentInfo) -> ConsoleChecklist {
    let mut authorized_origins = vec![environment.origin_url.clone()];
    for origin in CANONICAL_ORIGINS {
        if !authorized_origins.iter().any(|o| o == origin) {
            authorized_origins.push((*origin).to_string());
        }
    }

    let mut redirect_uris = Vec::new();
    if let Some(current) = environment.redirect_uris.get("drive") {
        redirect_uris.push(current.clone());
    }
    for origin in CANONICAL_ORIGINS {
        let uri = format!("{origin}{DRIVE_SETTINGS_PATH}");
        if !redirect_uris.iter().any(|u| u == &uri) {
            redirect_uris.push(uri);
        }
    }

    ConsoleChecklist {
        authorized_origins,
        redirect_uris,
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use scriptony_environment::classify;

    use super::*;

    #[test]
    fn checklist_includes_current_and_canonical_origins() {
        let environment = classify("localhost:5173");
        let checklist = console_checklist(&environment);

        assert_eq!(checklist.authorized_origins[0], "http://localhost:5173");
        assert_eq!(checklist.authorized_origins.len(), 1 + CANONICAL_ORIGINS.len());
        assert_eq!(
            checklist.redirect_uris[0],
            "http://localhost:5173/account?tab=storage"
        );
        assert!(
            checklist
                .redirect_uris
                .contains(&"https://app.scriptony.de/account?tab=storage".to_string())
        );
    }

    #[test]
    fn checklist_deduplicates_canonical_environment() {
        let environment = classify("app.scriptony.de");
        let checklist = console_checklist(&environment);

        // The current origin is itself canonical, so no duplicate entry.
        assert_eq!(checklist.authorized_origins.len(), CANONICAL_ORIGINS.len());
        assert_eq!(checklist.redirect_uris.len(), CANONICAL_ORIGINS.len());
    }

    #[test]
    fn unavailable_credential_serializes_without_preview() {
        let credential = CredentialProbe {
            feature: "drive".to_string(),
            status: CredentialStatus::Unavailable,
            preview: None,
        };
        let json = serde_json::to_value(&credential).unwrap();
        assert_eq!(json["status"], "unavailable");
        assert!(json.get("preview").is_none());
    }

    #[test]
    fn report_serializes_for_any_renderer() {
        let report = DiagnosticReport {
            environment: classify("preview.scriptony.de"),
            credential: CredentialProbe {
                feature: "drive".to_string(),
                status: CredentialStatus::Available,
                preview: Some("123456789012...".to_string()),
            },
            connectivity: Reachability::Unknown,
            last_error: Some(LastError {
                code: "redirect_uri_mismatch".to_string(),
                details: "redirect URI not registered".to_string(),
            }),
        };

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["environment"]["kind"], "preview");
        assert_eq!(json["connectivity"], "unknown");
        assert_eq!(json["last_error"]["code"], "redirect_uri_mismatch");
    }
}
