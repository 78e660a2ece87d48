//! Environment classification and redirect URI derivation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::rules::{DomainRules, EnvironmentKind};

/// Path suffix of the storage settings page (the Drive OAuth callback).
pub const DRIVE_SETTINGS_PATH: &str = "/account?tab=storage";

/// Path suffix of the sign-in callback.
pub const AUTH_CALLBACK_PATH: &str = "/auth/callback";

/// Fixed path suffix appended to the origin for each OAuth-consuming feature.
pub const FEATURE_PATHS: &[(&str, &str)] = &[
    ("auth", AUTH_CALLBACK_PATH),
    ("drive", DRIVE_SETTINGS_PATH),
];

/// Origins expected in the provider console regardless of which environment
/// the diagnostics run from.
pub const CANONICAL_ORIGINS: &[&str] = &[
    "https://app.scriptony.de",
    "https://preview.scriptony.de",
    "https://admin.scriptony.de",
];

/// The path suffix for a feature key, if the feature is known.
#[must_use]
pub fn feature_path(feature: &str) -> Option<&'static str> {
    FEATURE_PATHS
        .iter()
        .find(|(key, _)| *key == feature)
        .map(|(_, path)| *path)
}

/// Snapshot of the deployment environment derived from a hostname.
///
/// Recomputed on demand and never persisted; identical hostnames always
/// produce field-for-field identical snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentInfo {
    /// The hostname as given, port included.
    pub hostname: String,
    pub kind: EnvironmentKind,
    /// Canonical `scheme://host[:port]` of this context.
    pub origin_url: String,
    /// Feature key → fully qualified redirect URI for this origin.
    pub redirect_uris: BTreeMap<String, String>,
}

/// Classify a hostname using the built-in domain rules.
///
/// Pure and total: unrecognized hosts yield [`EnvironmentKind::Unknown`]
/// with redirect URIs still derived from their literal origin, so the
/// diagnostic flow can render partial output for third-party preview hosts.
#[must_use]
pub fn classify(hostname: &str) -> EnvironmentInfo {
    classify_with_rules(hostname, &DomainRules::builtin())
}

/// Classify a hostname against an injected rule set.
#[must_use]
pub fn classify_with_rules(hostname: &str, rules: &DomainRules) -> EnvironmentInfo {
    let kind = rules.kind_for(hostname);
    let scheme = if kind == EnvironmentKind::Local {
        "http"
    } else {
        "https"
    };
    let origin_url = format!("{scheme}://{hostname}");
    let redirect_uris = FEATURE_PATHS
        .iter()
        .map(|(feature, path)| ((*feature).to_string(), format!("{origin_url}{path}")))
        .collect();

    EnvironmentInfo {
        hostname: hostname.to_string(),
        kind,
        origin_url,
        redirect_uris,
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_dev_host_with_port() {
        let info = classify("localhost:5173");
        assert_eq!(info.kind, EnvironmentKind::Local);
        assert_eq!(info.origin_url, "http://localhost:5173");
        assert_eq!(
            info.redirect_uris.get("drive").map(String::as_str),
            Some("http://localhost:5173/account?tab=storage")
        );
    }

    #[test]
    fn preview_host_uses_https() {
        let info = classify("preview.scriptony.de");
        assert_eq!(info.kind, EnvironmentKind::Preview);
        assert_eq!(info.origin_url, "https://preview.scriptony.de");
        assert!(
            info.redirect_uris
                .get("auth")
                .is_some_and(|uri| uri.starts_with("https://preview.scriptony.de"))
        );
    }

    #[test]
    fn production_redirects() {
        let info = classify("app.scriptony.de");
        assert_eq!(info.kind, EnvironmentKind::Production);
        assert_eq!(
            info.redirect_uris.get("drive").map(String::as_str),
            Some("https://app.scriptony.de/account?tab=storage")
        );
        assert_eq!(
            info.redirect_uris.get("auth").map(String::as_str),
            Some("https://app.scriptony.de/auth/callback")
        );
    }

    #[test]
    fn unknown_host_still_derives_uris() {
        let info = classify("something.vercel.app");
        assert_eq!(info.kind, EnvironmentKind::Unknown);
        assert_eq!(info.origin_url, "https://something.vercel.app");
        assert_eq!(info.redirect_uris.len(), FEATURE_PATHS.len());
    }

    #[test]
    fn classify_is_deterministic() {
        assert_eq!(classify("preview.scriptony.de"), classify("preview.scriptony.de"));
        assert_eq!(classify("localhost:5173"), classify("localhost:5173"));
    }

    #[test]
    fn feature_path_lookup() {
        assert_eq!(feature_path("drive"), Some(DRIVE_SETTINGS_PATH));
        assert_eq!(feature_path("auth"), Some(AUTH_CALLBACK_PATH));
        assert_eq!(feature_path("calendar"), None);
    }
}
