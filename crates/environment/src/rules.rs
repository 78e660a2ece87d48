//! Ordered hostname classification rules.
//!
//! The rule list is data, not logic: built-in defaults cover the known
//! Scriptony domains and the hosted preview platform, and the whole list
//! can be replaced by a `domain_rules.json` file in the config directory:
//!
//! ```json
//! {
//!   "rules": [
//!     { "pattern": { "exact": "localhost" }, "kind": "local" },
//!     { "pattern": { "suffix": ".scriptony.de" }, "kind": "production" }
//!   ]
//! }
//! ```

use std::path::Path;

use {
    serde::{Deserialize, Serialize},
    tracing::{debug, warn},
};

use crate::error::{Context, Result};

/// Coarse classification of the deployment context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvironmentKind {
    Local,
    Preview,
    Staging,
    Production,
    Unknown,
}

impl EnvironmentKind {
    /// Operator-facing label shown in diagnostic output.
    #[must_use]
    pub fn recognition_label(self) -> &'static str {
        match self {
            Self::Local => "Local Development",
            Self::Preview => "Preview Domain",
            Self::Staging => "Admin Domain",
            Self::Production => "Scriptony Domain",
            Self::Unknown => "Unknown Domain",
        }
    }
}

impl std::fmt::Display for EnvironmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Preview => write!(f, "preview"),
            Self::Staging => write!(f, "staging"),
            Self::Production => write!(f, "production"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// A single hostname pattern. Matching is case-insensitive and ignores any
/// port carried by the hostname.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostPattern {
    /// The host must equal this value exactly.
    Exact(String),
    /// The host must end with this suffix (leading dot recommended).
    Suffix(String),
    /// The host must start with this prefix (private-range dev hosts).
    Prefix(String),
}

impl HostPattern {
    fn matches(&self, host: &str) -> bool {
        match self {
            Self::Exact(value) => host == value,
            Self::Suffix(suffix) => host.ends_with(suffix.as_str()),
            Self::Prefix(prefix) => host.starts_with(prefix.as_str()),
        }
    }
}

/// One `pattern → kind` classification rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainRule {
    pub pattern: HostPattern,
    pub kind: EnvironmentKind,
}

/// Ordered rule list; the first matching rule wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainRules {
    pub rules: Vec<DomainRule>,
}

impl Default for DomainRules {
    fn default() -> Self {
        Self::builtin()
    }
}

impl DomainRules {
    /// The built-in rule list. Dev hosts sort before preview patterns,
    /// preview before the admin domain, admin before the apex domains.
    #[must_use]
    pub fn builtin() -> Self {
        use EnvironmentKind::{Local, Preview, Production, Staging};

        let exact = |value: &str, kind| DomainRule {
            pattern: HostPattern::Exact(value.into()),
            kind,
        };
        let suffix = |value: &str, kind| DomainRule {
            pattern: HostPattern::Suffix(value.into()),
            kind,
        };

        Self {
            rules: vec![
                exact("localhost", Local),
                exact("127.0.0.1", Local),
                exact("::1", Local),
                suffix(".localhost", Local),
                DomainRule {
                    pattern: HostPattern::Prefix("192.168.".into()),
                    kind: Local,
                },
                exact("preview.scriptony.de", Preview),
                suffix(".lovable.app", Preview),
                suffix(".lovableproject.com", Preview),
                exact("admin.scriptony.de", Staging),
                exact("app.scriptony.de", Production),
                exact("www.scriptony.de", Production),
                exact("scriptony.de", Production),
            ],
        }
    }

    /// Load the rule list, preferring `domain_rules.json` in the config
    /// directory. An unreadable override is ignored with a warning so
    /// diagnostics keep working on the built-ins.
    #[must_use]
    pub fn load() -> Self {
        let path = scriptony_common::paths::config_dir().join("domain_rules.json");
        if !path.exists() {
            return Self::builtin();
        }
        match Self::from_json_file(&path) {
            Ok(rules) => {
                debug!(path = %path.display(), count = rules.rules.len(), "loaded domain rule override");
                rules
            },
            Err(err) => {
                warn!(path = %path.display(), error = %err, "ignoring unreadable domain rule override");
                Self::builtin()
            },
        }
    }

    /// Parse a rule list from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read domain rules from {}", path.display()))?;
        let rules: Self = serde_json::from_str(&data)
            .with_context(|| format!("invalid domain rules in {}", path.display()))?;
        Ok(rules)
    }

    /// The environment kind for a hostname. The port is ignored for
    /// matching; no matching rule yields [`EnvironmentKind::Unknown`],
    /// never an error.
    #[must_use]
    pub fn kind_for(&self, hostname: &str) -> EnvironmentKind {
        let host = host_only(hostname).to_ascii_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.pattern.matches(&host))
            .map_or(EnvironmentKind::Unknown, |rule| rule.kind)
    }
}

/// Strips a trailing `:port` and IPv6 brackets from a hostname.
fn host_only(hostname: &str) -> &str {
    if let Some(rest) = hostname.strip_prefix('[')
        && let Some(end) = rest.find(']')
    {
        return &rest[..end];
    }
    match hostname.rsplit_once(':') {
        Some((host, port))
            if !host.contains(':')
                && !port.is_empty()
                && port.bytes().all(|b| b.is_ascii_digit()) =>
        {
            host
        },
        _ => hostname,
    }
}
