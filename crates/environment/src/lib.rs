//! Deployment environment classification for Scriptony.
//!
//! Maps a request hostname onto an environment kind (local, preview,
//! staging/admin, production) and derives the OAuth redirect URIs the
//! external provider must have registered for that origin. Classification
//! is a pure function of the hostname and an ordered rule list; nothing
//! here touches the network.

pub mod classify;
pub mod error;
pub mod rules;

pub use {
    classify::{
        AUTH_CALLBACK_PATH, CANONICAL_ORIGINS, DRIVE_SETTINGS_PATH, EnvironmentInfo,
        FEATURE_PATHS, classify, classify_with_rules, feature_path,
    },
    rules::{DomainRule, DomainRules, EnvironmentKind, HostPattern},
};

pub use error::{Error, Result};
