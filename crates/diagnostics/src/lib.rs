//! OAuth integration diagnostics for Scriptony.
//!
//! Assembles a [`report::DiagnosticReport`] from three independent checks:
//! environment classification (`scriptony-environment`), client id
//! resolution (`scriptony-oauth`), and a best-effort reachability probe
//! against the provider. Sub-check failures degrade their own report field
//! and never abort a run.

pub mod error;
pub mod probe;
pub mod report;
pub mod runner;

pub use {
    probe::{
        DEFAULT_PROBE_TARGET, DEFAULT_PROBE_TIMEOUT, Reachability, probe, probe_with_timeout,
    },
    report::{
        ConsoleChecklist, CredentialProbe, CredentialStatus, DiagnosticReport,
        GOOGLE_CONSOLE_CREDENTIALS_URL, LastError, console_checklist,
    },
    runner::{DiagnosticsRunner, RunState},
};

pub use error::{Error, Result};
