//! `scriptony diagnose` — sectioned rendering of a diagnostic report.
//!
//! Prints `[ok]`, `[warn]`, `[fail]`, or `[info]` status indicators per
//! item, the expected Google Cloud console configuration, and a summary
//! line with error/warning counts.

use scriptony_diagnostics::{
    CredentialStatus, DiagnosticReport, GOOGLE_CONSOLE_CREDENTIALS_URL, LastError, Reachability,
    console_checklist,
};
use scriptony_environment::{EnvironmentInfo, EnvironmentKind};

// ── ANSI helpers ────────────────────────────────────────────────────────────

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Per-item result used to build the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Ok,
    Warn,
    Fail,
    Info,
}

impl Status {
    fn label(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Warn => "warn",
            Self::Fail => "fail",
            Self::Info => "info",
        }
    }

    fn color(self) -> &'static str {
        match self {
            Self::Ok => GREEN,
            Self::Warn => YELLOW,
            Self::Fail => RED,
            Self::Info => CYAN,
        }
    }
}

struct CheckItem {
    status: Status,
    message: String,
}

struct Section {
    title: String,
    items: Vec<CheckItem>,
}

impl Section {
    fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            items: Vec::new(),
        }
    }

    fn push(&mut self, status: Status, message: impl Into<String>) {
        self.items.push(CheckItem {
            status,
            message: message.into(),
        });
    }
}

// ── Printing ────────────────────────────────────────────────────────────────

fn print_report(sections: &[Section]) -> (usize, usize) {
    let mut errors = 0usize;
    let mut warnings = 0usize;

    for section in sections {
        eprintln!("{BOLD}{}{RESET}", section.title);
        for item in &section.items {
            let color = item.status.color();
            let label = item.status.label();
            eprintln!("  [{color}{label}{RESET}]  {}", item.message);
            match item.status {
                Status::Fail => errors += 1,
                Status::Warn => warnings += 1,
                _ => {},
            }
        }
        eprintln!();
    }

    (errors, warnings)
}

// ── Entry points ────────────────────────────────────────────────────────────

/// Print the full diagnosis. Returns `(errors, warnings)`.
pub fn print_diagnosis(report: &DiagnosticReport) -> (usize, usize) {
    eprintln!("{BOLD}scriptony diagnose{RESET}");
    eprintln!("{BOLD}=================={RESET}\n");

    let mut sections = Vec::new();
    sections.push(environment_section(&report.environment));
    sections.push(credential_section(report));
    sections.push(connectivity_section(report));
    if let Some(ref last_error) = report.last_error {
        sections.push(last_error_section(last_error));
    }
    sections.push(console_section(&report.environment));

    let (errors, warnings) = print_report(&sections);
    eprintln!("{BOLD}Summary:{RESET} {errors} error(s), {warnings} warning(s)");

    (errors, warnings)
}

/// Print just the environment classification.
pub fn print_environment(environment: &EnvironmentInfo) {
    print_report(&[environment_section(environment)]);
}

// ── Sections ────────────────────────────────────────────────────────────────

fn environment_section(environment: &EnvironmentInfo) -> Section {
    let mut section = Section::new("Environment");

    section.push(Status::Info, format!("Hostname: {}", environment.hostname));
    let recognition = if environment.kind == EnvironmentKind::Unknown {
        Status::Warn
    } else {
        Status::Ok
    };
    section.push(
        recognition,
        format!(
            "Domain recognition: {}",
            environment.kind.recognition_label()
        ),
    );
    section.push(
        Status::Info,
        format!("Origin URL: {}", environment.origin_url),
    );
    for (feature, uri) in &environment.redirect_uris {
        section.push(Status::Info, format!("{feature} redirect URI: {uri}"));
    }

    section
}

fn credential_section(report: &DiagnosticReport) -> Section {
    let mut section = Section::new("Credential");

    match report.credential.status {
        CredentialStatus::Available => {
            let preview = report.credential.preview.as_deref().unwrap_or("redacted");
            section.push(Status::Ok, format!("Client id available ({preview})"));
        },
        CredentialStatus::Unavailable => {
            section.push(
                Status::Fail,
                format!(
                    "No client id configured for \"{}\"",
                    report.credential.feature
                ),
            );
        },
    }

    section
}

fn connectivity_section(report: &DiagnosticReport) -> Section {
    let mut section = Section::new("Connectivity");

    match report.connectivity {
        Reachability::Reachable => {
            section.push(Status::Ok, "Google reachable");
        },
        Reachability::Unreachable => {
            section.push(Status::Fail, "Google unreachable (network-level failure)");
        },
        Reachability::Unknown => {
            section.push(
                Status::Warn,
                "Google reachability inconclusive (blocked or filtered transport)",
            );
        },
    }

    section
}

fn last_error_section(last_error: &LastError) -> Section {
    let mut section = Section::new("Last error");
    section.push(
        Status::Fail,
        format!("{}: {}", last_error.code, last_error.details),
    );
    section
}

fn console_section(environment: &EnvironmentInfo) -> Section {
    let mut section = Section::new("Google Cloud console configuration");
    let checklist = console_checklist(environment);

    section.push(
        Status::Info,
        format!("Review at {GOOGLE_CONSOLE_CREDENTIALS_URL}"),
    );
    for origin in &checklist.authorized_origins {
        section.push(
            Status::Info,
            format!("Authorized JavaScript origin: {origin}"),
        );
    }
    for uri in &checklist.redirect_uris {
        section.push(Status::Info, format!("Authorized redirect URI: {uri}"));
    }

    section
}

// ── Tests ───────────────────────────────────────────────────────────────────
