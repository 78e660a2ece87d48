mod diagnose_commands;

use {
    clap::{Parser, Subcommand},
    scriptony_diagnostics::{DiagnosticsRunner, LastError},
    scriptony_environment::classify,
    scriptony_oauth::CredentialResolver,
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(
    name = "scriptony",
    about = "Scriptony — deployment environment and OAuth connection diagnostics"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the OAuth connection diagnostics for a feature.
    Diagnose {
        /// Feature to diagnose (e.g. "drive" or "auth").
        #[arg(long, default_value = "drive")]
        feature: String,
        /// Hostname of the deployment under diagnosis, port included for
        /// dev hosts (e.g. "localhost:5173").
        #[arg(long, env = "SCRIPTONY_HOSTNAME")]
        hostname: String,
        /// Error code of the most recent real-world failure, if any.
        #[arg(long, requires = "last_error_details")]
        last_error_code: Option<String>,
        /// Details of the most recent real-world failure.
        #[arg(long, requires = "last_error_code")]
        last_error_details: Option<String>,
        /// Print the report as JSON instead of the sectioned summary.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Classify a hostname and print the derived environment.
    Environment {
        /// Hostname to classify.
        #[arg(long, env = "SCRIPTONY_HOSTNAME")]
        hostname: String,
        /// Print the environment as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_telemetry(&cli);

    match cli.command {
        Commands::Diagnose {
            feature,
            hostname,
            last_error_code,
            last_error_details,
            json,
        } => {
            let last_error = last_error_code
                .zip(last_error_details)
                .map(|(code, details)| LastError { code, details });

            info!(feature, hostname, "starting diagnostics");

            let runner = DiagnosticsRunner::new(CredentialResolver::default_chain());
            let report = runner.run(&feature, &hostname, last_error).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                let (errors, _warnings) = diagnose_commands::print_diagnosis(&report);
                if errors > 0 {
                    std::process::exit(1);
                }
            }
            Ok(())
        },
        Commands::Environment { hostname, json } => {
            let environment = classify(&hostname);
            if json {
                println!("{}", serde_json::to_string_pretty(&environment)?);
            } else {
                diagnose_commands::print_environment(&environment);
            }
            Ok(())
        },
    }
}
