mod collect;
mod config;
mod probes;
mod report;
mod snapshot;
mod transport;

use clap::Parser;
use collect::Identity;
use config::Config;
use snapshot::ExternalData;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "sysdetails")]
#[command(version)]
#[command(about = "Collects machine inventory details and relays them to a collection endpoint")]
struct Cli {
    /// Employee ID for the submission (prompted when omitted)
    #[arg(long)]
    employee_id: Option<String>,
    /// Email for the submission (prompted when omitted)
    #[arg(long)]
    email: Option<String>,
    /// Department for the submission (prompted when omitted)
    #[arg(long)]
    department: Option<String>,
    /// YAML config path; defaults apply when the file is absent
    #[arg(long, default_value = "./config.yaml")]
    config: String,
    /// Overrides api_base_url from the config
    #[arg(long)]
    api_url: Option<String>,
    /// JSON file with details collected on the subject machine;
    /// skips local probing entirely
    #[arg(long)]
    client_data: Option<PathBuf>,
    /// Render the report without sending it
    #[arg(long)]
    print_only: bool,
    /// Also write the report to a timestamped .txt file
    #[arg(long)]
    save: bool,
    #[arg(long)]
    print_default_config: bool,
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    if cli.print_default_config {
        println!("{}", Config::example_yaml());
        return;
    }

    let mut cfg = match Config::load(&cli.config) {
        Ok(cfg) => cfg,
        Err(err) => {
            error!(error = %err, "failed to load configuration");
            std::process::exit(2);
        }
    };
    if let Some(url) = &cli.api_url {
        cfg.api_base_url = url.clone();
        if let Err(err) = cfg.validate() {
            error!(error = %err, "invalid configuration");
            std::process::exit(2);
        }
    }

    let identity = match resolve_identity(&cli) {
        Ok(identity) => identity,
        Err(err) => {
            error!(error = %err, "all identity fields are required");
            std::process::exit(2);
        }
    };

    let external = match cli.client_data.as_deref().map(read_external_data).transpose() {
        Ok(data) => data,
        Err(err) => {
            error!(error = %err, "failed to read client data");
            std::process::exit(2);
        }
    };

    let started = Instant::now();
    let snapshot = collect::collect(&identity, external, &cfg);
    info!(
        elapsed = %humantime::format_duration(truncate_to_millis(started.elapsed())),
        "snapshot collected"
    );

    let text = report::format_report(&snapshot);
    println!("{text}");

    if cli.save {
        match report::save_report(&text, &identity.employee_id) {
            Ok(path) => info!(path = %path.display(), "report saved"),
            Err(err) => warn!(error = %err, "failed to save report"),
        }
    }

    if cli.print_only {
        return;
    }

    let timeout = Duration::from_secs(cfg.request_timeout_secs);
    match transport::send(&cfg.api_base_url, &snapshot, timeout) {
        Ok(response) => {
            info!(endpoint = %cfg.api_base_url, "submission accepted");
            if let Some(meta) = response.meta {
                info!(%meta, "server metadata");
            }
            if let Some(details) = response.details {
                tracing::debug!(%details, "server echoed persisted record");
            }
            if let Some(server_text) = response.formatted_text {
                tracing::debug!(bytes = server_text.len(), "server rendered its own report copy");
            }
        }
        Err(err) => {
            error!(error = %err, "submission failed");
            std::process::exit(1);
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn resolve_identity(cli: &Cli) -> Result<Identity, collect::ValidationError> {
    let employee_id = field_or_prompt(cli.employee_id.as_deref(), "Enter Employee ID: ");
    let email = field_or_prompt(cli.email.as_deref(), "Enter Email: ");
    let department = field_or_prompt(cli.department.as_deref(), "Enter Department: ");
    collect::validate_identity(&employee_id, &email, &department)
}

fn field_or_prompt(value: Option<&str>, prompt: &str) -> String {
    if let Some(v) = value {
        return v.to_string();
    }
    print!("{prompt}");
    let _ = io::stdout().flush();
    let mut line = String::new();
    if io::stdin().read_line(&mut line).is_err() {
        return String::new();
    }
    line.trim().to_string()
}

fn read_external_data(path: &Path) -> Result<ExternalData, String> {
    let text =
        std::fs::read_to_string(path).map_err(|err| format!("{}: {err}", path.display()))?;
    serde_json::from_str(&text).map_err(|err| format!("{}: {err}", path.display()))
}

// format_duration prints every nanosecond otherwise.
fn truncate_to_millis(duration: Duration) -> Duration {
    Duration::from_millis(duration.as_millis() as u64)
}
