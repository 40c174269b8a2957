//! Lumen - command-line client for the models API
//!
//! ## Commands
//!
//! - `models list`: list every model visible to the key
//! - `models get <ID>`: retrieve one model
//! - `config path`: print where settings are read from
//! - `config save`: persist the effective settings
//!
//! Model commands print the response envelope as JSON on stdout and exit
//! non-zero when the envelope is a failure. Logs go to stderr and follow
//! `RUST_LOG` (default `warn`).

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use lumen_application::{CallOptions, ModelsClient};
use lumen_domain::{ApiKey, ClientSettings, Envelope, ModelId, OrganizationId};
use lumen_infrastructure::{ReqwestHttpClient, SettingsRepository, SystemClock, to_json_stable};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "lumen")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Query the models API", long_about = None)]
struct Cli {
    /// API key (overrides LUMEN_API_KEY and the settings file)
    #[arg(long, global = true)]
    api_key: Option<ApiKey>,

    /// Organization id sent with every request
    #[arg(long, global = true)]
    organization: Option<OrganizationId>,

    /// API root, e.g. https://api.openai.com/v1
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Per-call timeout in milliseconds
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    timeout_ms: Option<u64>,

    /// Settings file (default: <config dir>/lumen/settings.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Model operations
    Models {
        #[command(subcommand)]
        action: ModelsAction,
    },

    /// Settings file operations
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum ModelsAction {
    /// List all models
    List,

    /// Retrieve one model by id
    Get {
        /// Model id, e.g. text-curie:001
        id: ModelId,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Print the settings file location
    Path,

    /// Write the effective settings (file, environment and flags) to the settings file
    Save,
}

impl Cli {
    fn repository(&self) -> SettingsRepository {
        self.config
            .as_ref()
            .map_or_else(SettingsRepository::new, SettingsRepository::at)
    }

    /// Flags win over the environment, which wins over the file.
    fn apply_flags(&self, mut settings: ClientSettings) -> ClientSettings {
        if let Some(key) = &self.api_key {
            settings.api_key = Some(key.clone());
        }
        if let Some(organization) = &self.organization {
            settings.organization = Some(organization.clone());
        }
        if let Some(base_url) = &self.base_url {
            settings.base_url.clone_from(base_url);
        }
        if let Some(timeout_ms) = self.timeout_ms {
            settings.timeout_ms = timeout_ms;
        }
        settings
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Prints the envelope and maps its outcome to the exit code.
fn report<T: Serialize>(envelope: &Envelope<T>) -> Result<ExitCode, Box<dyn std::error::Error>> {
    print!("{}", to_json_stable(envelope)?);
    Ok(if envelope.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    init_tracing();

    let cli = Cli::parse();
    let repository = cli.repository();
    let settings = cli.apply_flags(repository.load_with_env().await?);

    match &cli.command {
        Command::Models { action } => {
            let http = Arc::new(ReqwestHttpClient::from_settings(&settings)?);
            let client = ModelsClient::new(http, SystemClock::new(), settings);
            let options = CallOptions::default();

            match action {
                ModelsAction::List => report(&client.list_models(&options).await),
                ModelsAction::Get { id } => report(&client.get_model(id, &options).await),
            }
        }
        Command::Config { action } => match action {
            ConfigAction::Path => {
                match repository.path() {
                    Some(path) => println!("{}", path.display()),
                    None => println!("no config directory available"),
                }
                Ok(ExitCode::SUCCESS)
            }
            ConfigAction::Save => {
                repository.save(&settings).await?;
                info!(path = ?repository.path(), "settings saved");
                Ok(ExitCode::SUCCESS)
            }
        },
    }
}
