use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use fd_lock::RwLock;
use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use onboarding_workflow::advisor::next_step_for;
use onboarding_workflow::config::{init_config, OnboardingConfig};
use onboarding_workflow::service::{OnboardingService, ServiceError};
use onboarding_workflow::storage::{BusinessStore, JsonDirStore};
use onboarding_workflow::telemetry::init_telemetry;

#[derive(Parser)]
#[command(name = "onboard")]
#[command(about = "Move businesses through industry, contact and sales approval")]
#[command(long_about = "Tracks each business (keyed by FEIN) through the onboarding workflow: \
                       New -> Market Approved -> Sales Approved -> Won/Lost. Every command prints \
                       the resulting state together with the next allowed step.")]
struct Cli {
    /// Directory holding business snapshots (overrides configuration)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Emit JSON log lines on stderr
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a new business in stage New
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        fein: String,
    },
    /// Print the stored snapshot of a business
    Show { fein: String },
    /// Declare the industry of a business
    Industry { fein: String, industry: String },
    /// Set the contact person of a business
    Contact {
        fein: String,
        #[arg(long)]
        name: String,
        #[arg(long, help = "Exactly 11 digits, no separators")]
        phone: String,
    },
    /// Close a Sales Approved business as Won or Lost
    Complete { fein: String, stage: String },
    /// Describe the next step for a stage label
    NextStep {
        stage: String,
        #[arg(long, default_value = "fein_id")]
        fein: String,
    },
    /// Inspect or write the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write the effective configuration to onboarding.toml
    Init {
        #[arg(long, help = "Overwrite an existing onboarding.toml")]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = init_config()?.clone();
    if let Some(dir) = cli.data_dir {
        config.storage.data_dir = dir;
    }
    if cli.json_logs {
        config.observability.json_logs = true;
    }
    init_telemetry(&config.observability)?;

    match cli.command {
        Commands::NextStep { stage, fein } => match next_step_for(&stage, &fein) {
            Ok(advisory) => print_json(&advisory),
            Err(e) => {
                print_json(&serde_json::json!({ "error": e.to_string() }))?;
                Ok(ExitCode::FAILURE)
            }
        },
        Commands::Config { action } => run_config(action, &config),
        command => {
            // Each invocation is its own process, so only the json backend
            // can see businesses created by an earlier command
            let data_dir = config.storage.persistent_dir()?;
            let mut lock = open_writer_lock(data_dir)?;
            let _guard = lock.try_write().map_err(|_| {
                anyhow!(
                    "Another onboard command is using {}. Only one can run at a time.",
                    data_dir.display()
                )
            })?;
            let service = OnboardingService::new(JsonDirStore::new(data_dir));
            run_command(command, &service).await
        }
    }
}

async fn run_command<S: BusinessStore>(
    command: Commands,
    service: &OnboardingService<S>,
) -> Result<ExitCode> {
    match command {
        Commands::Create { name, fein } => emit(service.create_business(&name, &fein).await),
        Commands::Show { fein } => emit(service.get_business(&fein).await),
        Commands::Industry { fein, industry } => emit(service.add_industry(&fein, &industry).await),
        Commands::Contact { fein, name, phone } => {
            emit(service.add_contact(&fein, &name, &phone).await)
        }
        Commands::Complete { fein, stage } => emit(service.complete_process(&fein, &stage).await),
        Commands::NextStep { .. } | Commands::Config { .. } => {
            Err(anyhow!("command does not use the business store"))
        }
    }
}

fn run_config(action: ConfigAction, config: &OnboardingConfig) -> Result<ExitCode> {
    match action {
        ConfigAction::Show => print_json(config),
        ConfigAction::Init { force } => {
            let path = Path::new("onboarding.toml");
            if path.exists() && !force {
                return Err(anyhow!(
                    "onboarding.toml already exists, use --force to overwrite"
                ));
            }
            config.save_to_file(path)?;
            println!("Wrote {}", path.display());
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Single-writer guard for a data directory
fn open_writer_lock(data_dir: &Path) -> Result<RwLock<File>> {
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("creating {}", data_dir.display()))?;
    let lock_file = File::create(data_dir.join("onboard.lock"))?;
    Ok(RwLock::new(lock_file))
}

fn emit<T: Serialize>(result: Result<T, ServiceError>) -> Result<ExitCode> {
    match result {
        Ok(body) => print_json(&body),
        Err(e) => {
            tracing::debug!(error = %e, "Request failed");
            print_json(&e.to_response())?;
            Ok(ExitCode::FAILURE)
        }
    }
}

fn print_json<T: Serialize + ?Sized>(body: &T) -> Result<ExitCode> {
    println!("{}", serde_json::to_string_pretty(body)?);
    Ok(ExitCode::SUCCESS)
}
