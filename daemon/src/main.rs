//! Pledge daemon — entry point for running the sign-up service.

mod config;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use config::{PledgeConfig, Secrets, StoreBackend};
use pledge_api::AppState;
use pledge_geocode::{AddressSearchClient, DistrictClient, HttpGeocoder};
use pledge_notify::{SmtpConfig, SmtpNotifier, ThreadRngCodeSource};
use pledge_store::{DuplicateChecker, SignatureLedger, TabularStore};
use pledge_store_csv::{CsvBackup, CsvStore};
use pledge_store_sheets::SheetsStore;
use pledge_types::SystemClock;
use pledge_workflow::PledgeWorkflow;

#[derive(Parser)]
#[command(name = "pledge-daemon", about = "Petition pledge sign-up service")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Port for the HTTP API.
    #[arg(long, env = "PLEDGE_PORT")]
    port: Option<u16>,

    /// Subcommand.
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run the sign-up service.
    Serve,
    /// Clear the entire signature store. Refuses to run without
    /// explicit confirmation.
    Reset {
        /// Confirm that every signature should be deleted.
        #[arg(long)]
        yes_delete_everything: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pledge_utils::init_tracing();

    let cli = Cli::parse();

    let mut config = if let Some(ref config_path) = cli.config {
        match PledgeConfig::from_toml_file(config_path) {
            Ok(cfg) => {
                tracing::info!("Loaded config from {}", config_path.display());
                cfg
            }
            Err(e) => {
                tracing::warn!("Failed to load config file: {e}, using defaults");
                PledgeConfig::default()
            }
        }
    } else {
        PledgeConfig::default()
    };
    if let Some(port) = cli.port {
        config.listen_port = port;
    }

    let secrets = Secrets::from_env();

    match cli.command {
        Command::Serve => serve(config, secrets).await,
        Command::Reset {
            yes_delete_everything,
        } => reset(config, secrets, yes_delete_everything).await,
    }
}

fn build_store(config: &PledgeConfig, secrets: &Secrets) -> anyhow::Result<Arc<dyn TabularStore>> {
    Ok(match config.backend {
        StoreBackend::Csv => Arc::new(CsvStore::new(&config.csv_path)),
        StoreBackend::Sheets => {
            anyhow::ensure!(
                !config.sheets_base_url.is_empty(),
                "sheets backend requires sheets_base_url"
            );
            let mut store = SheetsStore::new(&config.sheets_base_url, &config.sheets_worksheet);
            if let Some(token) = &secrets.sheets_token {
                store = store.with_token(token);
            }
            Arc::new(store)
        }
    })
}

async fn serve(config: PledgeConfig, secrets: Secrets) -> anyhow::Result<()> {
    let store = build_store(&config, &secrets)?;

    let mut ledger = SignatureLedger::new(store.clone()).with_floor(config.shrink_floor);
    match &config.backup_path {
        Some(path) => {
            ledger = ledger.with_backup(Arc::new(CsvBackup::new(path)));
        }
        None => tracing::warn!("no backup sink configured; a primary store outage loses writes"),
    }
    let checker = DuplicateChecker::new(store.clone());

    let api_key = secrets
        .district_api_key
        .clone()
        .context("PLEDGE_DISTRICT_API_KEY is required to resolve districts")?;
    let geocoder = Arc::new(HttpGeocoder {
        search: AddressSearchClient::with_base_url(
            &config.search_base_url,
            &config.search_user_agent,
        ),
        districts: DistrictClient::with_base_url(&config.district_base_url, &api_key),
    });

    let mut workflow = PledgeWorkflow::new(geocoder, checker, ledger, Arc::new(SystemClock));
    if config.require_email_verification {
        let username = secrets
            .smtp_username
            .clone()
            .context("PLEDGE_SMTP_USERNAME is required for email verification")?;
        let password = secrets
            .smtp_password
            .clone()
            .context("PLEDGE_SMTP_PASSWORD is required for email verification")?;
        anyhow::ensure!(
            !config.smtp_from.is_empty(),
            "smtp_from is required for email verification"
        );
        let smtp = SmtpConfig::new(&config.smtp_relay, &username, &password, &config.smtp_from);
        let notifier = Arc::new(SmtpNotifier::new(&smtp)?);
        workflow = workflow.with_code_challenge(notifier, Arc::new(ThreadRngCodeSource));
    } else {
        tracing::warn!("email verification disabled; identity submission commits directly");
    }

    let mut state = AppState::new(workflow, store);
    if let Some(token) = &secrets.admin_token {
        state = state.with_admin_token(token);
    }

    tracing::info!(
        port = config.listen_port,
        backend = ?config.backend,
        floor = config.shrink_floor,
        verified = config.require_email_verification,
        "starting pledge service"
    );
    pledge_api::serve(Arc::new(state), config.listen_port).await?;
    Ok(())
}

async fn reset(config: PledgeConfig, secrets: Secrets, confirmed: bool) -> anyhow::Result<()> {
    anyhow::ensure!(
        confirmed,
        "refusing to clear the signature store without --yes-delete-everything"
    );
    match config.backend {
        StoreBackend::Csv => {
            CsvStore::new(&config.csv_path).reset()?;
            tracing::info!(path = %config.csv_path.display(), "signature store cleared");
        }
        StoreBackend::Sheets => {
            let store = build_store(&config, &secrets)?;
            store.overwrite_all(&[]).await?;
            tracing::info!(
                worksheet = %config.sheets_worksheet,
                "remote signature worksheet cleared"
            );
        }
    }
    Ok(())
}
