use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use dealsync_engine::{service_from_config, SyncConfig, SyncDirection};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "dealsync-cli")]
#[command(about = "Finance/sales ledger stage reconciliation")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Sweep every deal in both ledgers once.
    SyncAll,
    /// Reconcile one VIN.
    SyncVin {
        vin: String,
        #[arg(long, default_value = "both")]
        direction: SyncDirection,
    },
    /// Compare both sides of one VIN without writing.
    Status { vin: String },
    /// Apply ledger table migrations.
    Migrate,
    /// Run periodic sweeps until interrupted.
    Scheduler,
}

fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).context("serializing output")?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = SyncConfig::from_env();

    match cli.command.unwrap_or(Commands::SyncAll) {
        Commands::Migrate => {
            let pool = dealsync_storage::connect(&config.database_url)
                .await
                .context("connecting to ledger database")?;
            dealsync_storage::migrate(&pool)
                .await
                .context("applying migrations")?;
            println!("migrations applied");
        }
        Commands::SyncAll => {
            let service = service_from_config(&config).await?;
            let report = service.trigger_full_sync().await?;
            print_json(&report)?;
        }
        Commands::SyncVin { vin, direction } => {
            let service = service_from_config(&config).await?;
            let report = service
                .trigger_targeted_sync(&vin, direction)
                .await
                .with_context(|| format!("syncing {vin}"))?;
            print_json(&report)?;
        }
        Commands::Status { vin } => {
            let service = service_from_config(&config).await?;
            let status = service
                .query_status(&vin)
                .await
                .with_context(|| format!("reading sync status for {vin}"))?;
            print_json(&status)?;
        }
        Commands::Scheduler => {
            let service = service_from_config(&config).await?;
            if !service.maybe_start_scheduler(&config) {
                bail!("scheduler disabled; set DEALSYNC_SCHEDULER_ENABLED=1 to run it");
            }
            tokio::signal::ctrl_c()
                .await
                .context("waiting for ctrl-c")?;
            service.scheduler().stop();
            print_json(&service.scheduler().status())?;
        }
    }

    Ok(())
}
