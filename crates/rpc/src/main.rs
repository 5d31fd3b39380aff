//! Credbank CLI - Main entry point

use clap::{Parser, Subcommand};
use credbank_rpc::{commands, AppConfig, AppContext};
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "credbank")]
#[command(about = "Credbank - Credit ledger for pay-per-use services", long_about = None)]
struct Cli {
    /// Data directory path
    #[arg(short, long, default_value = "./data")]
    data: PathBuf,

    /// Config file path (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a verified payment and credit an account
    RecordPayment {
        /// Account identifier
        account: String,
        /// Payment reference (transaction hash)
        reference: String,
        /// Credits the payment is worth
        amount: u64,
        /// Optional correlation ID
        #[arg(long)]
        correlation_id: Option<String>,
    },

    /// Consume credits from an account
    Consume {
        /// Account identifier
        account: String,
        /// Credits to consume
        amount: u64,
        /// Optional correlation ID
        #[arg(long)]
        correlation_id: Option<String>,
    },

    /// Check balance for an account
    Balance {
        /// Account identifier
        account: String,
    },

    /// List journal history
    History {
        /// Filter by account
        #[arg(long)]
        account: Option<String>,
        /// Maximum number of events to show
        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Audit journal-derived balances against the store
    Audit,

    /// Show the active configuration
    ShowConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref())?;
    let mut ctx = AppContext::new(config, &cli.data).await?;

    match cli.command {
        Commands::RecordPayment {
            account,
            reference,
            amount,
            correlation_id,
        } => {
            let correlation_id = correlation_id.unwrap_or_else(|| Uuid::new_v4().to_string());
            commands::record_payment(&mut ctx, &account, &reference, amount, &correlation_id)
                .await?;
        }

        Commands::Consume {
            account,
            amount,
            correlation_id,
        } => {
            let correlation_id = correlation_id.unwrap_or_else(|| Uuid::new_v4().to_string());
            commands::consume(&mut ctx, &account, amount, &correlation_id).await?;
        }

        Commands::Balance { account } => {
            commands::balance(&ctx, &account).await?;
        }

        Commands::History { account, limit } => {
            commands::history(&ctx, account.as_deref(), limit).await?;
        }

        Commands::Audit => {
            commands::audit(&ctx).await?;
        }

        Commands::ShowConfig => {
            commands::show_config(&ctx)?;
        }
    }

    Ok(())
}
