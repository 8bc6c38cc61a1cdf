use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::path::PathBuf;

use storefront_functions::config::require;
use storefront_functions::domain::aggregates::OrderStatus;
use storefront_functions::jobs::{backfill_invoices, backfill_status_webhooks, import_postal_codes, BackfillReport};
use storefront_functions::upstream::{SupabaseClient, WebhookClient};
use storefront_functions::{logging, Config};

#[derive(Debug, Parser)]
#[command(name = "storefront-jobs")]
#[command(about = "One-off backfill and import jobs for the storefront database")]
struct Cli {
    #[command(subcommand)]
    job: Job,
}

#[derive(Debug, Subcommand)]
enum Job {
    /// Request invoices for paid orders that have none
    Invoices {
        #[arg(long, default_value = "100")]
        limit: u32,
    },
    /// Re-send the status webhook for orders in a given status
    StatusWebhooks {
        #[arg(long)]
        status: OrderStatus,
        #[arg(long, default_value = "100")]
        limit: u32,
    },
    /// Import postal codes from a CSV file (postal_code,suburb,city,province)
    ImportPostalCodes {
        #[arg(long)]
        file: PathBuf,
        #[arg(long, default_value = "500")]
        batch_size: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;
    logging::init("storefront_functions=info");

    let http = reqwest::Client::new();
    let supabase = SupabaseClient::from_config(http.clone(), &config)?;

    let report: BackfillReport = match cli.job {
        Job::Invoices { limit } => {
            let url = require(&config.invoice_webhook_url, "N8N_INVOICE_WEBHOOK_URL")?;
            backfill_invoices(&supabase, &WebhookClient::new(http, url), limit).await?
        }
        Job::StatusWebhooks { status, limit } => {
            let url = require(&config.status_webhook_url, "N8N_ORDER_STATUS_WEBHOOK_URL")?;
            backfill_status_webhooks(&supabase, &WebhookClient::new(http, url), status, limit).await?
        }
        Job::ImportPostalCodes { file, batch_size } => {
            let reader = File::open(&file).with_context(|| format!("opening {}", file.display()))?;
            import_postal_codes(&supabase, reader, batch_size).await?
        }
    };

    tracing::info!(%report, "job finished");
    println!("{report}");
    if report.failed > 0 {
        std::process::exit(2);
    }
    Ok(())
}
