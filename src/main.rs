//! Storefront Functions - HTTP entry point

use anyhow::Result;
use storefront_functions::{logging, router, AppState, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    logging::init("storefront_functions=info,tower_http=info");

    let port = config.port;
    for (name, configured) in [
        ("supabase", config.supabase_url.is_some() && config.supabase_service_key.is_some()),
        ("payfast", config.payfast.merchant_id.is_some()),
        ("shiplogic", config.shiplogic_api_key.is_some()),
        ("status webhook", config.status_webhook_url.is_some()),
    ] {
        if !configured {
            tracing::warn!("{} is not configured; its handlers will answer 500", name);
        }
    }

    let app = router(AppState::new(config));
    tracing::info!("🚀 Storefront functions listening on 0.0.0.0:{}", port);
    axum::serve(tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?, app).await?;
    Ok(())
}
