//! One-shot sweep: apply every scheduled price change that is due now and exit.
//!
//! Intended for cron-style deployments that run without the HTTP server.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pricing_backend::{build_pricing_service, config::AppConfig, connect_store};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,pricing_backend=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();
    let config = AppConfig::from_env();

    if config.database_url.is_none() {
        return Err("DATABASE_URL must be set; an in-memory store has nothing to sweep".into());
    }

    let store = connect_store(&config).await?;
    let pricing = build_pricing_service(&config, store)?;

    let report = pricing.apply_due_scheduled_changes().await?;

    println!("{}", serde_json::to_string_pretty(&report)?);

    if !report.failed_ids.is_empty() {
        tracing::warn!(
            "{} scheduled changes failed and remain pending: {:?}",
            report.failed_ids.len(),
            report.failed_ids
        );
        std::process::exit(2);
    }

    Ok(())
}
