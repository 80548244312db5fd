use tokio::sync::watch;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pricing_backend::{
    build_pricing_service, config::AppConfig, connect_store, handlers,
    jobs::scheduled_price_sweep::start_scheduled_price_sweep_job, AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,pricing_backend=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env();

    let store = connect_store(&config).await?;
    let pricing = build_pricing_service(&config, store)?;

    // Create the settings row up front so the first request does not race it
    let settings = pricing.get_settings().await?;
    tracing::info!(
        percentage_markup = %settings.percentage_markup,
        flat_fee_markup = %settings.flat_fee_markup,
        "Markup settings loaded"
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweep_job = if config.sweep.enabled {
        Some(start_scheduled_price_sweep_job(
            pricing.sweeper().clone(),
            config.sweep.clone(),
            shutdown_rx,
        ))
    } else {
        tracing::warn!("Scheduled price sweep job disabled; use POST /api/scheduled-changes/apply-due");
        None
    };

    let state = AppState { pricing };

    let mut app = handlers::api_router(state).layer(TraceLayer::new_for_http());
    if config.cors_allow_any {
        app = app.layer(CorsLayer::permissive());
    }

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received, draining HTTP server");
            shutdown_tx.send(true).ok();
        })
        .await?;

    // Let an in-flight sweep finish its current apply before exiting
    if let Some(handle) = sweep_job {
        if let Err(e) = handle.await {
            tracing::warn!("Sweep job ended abnormally: {}", e);
        }
    }

    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on unix
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
