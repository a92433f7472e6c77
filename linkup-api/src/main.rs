//! # Linkup API Server
//!
//! Mock identity and profile backend for the Linkup frontend. Accounts live
//! in a single JSON file so test suites can seed and reset them freely.
//!
//! ## Usage
//!
//! ```bash
//! JWT_SECRET=$(openssl rand -hex 32) cargo run -p linkup-api
//! ```

use linkup_api::{
    app::{build_router, AppState},
    config::Config,
};
use linkup_shared::store::JsonStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "linkup_api=debug,linkup_shared=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Linkup API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    if config.api.production {
        tracing::info!("Production mode: verification links hidden, fixture session disabled");
    } else if let Some(user_id) = config.effective_fixture_user() {
        tracing::warn!(%user_id, "Requests without a token act as the fixture user");
    }

    let store = JsonStore::open(&config.store.path).await?;
    let bind_address = config.bind_address();

    let app = build_router(AppState::new(store, config));

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }

    tracing::info!("Shutdown signal received, exiting...");
}
