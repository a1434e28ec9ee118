use std::sync::Arc;

use dotenvy::dotenv;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use wig_storefront::{
    api::{self, AppState},
    config::{self, settings::Settings},
    core::{catalog, profile},
    errors::Result,
    payment::StripeGateway,
};

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; variables may also be set externally
    dotenv().ok();

    // 3. Process settings and store configuration
    let settings = Settings::from_env()?;
    let store = config::store::load_config(&settings.store_config_path)
        .inspect(|_| info!("Loaded store configuration from {}", settings.store_config_path))
        .inspect_err(|e| error!("Failed to load store configuration: {}", e))?;

    // 4. Database, schema, starter catalog
    let db = config::database::create_connection().await?;
    config::database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {}", e))?;
    let seeded = catalog::seed_catalog(&db, &store.products).await?;
    if seeded > 0 {
        info!("Seeded {} catalog products", seeded);
    }

    // 5. Bootstrap administrator
    match config::admin::get_admin_credentials() {
        Some(admin) => {
            profile::ensure_admin(&db, &admin.email, &admin.password, settings.password_hash_cost)
                .await?;
        }
        None => warn!("ADMIN_EMAIL/ADMIN_PASSWORD not set; no bootstrap administrator"),
    }

    // 6. Serve
    let gateway = StripeGateway::new(&settings.stripe_api_base, settings.stripe_secret_key.clone());
    let bind_addr = settings.bind_addr.clone();
    let state = AppState {
        db,
        gateway: Arc::new(gateway),
        store: Arc::new(store),
        settings: Arc::new(settings),
    };

    let listener = tokio::net::TcpListener::bind(bind_addr.as_str()).await?;
    info!("Listening on {}", bind_addr);
    axum::serve(listener, api::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
