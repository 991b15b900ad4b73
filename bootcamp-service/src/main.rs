//! Bootcamp Service - HTTP microservice for the bootcamp directory.
//!
//! ## Environment Variables
//!
//! Loaded from the process environment, then `config/config.env` or `.env`
//! when present.
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `BOOTCAMP_PORT` | HTTP server port | 8080 |
//! | `BOOTCAMP_BASE_PATH` | Prefix for the bootcamp routes | `/api/v1.0.0` |
//! | `BOOTCAMP_DATA_FILE` | JSON file persisting the collection | in-memory |
//! | `BOOTCAMP_GEOCODER_PROVIDER` | `static` or `mapquest` | `static` |
//! | `BOOTCAMP_GEOCODER_API_KEY` | MapQuest consumer key | None |
//! | `BOOTCAMP_GEOCODER_FIXTURES` | JSON answers for the static geocoder | None |
//! | `BOOTCAMP_GEOCODER_CACHE_SIZE` | Cached geocoder queries | 1000 |
//! | `RUST_LOG` | Log level (e.g., "info", "debug") | "info" |
//!
//! ## Endpoints
//!
//! - `GET|POST {base}/bootcamps` - List with filters, or create
//! - `GET|PUT|DELETE {base}/bootcamps/:id` - Single bootcamp
//! - `GET {base}/bootcamps/radius/:zipcode/:distance` - Radius search (miles)
//! - `GET /health` - Health check
//! - `GET /stats` - Collection and geocoder cache statistics
//! - `GET /docs` - OpenAPI documentation (Swagger UI)

use std::net::SocketAddr;
use std::sync::Arc;

use bootcamp::BootcampServiceBuilder;
use bootcamp_service::{router, AppState, ServerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Existing variables win over the file
    let env_file = dotenvy::from_filename("config/config.env").or_else(|_| dotenvy::dotenv());

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bootcamp_service=info,bootcamp=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match env_file {
        Ok(path) => tracing::info!(path = %path.display(), "Loaded environment file"),
        Err(_) => tracing::debug!("No environment file found"),
    }

    let config = ServerConfig::from_env();

    // The library handles: BOOTCAMP_DATA_FILE, BOOTCAMP_GEOCODER_*
    let builder = BootcampServiceBuilder::from_env()?;
    if builder.data_file_path().is_none() {
        tracing::warn!("BOOTCAMP_DATA_FILE not set, bootcamps are kept in memory only");
    }
    let service = builder.build()?;

    tracing::info!(
        bootcamps = service.count().await?,
        cache_capacity = service.cache_capacity(),
        base_path = %config.base_path,
        port = config.port,
        "Starting bootcamp service"
    );

    let state = Arc::new(AppState { service });
    let app = router(state, &config.base_path);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
