//! chalkgrid Collector Server
//!
//! Receives surface snapshots and question updates from the drawing app.
//!
//! ## Endpoints
//!
//! - `POST /image`: multipart form, field `image` holding a PNG
//! - `POST /setQuestion`: `{ "question": "..." }`
//! - `GET /question`: `{ "question": "..." | null }`

mod collector;

use collector::{CollectorConfig, CollectorState, router};
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chalkgrid_server=info,tower_http=info".into()),
        )
        .init();

    let config = CollectorConfig::default();
    let addr = config.addr;
    info!("Storing uploads in {}", config.upload_dir.display());

    let app = router(Arc::new(CollectorState::new(config)));

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };
    info!("chalkgrid collector listening on http://{}", addr);

    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
}
