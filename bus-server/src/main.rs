use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use bus_server::registry::SubscriptionRegistry;
use bus_server::relay::LocationRelay;
use bus_server::stops::StopDirectory;
use bus_server::web::{AppState, ConnectionMap, create_router};

/// Port used when the PORT environment variable is not set.
const DEFAULT_PORT: u16 = 5000;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);

    // Build the shared services
    let registry = Arc::new(SubscriptionRegistry::new());
    let connections = ConnectionMap::new();
    let relay = Arc::new(LocationRelay::new(
        Arc::clone(&registry),
        Arc::new(connections.clone()),
    ));
    let stops = StopDirectory::new();

    // Build app state
    let state = AppState::new(relay, registry, stops, connections);

    // Create router
    let app = create_router(state);

    // Bind and serve
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    println!("Bus location server listening on http://{addr}");
    println!();
    println!("API Endpoints:");
    println!("  GET  /health                                - Health check");
    println!("  POST /api/bus-stops                         - Create or replace a stop");
    println!("  GET  /api/bus-stops/:stop_code              - Look up a stop");
    println!("  GET  /api/passenger/nearest-buses/:stop_code - Nearest live buses");
    println!("  GET  /ws                                    - WebSocket endpoint");

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
