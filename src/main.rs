use product_store::{build_router, build_state, config::Config, infrastructure::logger::Logger};
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;
    let _guard = Logger::init(&config.logging)?;

    info!("Starting Product Store service...");

    let state = build_state(&config.database).await.map_err(|e| {
        error!("Failed to initialize storage: {}", e);
        e
    })?;
    let app = build_router(state, &config.server);

    let listener = TcpListener::bind(config.server.socket_address()).await?;
    let addr = listener.local_addr()?;

    info!("🚀 Product Store running on http://{}", addr);
    info!("   GET    /                       - Service info");
    info!("   GET    /health                 - Health check");
    info!("   GET    /products               - List products (?description=&name=&available=&price=)");
    info!("   POST   /products               - Create product");
    info!("   GET    /products/:id           - Get product");
    info!("   PUT    /products/:id           - Update product");
    info!("   DELETE /products/:id           - Delete product");
    info!("   PUT    /products/:id/purchase  - Purchase product");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Product Store stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}
