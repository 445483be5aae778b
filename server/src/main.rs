use std::sync::Arc;

use socketioxide::SocketIo;
use storefront_server::notify::{self, SocketIoNotifier};
use storefront_server::{AppState, Config, api};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storefront_server=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;
    tracing::info!("Starting storefront server (env: {})", config.environment);

    // Real-time channel: the socket.io layer rides on the same HTTP server,
    // and the io handle becomes the injected notification publisher.
    let (socket_layer, io) = SocketIo::new_layer();
    notify::attach_handlers(&io);
    let notifier = Arc::new(SocketIoNotifier::new(io));

    let state = AppState::new(&config, notifier).await?;
    let app = api::create_router(state).layer(socket_layer);

    let addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("HTTP listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down...");
        })
        .await?;

    Ok(())
}
