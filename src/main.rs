use tokio::net::TcpListener;

use tinywiki::logger::Logger;
use tinywiki::{app, build_state, Config, WikiError};

#[tokio::main]
async fn main() -> Result<(), WikiError> {
    if let Err(e) = Logger::init() {
        eprintln!("Failed to install logger: {}", e);
    }

    let config = Config::from_env()?;
    // Exits here if the session backend is configured but unreachable.
    let state = build_state(&config).await?;

    let addr = config.socket_addr().await?;
    log::info!("Wiki listening on http://{}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app(state)).await.map_err(WikiError::from)
}
