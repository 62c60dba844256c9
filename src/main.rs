use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use paloma::api;
use paloma::api::state::AppState;
use paloma::cli;
use paloma::roster::StaticRoster;
use paloma::sinks::WebhookSink;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "paloma=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse args and env vars
    let args = cli::Cli::parse();
    let settings = args.into_settings();
    settings.dispatch.validate()?;

    // Socket server listen address setup
    let listen_address: IpAddr = settings.listen_address.parse()?;
    let socket_address = SocketAddr::from((listen_address, settings.listen_port));

    // Audience roster for recipient lookups
    let roster = match &settings.roster_path {
        Some(path) => StaticRoster::from_file(path)?,
        None => {
            warn!("no roster configured, starting with an empty audience");
            StaticRoster::default()
        }
    };

    // Shared state: one pacer and one cancel scope for the whole process
    let state = Arc::new(AppState::new(
        settings.dispatch_settings(),
        Arc::new(roster),
        Arc::new(WebhookSink::new()),
    ));

    // Build Axum Router
    let api = api::api(state);

    // Start server
    info!("Starting Paloma on {}", socket_address);
    axum::Server::bind(&socket_address)
        .serve(api.into_make_service())
        .await?;

    Ok(())
}
