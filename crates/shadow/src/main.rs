mod app;
mod handlers;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use listenfd::ListenFd;
use shadow_auth::{mock_idp::mock_idp_routes, AuthConfig, AuthState, MemoryProfileStore, MemoryProvider};
use tokio::{net::TcpListener, signal};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::create_app;

/// Shadow - session refresh, sign-in callback and onboarding backend
#[derive(Parser, Debug)]
#[command(name = "shadow")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Host address to bind the server to
    #[arg(long, short = 'H', default_value = "0.0.0.0", env = "HOST")]
    host: String,

    /// Port to listen on
    #[arg(long, short, default_value = "3000", env = "PORT")]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shadow=debug,shadow_auth=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AuthConfig::from_env()?;
    let profiles = MemoryProfileStore::new();

    // Without a provider URL the server runs against the in-memory provider
    // and exposes the mock IdP sign-in page.
    let (state, mock_idp) = if config.provider_url.is_some() {
        tracing::info!("Using GoTrue identity provider");
        (AuthState::with_gotrue(Arc::new(profiles), config)?, None)
    } else {
        tracing::warn!("AUTH_PROVIDER_URL not set, using in-memory provider with mock IdP");
        let provider = Arc::new(MemoryProvider::new());
        let state = AuthState::new(provider.clone(), Arc::new(profiles.clone()), config);
        (state, Some(mock_idp_routes(provider, profiles)))
    };

    tracing::info!(
        policy = ?state.config.new_user_policy,
        enforcement = ?state.config.route_enforcement,
        "Auth configured"
    );

    let app = create_app(state, mock_idp);

    // Auto-reload support via listenfd
    let mut listenfd = ListenFd::from_env();
    let listener = match listenfd.take_tcp_listener(0)? {
        Some(listener) => {
            listener.set_nonblocking(true)?;
            TcpListener::from_std(listener)?
        }
        None => {
            let addr = format!("{}:{}", cli.host, cli.port);
            TcpListener::bind(&addr).await?
        }
    };

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
    }
}
