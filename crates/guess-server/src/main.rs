//! Guess Server — application entry point.

use anyhow::Context;
use guess_auth::AuthService;
use guess_db::{DbManager, SurrealAccountRepository};
use guess_server::{AppState, BrevoMailer, LogMailer, Mailer, ServerConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("guess=info".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .json()
        .init();

    info!("Starting Guess server...");

    let config = ServerConfig::from_env().context("invalid configuration")?;

    let db = DbManager::connect(&config.db)
        .await
        .context("failed to connect to SurrealDB")?;
    let accounts = SurrealAccountRepository::new(db.client().clone());

    let mailer = match config.brevo.clone() {
        Some(brevo) => Mailer::Brevo(BrevoMailer::new(brevo).context("failed to build mail client")?),
        None => {
            warn!("BREVO_API_KEY not set; verification links will only be logged");
            Mailer::Log(LogMailer)
        }
    };

    let auth = AuthService::new(accounts, mailer, config.auth.clone())
        .context("invalid authentication settings")?;
    let state = AppState::new(auth, config.cookies);
    let app = guess_server::router(state, config.cors_origin.clone());

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    info!(addr = %config.bind_addr, "Guess server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Guess server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
    }
}
