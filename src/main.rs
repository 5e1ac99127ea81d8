// SPDX-FileCopyrightText: 2026 Contact Relay Contributors
// SPDX-License-Identifier: Apache-2.0

//! Contact Relay Service
//!
//! Accepts contact-form submissions over HTTP, validates them, and
//! forwards them as email over an authenticated SMTP session.
//!
//! Configuration is a TOML file whose path comes from the
//! `CONTACT_RELAY_CONFIG` environment variable (default:
//! `contact-relay.toml` in the working directory).

use axum::Router;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use contact_relay::config::Config;
use contact_relay::handlers::{self, AppState};
use contact_relay::mailer::SmtpMailer;
use contact_relay::pipeline::AdmissionPipeline;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let config_path = std::env::var("CONTACT_RELAY_CONFIG")
        .unwrap_or_else(|_| "contact-relay.toml".to_string());
    let config = Config::load(Path::new(&config_path))?;
    info!(
        bind_addr = %config.bind_addr,
        smtp_host = %config.smtp.host,
        rate_limited = config.rate_limit.is_some(),
        "starting contact relay"
    );

    let bind_addr: SocketAddr = config.bind_addr.parse()?;
    let mailer = Arc::new(SmtpMailer::new(&config.smtp)?);
    let state = Arc::new(AppState {
        pipeline: AdmissionPipeline::new(config.clone(), mailer)?,
        config,
    });
    let app: Router = handlers::router(state);

    let listener = TcpListener::bind(bind_addr).await?;
    info!(addr = %bind_addr, "server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
