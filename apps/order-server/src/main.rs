//! Order intake web server.
//!
//! Wires the ledger configuration, the single writer thread and the HTTP
//! router together, with command-line parsing and graceful shutdown.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use order_ledger_api::auth::{generate_key, generate_token, AdminConfig};
use order_ledger_api::{
    router::{AppState, Router},
    server::Server,
};
use order_ledger_core::config::{LedgerConfig, OrderMode};
use tokio::signal;

/// Command-line arguments for the order server.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value_t = 8080)]
    port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Directory holding the ledger and order files
    #[arg(long, default_value = "./data")]
    data_dir: String,

    /// `ledger` (one shared CSV) or `per-customer` (one file per order)
    #[arg(long, default_value = "ledger")]
    mode: OrderMode,

    /// Request timeout in milliseconds
    #[arg(long, default_value_t = 5000)]
    request_timeout_ms: u64,

    /// Response timeout in milliseconds
    #[arg(long, default_value_t = 10000)]
    response_timeout_ms: u64,

    /// Path segment guarding `/empresa/{secret}`; random when unset
    #[arg(long, env = "ADMIN_URL_SECRET", hide_env_values = true)]
    admin_secret: Option<String>,

    /// Password for `/login`; login is disabled when unset
    #[arg(long, env = "ADMIN_PASSWORD", hide_env_values = true)]
    admin_password: Option<String>,

    /// Key signing session cookies; random per start when unset
    #[arg(long, env = "SESSION_SECRET", hide_env_values = true)]
    session_secret: Option<String>,

    /// Mark the session cookie `Secure` (serve behind HTTPS)
    #[arg(long, env = "SECURE_COOKIES")]
    secure_cookies: bool,
}

fn admin_config(args: &Args, config: &LedgerConfig) -> AdminConfig {
    let url_secret = match args.admin_secret.as_deref().map(str::trim) {
        Some(secret) if !secret.is_empty() => secret.to_string(),
        _ => {
            let secret = generate_token();
            tracing::warn!(
                "ADMIN_URL_SECRET not set; dashboard available at /empresa/{}",
                secret
            );
            secret
        }
    };

    let password = args.admin_password.clone().filter(|p| !p.is_empty());
    if password.is_none() {
        tracing::warn!("ADMIN_PASSWORD not set; password login is disabled");
    }

    let session_key = match &args.session_secret {
        Some(secret) if !secret.is_empty() => secret.as_bytes().to_vec(),
        _ => {
            tracing::warn!("SESSION_SECRET not set; sessions will not survive a restart");
            generate_key()
        }
    };

    AdminConfig {
        url_secret,
        password,
        session_key,
        session_max_age: Duration::from_secs(config.session_max_age_secs),
        secure_cookies: args.secure_cookies,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let args = Args::parse();

    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt::init();

    let config = LedgerConfig {
        data_dir: PathBuf::from(&args.data_dir),
        mode: args.mode,
        request_timeout_ms: args.request_timeout_ms,
        response_timeout_ms: args.response_timeout_ms,
        ..Default::default()
    };
    let admin = admin_config(&args, &config);

    std::fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("Failed to create data directory {}", args.data_dir))?;

    // Spawn the writer thread
    let (writer, writer_join) =
        order_ledger_runtime::spawn(&config).context("Failed to start ledger writer")?;

    let config = Arc::new(config);
    let state = AppState::new(Arc::clone(&config), Arc::new(admin), writer);
    let router = Router::new(state);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .context("Invalid listen address")?;
    let server = Server::new(addr, router);

    tracing::info!(
        host = %args.host,
        port = args.port,
        mode = ?config.mode,
        data_dir = %args.data_dir,
        request_timeout_ms = args.request_timeout_ms,
        response_timeout_ms = args.response_timeout_ms,
        "Starting order server"
    );

    // Start server with graceful shutdown
    let server_handle = tokio::spawn(async move {
        if let Err(e) = server.serve().await {
            tracing::error!("Server error: {}", e);
        }
    });

    // Wait for Ctrl+C
    signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl_c")?;
    tracing::info!("Shutting down server...");
    server_handle.abort();
    let _ = server_handle.await;

    // Open connections may still hold writer handles; the thread exits with them
    if writer_join.is_finished() && writer_join.join().is_err() {
        tracing::error!("Ledger writer panicked");
    }

    Ok(())
}
