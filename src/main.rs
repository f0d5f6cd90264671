//! QrLogin - QR code login authorization server
//!
//! A desktop browser shows a QR code and polls its status; a phone scans it,
//! confirms with its own login, and the browser receives a session token.

use anyhow::Result;
use clap::Parser;
use qrlogin_auth::{
    generate_secret, AuthGateway, MemorySessionStore, QrLoginManager, TokenService, UserDirectory,
};
use qrlogin_core::Config;
use qrlogin_server::{create_router, AppState};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn, Level};
use tracing_subscriber::EnvFilter;

/// QrLogin - Log in on the desktop by scanning a QR code with your phone
#[derive(Parser, Debug)]
#[command(name = "qrlogin")]
#[command(version, about, long_about = None)]
struct Args {
    /// Server port
    #[arg(short, long, default_value = "3000")]
    port: u16,

    /// Address to bind to
    #[arg(short, long, default_value = "0.0.0.0")]
    bind: IpAddr,

    /// Base URL phones use to reach this server (embedded in QR codes).
    /// Defaults to http://<local-ip>:<port>
    #[arg(short = 'u', long)]
    public_url: Option<String>,

    /// Secret for signing bearer tokens. A random one is generated if unset,
    /// which invalidates all tokens on restart
    #[arg(long, env = "QRLOGIN_JWT_SECRET", hide_env_values = true)]
    jwt_secret: Option<String>,

    /// Bearer token lifetime in seconds
    #[arg(long, default_value = "604800")]
    token_ttl: i64,

    /// QR code lifetime in seconds
    #[arg(long, default_value = "120")]
    qr_ttl: i64,

    /// Seconds an expired QR session is kept before eviction
    #[arg(long, default_value = "300")]
    retention: i64,

    /// Seconds between expiry sweeps
    #[arg(long, default_value = "30")]
    sweep_interval: u64,

    /// QR image size in pixels
    #[arg(long, default_value = "200")]
    qr_size: u32,

    /// JSON file of users: [{ "id": 1, "username": "...", "password": "..." }]
    #[arg(long)]
    users: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .with_env_filter(EnvFilter::from_default_env().add_directive(log_level.into()))
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();

    info!("QrLogin v{}", env!("CARGO_PKG_VERSION"));

    let public_url = args.public_url.clone().unwrap_or_else(|| {
        let host = get_local_ip().unwrap_or_else(|| "localhost".to_string());
        format!("http://{}:{}", host, args.port)
    });

    let jwt_secret = match args.jwt_secret.clone() {
        Some(secret) => secret,
        None => {
            warn!("No JWT secret configured; tokens will not survive a restart");
            generate_secret()
        }
    };

    let config = Config::new()
        .with_bind(args.bind)
        .with_port(args.port)
        .with_public_url(public_url)
        .with_jwt_secret(jwt_secret)
        .with_token_ttl(args.token_ttl)
        .with_qr_ttl(args.qr_ttl)
        .with_retention(args.retention)
        .with_sweep_interval(args.sweep_interval)
        .with_qr_size(args.qr_size)
        .with_users_file(args.users.clone());
    config.validate()?;

    info!("Loading user directory...");
    let users = match &config.users_file {
        Some(path) => UserDirectory::from_json_file(path)
            .map_err(|e| anyhow::anyhow!("Failed to load users from {:?}: {}", path, e))?,
        None => {
            warn!("Using built-in demo accounts");
            UserDirectory::with_default_users()?
        }
    };
    info!("{} users available", users.len());

    let tokens = TokenService::new(
        &config.jwt_secret,
        chrono::Duration::seconds(config.token_ttl_secs),
    );
    let gateway = Arc::new(AuthGateway::new(tokens, users));
    let store = Arc::new(MemorySessionStore::new(
        chrono::Duration::seconds(config.qr_ttl_secs),
        chrono::Duration::seconds(config.retention_secs),
    ));
    let login_manager = Arc::new(QrLoginManager::new(
        store,
        gateway,
        config.public_url.clone(),
    ));

    // Spawn expiry sweeper
    let sweeper_manager = login_manager.clone();
    let sweep_every = Duration::from_secs(config.sweep_interval_secs);
    let sweeper_handle = tokio::spawn(async move {
        let mut interval = tokio::time::interval(sweep_every);
        loop {
            interval.tick().await;
            let evicted = sweeper_manager.sweep().await;
            debug!(
                "Sweep evicted {} sessions, {} remain",
                evicted,
                sweeper_manager.session_count().await
            );
        }
    });

    let addr = SocketAddr::new(config.bind, config.port);
    let public_url = config.public_url.clone();
    let state = Arc::new(AppState::new(config, login_manager));
    let router = create_router(state);

    info!("Starting server on {}...", addr);
    info!("");
    info!("  Open on desktop: {}", public_url);
    info!("  QR codes point phones at {}/pages/confirm.html", public_url);
    info!("");
    info!("Press Ctrl+C to stop.");

    let shutdown = async {
        tokio::signal::ctrl_c().await.ok();
        info!("Shutting down...");
    };

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;

    sweeper_handle.abort();

    info!("Goodbye!");
    Ok(())
}

/// Get the local IP address
fn get_local_ip() -> Option<String> {
    use std::net::UdpSocket;

    // Connecting a UDP socket sends nothing but selects the outbound interface
    let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect("8.8.8.8:80").ok()?;
    let addr = socket.local_addr().ok()?;
    Some(addr.ip().to_string())
}
