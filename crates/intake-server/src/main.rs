//! Contact intake server
//!
//! Serves the contact-form API, or mints admin tokens with `issue-token`.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};

use intake_core::Config;
use intake_core::config::{DEV_JWT_SECRET, load_config};
use intake_core::tracing_init::init_tracing;

use intake_server::api::{AppState, build_router};
use intake_server::auth::{ADMIN_ROLE, JwtManager};
use intake_server::intake::IntakeService;
use intake_server::notify::HttpMailer;
use intake_server::storage::IntakeDatabase;

#[derive(Parser, Debug)]
#[command(name = "intake-server")]
#[command(
    version,
    about = "Contact intake server - validates, stores, and notifies on contact form submissions"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// JSON settings file.
    #[arg(long, global = true, env = "INTAKE_CONFIG")]
    config: Option<PathBuf>,

    /// Output logs as JSON (for structured log aggregation).
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP server (default)
    Serve(ServeArgs),
    /// Print a signed bearer token for the admin routes
    IssueToken(IssueTokenArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Address to listen on.
    #[arg(long)]
    addr: Option<SocketAddr>,

    /// Path to SQLite database file.
    #[arg(long)]
    db_path: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct IssueTokenArgs {
    /// Token subject (operator name or email).
    #[arg(long)]
    subject: String,

    #[arg(long, default_value = ADMIN_ROLE)]
    role: String,

    /// Token lifetime in seconds (defaults to `auth.token_ttl_secs`).
    #[arg(long)]
    ttl: Option<i64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing("intake_server=info,tower_http=info", cli.log_json);

    let mut config = load_config(cli.config.as_deref())?;

    match cli.command.unwrap_or(Commands::Serve(ServeArgs::default())) {
        Commands::Serve(args) => {
            if let Some(addr) = args.addr {
                config.server.addr = addr;
            }
            if let Some(path) = args.db_path {
                config.storage.database_path = Some(path);
            }
            config.validate()?;
            serve(config).await
        }
        Commands::IssueToken(args) => {
            if let Some(ttl) = args.ttl {
                config.auth.token_ttl_secs = ttl;
            }
            config.validate()?;
            issue_token(&config, &args)
        }
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    info!(
        version = env!("CARGO_PKG_VERSION"),
        addr = %config.server.addr,
        "Starting intake-server"
    );

    if config.auth.jwt_secret == DEV_JWT_SECRET {
        warn!("Using the development JWT secret; set INTAKE_JWT_SECRET in production");
    }

    let db_path = config
        .database_path()
        .ok_or_else(|| anyhow::anyhow!("Cannot determine home directory; pass --db-path"))?;
    info!(path = %db_path.display(), "Opening intake database");
    let db = IntakeDatabase::open(&db_path).await?;

    let mut intake = IntakeService::new(
        Arc::new(db.clone()),
        config.limits.clone(),
        Duration::from_secs(config.storage.write_timeout_secs),
    );
    match (
        HttpMailer::from_config(&config.notification)?,
        config.notification.staff_address.as_deref(),
    ) {
        (Some(mailer), Some(staff)) => {
            info!(
                endpoint = mailer.endpoint(),
                to = staff,
                "Staff notification enabled"
            );
            intake = intake.with_notifier(Arc::new(mailer), staff);
        }
        _ => warn!("No notification endpoint configured; inquiries stay in received"),
    }

    let state = AppState {
        intake: Arc::new(intake),
        jwt: Arc::new(JwtManager::new(
            config.auth.jwt_secret.as_bytes(),
            config.auth.token_ttl_secs,
        )),
    };
    let app = build_router(state, &config.server);

    let listener = tokio::net::TcpListener::bind(config.server.addr).await?;
    info!(addr = %listener.local_addr()?, "Intake server ready");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Intake server stopped");
    Ok(())
}

#[allow(clippy::print_stdout)]
fn issue_token(config: &Config, args: &IssueTokenArgs) -> anyhow::Result<()> {
    let jwt = JwtManager::new(
        config.auth.jwt_secret.as_bytes(),
        config.auth.token_ttl_secs,
    );
    let (token, exp) = jwt.issue_token(&args.subject, &args.role)?;
    info!(subject = %args.subject, role = %args.role, exp, "Issued token");
    println!("{token}");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C shutdown signal");
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                info!("Received SIGTERM shutdown signal");
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
