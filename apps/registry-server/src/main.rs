use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use runtime::{AppConfig, CliArgs, DatabaseConfig};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use members::api::http::routes;
use members::api::http::session::{AuthSettings, SessionStore};
use members::config::MembersConfig;
use members::domain::service::{Service, ServiceConfig};
use members::infra::storage::migrations::Migrator;
use members::infra::storage::repo::SeaOrmMembersRepository;
use sea_orm::{ConnectOptions, ConnectionTrait, Database};
use sea_orm_migration::MigratorTrait;

/// Expand a sqlite DSN into an absolute-path DSN using a base directory.
/// - Keeps "sqlite::memory:" as-is.
/// - Normalizes backslashes into forward slashes (important on Windows).
fn absolutize_sqlite_dsn(dsn: &str, base_dir: &Path, create_dirs: bool) -> Result<String> {
    if dsn.eq_ignore_ascii_case("sqlite::memory:") || dsn.eq_ignore_ascii_case("sqlite://:memory:")
    {
        return Ok("sqlite::memory:".to_string());
    }
    let db_path = dsn
        .strip_prefix("sqlite://")
        .ok_or_else(|| anyhow!("DSN must start with sqlite:// (got: {})", dsn))?;

    let (path_str, query) = match db_path.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (db_path, None),
    };

    let mut p = PathBuf::from(path_str);
    if p.as_os_str().is_empty() {
        return Err(anyhow!("Empty SQLite path in DSN"));
    }
    if p.is_relative() {
        p = base_dir.join(p);
    }

    if let Some(dir) = p.parent() {
        if create_dirs {
            std::fs::create_dir_all(dir)?;
        }
    }

    // Rebuild DSN with absolute path and normalized slashes; mode=rwc so
    // the database file is created on first run.
    let mut out = String::from("sqlite://");
    out.push_str(&p.to_string_lossy().replace('\\', "/"));
    match query {
        Some(q) => {
            out.push('?');
            out.push_str(q);
        }
        None => out.push_str("?mode=rwc"),
    }
    Ok(out)
}

/// Member Registry - membership tracking service
#[derive(Parser)]
#[command(name = "registry-server")]
#[command(about = "Member Registry - membership tracking service")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use an in-memory database
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // CLI args passed down to config/app
    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
        mock: cli.mock,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;

    // Apply CLI overrides (port / verbosity)
    config.apply_cli_overrides(&args);

    // Initialize logging
    let logging_config = config.logging.clone().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::info!("Member Registry starting");

    // Print config and exit if requested
    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    // Execute command
    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config, args).await,
        Commands::Check => check_config(config).await,
    }
}

/// Detect DB backend from URL scheme. Only sqlite is supported here.
fn detect_from_dsn(cfg: &DatabaseConfig) -> Result<&'static str> {
    let raw = cfg.url.trim().to_owned();
    if raw.is_empty() {
        return Err(anyhow!("Database URL not configured"));
    }

    let url = Url::parse(&raw).map_err(|e| anyhow!("Invalid database DSN '{}': {}", raw, e))?;

    match url.scheme() {
        "sqlite" | "sqlite3" => Ok("sqlite"),
        other => Err(anyhow!("Unsupported database type: {}", other)),
    }
}

async fn run_server(config: AppConfig, args: CliArgs) -> Result<()> {
    let db_config = config
        .database
        .clone()
        .ok_or_else(|| anyhow!("No database configuration found"))?;

    // Base dir for resolving relative sqlite paths (already absolute & created)
    let base_dir = PathBuf::from(&config.server.home_dir);

    // Use URL from config; override with in-memory SQLite when --mock is set
    let mut final_dsn = if args.mock {
        "sqlite::memory:".to_string()
    } else {
        let _backend = detect_from_dsn(&db_config)?;
        db_config.url.trim().to_owned()
    };

    // Absolutize sqlite DSNs to avoid cwd issues
    if final_dsn.starts_with("sqlite://") {
        final_dsn = absolutize_sqlite_dsn(&final_dsn, &base_dir, true)?;
    }

    tracing::info!("Connecting to database: {}", final_dsn);
    let max_conns = pool_size(&final_dsn, db_config.max_conns);
    let mut opts = ConnectOptions::new(final_dsn);
    opts.max_connections(max_conns)
        .acquire_timeout(Duration::from_secs(5));
    let db = Database::connect(opts)
        .await
        .context("Failed to connect to database")?;

    if let Some(ms) = db_config.busy_timeout_ms {
        db.execute_unprepared(&format!("PRAGMA busy_timeout = {ms}"))
            .await
            .context("Failed to set busy_timeout")?;
    }

    Migrator::up(&db, None)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Database migrations applied");

    // Wire the members module: repository → service → router
    let members_config: MembersConfig = config.module_config("members")?;
    let repo = Arc::new(SeaOrmMembersRepository::new(db));
    let service = Arc::new(Service::new(repo, ServiceConfig::from(&members_config)));

    let sessions = Arc::new(SessionStore::new(config.auth.session_ttl_hours));
    let auth = AuthSettings {
        access_key: config.auth.access_key.clone(),
    };
    if auth.access_key.is_none() {
        tracing::warn!("No auth.access_key configured; all logins will be rejected");
    }

    let app = routes::router(service, sessions, auth);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Pool size for the given DSN. In-memory SQLite gets a separate empty
/// database per pooled connection, so that path is pinned to a single
/// connection; everything else uses the configured size.
fn pool_size(dsn: &str, configured: Option<u32>) -> u32 {
    if dsn == "sqlite::memory:" {
        1
    } else {
        configured.unwrap_or(10)
    }
}

/// Resolve on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}

async fn check_config(config: AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");

    if let Some(db_config) = &config.database {
        detect_from_dsn(db_config)?;
    }
    // Module sections must deserialize cleanly too
    let _members: MembersConfig = config.module_config("members")?;

    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("Server config:");
    println!("{}", config.to_yaml()?);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlite_memory_dsn_is_kept() {
        let out = absolutize_sqlite_dsn("sqlite::memory:", Path::new("/base"), false).unwrap();
        assert_eq!(out, "sqlite::memory:");
        let out = absolutize_sqlite_dsn("sqlite://:memory:", Path::new("/base"), false).unwrap();
        assert_eq!(out, "sqlite::memory:");
    }

    #[test]
    fn relative_sqlite_path_is_anchored_to_base_dir() {
        let out = absolutize_sqlite_dsn("sqlite://registry.db", Path::new("/base"), false).unwrap();
        assert_eq!(out, "sqlite:///base/registry.db?mode=rwc");
    }

    #[test]
    fn existing_query_string_is_preserved() {
        let out =
            absolutize_sqlite_dsn("sqlite:///tmp/r.db?cache=shared", Path::new("/base"), false)
                .unwrap();
        assert_eq!(out, "sqlite:///tmp/r.db?cache=shared");
    }

    #[test]
    fn in_memory_database_uses_a_single_connection() {
        assert_eq!(pool_size("sqlite::memory:", Some(10)), 1);
        assert_eq!(pool_size("sqlite::memory:", None), 1);
        assert_eq!(pool_size("sqlite:///data/registry.db?mode=rwc", Some(20)), 20);
        assert_eq!(pool_size("sqlite:///data/registry.db?mode=rwc", None), 10);
    }

    #[test]
    fn non_sqlite_dsn_is_rejected() {
        let cfg = DatabaseConfig {
            url: "postgresql://localhost/members".to_string(),
            max_conns: None,
            busy_timeout_ms: None,
        };
        assert!(detect_from_dsn(&cfg).is_err());
    }
}
