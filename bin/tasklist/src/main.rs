//! Tasklist - task list GraphQL API with cursor pagination.
//!
//! # Usage
//!
//! ```bash
//! # Start with default config
//! tasklist
//!
//! # Start with environment overrides
//! DATABASE_URL=postgres://localhost/tasklist GRAPHQL_PORT=8080 tasklist
//!
//! # Run without PostgreSQL
//! tasklist --in-memory
//! ```

use std::sync::Arc;
use std::time::Duration;

use anyhow::{ensure, Context, Result};
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::signal;
use tokio::sync::watch;
use tracing::{debug, error, info, info_span, warn, Instrument};
use tracing_subscriber::{fmt, EnvFilter};

use tasklist_core::memory::MemoryTaskRepository;
use tasklist_core::metrics::init_metrics;
use tasklist_core::pagination::{Paginator, PagingConfig, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use tasklist_core::ports::TaskRepository;
use tasklist_core::services::TaskService;
use tasklist_graphql::{build_schema, serve_with_shutdown, ServerConfig};
use tasklist_storage::{Database, DatabaseConfig, PgTaskRepository};

/// Tasklist CLI.
#[derive(Parser, Debug)]
#[command(name = "tasklist")]
#[command(about = "Tasklist - task list GraphQL API with cursor pagination")]
#[command(version)]
struct Cli {
    /// PostgreSQL database URL.
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "postgres://localhost/tasklist"
    )]
    database_url: String,

    /// GraphQL server port.
    #[arg(long, env = "GRAPHQL_PORT", default_value = "4000")]
    graphql_port: u16,

    /// Prometheus metrics port.
    #[arg(long, env = "METRICS_PORT", default_value = "9090")]
    metrics_port: u16,

    /// Enable JSON log output.
    #[arg(long, env = "JSON_LOGS")]
    json_logs: bool,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Page size when a request gives neither `first` nor `last`.
    #[arg(long, env = "DEFAULT_PAGE_SIZE", default_value_t = DEFAULT_PAGE_SIZE)]
    default_page_size: u32,

    /// Larger requested page sizes are clamped to this.
    #[arg(long, env = "MAX_PAGE_SIZE", default_value_t = MAX_PAGE_SIZE)]
    max_page_size: u32,

    /// Run database migrations and exit.
    #[arg(long)]
    migrate_only: bool,

    /// Keep tasks in memory instead of PostgreSQL (data is lost on exit).
    #[arg(long, conflicts_with = "migrate_only")]
    in_memory: bool,
}

impl Cli {
    fn paging_config(&self) -> Result<PagingConfig> {
        ensure!(self.max_page_size > 0, "--max-page-size must be positive");
        ensure!(
            (1..=self.max_page_size).contains(&self.default_page_size),
            "--default-page-size must be between 1 and --max-page-size ({})",
            self.max_page_size
        );
        Ok(PagingConfig {
            default_page_size: self.default_page_size,
            max_page_size: self.max_page_size,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.json_logs);

    let paging = cli.paging_config()?;

    // Prometheus metrics exporter (optional - failures don't crash the app)
    let metrics_enabled = match format!("0.0.0.0:{}", cli.metrics_port).parse::<std::net::SocketAddr>() {
        Ok(metrics_addr) => {
            match PrometheusBuilder::new()
                .with_http_listener(metrics_addr)
                .install()
            {
                Ok(()) => {
                    init_metrics();
                    true
                }
                Err(e) => {
                    warn!("⚠️  Failed to start metrics exporter: {}. Continuing without metrics.", e);
                    false
                }
            }
        }
        Err(e) => {
            warn!("⚠️  Invalid metrics address: {}. Continuing without metrics.", e);
            false
        }
    };

    // ─────────────────────────────────────────────────────────────────────────
    // 🚀 STARTUP
    // ─────────────────────────────────────────────────────────────────────────
    info!("🚀 Starting Tasklist");
    debug!(
        default_page_size = paging.default_page_size,
        max_page_size = paging.max_page_size,
        "Paging configuration"
    );

    // ─────────────────────────────────────────────────────────────────────────
    // 🗄️ STORAGE
    // ─────────────────────────────────────────────────────────────────────────
    let (repository, db): (Arc<dyn TaskRepository>, Option<Database>) = if cli.in_memory {
        info!("🧠 Using in-memory task store");
        let repository: Arc<dyn TaskRepository> = Arc::new(MemoryTaskRepository::new());
        (repository, None)
    } else {
        debug!(database_url = %mask_password(&cli.database_url), "Database endpoint");
        info!("🗄️  Connecting to database...");
        let db = Database::connect(&DatabaseConfig::for_graphql(&cli.database_url))
            .await
            .context("Failed to connect to database")?;

        db.migrate().await.context("Failed to run migrations")?;
        info!("🗄️  Database ready (migrations applied)");

        if cli.migrate_only {
            info!("🛑 --migrate-only flag set, exiting");
            db.close().await;
            return Ok(());
        }

        let repository: Arc<dyn TaskRepository> = Arc::new(PgTaskRepository::new(&db));
        (repository, Some(db))
    };

    let service = TaskService::new(repository, Paginator::new(paging));
    let schema = build_schema(service);

    // ─────────────────────────────────────────────────────────────────────────
    // ⚡ SERVICES START
    // ─────────────────────────────────────────────────────────────────────────
    let (shutdown_tx, mut graphql_shutdown_rx) = watch::channel(false);

    let graphql_config = ServerConfig {
        port: cli.graphql_port,
        ..Default::default()
    };

    let graphql_port = cli.graphql_port;
    let graphql_handle = tokio::spawn(
        async move {
            let shutdown_signal = async move {
                while !*graphql_shutdown_rx.borrow() {
                    if graphql_shutdown_rx.changed().await.is_err() {
                        break;
                    }
                }
            };

            if let Err(e) = serve_with_shutdown(schema, graphql_config, shutdown_signal).await {
                error!(error = %e, "❌ Server error");
            }
            debug!("Server stopped");
        }
        .instrument(info_span!("graphql")),
    );

    // ─────────────────────────────────────────────────────────────────────────
    // ✅ READY
    // ─────────────────────────────────────────────────────────────────────────
    info!("✅ Tasklist ready");
    info!("   ⚡ GraphQL:  http://localhost:{}/graphql", graphql_port);
    if metrics_enabled {
        info!(
            "   📊 Metrics:  http://localhost:{}/metrics",
            cli.metrics_port
        );
    } else {
        info!("   📊 Metrics:  disabled");
    }
    info!("   Press Ctrl+C to stop");

    shutdown_signal().await;

    // ─────────────────────────────────────────────────────────────────────────
    // 🛑 SHUTDOWN
    // ─────────────────────────────────────────────────────────────────────────
    info!("🛑 Shutting down...");
    let _ = shutdown_tx.send(true);

    match tokio::time::timeout(Duration::from_secs(10), graphql_handle).await {
        Ok(_) => debug!("GraphQL stopped"),
        Err(_) => warn!("⚠️  GraphQL shutdown timed out"),
    }

    if let Some(db) = db {
        db.close().await;
    }

    info!("🛑 Shutdown complete");
    Ok(())
}

/// Initialize tracing subscriber.
fn init_tracing(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json {
        fmt().with_env_filter(filter).json().init();
    } else {
        fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .init();
    }
}

/// Mask password in database URL for logging.
fn mask_password(url_str: &str) -> String {
    match url::Url::parse(url_str) {
        Ok(mut url) => {
            if url.password().is_some() {
                let _ = url.set_password(Some("****"));
            }
            url.to_string()
        }
        Err(_) => url_str.to_string(),
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
///
/// A handler that fails to install never fires; the other one still does.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "❌ Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "❌ Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("tasklist").chain(args.iter().copied()))
    }

    #[test]
    fn test_mask_password() {
        assert_eq!(
            mask_password("postgres://admin:secret@db:5432/tasks"),
            "postgres://admin:****@db:5432/tasks"
        );
        assert_eq!(mask_password("not a url"), "not a url");
    }

    #[test]
    fn test_paging_flags() {
        let config = cli(&["--default-page-size", "25", "--max-page-size", "50"])
            .paging_config()
            .unwrap();
        assert_eq!(config.default_page_size, 25);
        assert_eq!(config.max_page_size, 50);

        assert!(cli(&["--default-page-size", "80", "--max-page-size", "50"])
            .paging_config()
            .is_err());
        assert!(cli(&["--default-page-size", "0"]).paging_config().is_err());
    }
}
