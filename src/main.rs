use std::net::SocketAddr;
use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use funnel_link::config::{Config, DiagnosticSinkKind, StoreBackend};
use funnel_link::diagnostics::{DatabaseSink, DiagnosticSink, MultiSink, NoopSink, TracingSink};
use funnel_link::store::{MemorySubmissionStore, PgSubmissionStore, SubmissionStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // `funnel-link hash-password <password>` prints a value for EFC_ADMIN_PASSWORD_HASH
    let args: Vec<String> = std::env::args().collect();
    if args.get(1).map(String::as_str) == Some("hash-password") {
        let password = args.get(2).ok_or("usage: funnel-link hash-password <password>")?;
        println!("{}", funnel_link::auth::hash_password(password)?);
        return Ok(());
    }

    // Load .env if present
    let _ = dotenvy::dotenv();

    let config = Config::from_env().expect("Failed to load configuration");

    // Init tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(&config.log_level)
        }))
        .init();

    tracing::info!("Starting funnel-link");

    let pool = match config.store {
        StoreBackend::Postgres => Some(connect(&config).await),
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; submissions are lost on restart");
            None
        }
    };

    let store: Arc<dyn SubmissionStore> = match &pool {
        Some(pool) => Arc::new(PgSubmissionStore::new(pool.clone(), config.store_timeout)),
        None => Arc::new(MemorySubmissionStore::new()),
    };

    let sink: Arc<dyn DiagnosticSink> = match (config.diagnostic_sink, &pool) {
        (DiagnosticSinkKind::Off, _) => Arc::new(NoopSink),
        (DiagnosticSinkKind::Database, Some(pool)) => Arc::new(MultiSink(vec![
            Arc::new(TracingSink),
            Arc::new(DatabaseSink::new(pool.clone(), config.store_timeout)),
        ])),
        _ => Arc::new(TracingSink),
    };

    if config.admin.password_hash.is_none() {
        tracing::warn!("EFC_ADMIN_PASSWORD_HASH not set; admin API login disabled");
    }

    let addr = SocketAddr::new(config.host, config.port);
    let app = funnel_link::build_app(config, store, sink);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn connect(config: &Config) -> PgPool {
    let url = config
        .database_url
        .as_deref()
        .expect("DATABASE_URL is required for the postgres store");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(config.store_timeout)
        .connect(url)
        .await
        .expect("Failed to connect to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    tracing::info!("Migrations applied");
    pool
}

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
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
