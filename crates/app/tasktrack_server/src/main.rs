//! Tasktrack API server binary.
//!
//! Runs against PostgreSQL when `DATABASE_URL` is set, otherwise against an
//! in-memory store that is lost on exit.

use std::sync::Arc;

use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use tasktrack_api::config::ApiConfig;
use tasktrack_api::services::auth::normalize_email;
use tasktrack_core::config::{AuthConfig, DEFAULT_BCRYPT_COST, DEFAULT_TOKEN_TTL_MINUTES};
use tasktrack_core::seed;
use tasktrack_core::store::{MemoryStore, PgStore, TaskStore, UserStore};
use tracing::{info, warn};

/// CLI arguments for the API server.
#[derive(Parser, Debug)]
#[command(name = "tasktrack_server", about = "Tasktrack API server")]
struct Args {
    /// Address to listen on.
    #[arg(long, env = "BIND_ADDR", default_value = "127.0.0.1:8000")]
    bind: String,

    /// PostgreSQL connection URL. Without it data lives in memory.
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Maximum number of database connections in the pool.
    #[arg(long, default_value_t = 5)]
    max_connections: u32,

    /// Shared secret for signing access tokens.
    #[arg(long, env = "SECRET_KEY", hide_env_values = true)]
    secret_key: String,

    /// Token signing algorithm (HS256, HS384 or HS512).
    #[arg(long, env = "ALGORITHM", default_value = "HS256")]
    algorithm: String,

    /// Access token lifetime in minutes.
    #[arg(long, env = "ACCESS_TOKEN_EXPIRE_MINUTES", default_value_t = DEFAULT_TOKEN_TTL_MINUTES)]
    access_token_expire_minutes: i64,

    /// bcrypt work factor.
    #[arg(long, env = "BCRYPT_COST", default_value_t = DEFAULT_BCRYPT_COST)]
    bcrypt_cost: u32,

    /// Email of the administrator created on first start.
    #[arg(long, env = "ADMIN_EMAIL", default_value = "admin@example.com")]
    admin_email: String,

    /// Password of the administrator created on first start.
    #[arg(long, env = "ADMIN_PASSWORD", hide_env_values = true)]
    admin_password: String,

    /// Allowed CORS origins.
    #[arg(
        long,
        env = "BACKEND_CORS_ORIGINS",
        value_delimiter = ',',
        default_value = tasktrack_api::config::DEFAULT_CORS_ORIGIN
    )]
    cors_origins: Vec<String>,
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(
                    "info,tasktrack_api=debug,tasktrack_core=debug",
                )
            }),
        )
        .init();

    let args = Args::parse();

    let token_ttl = chrono::Duration::try_minutes(args.access_token_expire_minutes)
        .ok_or("access token lifetime is out of range")?;
    let auth = AuthConfig::new(
        args.secret_key,
        &args.algorithm,
        token_ttl,
        args.bcrypt_cost,
    )?;

    let (users, tasks): (Arc<dyn UserStore>, Arc<dyn TaskStore>) = match &args.database_url {
        Some(url) => {
            info!(max_connections = args.max_connections, "connecting to database");
            let pool = PgPoolOptions::new()
                .max_connections(args.max_connections)
                .acquire_timeout(std::time::Duration::from_secs(30))
                .connect(url)
                .await?;

            info!("running database migrations");
            tasktrack_core::migrate::migrate(&pool).await?;

            let store = Arc::new(PgStore::new(pool));
            (store.clone(), store)
        }
        None => {
            warn!("DATABASE_URL not set, using in-memory store");
            let store = Arc::new(MemoryStore::new());
            (store.clone(), store)
        }
    };

    let admin_email = normalize_email(&args.admin_email);
    seed::ensure_admin(
        users.as_ref(),
        &admin_email,
        &args.admin_password,
        auth.bcrypt_cost(),
    )
    .await?;

    let config = ApiConfig {
        bind_addr: args.bind,
        auth,
        cors_origins: args.cors_origins,
    };

    let state = tasktrack_api::AppState::new(config.clone(), users, tasks)?;
    let app = tasktrack_api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    let local_addr = listener.local_addr()?;
    info!(addr = %local_addr, "REST API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}
