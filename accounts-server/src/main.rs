//! An account registration server.

mod envelope;
mod error;
mod handlers;
mod jwt;
mod repo;
mod router;
mod state;
mod validate;

use clap::Parser;
use color_eyre::eyre::WrapErr;
use repo::{MemoryRepository, PgRepository, SharedRepository};
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
struct Config {
    #[clap(long, env, default_value = "127.0.0.1:3000")]
    address: String,

    /// Request body size limit, in bytes
    #[clap(long, env, default_value = "5242880")]
    body_limit: usize,

    /// Request timeout, in seconds
    #[clap(long, env, default_value = "5", value_parser = duration_parser)]
    request_timeout: Duration,

    /// PostgreSQL connection string. Without one, accounts are kept in memory
    /// and lost on restart.
    #[clap(long, env)]
    database_url: Option<String>,

    /// Most database connections to hold open at once
    #[clap(long, env, default_value = "5")]
    max_connections: u32,

    /// Base64-encoded secret for signing login tokens
    #[clap(long, env)]
    jwt_secret: String,

    /// How long login tokens last, in days
    #[clap(long, env, default_value = "90")]
    jwt_ttl_days: i64,
}

fn duration_parser(s: &str) -> Result<Duration, std::num::ParseIntError> {
    s.parse().map(Duration::from_secs)
}

async fn repository(options: &Config) -> color_eyre::Result<SharedRepository> {
    let Some(database_url) = &options.database_url else {
        tracing::warn!("no database URL configured; accounts will be kept in memory");
        return Ok(Arc::new(MemoryRepository::default()));
    };

    let pool = PgPoolOptions::new()
        .max_connections(options.max_connections)
        .connect(database_url)
        .await
        .wrap_err("could not connect to the database")?;

    sqlx::migrate!()
        .run(&pool)
        .await
        .wrap_err("could not run migrations")?;

    Ok(Arc::new(PgRepository::new(pool)))
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let options = Config::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let state = state::State::new(
        repository(&options).await?,
        &options.jwt_secret,
        chrono::Duration::days(options.jwt_ttl_days),
    )
    .wrap_err("invalid JWT secret")?;

    let app = router::app(state, options.body_limit, options.request_timeout);

    let listener = TcpListener::bind(&options.address).await?;
    tracing::info!(address = ?listener.local_addr(), "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(?err, "could not listen for shutdown signal");
        std::future::pending::<()>().await;
    }

    tracing::info!("shutting down");
}
