use anyhow::Result;
use std::sync::Arc;
use subhub::{
    config::config_loader,
    infrastructure::{axum_http::http_serve, postgres::postgres_connection},
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    if let Err(error) = run().await {
        error!("Server exited with error: {}", error);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let dotenvy_env = config_loader::load()?;
    info!("ENV has been loaded");

    let stage = config_loader::get_stage();
    info!("Running in {} stage", stage);

    let postgres_pool = postgres_connection::establish_connection(&dotenvy_env.database.url)?;
    info!("Postgres connection has been established");

    http_serve::start(Arc::new(dotenvy_env), Arc::new(postgres_pool)).await?;

    Ok(())
}
