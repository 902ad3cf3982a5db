//! Binary entrypoint for the size API.

use std::sync::Arc;

use size_api::{AppState, LogFormat, PgRecordStore, ServerConfig};
use size_engine::{Config, Engine};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing(format: LogFormat) {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  let registry = tracing_subscriber::registry().with(filter);
  match format {
    LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
    LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
  }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  let config = ServerConfig::from_env()?;
  init_tracing(config.log_format);

  let store = PgRecordStore::connect(&config.database_url, config.db_max_connections).await?;
  let engine = Engine::new(
    Config {
      app_domain: Some(config.app_domain.clone()),
      ..Config::default()
    },
    Arc::new(store),
  );
  let app = size_api::router(Arc::new(AppState { engine }));

  info!(addr = %config.bind, "size-api listening");
  let listener = tokio::net::TcpListener::bind(config.bind).await?;
  axum::serve(listener, app).await?;

  Ok(())
}
