//! refuel server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) plus `REFUEL_*`
//! environment variables, builds the CRM and payments clients, opens the
//! device-token registry and serves the JSON API over HTTP.

mod settings;

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use refuel_api::{ApiConfig, AppState};
use refuel_remote::{CrmClient, CrmConfig, PaymentsClient, PaymentsConfig};
use refuel_store_sqlite::SqliteTokenRegistry;
use settings::{ServerConfig, expand_tilde};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Backend for the refuel iOS app")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let server_cfg = ServerConfig::load(&cli.config)?;
  let timeout = server_cfg.request_timeout();

  let crm = CrmClient::new(CrmConfig {
    base_url:     server_cfg.crm_base_url.clone(),
    access_token: server_cfg.crm_token.clone(),
    timeout,
  })
  .context("failed to build CRM client")?;

  let payments = PaymentsClient::new(PaymentsConfig {
    base_url:   server_cfg.payments_base_url.clone(),
    secret_key: server_cfg.payments_secret_key.clone(),
    timeout,
  })
  .context("failed to build payments client")?;

  let token_path = expand_tilde(&server_cfg.token_store_path);
  let tokens = SqliteTokenRegistry::open(&token_path)
    .await
    .with_context(|| format!("failed to open token registry at {token_path:?}"))?;

  let state = AppState {
    store:    Arc::new(crm),
    payments: Arc::new(payments),
    tokens:   Arc::new(tokens),
    config:   Arc::new(ApiConfig {
      default_currency:  server_cfg.default_currency.to_lowercase(),
      portal_return_url: server_cfg.portal_return_url.clone(),
    }),
  };

  let app = refuel_api::router(state).layer(TraceLayer::new_for_http());
  let address = server_cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
