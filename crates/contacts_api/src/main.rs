//! Contacts API server entry point.

use anyhow::{Context, Result};
use clap::Parser;
use contacts_api::{serve, AppState, Config};
use log::warn;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::parse();

    contacts_core::init_logging(config.log_level(), config.log_dir.as_deref())
        .map_err(anyhow::Error::msg)
        .context("failed to initialize logging")?;

    for setting in config.unused_store_settings() {
        warn!("event=config_load module=config status=ignored setting={setting} reason=embedded_store");
    }

    let conn = config.open_store()?;
    serve(config.bind_addr(), AppState::new(conn)).await
}
