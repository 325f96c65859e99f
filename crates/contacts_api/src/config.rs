//! Process configuration from CLI flags and environment.
//!
//! Every flag can be set through the environment variable named next to it;
//! a `.env` file in the working directory is loaded before parsing.

use anyhow::{Context, Result};
use clap::Parser;
use contacts_core::db::{open_db, open_db_in_memory};
use contacts_core::default_log_level;
use rusqlite::Connection;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Database name that selects a throwaway in-memory store.
pub const IN_MEMORY_DB_NAME: &str = ":memory:";

#[derive(Debug, Clone, Parser)]
#[command(name = "contacts_api", about = "Contacts management HTTP API", version)]
pub struct Config {
    /// Address to bind the HTTP listener on.
    #[arg(long, env = "HTTP_HOST", default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    pub host: IpAddr,

    /// Port to listen on.
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// SQLite database file, or `:memory:`.
    #[arg(long, env = "DB_NAME", default_value = "contacts.sqlite3")]
    pub db_name: String,

    /// Accepted for deployments that also configure server-backed stores;
    /// the embedded store ignores it.
    #[arg(long, env = "DB_HOST")]
    pub db_host: Option<String>,

    #[arg(long, env = "DB_PORT")]
    pub db_port: Option<u16>,

    #[arg(long, env = "DB_USERNAME")]
    pub db_username: Option<String>,

    #[arg(long, env = "DB_PASSWORD", hide_env_values = true)]
    pub db_password: Option<String>,

    /// trace|debug|info|warn|error; defaults by build mode.
    #[arg(long, env = "LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Absolute directory for rotating log files; stderr when unset.
    #[arg(long, env = "LOG_DIR")]
    pub log_dir: Option<String>,
}

impl Config {
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(default_log_level())
    }

    /// Names of configured settings the embedded store does not use.
    pub fn unused_store_settings(&self) -> Vec<&'static str> {
        [
            ("DB_HOST", self.db_host.is_some()),
            ("DB_PORT", self.db_port.is_some()),
            ("DB_USERNAME", self.db_username.is_some()),
            ("DB_PASSWORD", self.db_password.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, set)| set.then_some(name))
        .collect()
    }

    /// Opens and migrates the configured store.
    pub fn open_store(&self) -> Result<Connection> {
        if self.db_name == IN_MEMORY_DB_NAME {
            return open_db_in_memory().context("failed to open in-memory database");
        }
        open_db(&self.db_name).with_context(|| format!("failed to open database `{}`", self.db_name))
    }
}
