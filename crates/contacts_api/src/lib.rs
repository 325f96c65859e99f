//! HTTP boundary for the contacts API.
//!
//! # Responsibility
//! - Expose contact use cases from `contacts_core` as a JSON REST API.
//! - Guarantee every response is a JSON body with a status code.

pub mod config;
pub mod controller;
pub mod envelope;
pub mod server;
pub mod state;

pub use config::Config;
pub use server::{router, routes, serve, with_boundary};
pub use state::AppState;
