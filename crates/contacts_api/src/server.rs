//! Router assembly and server lifecycle.
//!
//! # Responsibility
//! - Bind the route table to handlers and boundary layers.
//! - Log one event per request with status and duration.
//! - Serve until Ctrl-C or SIGTERM, then drain in-flight requests.
//!
//! # Invariants
//! - Layer order: request log (outer) -> failure translator -> panic catcher
//!   -> handlers, so logged statuses are the final ones.

use crate::controller::{
    create_contact, delete_contact, get_contact, healthz, list_contacts, route_not_found,
    update_contact,
};
use crate::envelope::{panic_failure, translate_failures};
use crate::state::AppState;
use anyhow::{Context, Result};
use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use log::{error, info, warn};
use std::net::SocketAddr;
use std::time::Instant;
use tower_http::catch_panic::CatchPanicLayer;

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    with_boundary(routes()).with_state(state)
}

/// Route table of the API, including the unknown-route fallback.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/contacts", get(list_contacts).post(create_contact))
        .route(
            "/contacts/:id",
            get(get_contact).put(update_contact).delete(delete_contact),
        )
        .fallback(route_not_found)
}

/// Wraps `routes` in the panic catcher, failure translator and request log.
pub fn with_boundary(routes: Router<AppState>) -> Router<AppState> {
    routes
        .layer(CatchPanicLayer::custom(panic_failure))
        .layer(middleware::from_fn(translate_failures))
        .layer(middleware::from_fn(log_requests))
}

/// Binds `addr` and serves the API until a shutdown signal arrives.
pub async fn serve(addr: SocketAddr, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    let local_addr = listener
        .local_addr()
        .context("failed to read bound address")?;
    info!("event=server_start module=server status=ok addr={local_addr}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server failed")?;

    info!("event=server_stop module=server status=ok");
    Ok(())
}

async fn log_requests(request: Request, next: Next) -> Response {
    let started_at = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    let status = response.status();
    let duration_ms = started_at.elapsed().as_millis();
    if status.is_server_error() {
        error!(
            "event=http_request module=http status=error method={method} path={path} http_status={} duration_ms={duration_ms}",
            status.as_u16()
        );
    } else if status.is_client_error() {
        warn!(
            "event=http_request module=http status=rejected method={method} path={path} http_status={} duration_ms={duration_ms}",
            status.as_u16()
        );
    } else {
        info!(
            "event=http_request module=http status=ok method={method} path={path} http_status={} duration_ms={duration_ms}",
            status.as_u16()
        );
    }

    response
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!("event=shutdown_signal module=server status=error signal=ctrl_c error={err}");
            std::future::pending::<()>().await;
        }
    };
    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!("event=shutdown_signal module=server status=error signal=sigterm error={err}");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(unix)]
    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    #[cfg(not(unix))]
    ctrl_c.await;

    info!("event=shutdown_signal module=server status=ok");
}
