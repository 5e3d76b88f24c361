// ABOUTME: HTTP server assembly with middleware layers, background jobs, and graceful shutdown
// ABOUTME: Binds the API router to a TCP listener and stops cleanly on ctrl-c or SIGTERM
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Server
//!
//! Layer order, outermost first: request id, trace span, request id
//! propagation, request log, body limit, timeout, CORS.

use std::future::{pending, Future};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::extract::Request;
use axum::http::{HeaderName, StatusCode};
use axum::{middleware, Router};
use tokio::net::TcpListener;
use tokio::signal::ctrl_c;
use tokio::sync::watch;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::middleware::{create_request_span, log_requests, setup_cors, REQUEST_ID_HEADER};
use crate::resources::ServerResources;
use crate::routes::api_router;
use crate::scheduler::Scheduler;

/// The Repforge HTTP server
pub struct RepforgeServer {
    resources: Arc<ServerResources>,
}

impl RepforgeServer {
    /// Create a server over shared resources
    #[must_use]
    pub const fn new(resources: Arc<ServerResources>) -> Self {
        Self { resources }
    }

    /// The full application router with every middleware layer applied
    #[must_use]
    pub fn router(&self) -> Router {
        build_router(&self.resources)
    }

    /// Bind `0.0.0.0:{port}` and serve until ctrl-c or SIGTERM
    ///
    /// # Errors
    ///
    /// Returns an error if the port cannot be bound or the server fails
    pub async fn run(self, port: u16) -> Result<()> {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind HTTP listener on {addr}"))?;
        info!("HTTP server listening on http://{addr}");

        self.serve(listener, shutdown_signal()).await
    }

    /// Serve on an already bound listener until `shutdown` resolves
    ///
    /// The background scheduler runs alongside and is stopped before this returns.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails while accepting connections
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let scheduler = Scheduler::new(Arc::clone(&self.resources)).spawn(shutdown_rx);

        let app = self.router();
        let served = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown.await;
                info!("Shutdown signal received, draining connections");
                if shutdown_tx.send(true).is_err() {
                    warn!("Scheduler already stopped");
                }
            })
            .await;

        if let Some(handle) = scheduler {
            if let Err(e) = handle.await {
                error!(error = %e, "Scheduler task ended abnormally");
            }
        }

        served.context("HTTP server error")?;
        info!("HTTP server stopped");
        Ok(())
    }
}

/// Compose every route group and wrap it in the request middleware stack
#[must_use]
pub fn build_router(resources: &Arc<ServerResources>) -> Router {
    let http = &resources.config.http;
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    api_router(resources).layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(|request: &Request| create_request_span(request)),
            )
            .layer(PropagateRequestIdLayer::new(request_id))
            .layer(middleware::from_fn(log_requests))
            .layer(RequestBodyLimitLayer::new(http.max_request_body_bytes))
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                Duration::from_secs(http.request_timeout_secs),
            ))
            .layer(setup_cors(http)),
    )
}

/// Resolve on ctrl-c, or SIGTERM on unix
pub async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = ctrl_c().await {
            error!(error = %e, "Failed to listen for ctrl-c");
            pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = pending::<()>();

    tokio::select! {
        () = interrupt => {},
        () = terminate => {},
    }
}
