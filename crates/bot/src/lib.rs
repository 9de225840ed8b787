//! Gohan Bot library.
//!
//! A Slack bot served over two signed webhooks. Mentions run commands
//! (`ping`, `gohan`, `conversations`, `check`, `reactions`); the `gohan` menu
//! drives a select/confirm flow through block actions.
//!
//! The crate is a library so the router can be driven end to end in tests;
//! the `gohan-bot` binary wires it to configuration, logging and a listener.

#![cfg_attr(not(test), forbid(unsafe_code))]

use axum::{Router, middleware::from_fn};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod slack;
pub mod state;

use state::AppState;

/// Build the full application: routes, tracing, request IDs and Sentry.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::routes(state.clone()))
        .layer(from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}
