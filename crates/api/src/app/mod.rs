//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: catalog service wiring and startup helpers
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: request/response DTOs
//! - `errors.rs`: failure taxonomy and the single error-rendering layer
//!
//! Layer order, outermost first: error mapping, authentication, access policy, handler.

use std::sync::Arc;

use axum::{Extension, Router, routing::get};

use anime_auth::{AccessPolicy, Hs256JwtValidator};
use anime_catalog::AnimeStore;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(jwt_secret: impl AsRef<[u8]>, store: Arc<dyn AnimeStore>) -> Router {
    let jwt = Arc::new(Hs256JwtValidator::new(jwt_secret));
    let auth_state = middleware::AuthState { jwt };
    let policy = Arc::new(AccessPolicy::animes());

    let services = Arc::new(services::build_services(store));

    // Protected routes: authenticate, then apply the access policy.
    let protected = routes::router()
        .layer(Extension(services))
        .route_layer(axum::middleware::from_fn_with_state(
            policy,
            middleware::access_middleware,
        ))
        .route_layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(protected)
        .fallback(errors::no_route)
        .layer(axum::middleware::from_fn(errors::map_errors))
}
