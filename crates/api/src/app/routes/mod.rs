use axum::{Router, routing::get};

pub mod animes;
pub mod system;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .merge(animes::router())
}
