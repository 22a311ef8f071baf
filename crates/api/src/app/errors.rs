//! Failure taxonomy for the HTTP layer and the single stage that renders it.
//!
//! Handlers and middleware return [`ApiError`]. Its `IntoResponse` only tags the
//! response with the failure; [`map_errors`], layered outside every route, turns the
//! tagged response into the JSON error body. Nothing else writes error bodies.

use std::error::Error as StdError;
use std::sync::Arc;

use axum::{
    extract::{
        Request,
        rejection::{JsonRejection, PathRejection},
    },
    http::{HeaderValue, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{Instrument, debug, error, info_span};

use anime_auth::{AuthzError, TokenValidationError};
use anime_catalog::AnimeError;
use anime_core::DomainError;
use anime_observability::{RequestId, request_id::REQUEST_ID_HEADER};

/// Attached to every body rendered from a status-coded failure.
pub const DEVELOPER_MESSAGE: &str = "A status-coded failure happened";

const INTERNAL_SERVER_ERROR: &str = "Internal Server Error";
const FALLBACK_BODY: &str = r#"{"status":500,"message":"Internal Server Error"}"#;

/// Why a request carries no usable credentials.
#[derive(Debug, Error)]
pub enum CredentialsError {
    #[error("missing or malformed bearer token")]
    MissingBearer,

    #[error(transparent)]
    Token(#[from] TokenValidationError),
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// Status-coded domain failure (not found, validation, bad identifier).
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The request was refused before a handler produced a result: an unreadable
    /// body or path, or a method the route does not serve. Carries the status the
    /// rejection was raised with.
    #[error("{1}")]
    Rejected(StatusCode, String),

    #[error("Unauthorized")]
    Unauthorized(#[from] CredentialsError),

    #[error("Access Denied")]
    Forbidden(#[from] AuthzError),

    /// Anything not status-coded: store, serialization, blocking pool.
    #[error("infrastructure failure")]
    Infrastructure(#[source] Box<dyn StdError + Send + Sync>),
}

impl ApiError {
    pub fn infrastructure(err: impl StdError + Send + Sync + 'static) -> Self {
        Self::Infrastructure(Box::new(err))
    }

    /// Status and message for failures that carry them explicitly.
    pub fn tagged(&self) -> Option<(StatusCode, String)> {
        let status = match self {
            ApiError::Domain(e) => {
                StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::BAD_REQUEST)
            }
            ApiError::Rejected(status, _) => *status,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Infrastructure(_) => return None,
        };
        Some((status, self.to_string()))
    }

    pub fn status(&self) -> StatusCode {
        self.tagged()
            .map(|(status, _)| status)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl From<AnimeError> for ApiError {
    fn from(err: AnimeError) -> Self {
        match err {
            AnimeError::Domain(e) => ApiError::Domain(e),
            AnimeError::Store(e) => ApiError::infrastructure(e),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Rejected(rejection.status(), rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Rejected(rejection.status(), rejection.body_text())
    }
}

/// Response extension carrying the failure to [`map_errors`].
#[derive(Clone)]
struct Failure(Arc<ApiError>);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = self.status().into_response();
        response.extensions_mut().insert(Failure(Arc::new(self)));
        response
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody<'a> {
    timestamp: DateTime<Utc>,
    path: &'a str,
    status: u16,
    error: &'a str,
    message: String,
    request_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    developer_message: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    trace: Option<String>,
}

/// Outermost middleware: assigns the request id, opens the request span, and renders
/// any [`ApiError`] raised further in. Error responses produced by the router itself
/// (such as 405) carry no [`ApiError`] and are rendered from their status.
pub async fn map_errors(mut req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    let trace = wants_trace(req.uri().query());
    let request_id = RequestId::from_header(
        req.headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok()),
    );
    req.extensions_mut().insert(request_id.clone());

    let span = info_span!(
        "request",
        method = %req.method(),
        path = %path,
        request_id = %request_id,
    );
    let mut response = next.run(req).instrument(span).await;

    if let Some(Failure(err)) = response.extensions_mut().remove::<Failure>() {
        response = render(&err, &path, &request_id, trace);
    } else if let Some(err) = untagged_error_status(response.status()) {
        response = render(&err, &path, &request_id, trace);
    }

    if let Ok(value) = HeaderValue::from_str(request_id.as_str()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

fn untagged_error_status(status: StatusCode) -> Option<ApiError> {
    if !(status.is_client_error() || status.is_server_error()) {
        return None;
    }
    let reason = status.canonical_reason().unwrap_or(INTERNAL_SERVER_ERROR);
    Some(ApiError::Rejected(status, reason.to_string()))
}

fn wants_trace(query: Option<&str>) -> bool {
    query
        .into_iter()
        .flat_map(|q| q.split('&'))
        .any(|pair| pair.eq_ignore_ascii_case("trace=true"))
}

fn render(err: &ApiError, path: &str, request_id: &RequestId, trace: bool) -> Response {
    let (status, message, developer_message) = match err.tagged() {
        Some((status, message)) => {
            debug!(%status, %message, %request_id, "request failed");
            (status, message, Some(DEVELOPER_MESSAGE))
        }
        None => {
            error!(error = %source_chain(err), %request_id, "request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                INTERNAL_SERVER_ERROR.to_string(),
                None,
            )
        }
    };

    let body = ErrorBody {
        timestamp: Utc::now(),
        path,
        status: status.as_u16(),
        error: status.canonical_reason().unwrap_or(INTERNAL_SERVER_ERROR),
        message,
        request_id: request_id.as_str(),
        developer_message,
        trace: trace.then(|| source_chain(err)),
    };

    match serde_json::to_vec(&body) {
        Ok(bytes) => (status, [(header::CONTENT_TYPE, "application/json")], bytes).into_response(),
        Err(e) => {
            error!(error = %e, %request_id, "failed to render error body");
            fallback_response()
        }
    }
}

fn fallback_response() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(header::CONTENT_TYPE, "application/json")],
        FALLBACK_BODY,
    )
        .into_response()
}

/// `err` and each of its sources, one per line.
fn source_chain(err: &(dyn StdError + 'static)) -> String {
    let mut chain = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        chain.push_str("\ncaused by: ");
        chain.push_str(&cause.to_string());
        source = cause.source();
    }
    chain
}

/// Response for requests that match no route.
pub async fn no_route() -> ApiError {
    ApiError::Domain(DomainError::not_found("No route found"))
}
