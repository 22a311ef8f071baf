use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use tracing::debug;

use anime_auth::{AccessPolicy, JwtValidator};

use crate::app::errors::{ApiError, CredentialsError};
use crate::context::PrincipalContext;

#[derive(Clone)]
pub struct AuthState {
    pub jwt: Arc<dyn JwtValidator>,
}

/// Resolve the bearer token into a [`PrincipalContext`] or fail with 401.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(req.headers())
        .inspect_err(|e| debug!(reason = %e, "authentication failed"))?;

    let claims = state.jwt.validate(token, Utc::now()).map_err(|e| {
        debug!(reason = %e, "authentication failed");
        CredentialsError::from(e)
    })?;

    req.extensions_mut()
        .insert(PrincipalContext::new(claims.sub, claims.roles));

    Ok(next.run(req).await)
}

/// Enforce the role the access policy requires for this method and path, or fail
/// with 403. Runs after [`auth_middleware`].
pub async fn access_middleware(
    State(policy): State<Arc<AccessPolicy>>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let principal = req
        .extensions()
        .get::<PrincipalContext>()
        .ok_or(CredentialsError::MissingBearer)?
        .to_principal();

    policy
        .check(&principal, req.method().as_str(), req.uri().path())
        .inspect_err(|e| {
            debug!(
                principal_id = %principal.principal_id,
                method = %req.method(),
                path = req.uri().path(),
                reason = %e,
                "access denied"
            )
        })?;

    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, CredentialsError> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or(CredentialsError::MissingBearer)?;

    let header = header.to_str().map_err(|_| CredentialsError::MissingBearer)?;

    let header = header
        .strip_prefix("Bearer ")
        .ok_or(CredentialsError::MissingBearer)?;

    let token = header.trim();
    if token.is_empty() {
        return Err(CredentialsError::MissingBearer);
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderValue, header::AUTHORIZATION};

    use super::*;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn bearer_token_is_extracted() {
        assert_eq!(extract_bearer(&headers("Bearer abc.def")).unwrap(), "abc.def");
    }

    #[test]
    fn missing_or_non_bearer_headers_are_rejected() {
        assert!(extract_bearer(&HeaderMap::new()).is_err());
        assert!(extract_bearer(&headers("Basic dXNlcjpwdw==")).is_err());
        assert!(extract_bearer(&headers("Bearer    ")).is_err());
    }
}
