//! HS256 bearer token signing and verification.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use crate::claims::{JwtClaims, TokenValidationError, validate_claims};

/// Verifies a bearer token and returns its claims.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenValidationError>;
}

/// Shared-secret (HS256) validator.
///
/// The library's own `exp`/`nbf` checks are disabled: the time window is carried in
/// `issued_at`/`expires_at` and checked by [`validate_claims`].
pub struct Hs256JwtValidator {
    key: DecodingKey,
    validation: Validation,
}

impl Hs256JwtValidator {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;

        Self {
            key: DecodingKey::from_secret(secret.as_ref()),
            validation,
        }
    }
}

impl JwtValidator for Hs256JwtValidator {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenValidationError> {
        let data = jsonwebtoken::decode::<JwtClaims>(token, &self.key, &self.validation)
            .map_err(|e| TokenValidationError::Malformed(e.to_string()))?;
        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

#[derive(Debug, Error)]
#[error("token encoding failed: {0}")]
pub struct TokenIssueError(#[from] jsonwebtoken::errors::Error);

/// Sign `claims` with HS256.
///
/// CPU-bound; callers on an async runtime should run it on a blocking thread.
pub fn issue_hs256(
    secret: impl AsRef<[u8]>,
    claims: &JwtClaims,
) -> Result<String, TokenIssueError> {
    let token = jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )?;
    Ok(token)
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::{PrincipalId, Role};

    const SECRET: &[u8] = b"test-secret";

    fn claims(now: DateTime<Utc>) -> JwtClaims {
        JwtClaims::new(PrincipalId::new(), vec![Role::ADMIN], now, Duration::minutes(10))
    }

    #[test]
    fn issued_token_validates_with_same_secret() {
        let now = Utc::now();
        let claims = claims(now);
        let token = issue_hs256(SECRET, &claims).unwrap();

        let decoded = Hs256JwtValidator::new(SECRET).validate(&token, now).unwrap();

        assert_eq!(decoded, claims);
    }

    #[test]
    fn token_signed_with_other_secret_is_malformed() {
        let now = Utc::now();
        let token = issue_hs256(b"other-secret", &claims(now)).unwrap();

        let err = Hs256JwtValidator::new(SECRET).validate(&token, now).unwrap_err();

        assert!(matches!(err, TokenValidationError::Malformed(_)));
    }

    #[test]
    fn expired_token_is_rejected_after_signature_check() {
        let now = Utc::now();
        let token = issue_hs256(SECRET, &claims(now)).unwrap();

        let err = Hs256JwtValidator::new(SECRET)
            .validate(&token, now + Duration::hours(1))
            .unwrap_err();

        assert_eq!(err, TokenValidationError::Expired);
    }

    #[test]
    fn garbage_is_malformed() {
        let err = Hs256JwtValidator::new(SECRET)
            .validate("not-a-token", Utc::now())
            .unwrap_err();
        assert!(matches!(err, TokenValidationError::Malformed(_)));
    }
}
