//! Service wiring and startup helpers.

use std::sync::Arc;

use chrono::{Duration, Utc};
use thiserror::Error;
use tracing::info;

use anime_auth::{JwtClaims, PrincipalId, Role, TokenIssueError, issue_hs256};
use anime_catalog::{AnimeService, AnimeStore};
use anime_infra::blocking::{self, BlockingError};

/// Services shared by all routes.
#[derive(Clone)]
pub struct AppServices {
    pub animes: AnimeService,
}

pub fn build_services(store: Arc<dyn AnimeStore>) -> AppServices {
    AppServices {
        animes: AnimeService::new(store),
    }
}

#[derive(Debug, Error)]
pub enum DevTokenError {
    #[error(transparent)]
    Blocking(#[from] BlockingError),

    #[error(transparent)]
    Issue(#[from] TokenIssueError),
}

const DEV_TOKEN_TTL_HOURS: i64 = 12;

/// Mint one ADMIN and one USER token for local use and log them.
///
/// Signing runs on the blocking pool.
pub async fn mint_dev_tokens(secret: String) -> Result<Vec<(Role, String)>, DevTokenError> {
    let tokens = blocking::offload(move || -> Result<Vec<(Role, String)>, DevTokenError> {
        [Role::ADMIN, Role::USER]
            .into_iter()
            .map(|role| -> Result<(Role, String), DevTokenError> {
                let token =
                    blocking::guarded("jwt.sign", || sign_dev_token(&secret, role.clone()))??;
                Ok((role, token))
            })
            .collect()
    })
    .await??;

    for (role, token) in &tokens {
        info!(role = role.name(), token = %token, "dev token");
    }
    Ok(tokens)
}

fn sign_dev_token(secret: &str, role: Role) -> Result<String, TokenIssueError> {
    let claims = JwtClaims::new(
        PrincipalId::new(),
        vec![role],
        Utc::now(),
        Duration::hours(DEV_TOKEN_TTL_HOURS),
    );
    issue_hs256(secret, &claims)
}
