//! Configuration loading and representation.

use std::net::SocketAddr;

use thiserror::Error;
use tracing::warn;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

/// Process configuration, read from the environment.
///
/// | Variable | Default |
/// |---|---|
/// | `BIND_ADDR` | `0.0.0.0:8080` |
/// | `JWT_SECRET` | `dev-secret` (logged as insecure) |
/// | `SEED_ANIMES` | empty; comma-separated names preloaded into the store |
/// | `PRINT_DEV_TOKENS` | `false`; log an ADMIN and a USER token at startup |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub seed_animes: Vec<String>,
    pub print_dev_tokens: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                key: "BIND_ADDR",
                message: e.to_string(),
            })?;

        let jwt_secret = match lookup("JWT_SECRET") {
            Some(secret) if !secret.is_empty() => secret,
            _ => {
                warn!("JWT_SECRET not set; using insecure dev default");
                DEV_JWT_SECRET.to_string()
            }
        };

        let seed_animes = lookup("SEED_ANIMES")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let print_dev_tokens = match lookup("PRINT_DEV_TOKENS") {
            None => false,
            Some(raw) => raw.trim().parse::<bool>().map_err(|e| ConfigError::Invalid {
                key: "PRINT_DEV_TOKENS",
                message: e.to_string(),
            })?,
        };

        Ok(Self {
            bind_addr,
            jwt_secret,
            seed_animes,
            print_dev_tokens,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = load(&[]).unwrap();

        assert_eq!(cfg.bind_addr, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(cfg.jwt_secret, "dev-secret");
        assert!(cfg.seed_animes.is_empty());
        assert!(!cfg.print_dev_tokens);
    }

    #[test]
    fn seed_names_are_split_and_trimmed() {
        let cfg = load(&[("SEED_ANIMES", " Naruto, ,Bleach ,One Piece")]).unwrap();
        assert_eq!(cfg.seed_animes, vec!["Naruto", "Bleach", "One Piece"]);
    }

    #[test]
    fn invalid_values_are_reported_by_key() {
        assert!(matches!(
            load(&[("BIND_ADDR", "not-an-addr")]),
            Err(ConfigError::Invalid { key: "BIND_ADDR", .. })
        ));
        assert!(matches!(
            load(&[("PRINT_DEV_TOKENS", "yes")]),
            Err(ConfigError::Invalid { key: "PRINT_DEV_TOKENS", .. })
        ));
    }

    #[test]
    fn explicit_values_win() {
        let cfg = load(&[
            ("BIND_ADDR", "127.0.0.1:9000"),
            ("JWT_SECRET", "s3cret"),
            ("PRINT_DEV_TOKENS", "true"),
        ])
        .unwrap();

        assert_eq!(cfg.bind_addr.port(), 9000);
        assert_eq!(cfg.jwt_secret, "s3cret");
        assert!(cfg.print_dev_tokens);
    }
}
