use serde::{Deserialize, Serialize};

use anime_catalog::Anime;
use anime_core::AnimeId;

// -------------------------
// Request DTOs
// -------------------------

/// Body of create, batch-create and update requests.
///
/// Both fields are optional on the wire: a missing name is reported by the service
/// as an invalid name rather than as a malformed body.
#[derive(Debug, Deserialize)]
pub struct AnimeRequest {
    #[serde(default)]
    pub id: Option<AnimeId>,
    #[serde(default)]
    pub name: String,
}

impl From<AnimeRequest> for Anime {
    fn from(req: AnimeRequest) -> Self {
        Anime {
            id: req.id,
            name: req.name,
        }
    }
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct WhoAmIResponse {
    pub principal_id: String,
    pub roles: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_fields_default_when_missing() {
        let req: AnimeRequest = serde_json::from_str("{}").unwrap();
        let anime = Anime::from(req);
        assert_eq!(anime, Anime::new(""));
    }

    #[test]
    fn request_keeps_client_id() {
        let req: AnimeRequest = serde_json::from_str(r#"{"id":4,"name":"Bleach"}"#).unwrap();
        assert_eq!(Anime::from(req), Anime::persisted(AnimeId::new(4), "Bleach"));
    }
}
