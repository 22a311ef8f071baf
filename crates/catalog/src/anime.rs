use serde::{Deserialize, Serialize};

use anime_core::{AnimeId, DomainError, DomainResult};

/// An anime record.
///
/// `id` is absent (or `0`) on creation payloads and always present once the store
/// has persisted the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anime {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<AnimeId>,
    #[serde(default)]
    pub name: String,
}

impl Anime {
    /// A record that has not been persisted yet.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
        }
    }

    pub fn persisted(id: AnimeId, name: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            name: name.into(),
        }
    }

    pub fn with_id(self, id: AnimeId) -> Self {
        Self { id: Some(id), ..self }
    }

    /// Drop any client-supplied identity so the store assigns one.
    pub fn into_new(self) -> Self {
        Self { id: None, ..self }
    }

    /// `true` when the store still has to assign an identity.
    pub fn is_new(&self) -> bool {
        self.id.is_none_or(|id| id.is_unassigned())
    }

    pub fn ensure_valid_name(&self, message: &str) -> DomainResult<()> {
        if self.name.is_empty() {
            return Err(DomainError::validation(message));
        }
        Ok(())
    }
}
