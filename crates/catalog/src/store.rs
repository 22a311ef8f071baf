//! Storage port consumed by the catalog service.

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::BoxStream;
use thiserror::Error;

use anime_core::AnimeId;

use crate::Anime;

/// Storage failure.
///
/// Opaque to the catalog: the service never inspects or retries these, it passes
/// them through as infrastructure failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("storage operation failed: {0}")]
    Backend(String),
}

/// Asynchronous key-value store of anime records, keyed by [`AnimeId`].
///
/// Implementations assign identities on first persist: a record whose id is absent
/// or zero is inserted under a fresh id, any other record is upserted under its id.
/// Streams returned by `find_all` and `save_all` are lazy; `save_all` only persists
/// an item once it is polled for.
#[async_trait]
pub trait AnimeStore: Send + Sync {
    fn find_all(&self) -> BoxStream<'_, Result<Anime, StoreError>>;

    async fn find_by_id(&self, id: AnimeId) -> Result<Option<Anime>, StoreError>;

    async fn save(&self, anime: Anime) -> Result<Anime, StoreError>;

    fn save_all(&self, animes: Vec<Anime>) -> BoxStream<'_, Result<Anime, StoreError>>;

    async fn delete(&self, anime: &Anime) -> Result<(), StoreError>;
}

#[async_trait]
impl<S> AnimeStore for Arc<S>
where
    S: AnimeStore + ?Sized,
{
    fn find_all(&self) -> BoxStream<'_, Result<Anime, StoreError>> {
        (**self).find_all()
    }

    async fn find_by_id(&self, id: AnimeId) -> Result<Option<Anime>, StoreError> {
        (**self).find_by_id(id).await
    }

    async fn save(&self, anime: Anime) -> Result<Anime, StoreError> {
        (**self).save(anime).await
    }

    fn save_all(&self, animes: Vec<Anime>) -> BoxStream<'_, Result<Anime, StoreError>> {
        (**self).save_all(animes)
    }

    async fn delete(&self, anime: &Anime) -> Result<(), StoreError> {
        (**self).delete(anime).await
    }
}
