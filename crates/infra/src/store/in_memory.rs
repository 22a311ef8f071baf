use std::collections::BTreeMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicI32, Ordering};

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};

use anime_catalog::{Anime, AnimeStore, StoreError};
use anime_core::AnimeId;

/// In-memory anime store for tests/dev.
///
/// Records are kept in id order, which is the order `find_all` returns them in.
/// Ids are assigned sequentially from 1.
#[derive(Debug, Default)]
pub struct InMemoryAnimeStore {
    records: RwLock<BTreeMap<AnimeId, Anime>>,
    last_id: AtomicI32,
}

impl InMemoryAnimeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store preloaded with one record per name, ids `1..=n`.
    pub fn with_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let store = Self::new();
        if let Ok(mut map) = store.records.write() {
            for name in names {
                let id = AnimeId::new(store.last_id.fetch_add(1, Ordering::SeqCst) + 1);
                map.insert(id, Anime::persisted(id, name));
            }
        }
        store
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn upsert(&self, anime: Anime) -> Result<Anime, StoreError> {
        let anime = match anime.id {
            Some(id) if !id.is_unassigned() => {
                self.last_id.fetch_max(id.get(), Ordering::SeqCst);
                anime
            }
            _ => {
                let id = AnimeId::new(self.last_id.fetch_add(1, Ordering::SeqCst) + 1);
                anime.with_id(id)
            }
        };

        let mut map = self.records.write().map_err(|_| poisoned())?;
        if let Some(id) = anime.id {
            map.insert(id, anime.clone());
        }
        Ok(anime)
    }
}

fn poisoned() -> StoreError {
    StoreError::Backend("in-memory store lock poisoned".to_string())
}

#[async_trait]
impl AnimeStore for InMemoryAnimeStore {
    fn find_all(&self) -> BoxStream<'_, Result<Anime, StoreError>> {
        match self.records.read() {
            Ok(map) => {
                let snapshot: Vec<_> = map.values().cloned().map(Ok::<_, StoreError>).collect();
                stream::iter(snapshot).boxed()
            }
            Err(_) => stream::once(async { Err::<Anime, _>(poisoned()) }).boxed(),
        }
    }

    async fn find_by_id(&self, id: AnimeId) -> Result<Option<Anime>, StoreError> {
        let map = self.records.read().map_err(|_| poisoned())?;
        Ok(map.get(&id).cloned())
    }

    async fn save(&self, anime: Anime) -> Result<Anime, StoreError> {
        self.upsert(anime)
    }

    fn save_all(&self, animes: Vec<Anime>) -> BoxStream<'_, Result<Anime, StoreError>> {
        // Each item is written only when the consumer polls for it.
        stream::iter(animes).map(move |anime| self.upsert(anime)).boxed()
    }

    async fn delete(&self, anime: &Anime) -> Result<(), StoreError> {
        let Some(id) = anime.id else {
            return Ok(());
        };
        let mut map = self.records.write().map_err(|_| poisoned())?;
        map.remove(&id);
        Ok(())
    }
}
