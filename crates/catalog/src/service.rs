//! Catalog service: the business rules the storage layer does not know about.
//!
//! - `find_by_id` is the only existence check; `update` and `delete` go through it.
//! - The service is stateless and holds no principal context; authorization happens
//!   before it is called.
//! - Domain failures are never retried here. Store failures pass through unchanged.

use std::sync::Arc;

use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use thiserror::Error;
use tracing::{debug, warn};

use anime_core::{AnimeId, DomainError};

use crate::{Anime, AnimeStore, StoreError};

pub const ANIME_NOT_FOUND: &str = "Anime not found";
pub const INVALID_NAME: &str = "Invalid name";

/// Lazy stream of records produced by the service.
pub type AnimeStream<'a> = BoxStream<'a, Result<Anime, AnimeError>>;

/// Failure raised by [`AnimeService`].
#[derive(Debug, Error)]
pub enum AnimeError {
    /// Tagged domain failure (not found, validation).
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Opaque infrastructure failure from the store.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AnimeError {
    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            AnimeError::Domain(e) => Some(e),
            AnimeError::Store(_) => None,
        }
    }
}

#[derive(Clone)]
pub struct AnimeService {
    store: Arc<dyn AnimeStore>,
}

impl AnimeService {
    pub fn new(store: Arc<dyn AnimeStore>) -> Self {
        Self { store }
    }

    /// All records in store order.
    pub fn list_all(&self) -> AnimeStream<'_> {
        self.store.find_all().map_err(AnimeError::from).boxed()
    }

    /// Fetch-or-fail: the record, or `NotFound` when the store has nothing for `id`.
    pub async fn find_by_id(&self, id: AnimeId) -> Result<Anime, AnimeError> {
        match self.store.find_by_id(id).await? {
            Some(anime) => Ok(anime),
            None => {
                debug!(%id, "anime not found");
                Err(DomainError::not_found(ANIME_NOT_FOUND).into())
            }
        }
    }

    /// Persist a new record; the store assigns its identity.
    pub async fn create(&self, anime: Anime) -> Result<Anime, AnimeError> {
        if let Err(e) = anime.ensure_valid_name(INVALID_NAME) {
            warn!("rejected anime with empty name");
            return Err(e.into());
        }

        let saved = self.store.save(anime.into_new()).await?;
        debug!(id = ?saved.id, "anime created");
        Ok(saved)
    }

    /// Replace the record stored under `id`.
    ///
    /// The path id is authoritative: whatever id the payload carries is replaced by
    /// the id of the record found under `id`.
    pub async fn update(&self, anime: Anime, id: AnimeId) -> Result<(), AnimeError> {
        let found = self.find_by_id(id).await?;
        let anime = anime.with_id(found.id.unwrap_or(id));

        if let Err(e) = anime.ensure_valid_name(INVALID_NAME) {
            warn!(%id, "rejected update with empty name");
            return Err(e.into());
        }

        self.store.save(anime).await?;
        debug!(%id, "anime updated");
        Ok(())
    }

    pub async fn delete(&self, id: AnimeId) -> Result<(), AnimeError> {
        let found = self.find_by_id(id).await?;
        self.store.delete(&found).await?;
        debug!(%id, "anime deleted");
        Ok(())
    }

    /// Persist many records through one bulk store call, validating each persisted
    /// item as it arrives.
    ///
    /// Valid items are emitted in store order. The first invalid item ends the
    /// stream with `ValidationFailed`; items already emitted stay emitted and the
    /// store stream is not polled again. Items the store persisted before the
    /// failure are not rolled back.
    pub fn create_batch(&self, animes: Vec<Anime>) -> AnimeStream<'_> {
        let animes = animes.into_iter().map(Anime::into_new).collect();

        let validated = self
            .store
            .save_all(animes)
            .enumerate()
            .map(|(index, item)| -> Result<Anime, AnimeError> {
                let anime = item?;
                if let Err(e) = anime.ensure_valid_name(INVALID_NAME) {
                    warn!(index, id = ?anime.id, "batch item failed validation");
                    return Err(AnimeError::from(e));
                }
                Ok(anime)
            })
            .boxed();

        halt_after_first_error(validated)
    }
}

/// Pass items through until the first `Err`, emit it, then end without polling
/// `inner` again.
fn halt_after_first_error<'a, T, E>(
    inner: BoxStream<'a, Result<T, E>>,
) -> BoxStream<'a, Result<T, E>>
where
    T: Send + 'a,
    E: Send + 'a,
{
    stream::unfold(Some(inner), |state| async move {
        let mut inner = state?;
        let item = inner.next().await?;
        let next = if item.is_ok() { Some(inner) } else { None };
        Some((item, next))
    })
    .boxed()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Write {
        Save(Anime),
        Delete(AnimeId),
    }

    /// Store double: keeps records in id order, logs every write, and can replay a
    /// scripted `save_all` reply while counting how many items were pulled from it.
    #[derive(Default)]
    struct ScriptedStore {
        records: Mutex<BTreeMap<AnimeId, Anime>>,
        next_id: AtomicI32,
        writes: Mutex<Vec<Write>>,
        save_all_reply: Mutex<Option<Vec<Result<Anime, StoreError>>>>,
        pulled: AtomicUsize,
    }

    impl ScriptedStore {
        fn with(records: Vec<Anime>) -> Arc<Self> {
            let store = Self::default();
            let mut max = 0;
            {
                let mut map = store.records.lock().unwrap();
                for anime in records {
                    let id = anime.id.unwrap();
                    max = max.max(id.get());
                    map.insert(id, anime);
                }
            }
            store.next_id.store(max, Ordering::SeqCst);
            Arc::new(store)
        }

        fn script_save_all(&self, reply: Vec<Result<Anime, StoreError>>) {
            *self.save_all_reply.lock().unwrap() = Some(reply);
        }

        fn writes(&self) -> Vec<Write> {
            self.writes.lock().unwrap().clone()
        }

        fn get(&self, id: i32) -> Option<Anime> {
            self.records.lock().unwrap().get(&AnimeId::new(id)).cloned()
        }

        fn persist(&self, anime: Anime) -> Anime {
            let anime = if anime.is_new() {
                let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
                anime.with_id(AnimeId::new(id))
            } else {
                anime
            };
            self.writes.lock().unwrap().push(Write::Save(anime.clone()));
            self.records
                .lock()
                .unwrap()
                .insert(anime.id.unwrap(), anime.clone());
            anime
        }
    }

    #[async_trait]
    impl AnimeStore for ScriptedStore {
        fn find_all(&self) -> BoxStream<'_, Result<Anime, StoreError>> {
            let all: Vec<_> = self
                .records
                .lock()
                .unwrap()
                .values()
                .cloned()
                .map(Ok::<_, StoreError>)
                .collect();
            stream::iter(all).boxed()
        }

        async fn find_by_id(&self, id: AnimeId) -> Result<Option<Anime>, StoreError> {
            Ok(self.records.lock().unwrap().get(&id).cloned())
        }

        async fn save(&self, anime: Anime) -> Result<Anime, StoreError> {
            Ok(self.persist(anime))
        }

        fn save_all(&self, animes: Vec<Anime>) -> BoxStream<'_, Result<Anime, StoreError>> {
            match self.save_all_reply.lock().unwrap().take() {
                Some(reply) => stream::iter(reply)
                    .inspect(|_| {
                        self.pulled.fetch_add(1, Ordering::SeqCst);
                    })
                    .boxed(),
                None => stream::iter(animes)
                    .map(|a| {
                        self.pulled.fetch_add(1, Ordering::SeqCst);
                        Ok::<_, StoreError>(self.persist(a))
                    })
                    .boxed(),
            }
        }

        async fn delete(&self, anime: &Anime) -> Result<(), StoreError> {
            let id = anime.id.unwrap();
            self.writes.lock().unwrap().push(Write::Delete(id));
            self.records.lock().unwrap().remove(&id);
            Ok(())
        }
    }

    fn service(store: &Arc<ScriptedStore>) -> AnimeService {
        AnimeService::new(store.clone())
    }

    fn is_not_found(err: &AnimeError) -> bool {
        matches!(err, AnimeError::Domain(DomainError::NotFound(msg)) if msg == ANIME_NOT_FOUND)
    }

    fn is_invalid_name(err: &AnimeError) -> bool {
        matches!(err, AnimeError::Domain(DomainError::Validation(msg)) if msg == INVALID_NAME)
    }

    #[tokio::test]
    async fn find_by_id_returns_matching_record() {
        let store = ScriptedStore::with(vec![Anime::persisted(AnimeId::new(1), "X")]);

        let anime = service(&store).find_by_id(AnimeId::new(1)).await.unwrap();

        assert_eq!(anime, Anime::persisted(AnimeId::new(1), "X"));
    }

    #[tokio::test]
    async fn find_by_id_on_empty_store_is_not_found() {
        let store = ScriptedStore::with(vec![]);

        let err = service(&store).find_by_id(AnimeId::new(99)).await.unwrap_err();

        assert!(is_not_found(&err));
        assert_eq!(err.as_domain().unwrap().status_code(), 404);
    }

    #[tokio::test]
    async fn list_all_streams_records_in_store_order() {
        let store = ScriptedStore::with(vec![
            Anime::persisted(AnimeId::new(2), "B"),
            Anime::persisted(AnimeId::new(1), "A"),
        ]);

        let all: Vec<Anime> = service(&store).list_all().try_collect().await.unwrap();

        assert_eq!(
            all,
            vec![
                Anime::persisted(AnimeId::new(1), "A"),
                Anime::persisted(AnimeId::new(2), "B"),
            ]
        );
    }

    #[tokio::test]
    async fn list_all_on_empty_store_completes_empty() {
        let store = ScriptedStore::with(vec![]);
        let all: Vec<Anime> = service(&store).list_all().try_collect().await.unwrap();
        assert!(all.is_empty());
    }

    #[tokio::test]
    async fn create_returns_record_with_assigned_id() {
        let store = ScriptedStore::with(vec![]);

        let saved = service(&store).create(Anime::new("Nome de um anime")).await.unwrap();

        assert_eq!(saved, Anime::persisted(AnimeId::new(1), "Nome de um anime"));
        assert_eq!(store.get(1), Some(saved));
    }

    #[tokio::test]
    async fn create_ignores_client_supplied_id() {
        let store = ScriptedStore::with(vec![Anime::persisted(AnimeId::new(1), "X")]);

        let saved = service(&store)
            .create(Anime::persisted(AnimeId::new(1), "Y"))
            .await
            .unwrap();

        assert_eq!(saved.id, Some(AnimeId::new(2)));
        assert_eq!(store.get(1).unwrap().name, "X");
    }

    #[tokio::test]
    async fn create_with_empty_name_fails_validation_without_writing() {
        let store = ScriptedStore::with(vec![]);

        let err = service(&store).create(Anime::new("")).await.unwrap_err();

        assert!(is_invalid_name(&err));
        assert_eq!(err.as_domain().unwrap().status_code(), 400);
        assert!(store.writes().is_empty());
    }

    #[tokio::test]
    async fn update_persists_under_path_id_not_body_id() {
        let store = ScriptedStore::with(vec![Anime::persisted(AnimeId::new(1), "X")]);

        service(&store)
            .update(Anime::persisted(AnimeId::new(99), "Y"), AnimeId::new(1))
            .await
            .unwrap();

        assert_eq!(store.get(1), Some(Anime::persisted(AnimeId::new(1), "Y")));
        assert_eq!(store.get(99), None);
        assert_eq!(
            store.writes(),
            vec![Write::Save(Anime::persisted(AnimeId::new(1), "Y"))]
        );
    }

    #[tokio::test]
    async fn update_of_missing_id_is_not_found_before_any_write() {
        let store = ScriptedStore::with(vec![]);

        let err = service(&store)
            .update(Anime::new("Y"), AnimeId::new(1))
            .await
            .unwrap_err();

        assert!(is_not_found(&err));
        assert!(store.writes().is_empty());
    }

    #[tokio::test]
    async fn update_with_empty_name_is_rejected() {
        let store = ScriptedStore::with(vec![Anime::persisted(AnimeId::new(1), "X")]);

        let err = service(&store)
            .update(Anime::new(""), AnimeId::new(1))
            .await
            .unwrap_err();

        assert!(is_invalid_name(&err));
        assert_eq!(store.get(1).unwrap().name, "X");
    }

    #[tokio::test]
    async fn delete_removes_existing_record() {
        let store = ScriptedStore::with(vec![Anime::persisted(AnimeId::new(1), "X")]);

        service(&store).delete(AnimeId::new(1)).await.unwrap();

        assert_eq!(store.get(1), None);
        assert_eq!(store.writes(), vec![Write::Delete(AnimeId::new(1))]);
    }

    #[tokio::test]
    async fn delete_of_missing_id_is_not_found_before_any_write() {
        let store = ScriptedStore::with(vec![]);

        let err = service(&store).delete(AnimeId::new(1)).await.unwrap_err();

        assert!(is_not_found(&err));
        assert!(store.writes().is_empty());
    }

    #[tokio::test]
    async fn deleted_identity_stays_gone() {
        let store = ScriptedStore::with(vec![Anime::persisted(AnimeId::new(1), "X")]);
        let svc = service(&store);

        svc.delete(AnimeId::new(1)).await.unwrap();

        assert!(is_not_found(&svc.find_by_id(AnimeId::new(1)).await.unwrap_err()));
        assert!(is_not_found(&svc.delete(AnimeId::new(1)).await.unwrap_err()));
    }

    #[tokio::test]
    async fn create_batch_of_valid_items_yields_all_in_order() {
        let store = ScriptedStore::with(vec![]);

        let saved: Vec<Anime> = service(&store)
            .create_batch(vec![Anime::new("A"), Anime::new("B")])
            .try_collect()
            .await
            .unwrap();

        assert_eq!(
            saved,
            vec![
                Anime::persisted(AnimeId::new(1), "A"),
                Anime::persisted(AnimeId::new(2), "B"),
            ]
        );
    }

    #[tokio::test]
    async fn create_batch_emits_valid_prefix_then_fails_and_stops() {
        let store = ScriptedStore::with(vec![]);
        store.script_save_all(vec![
            Ok(Anime::persisted(AnimeId::new(1), "A")),
            Ok(Anime::persisted(AnimeId::new(2), "")),
            Ok(Anime::persisted(AnimeId::new(3), "C")),
        ]);
        let svc = service(&store);

        let mut batch = svc.create_batch(vec![Anime::new("A"), Anime::new(""), Anime::new("C")]);

        let first = batch.next().await.unwrap().unwrap();
        assert_eq!(first, Anime::persisted(AnimeId::new(1), "A"));

        let second = batch.next().await.unwrap().unwrap_err();
        assert!(is_invalid_name(&second));

        assert!(batch.next().await.is_none());
        assert_eq!(store.pulled.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn create_batch_leaves_already_persisted_items_stored() {
        let store = ScriptedStore::with(vec![]);

        let results: Vec<_> = service(&store)
            .create_batch(vec![Anime::new("A"), Anime::new(""), Anime::new("C")])
            .collect()
            .await;

        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(is_invalid_name(results[1].as_ref().unwrap_err()));
        assert_eq!(store.get(1).unwrap().name, "A");
        assert_eq!(store.get(2).unwrap().name, "");
        assert_eq!(store.get(3), None);
    }

    #[tokio::test]
    async fn create_batch_passes_store_failures_through() {
        let store = ScriptedStore::with(vec![]);
        store.script_save_all(vec![
            Ok(Anime::persisted(AnimeId::new(1), "A")),
            Err(StoreError::Unavailable("connection reset".into())),
            Ok(Anime::persisted(AnimeId::new(2), "B")),
        ]);
        let svc = service(&store);

        let results: Vec<_> = svc.create_batch(vec![]).collect().await;

        assert_eq!(results.len(), 2);
        assert!(matches!(results[1], Err(AnimeError::Store(StoreError::Unavailable(_)))));
        assert!(results[1].as_ref().unwrap_err().as_domain().is_none());
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn block_on<F: std::future::Future>(f: F) -> F::Output {
            tokio::runtime::Builder::new_current_thread()
                .build()
                .unwrap()
                .block_on(f)
        }

        proptest! {
            /// Property: every stored id is found, every other id is `NotFound`.
            #[test]
            fn find_by_id_matches_store_contents(
                ids in proptest::collection::btree_set(1i32..500, 0..20),
                probe in 1i32..500,
            ) {
                let records = ids
                    .iter()
                    .map(|id| Anime::persisted(AnimeId::new(*id), format!("anime-{id}")))
                    .collect();
                let store = ScriptedStore::with(records);
                let svc = service(&store);

                let result = block_on(svc.find_by_id(AnimeId::new(probe)));

                if ids.contains(&probe) {
                    let found = result.unwrap();
                    prop_assert_eq!(found.id, Some(AnimeId::new(probe)));
                    prop_assert_eq!(found.name, format!("anime-{probe}"));
                } else {
                    prop_assert!(is_not_found(&result.unwrap_err()));
                }
            }
        }
    }
}
