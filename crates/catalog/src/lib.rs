//! Anime catalog domain module.
//!
//! Business rules for anime records: the storage port the rules run against and the
//! service that enforces existence checks and batch validation. No HTTP, no
//! authorization, no concrete storage.

pub mod anime;
pub mod service;
pub mod store;

pub use anime::Anime;
pub use service::{AnimeError, AnimeService, AnimeStream, ANIME_NOT_FOUND, INVALID_NAME};
pub use store::{AnimeStore, StoreError};
