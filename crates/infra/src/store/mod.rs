//! Storage adapters for the catalog's `AnimeStore` port.

pub mod in_memory;

pub use in_memory::InMemoryAnimeStore;
