//! Infrastructure layer: storage adapters, config, runtime guards.

pub mod blocking;
pub mod config;
pub mod store;
