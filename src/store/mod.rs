//! Durable key-value storage for serialized blobs.
//!
//! The repository only needs `get`/`set`/`remove` on string values, so the
//! storage backend is a trait: [`SqliteStore`] for the app, [`MemoryStore`]
//! as a test double with failure injection.

use std::future::Future;

use anyhow::Result;

mod memory;
mod migrations;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

pub trait KeyValueStore: Send + Sync + 'static {
    /// `Ok(None)` when the key has never been written.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>>> + Send;
    fn set(&self, key: &str, value: String) -> impl Future<Output = Result<()>> + Send;
    fn remove(&self, key: &str) -> impl Future<Output = Result<()>> + Send;
}
