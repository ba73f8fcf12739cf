//! Mixtape persistence.
//!
//! [`MixtapeStore`] is the narrow contract the rest of the crate is written
//! against. Two implementations:
//! - [`MemoryStore`]: in-process map, used by tests and as a dev backend
//! - [`FirestoreStore`]: Firestore REST documents API

pub mod firestore;
pub mod memory;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Mixtape, MixtapeUpdate};

/// Document-store contract for mixtapes.
///
/// Updates are partial-field merges with last-write-wins semantics; there is
/// no optimistic-concurrency check, so concurrent updates to the same record
/// can overwrite each other (documented limitation).
#[async_trait]
pub trait MixtapeStore: Send + Sync {
    /// Fetch a mixtape by id, `None` when it does not exist.
    async fn get(&self, id: &str) -> Result<Option<Mixtape>>;

    /// All mixtapes owned by `user_id`.
    async fn list_by_owner(&self, user_id: &str) -> Result<Vec<Mixtape>>;

    /// All mixtapes with the public flag set.
    async fn list_public(&self) -> Result<Vec<Mixtape>>;

    /// Store a new record, returning the generated id. The `id` field of
    /// the passed record is ignored.
    async fn add(&self, mixtape: Mixtape) -> Result<String>;

    /// Merge the set fields of `update` into the record. The caller has
    /// already established the record exists and the write is permitted.
    async fn update(&self, id: &str, update: &MixtapeUpdate) -> Result<()>;

    /// Remove a record.
    async fn delete(&self, id: &str) -> Result<()>;
}

pub use firestore::{AccessTokenProvider, FirestoreStore, StaticTokenProvider};
pub use memory::MemoryStore;
