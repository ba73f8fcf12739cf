//! In-memory mixtape store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::{MixtapeError, Result};
use crate::models::{Mixtape, MixtapeUpdate};
use crate::store::MixtapeStore;

/// Map-backed store. Cheap to clone into handler state via `Arc`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, Mixtape>>,
    next_id: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored mixtapes.
    pub fn len(&self) -> usize {
        self.records.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl MixtapeStore for MemoryStore {
    async fn get(&self, id: &str) -> Result<Option<Mixtape>> {
        Ok(self.records.read().unwrap().get(id).cloned())
    }

    async fn list_by_owner(&self, user_id: &str) -> Result<Vec<Mixtape>> {
        Ok(self
            .records
            .read()
            .unwrap()
            .values()
            .filter(|m| m.created_by == user_id)
            .cloned()
            .collect())
    }

    async fn list_public(&self) -> Result<Vec<Mixtape>> {
        Ok(self
            .records
            .read()
            .unwrap()
            .values()
            .filter(|m| m.is_public)
            .cloned()
            .collect())
    }

    async fn add(&self, mut mixtape: Mixtape) -> Result<String> {
        let id = format!("m{}", self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        mixtape.id = id.clone();
        self.records.write().unwrap().insert(id.clone(), mixtape);
        Ok(id)
    }

    async fn update(&self, id: &str, update: &MixtapeUpdate) -> Result<()> {
        let mut records = self.records.write().unwrap();
        let mixtape = records
            .get_mut(id)
            .ok_or_else(|| MixtapeError::NotFound(id.to_string()))?;
        update.apply_to(mixtape);
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.records
            .write()
            .unwrap()
            .remove(id)
            .ok_or_else(|| MixtapeError::NotFound(id.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MusicService, NewMixtape, Track};

    fn draft(title: &str, owner: &str, public: bool) -> Mixtape {
        NewMixtape {
            title: title.to_string(),
            tracks: vec![Track::new("t", "a", "", "1", MusicService::Spotify)],
            is_public: public,
            ..Default::default()
        }
        .into_mixtape(owner, 0)
    }

    #[tokio::test]
    async fn test_add_assigns_id_and_get_round_trips() {
        let store = MemoryStore::new();
        let id = store.add(draft("A", "u1", false)).await.unwrap();
        let fetched = store.get(&id).await.unwrap().unwrap();
        assert_eq!(fetched.id, id);
        assert_eq!(fetched.title, "A");
        assert!(store.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_filters() {
        let store = MemoryStore::new();
        store.add(draft("A", "u1", false)).await.unwrap();
        store.add(draft("B", "u1", true)).await.unwrap();
        store.add(draft("C", "u2", true)).await.unwrap();

        assert_eq!(store.list_by_owner("u1").await.unwrap().len(), 2);
        assert_eq!(store.list_by_owner("u3").await.unwrap().len(), 0);
        assert_eq!(store.list_public().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_update_merges_and_delete_removes() {
        let store = MemoryStore::new();
        let id = store.add(draft("A", "u1", false)).await.unwrap();

        let update = MixtapeUpdate {
            note: Some("hello".to_string()),
            ..Default::default()
        };
        store.update(&id, &update).await.unwrap();
        let fetched = store.get(&id).await.unwrap().unwrap();
        assert_eq!(fetched.note, "hello");
        assert_eq!(fetched.title, "A");

        store.delete(&id).await.unwrap();
        assert!(store.get(&id).await.unwrap().is_none());
        assert!(matches!(
            store.delete(&id).await,
            Err(MixtapeError::NotFound(_))
        ));
    }
}
