//! Mixtape operations: validation, access policy, then the store.
//!
//! Every mutating operation runs the policy check before touching the
//! store, and skips the store call entirely on denial — there are no
//! partial writes.

use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{MixtapeError, Result};
use crate::models::{Mixtape, MixtapeUpdate, NewMixtape};
use crate::policy;
use crate::search::token::Clock;
use crate::store::MixtapeStore;

/// High-level mixtape operations over a store.
pub struct MixtapeService {
    store: Arc<dyn MixtapeStore>,
    clock: Arc<dyn Clock>,
}

impl MixtapeService {
    pub fn new(store: Arc<dyn MixtapeStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// List mixtapes visible on the home view: an authenticated user sees
    /// their own mixtapes, an anonymous requester sees public ones.
    pub async fn list(&self, requester: Option<&str>) -> Result<Vec<Mixtape>> {
        match requester {
            Some(uid) => self.store.list_by_owner(uid).await,
            None => self.store.list_public().await,
        }
    }

    /// Fetch one mixtape, subject to the read policy.
    ///
    /// A mixtape that exists but is not visible to this requester is an
    /// `Authorization` error, not `NotFound`.
    pub async fn get(&self, id: &str, requester: Option<&str>) -> Result<Mixtape> {
        let mixtape = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| MixtapeError::NotFound(id.to_string()))?;

        if !policy::can_read(&mixtape, requester) {
            debug!("Read of {} denied for {:?}", id, requester);
            return Err(MixtapeError::Authorization(
                "you do not have access to this mixtape".to_string(),
            ));
        }
        Ok(mixtape)
    }

    /// Create a mixtape owned by `requester`. Validation runs before any
    /// store write.
    pub async fn create(&self, requester: &str, draft: NewMixtape) -> Result<Mixtape> {
        draft.validate()?;

        let mut mixtape = draft.into_mixtape(requester, self.clock.now_millis());
        let id = self.store.add(mixtape.clone()).await?;
        mixtape.id = id;

        info!("Mixtape {} created by {}", mixtape.id, requester);
        Ok(mixtape)
    }

    /// Apply a partial update, filtered down to the fields `requester` may
    /// change.
    pub async fn update(&self, id: &str, requester: &str, update: MixtapeUpdate) -> Result<()> {
        let mixtape = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| MixtapeError::NotFound(id.to_string()))?;

        if !policy::can_write(&mixtape, Some(requester)) {
            return Err(MixtapeError::Authorization(
                "you do not have permission to update this mixtape".to_string(),
            ));
        }

        let filtered = policy::filter_update(&mixtape, requester, update);
        if filtered.is_empty() {
            // Everything the requester sent was owner-only; nothing to write.
            return Ok(());
        }
        self.store.update(id, &filtered).await
    }

    /// Delete a mixtape. Owner only.
    pub async fn delete(&self, id: &str, requester: &str) -> Result<()> {
        let mixtape = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| MixtapeError::NotFound(id.to_string()))?;

        if !policy::can_delete(&mixtape, Some(requester)) {
            return Err(MixtapeError::Authorization(
                "you do not have permission to delete this mixtape".to_string(),
            ));
        }

        self.store.delete(id).await?;
        info!("Mixtape {} deleted by {}", id, requester);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MusicService, Track};
    use crate::store::MemoryStore;

    struct FixedClock(u64);

    impl Clock for FixedClock {
        fn now_millis(&self) -> u64 {
            self.0
        }
    }

    fn service() -> (MixtapeService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let service = MixtapeService::new(store.clone(), Arc::new(FixedClock(1_700_000_000_000)));
        (service, store)
    }

    fn draft(title: &str) -> NewMixtape {
        NewMixtape {
            title: title.to_string(),
            tracks: vec![Track::new("t", "a", "", "1", MusicService::Spotify)],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_stamps_owner_and_time() {
        let (service, _) = service();
        let mixtape = service.create("u1", draft("Mix")).await.unwrap();
        assert_eq!(mixtape.created_by, "u1");
        assert_eq!(mixtape.created_at, 1_700_000_000_000);
        assert!(!mixtape.id.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_draft_never_reaches_store() {
        let (service, store) = service();
        let mut bad = draft("");
        assert!(service.create("u1", bad.clone()).await.is_err());
        bad.title = "ok".to_string();
        bad.tracks.clear();
        assert!(service.create("u1", bad).await.is_err());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_get_distinguishes_missing_from_denied() {
        let (service, _) = service();
        let mixtape = service.create("u1", draft("Private")).await.unwrap();

        assert!(matches!(
            service.get("nope", Some("u1")).await,
            Err(MixtapeError::NotFound(_))
        ));
        assert!(matches!(
            service.get(&mixtape.id, Some("u3")).await,
            Err(MixtapeError::Authorization(_))
        ));
        assert!(matches!(
            service.get(&mixtape.id, None).await,
            Err(MixtapeError::Authorization(_))
        ));
        assert_eq!(
            service.get(&mixtape.id, Some("u1")).await.unwrap().id,
            mixtape.id
        );
    }

    #[tokio::test]
    async fn test_collaborator_update_is_filtered() {
        let (service, store) = service();
        let mut payload = draft("Shared");
        payload.collaborators = vec!["u2".to_string()];
        let mixtape = service.create("u1", payload).await.unwrap();

        let update = MixtapeUpdate {
            title: Some("Hijacked".to_string()),
            is_public: Some(true),
            note: Some("collab note".to_string()),
            ..Default::default()
        };
        service.update(&mixtape.id, "u2", update).await.unwrap();

        let stored = store.get(&mixtape.id).await.unwrap().unwrap();
        assert_eq!(stored.title, "Shared");
        assert!(!stored.is_public);
        assert_eq!(stored.note, "collab note");
    }

    #[tokio::test]
    async fn test_outsider_update_never_hits_store() {
        let (service, store) = service();
        let mixtape = service.create("u1", draft("Mine")).await.unwrap();

        let update = MixtapeUpdate {
            note: Some("graffiti".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            service.update(&mixtape.id, "u3", update).await,
            Err(MixtapeError::Authorization(_))
        ));
        let stored = store.get(&mixtape.id).await.unwrap().unwrap();
        assert_eq!(stored.note, "");
    }

    #[tokio::test]
    async fn test_delete_is_owner_only() {
        let (service, store) = service();
        let mut payload = draft("Mine");
        payload.collaborators = vec!["u2".to_string()];
        let mixtape = service.create("u1", payload).await.unwrap();

        assert!(matches!(
            service.delete(&mixtape.id, "u2").await,
            Err(MixtapeError::Authorization(_))
        ));
        assert_eq!(store.len(), 1);

        service.delete(&mixtape.id, "u1").await.unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_list_scopes_by_requester() {
        let (service, _) = service();
        service.create("u1", draft("A")).await.unwrap();
        let mut public = draft("B");
        public.is_public = true;
        service.create("u2", public).await.unwrap();

        assert_eq!(service.list(Some("u1")).await.unwrap().len(), 1);
        assert_eq!(service.list(Some("u3")).await.unwrap().len(), 0);
        let anonymous = service.list(None).await.unwrap();
        assert_eq!(anonymous.len(), 1);
        assert_eq!(anonymous[0].title, "B");
    }
}
