//! Access policy for mixtape reads and mutations.
//!
//! Pure functions over a `(mixtape, requester)` pair; no I/O. Every mutating
//! service operation consults these before issuing a store write, and skips
//! the write entirely on denial.
//!
//! The rules:
//! - read: public mixtapes are visible to anyone; private ones only to the
//!   owner and collaborators
//! - write: owner and collaborators, never anonymous requesters
//! - delete: owner only
//! - collaborators may only touch content fields (tracks, note, description,
//!   cover image); title, visibility, and the collaborator set stay under the
//!   owner's control

use crate::models::{Mixtape, MixtapeUpdate};

/// Whether `requester` may read `mixtape`.
///
/// `None` is an anonymous requester.
pub fn can_read(mixtape: &Mixtape, requester: Option<&str>) -> bool {
    if mixtape.is_public {
        return true;
    }
    match requester {
        Some(uid) => mixtape.created_by == uid || mixtape.has_collaborator(uid),
        None => false,
    }
}

/// Whether `requester` may mutate `mixtape`. Anonymous requesters never can.
pub fn can_write(mixtape: &Mixtape, requester: Option<&str>) -> bool {
    match requester {
        Some(uid) => mixtape.created_by == uid || mixtape.has_collaborator(uid),
        None => false,
    }
}

/// Whether `requester` may delete `mixtape`. Owner only.
pub fn can_delete(mixtape: &Mixtape, requester: Option<&str>) -> bool {
    matches!(requester, Some(uid) if mixtape.created_by == uid)
}

/// Restrict an update to the fields `requester` may change.
///
/// The owner's update passes through unchanged. A collaborator's update has
/// `title`, `is_public`, and `collaborators` stripped; the immutable
/// `created_by`/`created_at` fields are not representable in
/// [`MixtapeUpdate`] to begin with.
pub fn filter_update(mixtape: &Mixtape, requester: &str, mut update: MixtapeUpdate) -> MixtapeUpdate {
    if mixtape.created_by != requester {
        update.title = None;
        update.is_public = None;
        update.collaborators = None;
    }
    update
}
