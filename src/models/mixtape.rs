//! Mixtape models.
//!
//! Three shapes cover the record lifecycle: [`Mixtape`] is the stored
//! document, [`NewMixtape`] the creation payload, and [`MixtapeUpdate`] a
//! partial update where omitted fields stay untouched.

use serde::{Deserialize, Serialize};

use crate::error::{MixtapeError, Result};
use crate::models::track::Track;

/// A stored mixtape document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Mixtape {
    /// Store-generated identifier.
    pub id: String,

    /// Mixtape title. Non-empty.
    pub title: String,

    /// Free-text description.
    #[serde(default)]
    pub description: String,

    /// Cover image URL.
    #[serde(default)]
    pub cover_image: String,

    /// Ordered track list. Insertion order is significant.
    pub tracks: Vec<Track>,

    /// Free-text liner note.
    #[serde(default)]
    pub note: String,

    /// Owner's user id. Set once at creation from the authenticated
    /// requester, never changed afterwards.
    pub created_by: String,

    /// Creation time, unix milliseconds. Immutable.
    pub created_at: u64,

    /// Users granted write access without owning the mixtape.
    #[serde(default)]
    pub collaborators: Vec<String>,

    /// Whether anonymous users may read this mixtape.
    #[serde(default)]
    pub is_public: bool,
}

impl Mixtape {
    /// Whether `user_id` is in the collaborator set.
    pub fn has_collaborator(&self, user_id: &str) -> bool {
        self.collaborators.iter().any(|c| c == user_id)
    }
}

/// Payload for creating a mixtape.
///
/// `created_by` and `created_at` are not accepted from the caller; the
/// service fills them from the authenticated identity and the current time.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewMixtape {
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub cover_image: String,

    pub tracks: Vec<Track>,

    #[serde(default)]
    pub note: String,

    #[serde(default)]
    pub collaborators: Vec<String>,

    #[serde(default)]
    pub is_public: bool,
}

impl NewMixtape {
    /// Check required fields. Called before any store write.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(MixtapeError::Validation("title is required".to_string()));
        }
        if self.tracks.is_empty() {
            return Err(MixtapeError::Validation(
                "at least one track is required".to_string(),
            ));
        }
        Ok(())
    }

    /// Materialize into a full record for the given owner.
    ///
    /// The id is left empty; the store assigns it on add.
    pub fn into_mixtape(self, created_by: &str, created_at: u64) -> Mixtape {
        Mixtape {
            id: String::new(),
            title: self.title,
            description: self.description,
            cover_image: self.cover_image,
            tracks: self.tracks,
            note: self.note,
            created_by: created_by.to_string(),
            created_at,
            collaborators: self.collaborators,
            is_public: self.is_public,
        }
    }
}

/// Partial update payload. `None` means "leave unchanged".
///
/// There is deliberately no `created_by` or `created_at` field here, so the
/// immutable fields cannot be touched through an update at all.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MixtapeUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracks: Option<Vec<Track>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub collaborators: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
}

impl MixtapeUpdate {
    /// True when every field is `None` (nothing to write).
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.cover_image.is_none()
            && self.tracks.is_none()
            && self.note.is_none()
            && self.collaborators.is_none()
            && self.is_public.is_none()
    }

    /// Merge this update into a record, field by field.
    ///
    /// Last-write-wins; there is no concurrency check (documented store
    /// limitation).
    pub fn apply_to(&self, mixtape: &mut Mixtape) {
        if let Some(title) = &self.title {
            mixtape.title = title.clone();
        }
        if let Some(description) = &self.description {
            mixtape.description = description.clone();
        }
        if let Some(cover_image) = &self.cover_image {
            mixtape.cover_image = cover_image.clone();
        }
        if let Some(tracks) = &self.tracks {
            mixtape.tracks = tracks.clone();
        }
        if let Some(note) = &self.note {
            mixtape.note = note.clone();
        }
        if let Some(collaborators) = &self.collaborators {
            mixtape.collaborators = collaborators.clone();
        }
        if let Some(is_public) = self.is_public {
            mixtape.is_public = is_public;
        }
    }
}
