//! Identity verification.
//!
//! [`IdentityVerifier`] is the seam between request handling and the
//! external identity provider: a bearer credential goes in, a stable user
//! id comes out. [`FirebaseVerifier`] is the production implementation.

pub mod firebase;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{ProfileUpdate, UserProfile};

/// Verifies bearer credentials and answers profile lookups.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Validate a credential and return the user id it belongs to.
    ///
    /// Fails with `Authentication` on an invalid or expired credential.
    async fn verify(&self, credential: &str) -> Result<String>;

    /// Fetch a user's profile by id.
    async fn get_user(&self, uid: &str) -> Result<UserProfile>;

    /// Apply profile changes for a user.
    async fn update_profile(&self, uid: &str, update: &ProfileUpdate) -> Result<()>;
}

pub use firebase::FirebaseVerifier;
