//! Data models for mixtapes, tracks, and user profiles.

pub mod mixtape;
pub mod track;
pub mod user;

// Re-exports for convenience
pub use mixtape::{Mixtape, MixtapeUpdate, NewMixtape};
pub use track::{MusicService, Track};
pub use user::{ProfileUpdate, UserProfile};
