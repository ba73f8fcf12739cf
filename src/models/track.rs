//! Track models and the music service tag.
//!
//! A [`Track`] is an immutable value object once added to a mixtape;
//! only its membership in a mixtape's track sequence changes.

use serde::{Deserialize, Serialize};

/// The music service a track was found on.
///
/// Closed set: search requests naming anything else are rejected at the
/// gateway boundary instead of being passed through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MusicService {
    /// Spotify catalog search (client-credentials flow).
    #[serde(rename = "spotify")]
    Spotify,
    /// YouTube video search (API key).
    #[serde(rename = "youtube")]
    YouTube,
    /// Apple Music catalog search (developer token).
    #[serde(rename = "applemusic")]
    AppleMusic,
}

impl MusicService {
    /// Wire name used in query strings and track ids.
    pub fn as_str(&self) -> &'static str {
        match self {
            MusicService::Spotify => "spotify",
            MusicService::YouTube => "youtube",
            MusicService::AppleMusic => "applemusic",
        }
    }

    /// Parse a wire name. Returns `None` for anything outside the fixed set.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "spotify" => Some(MusicService::Spotify),
            "youtube" => Some(MusicService::YouTube),
            "applemusic" => Some(MusicService::AppleMusic),
            _ => None,
        }
    }

    /// Maximum number of search results returned for this service.
    pub fn result_limit(&self) -> u32 {
        match self {
            MusicService::Spotify => 20,
            MusicService::YouTube | MusicService::AppleMusic => 10,
        }
    }
}

impl Default for MusicService {
    fn default() -> Self {
        MusicService::Spotify
    }
}

/// A normalized track descriptor.
///
/// The same shape is returned by the lookup gateway and stored inside a
/// mixtape's track list.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    /// Composite id, `{service}-{serviceId}`.
    pub id: String,

    /// Track title.
    pub title: String,

    /// Artist name(s), joined with ", " when the source lists several.
    pub artist: String,

    /// Cover art or thumbnail URL. Empty string when the source has none.
    #[serde(default)]
    pub image_url: String,

    /// Identifier within the source service.
    pub service_id: String,

    /// Which service this track came from.
    pub service: MusicService,
}

impl Track {
    /// Build a track from normalized fields, deriving the composite id.
    pub fn new<S1, S2, S3, S4>(
        title: S1,
        artist: S2,
        image_url: S3,
        service_id: S4,
        service: MusicService,
    ) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
        S3: Into<String>,
        S4: Into<String>,
    {
        let service_id = service_id.into();
        Self {
            id: format!("{}-{}", service.as_str(), service_id),
            title: title.into(),
            artist: artist.into(),
            image_url: image_url.into(),
            service_id,
            service,
        }
    }
}
