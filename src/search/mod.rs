//! Music lookup gateway.
//!
//! Translates a free-text query plus a service selector into normalized
//! [`Track`] descriptors. Pure pass-through to the external search APIs;
//! the only state is the Spotify client-credentials token cache.

pub mod apple;
pub mod spotify;
pub mod token;
pub mod youtube;

use reqwest::Client;
use std::sync::Arc;
use tracing::info;

use crate::error::{MixtapeError, Result};
use crate::models::{MusicService, Track};

pub use apple::AppleMusicSearch;
pub use spotify::SpotifySearch;
pub use token::{Clock, SystemClock, TokenCache, SAFETY_MARGIN_SECS};
pub use youtube::YouTubeSearch;

/// Credentials for the upstream search services. Any of them may be absent;
/// searching an unconfigured service fails with an upstream error.
#[derive(Debug, Clone, Default)]
pub struct SearchConfig {
    pub spotify_client_id: Option<String>,
    pub spotify_client_secret: Option<String>,
    pub youtube_api_key: Option<String>,
    pub apple_music_token: Option<String>,
}

/// Facade over the per-service search clients.
pub struct SearchGateway {
    spotify: Option<SpotifySearch>,
    youtube: Option<YouTubeSearch>,
    apple: Option<AppleMusicSearch>,
}

impl SearchGateway {
    /// Build clients for every configured service.
    pub fn new(client: Client, config: SearchConfig, clock: Arc<dyn Clock>) -> Self {
        let spotify = match (&config.spotify_client_id, &config.spotify_client_secret) {
            (Some(id), Some(secret)) => Some(SpotifySearch::new(
                client.clone(),
                id,
                secret,
                clock,
            )),
            _ => None,
        };
        let youtube = config
            .youtube_api_key
            .as_ref()
            .map(|key| YouTubeSearch::new(client.clone(), key));
        let apple = config
            .apple_music_token
            .as_ref()
            .map(|token| AppleMusicSearch::new(client, token));

        info!(
            "Search gateway ready (spotify: {}, youtube: {}, applemusic: {})",
            spotify.is_some(),
            youtube.is_some(),
            apple.is_some()
        );

        Self {
            spotify,
            youtube,
            apple,
        }
    }

    /// Search one service. Results are capped per service, no pagination.
    pub async fn search(&self, query: &str, service: MusicService) -> Result<Vec<Track>> {
        match service {
            MusicService::Spotify => {
                let client = self.spotify.as_ref().ok_or_else(|| {
                    MixtapeError::Upstream("Spotify credentials not configured".to_string())
                })?;
                client.search(query).await
            }
            MusicService::YouTube => {
                let client = self.youtube.as_ref().ok_or_else(|| {
                    MixtapeError::Upstream("YouTube API key not configured".to_string())
                })?;
                client.search(query).await
            }
            MusicService::AppleMusic => {
                let client = self.apple.as_ref().ok_or_else(|| {
                    MixtapeError::Upstream("Apple Music token not configured".to_string())
                })?;
                client.search(query).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_service_is_an_upstream_error() {
        let gateway = SearchGateway::new(
            Client::new(),
            SearchConfig::default(),
            Arc::new(SystemClock),
        );
        for service in [
            MusicService::Spotify,
            MusicService::YouTube,
            MusicService::AppleMusic,
        ] {
            assert!(matches!(
                gateway.search("query", service).await,
                Err(MixtapeError::Upstream(_))
            ));
        }
    }
}
