//! Spotify track search.
//!
//! Uses the OAuth client-credentials flow: the service authenticates itself
//! (not an end user) and caches the short-lived access token in a
//! [`TokenCache`] shared by all concurrent searches.

use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error};

use crate::error::{MixtapeError, Result};
use crate::models::{MusicService, Track};
use crate::search::token::{Clock, TokenCache};

/// Token endpoint for the client-credentials flow.
const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// Catalog search endpoint.
const SEARCH_URL: &str = "https://api.spotify.com/v1/search";

/// Spotify search client.
pub struct SpotifySearch {
    client: Client,
    client_id: String,
    client_secret: String,
    cache: TokenCache,
    clock: Arc<dyn Clock>,
}

impl SpotifySearch {
    pub fn new<S1: Into<String>, S2: Into<String>>(
        client: Client,
        client_id: S1,
        client_secret: S2,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            client,
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            cache: TokenCache::new(),
            clock,
        }
    }

    /// Return a usable access token, fetching a fresh one when the cached
    /// token is absent or expired.
    async fn access_token(&self) -> Result<String> {
        if let Some(token) = self.cache.get(self.clock.now_millis()) {
            return Ok(token);
        }

        debug!("Fetching new Spotify client-credentials token");
        let response = self
            .client
            .post(TOKEN_URL)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            error!("Spotify token endpoint returned {}", status);
            return Err(MixtapeError::Upstream(format!(
                "Spotify token request failed ({})",
                status
            )));
        }

        let data: Value = response.json().await?;
        let token = data
            .get("access_token")
            .and_then(|t| t.as_str())
            .ok_or_else(|| {
                MixtapeError::Upstream("Spotify token response had no access_token".to_string())
            })?;
        let expires_in = data
            .get("expires_in")
            .and_then(|e| e.as_u64())
            .unwrap_or(0);

        self.cache
            .store(token, expires_in, self.clock.now_millis());
        Ok(token.to_string())
    }

    /// Search the catalog for tracks matching `query`.
    pub async fn search(&self, query: &str) -> Result<Vec<Track>> {
        let token = self.access_token().await?;
        let limit = MusicService::Spotify.result_limit().to_string();

        let response = self
            .client
            .get(SEARCH_URL)
            .bearer_auth(token)
            .query(&[("q", query), ("type", "track"), ("limit", &limit)])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            error!("Spotify search returned {}", status);
            return Err(MixtapeError::Upstream(format!(
                "Spotify search failed ({})",
                status
            )));
        }

        let data: Value = response.json().await?;
        parse_tracks(&data)
    }
}

/// Normalize a Spotify search payload into tracks.
fn parse_tracks(data: &Value) -> Result<Vec<Track>> {
    let items = data
        .get("tracks")
        .and_then(|t| t.get("items"))
        .and_then(|i| i.as_array())
        .ok_or_else(|| {
            MixtapeError::Upstream("Spotify search response was malformed".to_string())
        })?;

    let mut tracks = Vec::new();
    for item in items {
        let id = item.get("id").and_then(|v| v.as_str()).unwrap_or("");
        if id.is_empty() {
            continue;
        }
        let title = item.get("name").and_then(|v| v.as_str()).unwrap_or("");
        let artist = item
            .get("artists")
            .and_then(|a| a.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|a| a.get("name").and_then(|n| n.as_str()))
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .unwrap_or_default();
        let image_url = item
            .get("album")
            .and_then(|a| a.get("images"))
            .and_then(|i| i.as_array())
            .and_then(|arr| arr.first())
            .and_then(|img| img.get("url"))
            .and_then(|u| u.as_str())
            .unwrap_or("");

        tracks.push(Track::new(title, artist, image_url, id, MusicService::Spotify));
    }
    Ok(tracks)
}
