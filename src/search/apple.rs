//! Apple Music catalog search, authenticated with a developer token.

use reqwest::Client;
use serde_json::Value;
use tracing::error;

use crate::error::{MixtapeError, Result};
use crate::models::{MusicService, Track};

const SEARCH_URL: &str = "https://api.music.apple.com/v1/catalog/us/search";

/// Artwork size substituted into the `{w}`/`{h}` URL template.
const ARTWORK_SIZE: &str = "300";

/// Apple Music search client.
pub struct AppleMusicSearch {
    client: Client,
    developer_token: String,
}

impl AppleMusicSearch {
    pub fn new<S: Into<String>>(client: Client, developer_token: S) -> Self {
        Self {
            client,
            developer_token: developer_token.into(),
        }
    }

    pub async fn search(&self, query: &str) -> Result<Vec<Track>> {
        let limit = MusicService::AppleMusic.result_limit().to_string();
        let response = self
            .client
            .get(SEARCH_URL)
            .bearer_auth(&self.developer_token)
            .query(&[("term", query), ("types", "songs"), ("limit", &limit)])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            error!("Apple Music search returned {}", status);
            return Err(MixtapeError::Upstream(format!(
                "Apple Music search failed ({})",
                status
            )));
        }

        let data: Value = response.json().await?;
        parse_tracks(&data)
    }
}

fn parse_tracks(data: &Value) -> Result<Vec<Track>> {
    let songs = data
        .get("results")
        .and_then(|r| r.get("songs"))
        .and_then(|s| s.get("data"))
        .and_then(|d| d.as_array())
        .ok_or_else(|| {
            MixtapeError::Upstream("Apple Music search response was malformed".to_string())
        })?;

    let mut tracks = Vec::new();
    for song in songs {
        let id = song.get("id").and_then(|v| v.as_str()).unwrap_or("");
        if id.is_empty() {
            continue;
        }
        let attributes = song.get("attributes").cloned().unwrap_or(Value::Null);
        let title = attributes
            .get("name")
            .and_then(|v| v.as_str())
            .unwrap_or("");
        let artist = attributes
            .get("artistName")
            .and_then(|v| v.as_str())
            .unwrap_or("");
        let artwork = attributes
            .get("artwork")
            .and_then(|a| a.get("url"))
            .and_then(|u| u.as_str())
            .map(|url| url.replace("{w}", ARTWORK_SIZE).replace("{h}", ARTWORK_SIZE))
            .unwrap_or_default();

        tracks.push(Track::new(title, artist, artwork, id, MusicService::AppleMusic));
    }
    Ok(tracks)
}
