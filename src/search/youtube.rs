//! YouTube video search, keyed by API key.

use reqwest::Client;
use serde_json::Value;
use tracing::error;

use crate::error::{MixtapeError, Result};
use crate::models::{MusicService, Track};

const SEARCH_URL: &str = "https://www.googleapis.com/youtube/v3/search";

/// YouTube search client. The channel title stands in for the artist.
pub struct YouTubeSearch {
    client: Client,
    api_key: String,
}

impl YouTubeSearch {
    pub fn new<S: Into<String>>(client: Client, api_key: S) -> Self {
        Self {
            client,
            api_key: api_key.into(),
        }
    }

    pub async fn search(&self, query: &str) -> Result<Vec<Track>> {
        let limit = MusicService::YouTube.result_limit().to_string();
        let response = self
            .client
            .get(SEARCH_URL)
            .query(&[
                ("q", query),
                ("part", "snippet"),
                ("type", "video"),
                ("maxResults", &limit),
                ("key", &self.api_key),
            ])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            error!("YouTube search returned {}", status);
            return Err(MixtapeError::Upstream(format!(
                "YouTube search failed ({})",
                status
            )));
        }

        let data: Value = response.json().await?;
        parse_tracks(&data)
    }
}

fn parse_tracks(data: &Value) -> Result<Vec<Track>> {
    let items = data
        .get("items")
        .and_then(|i| i.as_array())
        .ok_or_else(|| {
            MixtapeError::Upstream("YouTube search response was malformed".to_string())
        })?;

    let mut tracks = Vec::new();
    for item in items {
        let video_id = item
            .get("id")
            .and_then(|id| id.get("videoId"))
            .and_then(|v| v.as_str())
            .unwrap_or("");
        if video_id.is_empty() {
            continue;
        }
        let snippet = item.get("snippet").cloned().unwrap_or(Value::Null);
        let title = snippet.get("title").and_then(|v| v.as_str()).unwrap_or("");
        let channel = snippet
            .get("channelTitle")
            .and_then(|v| v.as_str())
            .unwrap_or("");
        let thumbnail = snippet
            .get("thumbnails")
            .and_then(|t| t.get("high"))
            .and_then(|h| h.get("url"))
            .and_then(|u| u.as_str())
            .unwrap_or("");

        tracks.push(Track::new(
            title,
            channel,
            thumbnail,
            video_id,
            MusicService::YouTube,
        ));
    }
    Ok(tracks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_tracks() {
        let data = json!({
            "items": [
                {
                    "id": { "videoId": "dQw4w9WgXcQ" },
                    "snippet": {
                        "title": "Official Video",
                        "channelTitle": "RickAstleyVEVO",
                        "thumbnails": { "high": { "url": "https://img.example/t.jpg" } }
                    }
                },
                // channel results carry no videoId and are skipped
                { "id": { "channelId": "UC123" }, "snippet": { "title": "x" } }
            ]
        });

        let tracks = parse_tracks(&data).unwrap();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].id, "youtube-dQw4w9WgXcQ");
        assert_eq!(tracks[0].artist, "RickAstleyVEVO");
        assert_eq!(tracks[0].service, MusicService::YouTube);
    }

    #[test]
    fn test_parse_tracks_rejects_malformed_payload() {
        assert!(parse_tracks(&json!({})).is_err());
    }
}
