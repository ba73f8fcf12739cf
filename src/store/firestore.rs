//! Firestore-backed mixtape store.
//!
//! Talks to the Firestore REST documents API. Documents use Firestore's
//! typed-value JSON (`stringValue`, `booleanValue`, ...), so records are
//! encoded and decoded explicitly here rather than with serde derives.
//!
//! Credential issuance is out of scope for this crate: the store asks an
//! injected [`AccessTokenProvider`] for a bearer token on every call.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error};

use crate::error::{MixtapeError, Result};
use crate::models::{Mixtape, MixtapeUpdate, MusicService, Track};
use crate::store::MixtapeStore;

/// Firestore REST endpoint.
const FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com/v1";

/// Collection holding mixtape documents.
const COLLECTION: &str = "mixtapes";

/// Supplies bearer tokens for Firestore calls.
///
/// Production wires in whatever issues Google OAuth tokens for the service
/// account; tests use [`StaticTokenProvider`].
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    async fn token(&self) -> Result<String>;
}

/// Fixed-token provider, for environments where a token is injected
/// externally (metadata server sidecar, emulator, tests).
#[derive(Debug, Clone)]
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new<S: Into<String>>(token: S) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl AccessTokenProvider for StaticTokenProvider {
    async fn token(&self) -> Result<String> {
        Ok(self.token.clone())
    }
}

/// Firestore REST client scoped to one project's mixtape collection.
pub struct FirestoreStore {
    client: Client,
    project_id: String,
    tokens: Arc<dyn AccessTokenProvider>,
}

impl FirestoreStore {
    pub fn new<S: Into<String>>(
        client: Client,
        project_id: S,
        tokens: Arc<dyn AccessTokenProvider>,
    ) -> Self {
        Self {
            client,
            project_id: project_id.into(),
            tokens,
        }
    }

    /// Parent path of the mixtapes collection.
    fn documents_root(&self) -> String {
        format!(
            "projects/{}/databases/(default)/documents",
            self.project_id
        )
    }

    fn doc_url(&self, id: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            FIRESTORE_BASE_URL,
            self.documents_root(),
            COLLECTION,
            id
        )
    }

    async fn bearer(&self) -> Result<String> {
        self.tokens.token().await
    }

    /// Run a single-field equality query against the collection.
    async fn query_equal(&self, field: &str, value: Value) -> Result<Vec<Mixtape>> {
        let url = format!(
            "{}/{}:runQuery",
            FIRESTORE_BASE_URL,
            self.documents_root()
        );
        let body = json!({
            "structuredQuery": {
                "from": [{ "collectionId": COLLECTION }],
                "where": {
                    "fieldFilter": {
                        "field": { "fieldPath": field },
                        "op": "EQUAL",
                        "value": value
                    }
                }
            }
        });

        debug!("Firestore runQuery on {} = {:?}", field, body);
        let response = self
            .client
            .post(&url)
            .bearer_auth(self.bearer().await?)
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            error!("Firestore query failed with status {}", status);
            return Err(MixtapeError::Upstream(format!(
                "Firestore query failed ({})",
                status
            )));
        }

        let rows: Value = response.json().await?;
        let mut mixtapes = Vec::new();
        if let Some(arr) = rows.as_array() {
            for row in arr {
                // runQuery streams a trailing readTime-only row; skip
                // anything without a document.
                if let Some(doc) = row.get("document") {
                    mixtapes.push(decode_document(doc)?);
                }
            }
        }
        Ok(mixtapes)
    }
}

#[async_trait]
impl MixtapeStore for FirestoreStore {
    async fn get(&self, id: &str) -> Result<Option<Mixtape>> {
        let response = self
            .client
            .get(self.doc_url(id))
            .bearer_auth(self.bearer().await?)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let status = response.status();
        if !status.is_success() {
            error!("Firestore get({}) failed with status {}", id, status);
            return Err(MixtapeError::Upstream(format!(
                "Firestore get failed ({})",
                status
            )));
        }

        let doc: Value = response.json().await?;
        Ok(Some(decode_document(&doc)?))
    }

    async fn list_by_owner(&self, user_id: &str) -> Result<Vec<Mixtape>> {
        self.query_equal("createdBy", json!({ "stringValue": user_id }))
            .await
    }

    async fn list_public(&self) -> Result<Vec<Mixtape>> {
        self.query_equal("isPublic", json!({ "booleanValue": true }))
            .await
    }

    async fn add(&self, mixtape: Mixtape) -> Result<String> {
        let url = format!(
            "{}/{}/{}",
            FIRESTORE_BASE_URL,
            self.documents_root(),
            COLLECTION
        );
        let body = json!({ "fields": encode_fields(&mixtape) });

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.bearer().await?)
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            error!("Firestore add failed with status {}", status);
            return Err(MixtapeError::Upstream(format!(
                "Firestore add failed ({})",
                status
            )));
        }

        let doc: Value = response.json().await?;
        let id = doc
            .get("name")
            .and_then(|n| n.as_str())
            .and_then(|n| n.rsplit('/').next())
            .ok_or_else(|| {
                MixtapeError::Upstream("Firestore add returned no document name".to_string())
            })?;
        Ok(id.to_string())
    }

    async fn update(&self, id: &str, update: &MixtapeUpdate) -> Result<()> {
        let (fields, mask) = encode_update(update);
        if mask.is_empty() {
            return Ok(());
        }

        let mask_params: Vec<(&str, &str)> = mask
            .iter()
            .map(|path| ("updateMask.fieldPaths", path.as_str()))
            .collect();
        let response = self
            .client
            .patch(self.doc_url(id))
            .query(&mask_params)
            .bearer_auth(self.bearer().await?)
            .json(&json!({ "fields": fields }))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(MixtapeError::NotFound(id.to_string()));
        }
        let status = response.status();
        if !status.is_success() {
            error!("Firestore update({}) failed with status {}", id, status);
            return Err(MixtapeError::Upstream(format!(
                "Firestore update failed ({})",
                status
            )));
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.doc_url(id))
            .bearer_auth(self.bearer().await?)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            error!("Firestore delete({}) failed with status {}", id, status);
            return Err(MixtapeError::Upstream(format!(
                "Firestore delete failed ({})",
                status
            )));
        }
        Ok(())
    }
}

fn string_value<S: Into<String>>(s: S) -> Value {
    json!({ "stringValue": s.into() })
}

fn encode_track(track: &Track) -> Value {
    json!({
        "mapValue": {
            "fields": {
                "id": string_value(&track.id),
                "title": string_value(&track.title),
                "artist": string_value(&track.artist),
                "imageUrl": string_value(&track.image_url),
                "serviceId": string_value(&track.service_id),
                "service": string_value(track.service.as_str()),
            }
        }
    })
}

fn encode_tracks(tracks: &[Track]) -> Value {
    let values: Vec<Value> = tracks.iter().map(encode_track).collect();
    json!({ "arrayValue": { "values": values } })
}

fn encode_collaborators(collaborators: &[String]) -> Value {
    let values: Vec<Value> = collaborators.iter().map(string_value).collect();
    json!({ "arrayValue": { "values": values } })
}

/// Encode a full record as Firestore typed fields. The id lives in the
/// document name, not in the fields.
fn encode_fields(mixtape: &Mixtape) -> Value {
    json!({
        "title": string_value(&mixtape.title),
        "description": string_value(&mixtape.description),
        "coverImage": string_value(&mixtape.cover_image),
        "tracks": encode_tracks(&mixtape.tracks),
        "note": string_value(&mixtape.note),
        "createdBy": string_value(&mixtape.created_by),
        "createdAt": json!({ "integerValue": mixtape.created_at.to_string() }),
        "collaborators": encode_collaborators(&mixtape.collaborators),
        "isPublic": json!({ "booleanValue": mixtape.is_public }),
    })
}

/// Encode only the set fields of an update, plus the matching updateMask
/// paths so unset fields are left alone server-side.
fn encode_update(update: &MixtapeUpdate) -> (Value, Vec<String>) {
    let mut fields = serde_json::Map::new();
    let mut mask = Vec::new();

    if let Some(title) = &update.title {
        fields.insert("title".to_string(), string_value(title));
        mask.push("title".to_string());
    }
    if let Some(description) = &update.description {
        fields.insert("description".to_string(), string_value(description));
        mask.push("description".to_string());
    }
    if let Some(cover_image) = &update.cover_image {
        fields.insert("coverImage".to_string(), string_value(cover_image));
        mask.push("coverImage".to_string());
    }
    if let Some(tracks) = &update.tracks {
        fields.insert("tracks".to_string(), encode_tracks(tracks));
        mask.push("tracks".to_string());
    }
    if let Some(note) = &update.note {
        fields.insert("note".to_string(), string_value(note));
        mask.push("note".to_string());
    }
    if let Some(collaborators) = &update.collaborators {
        fields.insert(
            "collaborators".to_string(),
            encode_collaborators(collaborators),
        );
        mask.push("collaborators".to_string());
    }
    if let Some(is_public) = update.is_public {
        fields.insert("isPublic".to_string(), json!({ "booleanValue": is_public }));
        mask.push("isPublic".to_string());
    }

    (Value::Object(fields), mask)
}

fn field_str(fields: &Value, name: &str) -> String {
    fields
        .get(name)
        .and_then(|f| f.get("stringValue"))
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string()
}

fn field_bool(fields: &Value, name: &str) -> bool {
    fields
        .get(name)
        .and_then(|f| f.get("booleanValue"))
        .and_then(|v| v.as_bool())
        .unwrap_or(false)
}

fn field_u64(fields: &Value, name: &str) -> u64 {
    // integerValue comes back as a decimal string
    fields
        .get(name)
        .and_then(|f| f.get("integerValue"))
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse().ok())
        .unwrap_or(0)
}

fn field_array<'a>(fields: &'a Value, name: &str) -> Vec<&'a Value> {
    fields
        .get(name)
        .and_then(|f| f.get("arrayValue"))
        .and_then(|a| a.get("values"))
        .and_then(|v| v.as_array())
        .map(|arr| arr.iter().collect())
        .unwrap_or_default()
}

fn decode_track(value: &Value) -> Option<Track> {
    let fields = value.get("mapValue")?.get("fields")?;
    let service = MusicService::parse(&field_str(fields, "service"))?;
    Some(Track {
        id: field_str(fields, "id"),
        title: field_str(fields, "title"),
        artist: field_str(fields, "artist"),
        image_url: field_str(fields, "imageUrl"),
        service_id: field_str(fields, "serviceId"),
        service,
    })
}

/// Decode a Firestore document into a record. The id is the last segment of
/// the document name.
fn decode_document(doc: &Value) -> Result<Mixtape> {
    let id = doc
        .get("name")
        .and_then(|n| n.as_str())
        .and_then(|n| n.rsplit('/').next())
        .ok_or_else(|| MixtapeError::Upstream("Firestore document has no name".to_string()))?
        .to_string();
    let fields = doc
        .get("fields")
        .ok_or_else(|| MixtapeError::Upstream("Firestore document has no fields".to_string()))?;

    let tracks = field_array(fields, "tracks")
        .into_iter()
        .filter_map(decode_track)
        .collect();
    let collaborators = field_array(fields, "collaborators")
        .into_iter()
        .filter_map(|v| v.get("stringValue").and_then(|s| s.as_str()))
        .map(|s| s.to_string())
        .collect();

    Ok(Mixtape {
        id,
        title: field_str(fields, "title"),
        description: field_str(fields, "description"),
        cover_image: field_str(fields, "coverImage"),
        tracks,
        note: field_str(fields, "note"),
        created_by: field_str(fields, "createdBy"),
        created_at: field_u64(fields, "createdAt"),
        collaborators,
        is_public: field_bool(fields, "isPublic"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Mixtape {
        Mixtape {
            id: "m1".to_string(),
            title: "Mix".to_string(),
            description: "desc".to_string(),
            cover_image: "https://img.example/c.jpg".to_string(),
            tracks: vec![Track::new(
                "Song",
                "Artist",
                "https://img.example/t.jpg",
                "42",
                MusicService::YouTube,
            )],
            note: "liner".to_string(),
            created_by: "u1".to_string(),
            created_at: 1700000000000,
            collaborators: vec!["u2".to_string()],
            is_public: true,
        }
    }

    #[test]
    fn test_encode_decode_round_trip() {
        let mixtape = sample();
        let doc = json!({
            "name": "projects/p/databases/(default)/documents/mixtapes/m1",
            "fields": encode_fields(&mixtape),
        });
        let decoded = decode_document(&doc).unwrap();
        assert_eq!(decoded, mixtape);
    }

    #[test]
    fn test_encode_update_mask_covers_set_fields_only() {
        let update = MixtapeUpdate {
            note: Some("n".to_string()),
            is_public: Some(false),
            ..Default::default()
        };
        let (fields, mask) = encode_update(&update);
        assert_eq!(mask, vec!["note".to_string(), "isPublic".to_string()]);
        assert_eq!(fields["note"]["stringValue"], "n");
        assert_eq!(fields["isPublic"]["booleanValue"], false);
        assert!(fields.get("title").is_none());
    }

    #[test]
    fn test_decode_skips_unknown_service_tracks() {
        let raw = json!({
            "mapValue": { "fields": {
                "id": { "stringValue": "x" },
                "title": { "stringValue": "t" },
                "artist": { "stringValue": "a" },
                "imageUrl": { "stringValue": "" },
                "serviceId": { "stringValue": "1" },
                "service": { "stringValue": "soundcloud" },
            }}
        });
        assert!(decode_track(&raw).is_none());
    }
}
