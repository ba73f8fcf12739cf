//! Firebase identity provider client.
//!
//! Wraps the Identity Toolkit REST API: `accounts:lookup` resolves an ID
//! token to a user, `accounts:update` applies profile changes. Requests are
//! keyed by the project's web API key.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::auth::IdentityVerifier;
use crate::error::{MixtapeError, Result};
use crate::models::{ProfileUpdate, UserProfile};

/// Identity Toolkit endpoint.
const IDENTITY_BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1";

/// Firebase-backed identity verifier.
#[derive(Debug, Clone)]
pub struct FirebaseVerifier {
    client: Client,
    api_key: String,
}

impl FirebaseVerifier {
    pub fn new<S: Into<String>>(client: Client, api_key: S) -> Self {
        Self {
            client,
            api_key: api_key.into(),
        }
    }

    async fn call(&self, action: &str, body: Value) -> Result<Value> {
        let url = format!("{}/accounts:{}", IDENTITY_BASE_URL, action);
        debug!("Identity Toolkit accounts:{}", action);

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        let data: Value = response.json().await?;

        if !status.is_success() {
            let message = data
                .get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .unwrap_or("unknown error")
                .to_string();
            warn!("Identity Toolkit error ({}): {}", status, message);
            // Token problems come back as 400 with an explanatory code
            if status.as_u16() == 400 {
                return Err(MixtapeError::Authentication(message));
            }
            return Err(MixtapeError::Upstream(format!(
                "identity provider failed ({})",
                status
            )));
        }

        Ok(data)
    }

    fn parse_user(record: &Value) -> UserProfile {
        let get = |name: &str| {
            record
                .get(name)
                .and_then(|v| v.as_str())
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string())
        };
        UserProfile {
            uid: record
                .get("localId")
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string(),
            display_name: get("displayName"),
            email: get("email"),
            photo_url: get("photoUrl"),
        }
    }
}

#[async_trait]
impl IdentityVerifier for FirebaseVerifier {
    async fn verify(&self, credential: &str) -> Result<String> {
        let data = self
            .call("lookup", json!({ "idToken": credential }))
            .await?;

        let uid = data
            .get("users")
            .and_then(|u| u.as_array())
            .and_then(|arr| arr.first())
            .and_then(|user| user.get("localId"))
            .and_then(|id| id.as_str())
            .ok_or_else(|| {
                MixtapeError::Authentication("credential resolved to no user".to_string())
            })?;
        Ok(uid.to_string())
    }

    async fn get_user(&self, uid: &str) -> Result<UserProfile> {
        let data = self.call("lookup", json!({ "localId": [uid] })).await?;

        let record = data
            .get("users")
            .and_then(|u| u.as_array())
            .and_then(|arr| arr.first())
            .ok_or_else(|| MixtapeError::NotFound(format!("user {}", uid)))?;
        Ok(Self::parse_user(record))
    }

    async fn update_profile(&self, uid: &str, update: &ProfileUpdate) -> Result<()> {
        let mut body = serde_json::Map::new();
        body.insert("localId".to_string(), json!(uid));
        if let Some(display_name) = &update.display_name {
            body.insert("displayName".to_string(), json!(display_name));
        }
        if let Some(photo_url) = &update.photo_url {
            body.insert("photoUrl".to_string(), json!(photo_url));
        }

        self.call("update", Value::Object(body)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_user_drops_empty_fields() {
        let record = json!({
            "localId": "u1",
            "displayName": "Ada",
            "email": "",
            "photoUrl": "https://img.example/a.png",
        });
        let profile = FirebaseVerifier::parse_user(&record);
        assert_eq!(profile.uid, "u1");
        assert_eq!(profile.display_name.as_deref(), Some("Ada"));
        assert_eq!(profile.email, None);
        assert_eq!(profile.photo_url.as_deref(), Some("https://img.example/a.png"));
    }
}
