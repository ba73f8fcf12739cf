//! HTTP surface: axum router, handlers, and error mapping.
//!
//! Every handler speaks JSON and every failure crosses the boundary as an
//! `{"error": "..."}` payload with the status from
//! [`MixtapeError::status`]. CORS is open to any origin.

use axum::{
    extract::{Path, Query, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::warn;

use crate::auth::IdentityVerifier;
use crate::error::{MixtapeError, Result};
use crate::models::{Mixtape, MixtapeUpdate, MusicService, NewMixtape, ProfileUpdate, Track, UserProfile};
use crate::search::SearchGateway;
use crate::service::MixtapeService;

/// Shared state injected into all route handlers.
pub struct AppState {
    pub service: MixtapeService,
    pub verifier: Arc<dyn IdentityVerifier>,
    pub search: SearchGateway,
}

pub type SharedState = Arc<AppState>;

/// JSON error payload.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// JSON acknowledgement payload for updates and deletes.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl IntoResponse for MixtapeError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            warn!("Request failed: {}", self);
        }
        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

/// Build the application router.
pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/mixtapes", get(list_mixtapes).post(create_mixtape))
        .route(
            "/mixtapes/{id}",
            get(get_mixtape).put(update_mixtape).delete(delete_mixtape),
        )
        .route("/search", get(search_music))
        .route("/users/{uid}", get(get_profile).put(update_profile))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Pull the bearer credential out of the Authorization header.
///
/// An absent header is an anonymous request; a present but malformed header
/// is an authentication error, never silently anonymous.
fn bearer_token(headers: &HeaderMap) -> Result<Option<&str>> {
    let value = match headers.get(AUTHORIZATION) {
        Some(value) => value,
        None => return Ok(None),
    };
    let value = value
        .to_str()
        .map_err(|_| MixtapeError::Authentication("malformed Authorization header".to_string()))?;
    let token = value.strip_prefix("Bearer ").ok_or_else(|| {
        MixtapeError::Authentication("Authorization header must be a Bearer token".to_string())
    })?;
    Ok(Some(token))
}

/// Resolve the requester identity, if any.
async fn requester(state: &AppState, headers: &HeaderMap) -> Result<Option<String>> {
    match bearer_token(headers)? {
        Some(token) => Ok(Some(state.verifier.verify(token).await?)),
        None => Ok(None),
    }
}

/// Resolve the requester identity, rejecting anonymous requests.
async fn required_requester(state: &AppState, headers: &HeaderMap) -> Result<String> {
    requester(state, headers).await?.ok_or_else(|| {
        MixtapeError::Authentication("authentication required".to_string())
    })
}

async fn health() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "ok".to_string(),
    })
}

async fn list_mixtapes(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Mixtape>>> {
    let requester = requester(&state, &headers).await?;
    let mixtapes = state.service.list(requester.as_deref()).await?;
    Ok(Json(mixtapes))
}

async fn get_mixtape(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Mixtape>> {
    let requester = requester(&state, &headers).await?;
    let mixtape = state.service.get(&id, requester.as_deref()).await?;
    Ok(Json(mixtape))
}

async fn create_mixtape(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(draft): Json<NewMixtape>,
) -> Result<(StatusCode, Json<Mixtape>)> {
    let uid = required_requester(&state, &headers).await?;
    let mixtape = state.service.create(&uid, draft).await?;
    Ok((StatusCode::CREATED, Json(mixtape)))
}

async fn update_mixtape(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(update): Json<MixtapeUpdate>,
) -> Result<Json<MessageResponse>> {
    let uid = required_requester(&state, &headers).await?;
    state.service.update(&id, &uid, update).await?;
    Ok(Json(MessageResponse {
        message: "Mixtape updated successfully".to_string(),
    }))
}

async fn delete_mixtape(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<MessageResponse>> {
    let uid = required_requester(&state, &headers).await?;
    state.service.delete(&id, &uid).await?;
    Ok(Json(MessageResponse {
        message: "Mixtape deleted successfully".to_string(),
    }))
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    query: Option<String>,
    service: Option<String>,
}

async fn search_music(
    State(state): State<SharedState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Track>>> {
    let query = params
        .query
        .as_deref()
        .filter(|q| !q.is_empty())
        .ok_or_else(|| MixtapeError::Validation("search query is required".to_string()))?;
    let service = match params.service.as_deref() {
        None => MusicService::Spotify,
        Some(name) => MusicService::parse(name)
            .ok_or_else(|| MixtapeError::Validation("invalid music service".to_string()))?,
    };

    let tracks = state.search.search(query, service).await?;
    Ok(Json(tracks))
}

async fn get_profile(
    State(state): State<SharedState>,
    Path(uid): Path<String>,
) -> Result<Json<UserProfile>> {
    let profile = state.verifier.get_user(&uid).await?;
    Ok(Json(profile))
}

async fn update_profile(
    State(state): State<SharedState>,
    Path(uid): Path<String>,
    headers: HeaderMap,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<MessageResponse>> {
    let caller = required_requester(&state, &headers).await?;
    if caller != uid {
        return Err(MixtapeError::Authorization(
            "you may only update your own profile".to_string(),
        ));
    }

    state.verifier.update_profile(&uid, &update).await?;
    Ok(Json(MessageResponse {
        message: "Profile updated successfully".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{SearchConfig, SystemClock};
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use axum::http::HeaderValue;
    use reqwest::Client;

    /// Verifier that accepts tokens of the form `tok-{uid}`.
    struct StubVerifier;

    #[async_trait]
    impl IdentityVerifier for StubVerifier {
        async fn verify(&self, credential: &str) -> Result<String> {
            credential
                .strip_prefix("tok-")
                .map(|uid| uid.to_string())
                .ok_or_else(|| MixtapeError::Authentication("invalid token".to_string()))
        }

        async fn get_user(&self, uid: &str) -> Result<UserProfile> {
            Ok(UserProfile {
                uid: uid.to_string(),
                ..Default::default()
            })
        }

        async fn update_profile(&self, _uid: &str, _update: &ProfileUpdate) -> Result<()> {
            Ok(())
        }
    }

    fn state() -> SharedState {
        let store = Arc::new(MemoryStore::new());
        Arc::new(AppState {
            service: MixtapeService::new(store, Arc::new(SystemClock)),
            verifier: Arc::new(StubVerifier),
            search: SearchGateway::new(
                Client::new(),
                SearchConfig::default(),
                Arc::new(SystemClock),
            ),
        })
    }

    fn auth_headers(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        );
        headers
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(&HeaderMap::new()).unwrap(), None);
        assert_eq!(
            bearer_token(&auth_headers("abc")).unwrap(),
            Some("abc")
        );

        let mut bad = HeaderMap::new();
        bad.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(matches!(
            bearer_token(&bad),
            Err(MixtapeError::Authentication(_))
        ));
    }

    #[test]
    fn test_error_response_status() {
        let response = MixtapeError::NotFound("m1".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let response = MixtapeError::Authentication("no".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_create_requires_authentication() {
        let state = state();
        let draft = NewMixtape {
            title: "Mix".to_string(),
            tracks: vec![Track::new("t", "a", "", "1", MusicService::Spotify)],
            ..Default::default()
        };

        let denied = create_mixtape(State(state.clone()), HeaderMap::new(), Json(draft.clone()))
            .await;
        assert!(matches!(denied, Err(MixtapeError::Authentication(_))));

        let (status, Json(created)) =
            create_mixtape(State(state), auth_headers("tok-u1"), Json(draft))
                .await
                .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created.created_by, "u1");
    }

    #[tokio::test]
    async fn test_invalid_credential_is_401_not_anonymous() {
        let state = state();
        let result = list_mixtapes(State(state), auth_headers("garbage")).await;
        assert!(matches!(result, Err(MixtapeError::Authentication(_))));
    }

    #[tokio::test]
    async fn test_search_rejects_unknown_service() {
        let state = state();
        let params = SearchParams {
            query: Some("test".to_string()),
            service: Some("soundcloud".to_string()),
        };
        let result = search_music(State(state), Query(params)).await;
        assert!(matches!(result, Err(MixtapeError::Validation(_))));
    }

    #[tokio::test]
    async fn test_search_requires_query() {
        let state = state();
        let params = SearchParams {
            query: None,
            service: None,
        };
        let result = search_music(State(state), Query(params)).await;
        assert!(matches!(result, Err(MixtapeError::Validation(_))));
    }

    #[tokio::test]
    async fn test_profile_update_is_self_only() {
        let state = state();
        let result = update_profile(
            State(state),
            Path("u2".to_string()),
            auth_headers("tok-u1"),
            Json(ProfileUpdate::default()),
        )
        .await;
        assert!(matches!(result, Err(MixtapeError::Authorization(_))));
    }
}
