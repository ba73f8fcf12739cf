//! # Mixtaper
//!
//! Backend for a digital mixtape app: mixtape CRUD with owner/collaborator
//! access control, plus a music lookup gateway over Spotify, YouTube, and
//! Apple Music.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use mixtaper::search::{SearchConfig, SearchGateway, SystemClock};
//! use mixtaper::store::MemoryStore;
//! use mixtaper::{AppState, MixtapeService};
//!
//! # use async_trait::async_trait;
//! # struct NoAuth;
//! # #[async_trait]
//! # impl mixtaper::auth::IdentityVerifier for NoAuth {
//! #     async fn verify(&self, _: &str) -> mixtaper::Result<String> { unimplemented!() }
//! #     async fn get_user(&self, _: &str) -> mixtaper::Result<mixtaper::models::UserProfile> { unimplemented!() }
//! #     async fn update_profile(&self, _: &str, _: &mixtaper::models::ProfileUpdate) -> mixtaper::Result<()> { unimplemented!() }
//! # }
//! #[tokio::main]
//! async fn main() {
//!     let store = Arc::new(MemoryStore::new());
//!     let clock = Arc::new(SystemClock);
//!     let state = Arc::new(AppState {
//!         service: MixtapeService::new(store, clock.clone()),
//!         verifier: Arc::new(NoAuth),
//!         search: SearchGateway::new(reqwest::Client::new(), SearchConfig::default(), clock),
//!     });
//!
//!     let app = mixtaper::http::router(state);
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await.unwrap();
//!     axum::serve(listener, app).await.unwrap();
//! }
//! ```
//!
//! ## Layers
//!
//! - [`policy`] - pure access-control decisions (read/write/delete, field
//!   filtering for collaborators)
//! - [`store`] - document-store contract with in-memory and Firestore
//!   implementations
//! - [`auth`] - identity verification against the external provider
//! - [`search`] - normalized track search with a cached client-credentials
//!   token for Spotify
//! - [`service`] - the operations the HTTP surface exposes
//! - [`http`] - axum router and JSON error mapping

pub mod auth;
pub mod error;
pub mod http;
pub mod models;
pub mod policy;
pub mod search;
pub mod service;
pub mod store;

// Main interface
pub use error::{MixtapeError, Result};
pub use http::{AppState, SharedState};
pub use models::{Mixtape, MixtapeUpdate, MusicService, NewMixtape, Track};
pub use service::MixtapeService;
