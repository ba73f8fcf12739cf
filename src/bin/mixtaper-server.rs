use clap::Parser;
use reqwest::Client;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use mixtaper::auth::FirebaseVerifier;
use mixtaper::search::{SearchConfig, SearchGateway, SystemClock};
use mixtaper::store::{FirestoreStore, MemoryStore, MixtapeStore, StaticTokenProvider};
use mixtaper::{AppState, MixtapeService};

#[derive(Parser)]
#[command(name = "mixtaper-server")]
#[command(about = "HTTP server for the mixtape app", long_about = None)]
struct Cli {
    /// Address to bind
    #[arg(long, env = "MIXTAPER_ADDR", default_value = "0.0.0.0:8080")]
    addr: String,

    /// Firebase web API key (identity verification)
    #[arg(long, env = "FIREBASE_API_KEY")]
    firebase_api_key: String,

    /// Firestore project id; omit to run on the in-memory store
    #[arg(long, env = "FIRESTORE_PROJECT_ID")]
    firestore_project: Option<String>,

    /// Bearer token for Firestore calls (issued externally)
    #[arg(long, env = "FIRESTORE_ACCESS_TOKEN")]
    firestore_token: Option<String>,

    /// Spotify client id for the client-credentials flow
    #[arg(long, env = "SPOTIFY_CLIENT_ID")]
    spotify_client_id: Option<String>,

    /// Spotify client secret
    #[arg(long, env = "SPOTIFY_CLIENT_SECRET")]
    spotify_client_secret: Option<String>,

    /// YouTube Data API key
    #[arg(long, env = "YOUTUBE_API_KEY")]
    youtube_api_key: Option<String>,

    /// Apple Music developer token
    #[arg(long, env = "APPLE_MUSIC_TOKEN")]
    apple_music_token: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let client = Client::new();
    let clock = Arc::new(SystemClock);

    let store: Arc<dyn MixtapeStore> = match (&cli.firestore_project, &cli.firestore_token) {
        (Some(project), Some(token)) => {
            info!("Using Firestore store (project {})", project);
            Arc::new(FirestoreStore::new(
                client.clone(),
                project,
                Arc::new(StaticTokenProvider::new(token)),
            ))
        }
        _ => {
            info!("Using in-memory store");
            Arc::new(MemoryStore::new())
        }
    };

    let search = SearchGateway::new(
        client.clone(),
        SearchConfig {
            spotify_client_id: cli.spotify_client_id,
            spotify_client_secret: cli.spotify_client_secret,
            youtube_api_key: cli.youtube_api_key,
            apple_music_token: cli.apple_music_token,
        },
        clock.clone(),
    );

    let state = Arc::new(AppState {
        service: MixtapeService::new(store, clock),
        verifier: Arc::new(FirebaseVerifier::new(client, cli.firebase_api_key)),
        search,
    });

    let app = mixtaper::http::router(state);
    let listener = tokio::net::TcpListener::bind(&cli.addr).await?;
    info!("Listening on {}", cli.addr);
    axum::serve(listener, app).await?;

    Ok(())
}
