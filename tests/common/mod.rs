// Test helpers are intentionally partially used
#![allow(dead_code)]

use checkin_issuer::domain::{ManualClock, MetricsPtr};
use checkin_issuer::{
    build_router, create_memory_repository, create_memory_sessions, create_noop_metrics,
    AppState, CredentialIssuer, MemoryRepository, MemorySessionStore, TokenSigner,
};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

pub const SIGNING_SECRET: &str = "integration-test-secret";

// ============================================================================
// Test Setup
// ============================================================================

/// Everything a test needs to drive and inspect the service.
pub struct TestApp {
    pub state: AppState,
    pub clock: Arc<ManualClock>,
    pub repository: Arc<MemoryRepository>,
    pub sessions: Arc<MemorySessionStore>,
}

impl TestApp {
    // ---
    /// In-memory backends, a clock pinned at t=0 and a 30 second window.
    pub fn new() -> Self {
        // ---
        Self::with_metrics(create_noop_metrics().expect("noop metrics"))
    }

    pub fn with_metrics(metrics: MetricsPtr) -> Self {
        // ---
        let clock = Arc::new(ManualClock::at_secs(0));
        let repository = Arc::new(create_memory_repository());
        let sessions = Arc::new(create_memory_sessions(Duration::from_secs(3600)));

        let issuer = CredentialIssuer::new(
            repository.clone(),
            Arc::new(TokenSigner::new(SIGNING_SECRET).expect("signer")),
            clock.clone(),
            metrics.clone(),
            Duration::from_secs(30),
        )
        .expect("issuer");

        let state = AppState::new(sessions.clone(), metrics, repository.clone(), Arc::new(issuer));

        Self {
            state,
            clock,
            repository,
            sessions,
        }
    }

    /// Logs in `user_id` and returns a bearer header value.
    pub async fn login(&self, user_id: &str) -> String {
        // ---
        let token = self
            .sessions
            .create_session(user_id, &format!("user {user_id}"))
            .await
            .expect("session");
        format!("Bearer {token}")
    }
}

pub struct TestServer {
    pub addr: std::net::SocketAddr,
    pub client: Client,
}

impl TestServer {
    // ---
    pub async fn new(app: &TestApp) -> Self {
        // --
        let router = build_router(app.state.clone());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        // Spawn the server in the background
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let client = Client::new();

        Self { addr, client }
    }

    pub fn url(&self, path: &str) -> String {
        // ---
        format!("http://{}{}", self.addr, path)
    }
}
