#![allow(dead_code)]

use axum_test::TestServer;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use shortly::api::middleware::cors::CorsOptions;
use shortly::application::services::{AuthService, UrlService, UrlServiceOptions};
use shortly::domain::repositories::{TokenRepository, UrlRepository};
use shortly::infrastructure::cache::{CacheService, MemoryCache};
use shortly::infrastructure::persistence::{InMemoryTokenRepository, InMemoryUrlRepository};
use shortly::routes::{RateLimiting, router};
use shortly::state::AppState;
use shortly::utils::code_generator::RandomCodeGenerator;

pub const BASE_URL: &str = "http://sho.rt";
pub const SIGNING_SECRET: &str = "test-signing-secret";

pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    pub urls: Arc<InMemoryUrlRepository>,
}

impl TestApp {
    /// App backed by in-memory stores and an in-memory cache.
    pub fn new() -> Self {
        Self::with_cache(Arc::new(MemoryCache::new(Duration::from_secs(60))))
    }

    pub fn with_cache(cache: Arc<dyn CacheService>) -> Self {
        let urls = Arc::new(InMemoryUrlRepository::new());
        let tokens: Arc<dyn TokenRepository> = Arc::new(InMemoryTokenRepository::new());

        let url_repository: Arc<dyn UrlRepository> = urls.clone();
        let url_service = Arc::new(UrlService::new(
            url_repository,
            RandomCodeGenerator::default(),
            cache,
            UrlServiceOptions::default(),
        ));
        let auth_service = Arc::new(AuthService::new(tokens, SIGNING_SECRET.to_string()));

        let state = AppState::new(url_service, auth_service, BASE_URL);
        let app = router(
            state.clone(),
            Duration::from_secs(5),
            RateLimiting::Disabled,
            &CorsOptions::default(),
        );

        Self {
            server: TestServer::new(app).unwrap(),
            state,
            urls,
        }
    }

    /// Registers `token` for a fresh owner and returns the owner id.
    pub async fn owner_with_token(&self, token: &str) -> Uuid {
        let owner = Uuid::new_v4();
        self.state
            .auth_service
            .register_token(owner, "test", token)
            .await
            .unwrap();
        owner
    }

    /// Creates a short URL through the API and returns the response body.
    pub async fn create_url(&self, token: &str, long_url: &str) -> serde_json::Value {
        let response = self
            .server
            .post("/api/urls")
            .add_header("Authorization", format!("Bearer {token}"))
            .json(&serde_json::json!({ "long_url": long_url }))
            .await;

        response.assert_status(axum::http::StatusCode::CREATED);
        response.json::<serde_json::Value>()
    }
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}
