//! Live-database harness: serves the real router on a free port against
//! `DATABASE_URL`, with a fixed geocoder so no provider key is needed.
#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{multipart, StatusCode};
use serde_json::{json, Value};
use uuid::Uuid;

use places_api::config::AppConfig;
use places_api::database::DatabaseManager;
use places_api::geocoding::{Coordinates, GeocodeError, Geocoder};

pub const KNOWN_ADDRESS: &str = "1600 Amphitheatre Parkway";
pub const UNKNOWN_ADDRESS: &str = "Nowhere Street 0, Atlantis";

struct FixedGeocoder;

#[async_trait]
impl Geocoder for FixedGeocoder {
    async fn resolve(&self, address: &str) -> Result<Coordinates, GeocodeError> {
        if address == KNOWN_ADDRESS {
            Ok(Coordinates {
                lat: 37.4224764,
                lng: -122.0842499,
            })
        } else {
            Err(GeocodeError::NotFound)
        }
    }
}

pub struct TestServer {
    pub base_url: String,
    pub client: reqwest::Client,
    pub upload_dir: PathBuf,
}

impl TestServer {
    pub async fn spawn() -> Result<Self> {
        let _ = dotenvy::dotenv();

        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let upload_dir = std::env::temp_dir().join(format!("places-api-live-{}", Uuid::new_v4()));

        let mut config = AppConfig::from_env();
        config.server.port = port;
        config.uploads.dir = upload_dir.clone();
        config.security.bcrypt_cost = 4;
        if config.security.jwt_secret.is_empty() {
            config.security.jwt_secret = "live-test-secret".into();
        }

        let pool = DatabaseManager::connect(&config.database).await?;
        DatabaseManager::migrate(&pool).await?;

        let state = places_api::build_state(&config, pool, Arc::new(FixedGeocoder))?;
        state.images.ensure_dir().await?;
        let app = places_api::server::app(state, &config.server);

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let server = Self {
            base_url: format!("http://127.0.0.1:{}", port),
            client: reqwest::Client::new(),
            upload_dir,
        };
        server.wait_ready(Duration::from_secs(10)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn uploaded_files(&self) -> usize {
        std::fs::read_dir(&self.upload_dir).map(|dir| dir.count()).unwrap_or(0)
    }

    /// Signs up a fresh user and returns the session body
    pub async fn signup(&self, email: &str) -> Result<Value> {
        let form = multipart::Form::new()
            .text("name", "Live Tester")
            .text("email", email.to_string())
            .text("password", "secret")
            .part("image", png_part()?);

        let res = self.client.post(self.url("/api/users/signup")).multipart(form).send().await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "signup failed: {}", res.status());
        Ok(res.json().await?)
    }

    pub async fn create_place(&self, token: &str, address: &str) -> Result<reqwest::Response> {
        let form = multipart::Form::new()
            .text("title", "Googleplex")
            .text("description", "Where the search happens")
            .text("address", address.to_string())
            .part("image", png_part()?);

        Ok(self
            .client
            .post(self.url("/api/places"))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await?)
    }
}

pub fn unique_email() -> String {
    format!("live-{}@example.com", Uuid::new_v4().simple())
}

pub fn png_part() -> Result<multipart::Part> {
    Ok(multipart::Part::bytes(b"\x89PNG live".to_vec())
        .file_name("photo.png")
        .mime_str("image/png")?)
}

pub fn login_body(email: &str, password: &str) -> Value {
    json!({ "email": email, "password": password })
}
