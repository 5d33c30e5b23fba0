//! In-memory doubles and fixtures for unit and router tests.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use uuid::Uuid;

use crate::auth::Credentials;
use crate::config::{SecurityConfig, ServerConfig, UploadConfig};
use crate::database::{DatabaseError, Place, PlaceRepository, User, UserRepository};
use crate::geocoding::{Coordinates, GeocodeError, Geocoder};
use crate::services::{PlaceService, UserService};
use crate::state::AppState;
use crate::storage::ImageStore;

pub const GOOGLEPLEX: &str = "1600 Amphitheatre Parkway";
pub const UNKNOWN_ADDRESS: &str = "Nowhere Street 0, Atlantis";
pub const SEED_PASSWORD: &str = "password";

pub const GOOGLEPLEX_LOCATION: Coordinates = Coordinates {
    lat: 37.4224764,
    lng: -122.0842499,
};

#[derive(Default, Clone)]
struct Tables {
    users: HashMap<Uuid, User>,
    places: Vec<Place>,
}

/// Repository double. Multi-step writes work on a copy of the tables that
/// replaces the original only on commit.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    fail_commits: AtomicBool,
}

impl MemoryStore {
    /// Makes every following transaction fail at commit time
    pub fn fail_transactions(&self, fail: bool) {
        self.fail_commits.store(fail, Ordering::SeqCst);
    }

    pub fn owned_places(&self, user_id: Uuid) -> Vec<Uuid> {
        self.user(user_id).map(|u| u.places).unwrap_or_default()
    }

    pub fn place(&self, id: Uuid) -> Option<Place> {
        self.tables.lock().unwrap().places.iter().find(|p| p.id == id).cloned()
    }

    pub fn place_count(&self) -> usize {
        self.tables.lock().unwrap().places.len()
    }

    pub fn user(&self, id: Uuid) -> Option<User> {
        self.tables.lock().unwrap().users.get(&id).cloned()
    }

    pub fn user_count(&self) -> usize {
        self.tables.lock().unwrap().users.len()
    }

    fn transaction<F>(&self, apply: F) -> Result<(), DatabaseError>
    where
        F: FnOnce(&mut Tables) -> Result<(), DatabaseError>,
    {
        let mut tables = self.tables.lock().unwrap();
        let mut working = tables.clone();

        apply(&mut working)?;

        if self.fail_commits.load(Ordering::SeqCst) {
            return Err(DatabaseError::QueryError("simulated commit failure".into()));
        }

        *tables = working;
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        Ok(self.user(id))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn list(&self) -> Result<Vec<User>, DatabaseError> {
        let mut users: Vec<User> = self.tables.lock().unwrap().users.values().cloned().collect();
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }

    async fn insert(&self, user: &User) -> Result<(), DatabaseError> {
        self.transaction(|tables| {
            if tables.users.values().any(|u| u.email == user.email) {
                return Err(DatabaseError::Conflict(format!("email {}", user.email)));
            }
            tables.users.insert(user.id, user.clone());
            Ok(())
        })
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

#[async_trait]
impl PlaceRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Place>, DatabaseError> {
        Ok(self.place(id))
    }

    async fn find_by_creator(&self, creator: Uuid) -> Result<Vec<Place>, DatabaseError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.places.iter().filter(|p| p.creator == creator).cloned().collect())
    }

    async fn update_details(&self, place: &Place) -> Result<(), DatabaseError> {
        self.transaction(|tables| {
            let stored = tables
                .places
                .iter_mut()
                .find(|p| p.id == place.id)
                .ok_or_else(|| DatabaseError::NotFound(format!("place {}", place.id)))?;
            stored.title = place.title.clone();
            stored.description = place.description.clone();
            Ok(())
        })
    }

    async fn insert_owned(&self, place: &Place) -> Result<(), DatabaseError> {
        self.transaction(|tables| {
            tables.places.push(place.clone());
            let owner = tables
                .users
                .get_mut(&place.creator)
                .ok_or_else(|| DatabaseError::NotFound(format!("user {}", place.creator)))?;
            owner.places.push(place.id);
            Ok(())
        })
    }

    async fn delete_owned(&self, place: &Place) -> Result<(), DatabaseError> {
        self.transaction(|tables| {
            let before = tables.places.len();
            tables.places.retain(|p| p.id != place.id);
            if tables.places.len() == before {
                return Err(DatabaseError::NotFound(format!("place {}", place.id)));
            }
            let owner = tables
                .users
                .get_mut(&place.creator)
                .ok_or_else(|| DatabaseError::NotFound(format!("user {}", place.creator)))?;
            owner.places.retain(|id| *id != place.id);
            Ok(())
        })
    }
}

/// Resolves [`GOOGLEPLEX`] and fails every other address as not found.
#[derive(Default)]
pub struct StubGeocoder {
    calls: AtomicUsize,
}

impl StubGeocoder {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Geocoder for StubGeocoder {
    async fn resolve(&self, address: &str) -> Result<Coordinates, GeocodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if address == GOOGLEPLEX {
            Ok(GOOGLEPLEX_LOCATION)
        } else {
            Err(GeocodeError::NotFound)
        }
    }
}

/// Services wired to the in-memory store, with uploads in a private temp dir.
pub struct TestContext {
    pub places: Arc<PlaceService>,
    pub users: Arc<UserService>,
    pub credentials: Arc<Credentials>,
    pub store: Arc<MemoryStore>,
    pub geocoder: Arc<StubGeocoder>,
    pub images: Arc<ImageStore>,
    upload_dir: PathBuf,
}

impl TestContext {
    pub async fn new() -> Self {
        let upload_dir = std::env::temp_dir().join(format!("places-api-test-{}", Uuid::new_v4()));
        let images = Arc::new(ImageStore::new(&UploadConfig {
            dir: upload_dir.clone(),
            max_image_bytes: 64 * 1024,
        }));
        images.ensure_dir().await.unwrap();

        let credentials = Arc::new(
            Credentials::new(&SecurityConfig {
                jwt_secret: "test-secret".into(),
                jwt_expiry_hours: 1,
                // bcrypt minimum, keeps tests fast
                bcrypt_cost: 4,
            })
            .unwrap(),
        );

        let store = Arc::new(MemoryStore::default());
        let geocoder = Arc::new(StubGeocoder::default());

        let places = Arc::new(PlaceService::new(
            store.clone(),
            store.clone(),
            geocoder.clone(),
            images.clone(),
        ));
        let users = Arc::new(UserService::new(store.clone(), credentials.clone()));

        Self {
            places,
            users,
            credentials,
            store,
            geocoder,
            images,
            upload_dir,
        }
    }

    /// Inserts a user whose password is [`SEED_PASSWORD`]
    pub async fn seed_user(&self, email: &str) -> User {
        let hashed = self.credentials.hash_password(SEED_PASSWORD).await.unwrap();
        let user = User::new("Seed".into(), email.into(), hashed, self.image_path("avatar.png"));
        UserRepository::insert(self.store.as_ref(), &user).await.unwrap();
        user
    }

    /// Inserts a place at the Googleplex with a real image file
    pub async fn seed_place(&self, owner: Uuid) -> Place {
        let place = Place::new(
            "Googleplex".into(),
            "Where the search happens".into(),
            self.image_path(&format!("{}.png", Uuid::new_v4())),
            GOOGLEPLEX.into(),
            GOOGLEPLEX_LOCATION,
            owner,
        );
        self.store.insert_owned(&place).await.unwrap();
        place
    }

    /// Creates a file in the upload dir and returns its stored path
    pub fn image_path(&self, name: &str) -> String {
        let path = self.images.dir().join(name);
        std::fs::write(&path, b"\x89PNG test").unwrap();
        path.to_string_lossy().into_owned()
    }

    pub fn uploaded_files(&self) -> usize {
        std::fs::read_dir(self.images.dir()).map(|dir| dir.count()).unwrap_or(0)
    }

    pub fn token_for(&self, user: &User) -> String {
        self.credentials.issue_token(user.id, &user.email).unwrap()
    }

    pub fn state(&self) -> AppState {
        AppState {
            places: self.places.clone(),
            users: self.users.clone(),
            credentials: self.credentials.clone(),
            images: self.images.clone(),
        }
    }

    pub fn app(&self) -> Router {
        let config = ServerConfig {
            port: 0,
            max_request_size_bytes: 1024 * 1024,
            cors_origins: vec!["*".into()],
        };
        crate::server::app(self.state(), &config)
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.upload_dir);
    }
}

/// Hand-built multipart/form-data body. Returns the content type and bytes.
pub fn multipart_body(fields: &[(&str, &str)], image: Option<(&str, &[u8])>) -> (String, Vec<u8>) {
    let boundary = format!("places-api-{}", Uuid::new_v4().simple());
    let mut body = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        body.extend_from_slice(format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes());
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }

    if let Some((content_type, bytes)) = image {
        body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        body.extend_from_slice(b"Content-Disposition: form-data; name=\"image\"; filename=\"upload\"\r\n");
        body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());
    (format!("multipart/form-data; boundary={}", boundary), body)
}
