pub mod manager;
pub mod models;
pub mod repository;

pub use manager::{DatabaseError, DatabaseManager};
pub use models::{Place, User};
pub use repository::{PgPlaceRepository, PgUserRepository, PlaceRepository, UserRepository};
