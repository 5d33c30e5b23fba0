pub mod error;
pub mod place_service;
pub mod user_service;
pub mod validation;

pub use error::ServiceError;
pub use place_service::{NewPlace, PlaceService, PlaceUpdate};
pub use user_service::{AuthSession, Login, Signup, UserService};
