// handlers/protected/mod.rs - endpoints behind jwt_auth_middleware
//
// Handlers read the caller from the `AuthUser` request extension.
pub mod places;

pub use places::{create_place, delete_place, update_place};
