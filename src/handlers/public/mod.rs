// handlers/public/mod.rs - endpoints that need no token
pub mod places;
pub mod users;

pub use places::{get_place, list_user_places};
pub use users::{list_users, login, signup};
