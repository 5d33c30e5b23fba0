pub mod place;
pub mod user;

pub use place::Place;
pub use user::User;
