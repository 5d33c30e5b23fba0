// handlers/mod.rs - two security tiers
//
// Public (no auth) → Protected (JWT auth, see middleware::auth)
pub mod protected;
pub mod public;
pub mod system;

mod upload;

pub use upload::UploadForm;

use uuid::Uuid;

use crate::error::ApiError;

/// Path ids that are not UUIDs can never match a record.
pub(crate) fn parse_id(raw: &str, not_found: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::not_found(not_found))
}
