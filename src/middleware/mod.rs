pub mod auth;
pub mod response;
pub mod uploads;

pub use auth::{jwt_auth_middleware, AuthUser};
pub use response::{ApiResponse, ApiResult};
pub use uploads::{discard_failed_uploads, reject_with_upload, UploadedFile};
