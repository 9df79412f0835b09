pub mod auth;
pub mod fault;
pub mod response;

pub use auth::{extract_bearer, require_auth, AuthUser};
pub use fault::{fault_boundary, panic_response};
pub use response::{ApiResponse, ApiResult};
