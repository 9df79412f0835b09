// handlers/protected/auth/mod.rs - Account handlers for the signed-in caller

pub mod profile; // GET /auth/profile, PUT /auth/profile
pub mod session; // POST /auth/logout, GET /auth/token-info

pub use profile::{profile_get, profile_put};
pub use session::{logout, token_info};
