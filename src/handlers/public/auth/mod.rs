// handlers/public/auth/mod.rs - Public authentication handlers

pub mod session;      // POST /auth/login, POST /auth/refresh
pub mod user;         // POST /auth/register, POST /auth/reset-password
pub mod verification; // GET /auth/verify-email, POST /auth/resend-verification

pub use session::{login, refresh};
pub use user::{register, reset_password};
pub use verification::{resend_verification, verify_email};
