pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod provider;
pub mod services;
pub mod state;
pub mod testing;

pub use app::app;
pub use state::AppState;
