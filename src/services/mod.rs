//! Business operations on top of the provider seams.

pub mod auth;
pub mod bootstrap;
pub mod error;
pub mod records;
pub mod user_settings;

pub use auth::{AuthService, Redirects};
pub use bootstrap::{report_bootstrap_failures, BootstrapFailure, SettingsBootstrapper};
pub use error::{ServiceError, ServiceResult};
pub use records::RecordService;
pub use user_settings::{UserSettingsService, USER_SETTINGS_TABLE};
