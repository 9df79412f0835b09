use std::sync::Arc;

use tokio::sync::mpsc::UnboundedReceiver;

use crate::config::AppConfig;
use crate::models::{Contract, Customer};
use crate::provider::{IdentityProvider, RecordStore};
use crate::services::{
    AuthService, BootstrapFailure, RecordService, Redirects, SettingsBootstrapper, UserSettingsService,
};

pub const CUSTOMERS_TABLE: &str = "customers";
pub const CONTRACTS_TABLE: &str = "contracts";

/// Shared handler state. Every collaborator is constructed here from the
/// injected provider clients; nothing is read from ambient globals.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub identity: Arc<dyn IdentityProvider>,
    pub auth: Arc<AuthService>,
    pub settings: Arc<UserSettingsService>,
    pub customers: Arc<RecordService<Customer>>,
    pub contracts: Arc<RecordService<Contract>>,
}

impl AppState {
    /// Also returns the receiving end of the settings bootstrap failure
    /// channel; hand it to [`crate::services::report_bootstrap_failures`].
    pub fn new(
        config: AppConfig,
        identity: Arc<dyn IdentityProvider>,
        store: Arc<dyn RecordStore>,
    ) -> (Self, UnboundedReceiver<BootstrapFailure>) {
        let (bootstrapper, failures) = SettingsBootstrapper::new(store.clone());
        let redirects = Redirects::from(&config.frontend);

        let state = Self {
            auth: Arc::new(AuthService::new(identity.clone(), bootstrapper, redirects)),
            settings: Arc::new(UserSettingsService::new(store.clone())),
            customers: Arc::new(RecordService::new(store.clone(), CUSTOMERS_TABLE, "Customer")),
            contracts: Arc::new(RecordService::new(store, CONTRACTS_TABLE, "Contract")),
            identity,
            config: Arc::new(config),
        };
        (state, failures)
    }
}
