//! Shared handler state.

use std::sync::Arc;

use boutique_db::Database;

use crate::auth::JwtManager;
use crate::config::AppConfig;
use crate::notify::OrderNotifier;

/// Everything a handler can reach. Cloned per request; every field is a
/// cheap handle.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub jwt: Arc<JwtManager>,
    pub notifier: Arc<dyn OrderNotifier>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(db: Database, config: AppConfig, notifier: Arc<dyn OrderNotifier>) -> Self {
        let jwt = JwtManager::new(&config.jwt_secret, config.jwt_lifetime_secs);

        AppState {
            db,
            jwt: Arc::new(jwt),
            notifier,
            config: Arc::new(config),
        }
    }
}
