use std::sync::Arc;

use skyport_core::memory::InMemoryStore;
use skyport_core::placement::OrderPlacement;
use skyport_core::repository::{CatalogRepository, OrderRepository, UserRepository};
use skyport_store::{DbClient, StoreCatalogRepository, StoreOrderRepository, StoreUserRepository};

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub access_expiration: u64,
    pub refresh_expiration: u64,
    pub min_password_length: usize,
}

impl From<&skyport_store::app_config::AuthConfig> for AuthConfig {
    fn from(config: &skyport_store::app_config::AuthConfig) -> Self {
        Self {
            secret: config.jwt_secret.clone(),
            access_expiration: config.access_token_seconds,
            refresh_expiration: config.refresh_token_seconds,
            min_password_length: config.min_password_length,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogRepository>,
    pub orders: Arc<dyn OrderRepository>,
    pub users: Arc<dyn UserRepository>,
    pub placement: OrderPlacement,
    pub auth: AuthConfig,
}

impl AppState {
    pub fn postgres(db: &DbClient, auth: AuthConfig) -> Self {
        let orders = Arc::new(StoreOrderRepository::new(db.pool.clone()));
        Self {
            catalog: Arc::new(StoreCatalogRepository::new(db.pool.clone())),
            orders: orders.clone(),
            users: Arc::new(StoreUserRepository::new(db.pool.clone())),
            placement: OrderPlacement::new(orders),
            auth,
        }
    }

    pub fn in_memory(store: InMemoryStore, auth: AuthConfig) -> Self {
        let store = Arc::new(store);
        Self {
            catalog: store.clone(),
            orders: store.clone(),
            users: store.clone(),
            placement: OrderPlacement::new(store),
            auth,
        }
    }
}
