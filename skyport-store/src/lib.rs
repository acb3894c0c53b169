pub mod app_config;
pub mod catalog_repo;
pub mod database;
mod flight_records;
pub mod order_repo;
pub mod user_repo;

pub use app_config::{Config, StorageBackend};
pub use catalog_repo::StoreCatalogRepository;
pub use database::DbClient;
pub use order_repo::StoreOrderRepository;
pub use user_repo::StoreUserRepository;
