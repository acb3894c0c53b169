use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use std::time::Duration;
use tracing::{error, info};

use skyport_core::CoreError;

#[derive(Clone)]
pub struct DbClient {
    pub pool: Pool<Postgres>,
}

impl DbClient {
    pub async fn new(connection_string: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(connection_string)
            .await?;

        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        info!("Running database migrations...");
        sqlx::migrate!("../migrations").run(&self.pool).await?;
        info!("Migrations completed successfully.");
        Ok(())
    }
}

/// Maps a driver error onto the core taxonomy. Unique violations become
/// `Conflict`, foreign key violations `NotFound`; the rest is an opaque
/// storage failure.
pub(crate) fn map_db_error(context: &'static str, e: sqlx::Error) -> CoreError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return CoreError::Conflict(format!(
                "{}: {}",
                context,
                db_err.constraint().unwrap_or("unique constraint")
            ));
        }
        if db_err.is_foreign_key_violation() {
            return CoreError::not_found(
                "Reference",
                db_err.constraint().unwrap_or("foreign key"),
            );
        }
    }
    error!(error = %e, "{} failed", context);
    CoreError::Storage(format!("{}: {}", context, e))
}
