use async_trait::async_trait;
use chrono::{DateTime, Utc};
use skyport_core::identity::{StoredUser, User, UserUpdate};
use skyport_core::repository::UserRepository;
use skyport_core::{CoreError, CoreResult};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::map_db_error;

const USER_COLUMNS: &str = "id, email, password_hash, first_name, last_name, is_staff, created_at";

pub struct StoreUserRepository {
    pool: PgPool,
}

impl StoreUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    password_hash: String,
    first_name: String,
    last_name: String,
    is_staff: bool,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for StoredUser {
    fn from(row: UserRow) -> Self {
        StoredUser {
            user: User {
                id: row.id,
                email: row.email,
                first_name: row.first_name,
                last_name: row.last_name,
                is_staff: row.is_staff,
                created_at: row.created_at,
            },
            password_hash: row.password_hash,
        }
    }
}

#[async_trait]
impl UserRepository for StoreUserRepository {
    async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        first_name: &str,
        last_name: &str,
        is_staff: bool,
    ) -> CoreResult<User> {
        let query = format!(
            r#"
            INSERT INTO users (id, email, password_hash, first_name, last_name, is_staff)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            USER_COLUMNS
        );
        sqlx::query_as::<_, UserRow>(&query)
            .bind(Uuid::new_v4())
            .bind(email)
            .bind(password_hash)
            .bind(first_name)
            .bind(last_name)
            .bind(is_staff)
            .fetch_one(&self.pool)
            .await
            .map(|row| StoredUser::from(row).user)
            .map_err(|e| match map_db_error("create user", e) {
                CoreError::Conflict(_) => {
                    CoreError::Conflict(format!("user with email '{}' already exists", email))
                }
                other => other,
            })
    }

    async fn find_by_email(&self, email: &str) -> CoreResult<Option<StoredUser>> {
        let query = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        sqlx::query_as::<_, UserRow>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map(|row| row.map(StoredUser::from))
            .map_err(|e| map_db_error("find user", e))
    }

    async fn get_user(&self, id: Uuid) -> CoreResult<User> {
        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        sqlx::query_as::<_, UserRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_error("get user", e))?
            .map(|row| StoredUser::from(row).user)
            .ok_or_else(|| CoreError::not_found("User", id))
    }

    async fn update_user(&self, id: Uuid, update: &UserUpdate) -> CoreResult<User> {
        let query = format!(
            r#"
            UPDATE users
            SET first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                password_hash = COALESCE($4, password_hash)
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        );
        sqlx::query_as::<_, UserRow>(&query)
            .bind(id)
            .bind(update.first_name.as_deref())
            .bind(update.last_name.as_deref())
            .bind(update.password_hash.as_deref())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_error("update user", e))?
            .map(|row| StoredUser::from(row).user)
            .ok_or_else(|| CoreError::not_found("User", id))
    }
}
