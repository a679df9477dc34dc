use sliderblend_core::models::{CreateUser, User};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use super::error::PersistenceError;

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self, user), fields(db.table = "users", db.operation = "insert"))]
    pub async fn create(&self, user: CreateUser) -> Result<User, PersistenceError> {
        let user = sqlx::query_as::<Postgres, User>(
            r#"
            INSERT INTO users (telegram_username, telegram_user_id, first_name, last_name)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&user.telegram_username)
        .bind(&user.telegram_user_id)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    #[tracing::instrument(skip(self), fields(db.table = "users", db.operation = "select", db.record_id = %id))]
    pub async fn get(&self, id: Uuid) -> Result<Option<User>, PersistenceError> {
        let user = sqlx::query_as::<Postgres, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    #[tracing::instrument(skip(self), fields(db.table = "users", db.operation = "select"))]
    pub async fn get_by_telegram_id(
        &self,
        telegram_user_id: &str,
    ) -> Result<Option<User>, PersistenceError> {
        let user =
            sqlx::query_as::<Postgres, User>("SELECT * FROM users WHERE telegram_user_id = $1")
                .bind(telegram_user_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(user)
    }

    #[tracing::instrument(skip(self), fields(db.table = "users", db.operation = "update", db.record_id = %id))]
    pub async fn set_status(
        &self,
        id: Uuid,
        is_active: bool,
        is_blocked: bool,
    ) -> Result<User, PersistenceError> {
        sqlx::query_as::<Postgres, User>(
            r#"
            UPDATE users
            SET is_active = $2, is_blocked = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(is_active)
        .bind(is_blocked)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| PersistenceError::NotFound {
            entity: "User",
            id: id.to_string(),
        })
    }
}
