//! Users repository for database operations

use sqlx::{Pool, Postgres};

use crate::{error::AppResult, models::Usuario};

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Option<Usuario>> {
        let user = sqlx::query_as::<_, Usuario>("SELECT * FROM usuarios WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Get user by normalized RUT
    pub async fn get_by_rut(&self, rut: &str) -> AppResult<Option<Usuario>> {
        let user = sqlx::query_as::<_, Usuario>("SELECT * FROM usuarios WHERE rut = $1")
            .bind(rut)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Total number of registered users (dashboard)
    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM usuarios")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
