//! Libraries repository for database operations

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{error::AppResult, models::Biblioteca};

#[derive(Clone)]
pub struct LibrariesRepository {
    pool: Pool<Postgres>,
}

impl LibrariesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get library by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Option<Biblioteca>> {
        let lib = sqlx::query_as::<_, Biblioteca>("SELECT * FROM bibliotecas WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(lib)
    }

    /// First active library, creating the default one when none exists.
    /// Used by the quick-loan path when no library was provided.
    pub async fn get_active_or_create_default(&self) -> AppResult<Biblioteca> {
        let existing = sqlx::query_as::<_, Biblioteca>(
            "SELECT * FROM bibliotecas WHERE activo = TRUE ORDER BY id LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        if let Some(lib) = existing {
            return Ok(lib);
        }

        let lib = sqlx::query_as::<_, Biblioteca>(
            r#"
            INSERT INTO bibliotecas (nombre, activo, created_at)
            VALUES ($1, TRUE, $2)
            RETURNING *
            "#,
        )
        .bind("Biblioteca Principal")
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(lib)
    }
}
