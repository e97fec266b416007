//! Library (physical location) model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Library model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Biblioteca {
    pub id: i32,
    pub nombre: String,
    pub activo: bool,
    pub created_at: DateTime<Utc>,
}
