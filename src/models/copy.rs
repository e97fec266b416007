//! Copy ("ejemplar") model: one physical unit of a document

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::enums::CopyStatus;

/// Physical copy of a document
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Ejemplar {
    pub id: i32,
    pub documento_id: i32,
    /// Unique shelf label; auto-created copies get an `AUTO-{documento_id}-` prefix
    pub codigo: String,
    pub estado: CopyStatus,
    pub created_at: DateTime<Utc>,
}
