//! Document (catalog entry) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::enums::DocumentType;

/// Document model from database.
///
/// The `edicion` column carries the ISBN; lookups "by ISBN" match against it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Documento {
    pub id: i32,
    pub tipo: DocumentType,
    pub titulo: String,
    pub autor: Option<String>,
    pub editorial: Option<String>,
    pub resumen: Option<String>,
    pub link: Option<String>,
    pub anio: Option<i32>,
    pub edicion: Option<String>,
    pub categoria: Option<String>,
    pub tipo_medio: Option<String>,
    pub existencias: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create document request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateDocumento {
    pub tipo: String,
    #[validate(length(min = 1, message = "titulo no puede estar vacío"))]
    pub titulo: String,
    pub autor: Option<String>,
    pub editorial: Option<String>,
    pub resumen: Option<String>,
    pub link: Option<String>,
    pub anio: Option<i32>,
    pub edicion: Option<String>,
    pub categoria: Option<String>,
    pub tipo_medio: Option<String>,
    pub existencias: Option<i32>,
}

/// Partial update request (PATCH). All fields optional; sending none is an error.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateDocumento {
    pub tipo: Option<String>,
    pub titulo: Option<String>,
    pub autor: Option<String>,
    pub editorial: Option<String>,
    pub resumen: Option<String>,
    pub link: Option<String>,
    pub anio: Option<i32>,
    pub edicion: Option<String>,
    pub categoria: Option<String>,
    pub tipo_medio: Option<String>,
    pub existencias: Option<i32>,
}

impl UpdateDocumento {
    /// True when the PATCH body carries no field at all
    pub fn is_empty(&self) -> bool {
        self.tipo.is_none()
            && self.titulo.is_none()
            && self.autor.is_none()
            && self.editorial.is_none()
            && self.resumen.is_none()
            && self.link.is_none()
            && self.anio.is_none()
            && self.edicion.is_none()
            && self.categoria.is_none()
            && self.tipo_medio.is_none()
            && self.existencias.is_none()
    }
}

/// Query parameters for listing documents
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct DocumentoQuery {
    /// Filter by document type (libro, audio, video, revista)
    pub tipo: Option<String>,
    /// Filter by category
    pub categoria: Option<String>,
    /// Page number (1-based)
    pub page: Option<i64>,
    /// Page size (max 100)
    pub size: Option<i64>,
}

/// Query parameters for free-text document search
#[derive(Debug, Deserialize, IntoParams)]
pub struct DocumentoSearchQuery {
    /// Substring matched case-insensitively against titulo and autor
    pub termino: String,
    pub page: Option<i64>,
    pub size: Option<i64>,
}

/// Paginated document listing
#[derive(Debug, Serialize, ToSchema)]
pub struct ListaDocumentos {
    pub total_items: i64,
    pub items: Vec<Documento>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_patch_is_detected() {
        assert!(UpdateDocumento::default().is_empty());

        let patch = UpdateDocumento {
            titulo: Some("Rayuela".to_string()),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }
}
