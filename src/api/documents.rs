//! Document catalog endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{
        document::{
            CreateDocumento, DocumentoQuery, DocumentoSearchQuery, ListaDocumentos,
            UpdateDocumento,
        },
        Documento,
    },
    AppState,
};

use super::AdminUser;

#[derive(Serialize, ToSchema)]
pub struct Mensaje {
    pub mensaje: String,
}

/// Create a new document
#[utoipa::path(
    post,
    path = "/documentos",
    tag = "documentos",
    security(("bearer_auth" = [])),
    request_body = CreateDocumento,
    responses(
        (status = 201, description = "Document created", body = Documento),
        (status = 400, description = "Invalid type or empty title"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn crear_documento(
    State(state): State<AppState>,
    AdminUser(_claims): AdminUser,
    Json(request): Json<CreateDocumento>,
) -> AppResult<(StatusCode, Json<Documento>)> {
    let doc = state.services.catalog.create(request).await?;
    Ok((StatusCode::CREATED, Json(doc)))
}

/// List documents with optional filters
#[utoipa::path(
    get,
    path = "/documentos",
    tag = "documentos",
    params(DocumentoQuery),
    responses(
        (status = 200, description = "Paginated documents", body = ListaDocumentos),
        (status = 400, description = "Invalid type filter")
    )
)]
pub async fn listar_documentos(
    State(state): State<AppState>,
    Query(query): Query<DocumentoQuery>,
) -> AppResult<Json<ListaDocumentos>> {
    let lista = state.services.catalog.list(query).await?;
    Ok(Json(lista))
}

/// Free-text search over title and author
#[utoipa::path(
    get,
    path = "/documentos/buscar",
    tag = "documentos",
    params(DocumentoSearchQuery),
    responses(
        (status = 200, description = "Matching documents", body = Vec<Documento>),
        (status = 400, description = "Empty search term")
    )
)]
pub async fn buscar_documentos(
    State(state): State<AppState>,
    Query(query): Query<DocumentoSearchQuery>,
) -> AppResult<Json<Vec<Documento>>> {
    let docs = state
        .services
        .catalog
        .search(&query.termino, query.page, query.size)
        .await?;
    Ok(Json(docs))
}

/// Get a document by ISBN
#[utoipa::path(
    get,
    path = "/documentos/buscar-por-isbn/{isbn}",
    tag = "documentos",
    params(
        ("isbn" = String, Path, description = "Document ISBN")
    ),
    responses(
        (status = 200, description = "Document found", body = Documento),
        (status = 404, description = "Document not found")
    )
)]
pub async fn buscar_documento_por_isbn(
    State(state): State<AppState>,
    Path(isbn): Path<String>,
) -> AppResult<Json<Documento>> {
    let doc = state.services.catalog.get_by_isbn(&isbn).await?;
    Ok(Json(doc))
}

/// Get a document by ID
#[utoipa::path(
    get,
    path = "/documentos/{id}",
    tag = "documentos",
    params(
        ("id" = i32, Path, description = "Document ID")
    ),
    responses(
        (status = 200, description = "Document found", body = Documento),
        (status = 404, description = "Document not found")
    )
)]
pub async fn obtener_documento(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Documento>> {
    let doc = state.services.catalog.get(id).await?;
    Ok(Json(doc))
}

/// Partially update a document
#[utoipa::path(
    patch,
    path = "/documentos/{id}",
    tag = "documentos",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Document ID")
    ),
    request_body = UpdateDocumento,
    responses(
        (status = 200, description = "Document updated", body = Documento),
        (status = 400, description = "Empty patch or invalid type"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Document not found")
    )
)]
pub async fn actualizar_documento(
    State(state): State<AppState>,
    AdminUser(_claims): AdminUser,
    Path(id): Path<i32>,
    Json(request): Json<UpdateDocumento>,
) -> AppResult<Json<Documento>> {
    let doc = state.services.catalog.update(id, request).await?;
    Ok(Json(doc))
}

/// Delete a document
#[utoipa::path(
    delete,
    path = "/documentos/{id}",
    tag = "documentos",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Document ID")
    ),
    responses(
        (status = 200, description = "Document deleted", body = Mensaje),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Document not found")
    )
)]
pub async fn eliminar_documento(
    State(state): State<AppState>,
    AdminUser(_claims): AdminUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Mensaje>> {
    state.services.catalog.delete(id).await?;
    Ok(Json(Mensaje {
        mensaje: "Documento eliminado exitosamente".to_string(),
    }))
}
