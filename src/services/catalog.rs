//! Catalog service for document management

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        document::{CreateDocumento, Documento, DocumentoQuery, ListaDocumentos, UpdateDocumento},
        DocumentType,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    fn parse_tipo(raw: &str) -> AppResult<DocumentType> {
        raw.parse().map_err(|_| {
            AppError::Validation(format!(
                "tipo inválido: {} (se espera libro, audio, video o revista)",
                raw
            ))
        })
    }

    fn check_categoria(categoria: Option<&str>) -> AppResult<()> {
        if let Some(c) = categoria {
            if c.trim().is_empty() {
                return Err(AppError::Validation(
                    "categoria no puede estar vacía".to_string(),
                ));
            }
        }
        Ok(())
    }

    pub async fn create(&self, data: CreateDocumento) -> AppResult<Documento> {
        data.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        let tipo = Self::parse_tipo(&data.tipo)?;
        Self::check_categoria(data.categoria.as_deref())?;
        self.repository.documents.create(&data, tipo).await
    }

    pub async fn get(&self, id: i32) -> AppResult<Documento> {
        self.repository
            .documents
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Documento no encontrado".to_string()))
    }

    pub async fn get_by_isbn(&self, isbn: &str) -> AppResult<Documento> {
        self.repository
            .documents
            .get_by_isbn(isbn)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("No existe un documento con ISBN {}", isbn))
            })
    }

    pub async fn list(&self, query: DocumentoQuery) -> AppResult<ListaDocumentos> {
        if let Some(ref tipo) = query.tipo {
            Self::parse_tipo(tipo)?;
        }
        let (items, total_items) = self.repository.documents.list(&query).await?;
        Ok(ListaDocumentos { total_items, items })
    }

    pub async fn search(
        &self,
        termino: &str,
        page: Option<i64>,
        size: Option<i64>,
    ) -> AppResult<Vec<Documento>> {
        if termino.trim().is_empty() {
            return Err(AppError::Validation(
                "El término de búsqueda no puede estar vacío".to_string(),
            ));
        }
        let page = page.unwrap_or(1).max(1);
        let size = size.unwrap_or(10).clamp(1, 100);
        self.repository.documents.search(termino, page, size).await
    }

    pub async fn update(&self, id: i32, data: UpdateDocumento) -> AppResult<Documento> {
        if data.is_empty() {
            return Err(AppError::Validation(
                "No hay campos para actualizar".to_string(),
            ));
        }

        let tipo = match data.tipo {
            Some(ref raw) => Some(Self::parse_tipo(raw)?),
            None => None,
        };
        Self::check_categoria(data.categoria.as_deref())?;

        self.repository
            .documents
            .update(id, &data, tipo)
            .await?
            .ok_or_else(|| AppError::NotFound("Documento no encontrado".to_string()))
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let deleted = self.repository.documents.delete(id).await?;
        if !deleted {
            return Err(AppError::NotFound("Documento no encontrado".to_string()));
        }
        Ok(())
    }
}
