//! Documents repository for database operations

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{
        document::{CreateDocumento, Documento, DocumentoQuery, UpdateDocumento},
        enums::DocumentType,
    },
};

#[derive(Clone)]
pub struct DocumentsRepository {
    pool: Pool<Postgres>,
}

impl DocumentsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get document by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Option<Documento>> {
        let doc = sqlx::query_as::<_, Documento>("SELECT * FROM documentos WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(doc)
    }

    /// Get document by ISBN (the `edicion` column)
    pub async fn get_by_isbn(&self, isbn: &str) -> AppResult<Option<Documento>> {
        let doc = sqlx::query_as::<_, Documento>("SELECT * FROM documentos WHERE edicion = $1")
            .bind(isbn)
            .fetch_optional(&self.pool)
            .await?;
        Ok(doc)
    }

    /// Create a new document
    pub async fn create(&self, data: &CreateDocumento, tipo: DocumentType) -> AppResult<Documento> {
        let now = Utc::now();

        let doc = sqlx::query_as::<_, Documento>(
            r#"
            INSERT INTO documentos (
                tipo, titulo, autor, editorial, resumen, link, anio,
                edicion, categoria, tipo_medio, existencias, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $12)
            RETURNING *
            "#,
        )
        .bind(tipo)
        .bind(&data.titulo)
        .bind(&data.autor)
        .bind(&data.editorial)
        .bind(&data.resumen)
        .bind(&data.link)
        .bind(data.anio)
        .bind(&data.edicion)
        .bind(&data.categoria)
        .bind(&data.tipo_medio)
        .bind(data.existencias)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(doc)
    }

    /// List documents with optional type/category filters, paginated
    pub async fn list(&self, query: &DocumentoQuery) -> AppResult<(Vec<Documento>, i64)> {
        let page = query.page.unwrap_or(1);
        let size = query.size.unwrap_or(10).clamp(1, 100);
        let offset = super::page_offset(page, size);

        let mut conditions = Vec::new();
        let mut params: Vec<String> = Vec::new();

        if let Some(ref tipo) = query.tipo {
            params.push(tipo.clone());
            conditions.push(format!("tipo = ${}", params.len()));
        }

        if let Some(ref categoria) = query.categoria {
            params.push(categoria.clone());
            conditions.push(format!("categoria = ${}", params.len()));
        }

        let where_clause = if conditions.is_empty() {
            "1=1".to_string()
        } else {
            conditions.join(" AND ")
        };

        let count_query = format!("SELECT COUNT(*) FROM documentos WHERE {}", where_clause);
        let mut count = sqlx::query_scalar::<_, i64>(&count_query);
        for p in &params {
            count = count.bind(p);
        }
        let total = count.fetch_one(&self.pool).await?;

        let select_query = format!(
            "SELECT * FROM documentos WHERE {} ORDER BY id LIMIT {} OFFSET {}",
            where_clause, size, offset
        );
        let mut select = sqlx::query_as::<_, Documento>(&select_query);
        for p in &params {
            select = select.bind(p);
        }
        let docs = select.fetch_all(&self.pool).await?;

        Ok((docs, total))
    }

    /// Case-insensitive substring search over titulo and autor
    pub async fn search(&self, termino: &str, page: i64, size: i64) -> AppResult<Vec<Documento>> {
        let offset = super::page_offset(page, size);
        let pattern = format!("%{}%", termino);

        let docs = sqlx::query_as::<_, Documento>(
            r#"
            SELECT * FROM documentos
            WHERE titulo ILIKE $1 OR autor ILIKE $1
            ORDER BY titulo
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(&pattern)
        .bind(size)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(docs)
    }

    /// Partially update a document. Returns None when the document is missing.
    pub async fn update(
        &self,
        id: i32,
        data: &UpdateDocumento,
        tipo: Option<DocumentType>,
    ) -> AppResult<Option<Documento>> {
        let now = Utc::now();

        let doc = sqlx::query_as::<_, Documento>(
            r#"
            UPDATE documentos SET
                tipo = COALESCE($1::text, tipo),
                titulo = COALESCE($2::text, titulo),
                autor = COALESCE($3::text, autor),
                editorial = COALESCE($4::text, editorial),
                resumen = COALESCE($5::text, resumen),
                link = COALESCE($6::text, link),
                anio = COALESCE($7::int, anio),
                edicion = COALESCE($8::text, edicion),
                categoria = COALESCE($9::text, categoria),
                tipo_medio = COALESCE($10::text, tipo_medio),
                existencias = COALESCE($11::int, existencias),
                updated_at = $12
            WHERE id = $13
            RETURNING *
            "#,
        )
        .bind(tipo)
        .bind(&data.titulo)
        .bind(&data.autor)
        .bind(&data.editorial)
        .bind(&data.resumen)
        .bind(&data.link)
        .bind(data.anio)
        .bind(&data.edicion)
        .bind(&data.categoria)
        .bind(&data.tipo_medio)
        .bind(data.existencias)
        .bind(now)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(doc)
    }

    /// Delete a document. Returns false when it did not exist.
    pub async fn delete(&self, id: i32) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM documentos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Total number of documents (dashboard)
    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documentos")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
