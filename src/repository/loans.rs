//! Loans repository for database operations
//!
//! Both creation paths run inside a transaction and take row-level locks on
//! the copies they consume, so two concurrent requests can never lend the
//! same copy twice.

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Row};

use crate::{
    error::{AppError, AppResult},
    models::{
        loan::{CreateLoan, PrestamoStats},
        CopyStatus, DocumentType, Ejemplar, LoanStatus, LoanType, Prestamo,
    },
};

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Postgres>,
}

/// Shelf code for an auto-created copy. The random suffix keeps the UNIQUE
/// constraint on `codigo` safe under concurrent quick-loans for the same
/// document.
fn auto_codigo(documento_id: i32) -> String {
    format!("AUTO-{}-{}", documento_id, uuid::Uuid::new_v4().simple())
}

impl LoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get loan by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Option<Prestamo>> {
        let loan = sqlx::query_as::<_, Prestamo>("SELECT * FROM prestamos WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(loan)
    }

    /// Number of loans the user currently holds in activo or vencido state
    pub async fn count_open_for_user(&self, usuario_id: i32) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM prestamos WHERE usuario_id = $1 AND estado IN ('activo', 'vencido')",
        )
        .bind(usuario_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Whether the user holds any loan past its due date, swept or not
    pub async fn has_overdue(&self, usuario_id: i32, ahora: DateTime<Utc>) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM prestamos
                WHERE usuario_id = $1
                  AND (estado = 'vencido'
                       OR (estado = 'activo' AND fecha_devolucion_estimada < $2))
            )
            "#,
        )
        .bind(usuario_id)
        .bind(ahora)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Quick-loan path: lock one available copy of the document and lend it.
    ///
    /// When the document has no copies at all, one is auto-created so legacy
    /// catalog rows without inventory stay lendable. When copies exist but
    /// all are lent out, the call fails with a conflict.
    pub async fn create_for_document(
        &self,
        usuario_id: i32,
        biblioteca_id: i32,
        documento_id: i32,
        tipo: LoanType,
        fecha_devolucion: DateTime<Utc>,
    ) -> AppResult<(Prestamo, Ejemplar)> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        let copy = sqlx::query_as::<_, Ejemplar>(
            r#"
            SELECT * FROM ejemplares
            WHERE documento_id = $1 AND estado = 'disponible'
            ORDER BY id
            LIMIT 1
            FOR UPDATE SKIP LOCKED
            "#,
        )
        .bind(documento_id)
        .fetch_optional(&mut *tx)
        .await?;

        let copy = match copy {
            Some(copy) => copy,
            None => {
                let total: i64 =
                    sqlx::query_scalar("SELECT COUNT(*) FROM ejemplares WHERE documento_id = $1")
                        .bind(documento_id)
                        .fetch_one(&mut *tx)
                        .await?;

                if total > 0 {
                    return Err(AppError::Conflict(
                        "No hay ejemplares disponibles para este documento".to_string(),
                    ));
                }

                let codigo = auto_codigo(documento_id);
                sqlx::query_as::<_, Ejemplar>(
                    r#"
                    INSERT INTO ejemplares (documento_id, codigo, estado, created_at)
                    VALUES ($1, $2, 'disponible', $3)
                    RETURNING *
                    "#,
                )
                .bind(documento_id)
                .bind(&codigo)
                .bind(now)
                .fetch_one(&mut *tx)
                .await?
            }
        };

        let loan = sqlx::query_as::<_, Prestamo>(
            r#"
            INSERT INTO prestamos (
                tipo_prestamo, usuario_id, biblioteca_id, fecha_prestamo, hora_prestamo,
                fecha_devolucion_estimada, hora_devolucion_estimada, estado, notificado
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, 'activo', FALSE)
            RETURNING *
            "#,
        )
        .bind(tipo)
        .bind(usuario_id)
        .bind(biblioteca_id)
        .bind(now)
        .bind(now.time())
        .bind(fecha_devolucion)
        .bind(fecha_devolucion.time())
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO detalle_prestamos (prestamo_id, ejemplar_id) VALUES ($1, $2)")
            .bind(loan.id)
            .bind(copy.id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE ejemplares SET estado = 'prestado' WHERE id = $1")
            .bind(copy.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        let copy = Ejemplar {
            estado: CopyStatus::Prestado,
            ..copy
        };
        Ok((loan, copy))
    }

    /// Status and document type for a set of copies, keyed by copy ID
    pub async fn get_copy_states(
        &self,
        ejemplar_ids: &[i32],
    ) -> AppResult<Vec<(i32, CopyStatus, DocumentType)>> {
        let rows = sqlx::query(
            r#"
            SELECT e.id, e.estado, d.tipo
            FROM ejemplares e
            JOIN documentos d ON d.id = e.documento_id
            WHERE e.id = ANY($1)
            "#,
        )
        .bind(ejemplar_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut states = Vec::with_capacity(rows.len());
        for row in rows {
            states.push((row.try_get("id")?, row.try_get("estado")?, row.try_get("tipo")?));
        }
        Ok(states)
    }

    /// Full-loan path: lend an explicit set of copies in one transaction.
    ///
    /// The copies are re-checked under a row lock so a copy lent between the
    /// service pre-check and this call aborts the whole loan.
    pub async fn create(
        &self,
        data: &CreateLoan,
        fecha_devolucion: DateTime<Utc>,
    ) -> AppResult<Prestamo> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        let locked: Vec<i32> = sqlx::query_scalar(
            r#"
            SELECT id FROM ejemplares
            WHERE id = ANY($1) AND estado = 'disponible'
            FOR UPDATE
            "#,
        )
        .bind(&data.ejemplar_ids)
        .fetch_all(&mut *tx)
        .await?;

        if locked.len() != data.ejemplar_ids.len() {
            return Err(AppError::Conflict(
                "Uno o más ejemplares dejaron de estar disponibles".to_string(),
            ));
        }

        let loan = sqlx::query_as::<_, Prestamo>(
            r#"
            INSERT INTO prestamos (
                tipo_prestamo, usuario_id, bibliotecario_id, fecha_prestamo, hora_prestamo,
                fecha_devolucion_estimada, hora_devolucion_estimada, estado, notificado
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, 'activo', FALSE)
            RETURNING *
            "#,
        )
        .bind(data.tipo)
        .bind(data.usuario_id)
        .bind(data.bibliotecario_id)
        .bind(now)
        .bind(now.time())
        .bind(fecha_devolucion)
        .bind(fecha_devolucion.time())
        .fetch_one(&mut *tx)
        .await?;

        for ejemplar_id in &data.ejemplar_ids {
            sqlx::query("INSERT INTO detalle_prestamos (prestamo_id, ejemplar_id) VALUES ($1, $2)")
                .bind(loan.id)
                .bind(ejemplar_id)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query("UPDATE ejemplares SET estado = 'prestado' WHERE id = ANY($1)")
            .bind(&data.ejemplar_ids)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(loan)
    }

    /// Flip every past-due activo loan to vencido and return the swept rows,
    /// oldest due date first. A single UPDATE, so concurrent sweeps cannot
    /// double-process a loan; a second sweep with the same clock is a no-op.
    pub async fn sweep_overdue(
        &self,
        tipo: Option<LoanType>,
        ahora: DateTime<Utc>,
    ) -> AppResult<Vec<Prestamo>> {
        let loans = match tipo {
            Some(tipo) => {
                sqlx::query_as::<_, Prestamo>(
                    r#"
                    WITH swept AS (
                        UPDATE prestamos
                        SET estado = 'vencido'
                        WHERE estado = 'activo'
                          AND tipo_prestamo = $1
                          AND fecha_devolucion_estimada < $2
                        RETURNING *
                    )
                    SELECT * FROM swept ORDER BY fecha_devolucion_estimada ASC
                    "#,
                )
                .bind(tipo)
                .bind(ahora)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Prestamo>(
                    r#"
                    WITH swept AS (
                        UPDATE prestamos
                        SET estado = 'vencido'
                        WHERE estado = 'activo'
                          AND fecha_devolucion_estimada < $1
                        RETURNING *
                    )
                    SELECT * FROM swept ORDER BY fecha_devolucion_estimada ASC
                    "#,
                )
                .bind(ahora)
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(loans)
    }

    /// Most recent open loan touching any copy of the given document
    pub async fn find_latest_open_by_document(
        &self,
        documento_id: i32,
    ) -> AppResult<Option<Prestamo>> {
        let loan = sqlx::query_as::<_, Prestamo>(
            r#"
            SELECT p.* FROM prestamos p
            JOIN detalle_prestamos dp ON dp.prestamo_id = p.id
            JOIN ejemplares e ON e.id = dp.ejemplar_id
            WHERE e.documento_id = $1 AND p.estado IN ('activo', 'vencido')
            ORDER BY p.fecha_prestamo DESC
            LIMIT 1
            "#,
        )
        .bind(documento_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(loan)
    }

    /// Copies attached to a loan
    pub async fn get_copies(&self, prestamo_id: i32) -> AppResult<Vec<Ejemplar>> {
        let copies = sqlx::query_as::<_, Ejemplar>(
            r#"
            SELECT e.* FROM ejemplares e
            JOIN detalle_prestamos dp ON dp.ejemplar_id = e.id
            WHERE dp.prestamo_id = $1
            ORDER BY e.id
            "#,
        )
        .bind(prestamo_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(copies)
    }

    /// Set the notificado flag on a loan
    pub async fn set_notificado(&self, id: i32) -> AppResult<Prestamo> {
        let loan = sqlx::query_as::<_, Prestamo>(
            "UPDATE prestamos SET notificado = TRUE WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(loan)
    }

    /// Close a loan and free its copies in one transaction
    pub async fn return_loan(&self, id: i32, ahora: DateTime<Utc>) -> AppResult<Prestamo> {
        let mut tx = self.pool.begin().await?;

        let loan = sqlx::query_as::<_, Prestamo>(
            r#"
            UPDATE prestamos
            SET estado = 'devuelto', fecha_devolucion_real = $2
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(ahora)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE ejemplares SET estado = 'disponible'
            WHERE id IN (SELECT ejemplar_id FROM detalle_prestamos WHERE prestamo_id = $1)
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(loan)
    }

    /// Active loans, optionally filtered by user, newest first
    pub async fn list_active(
        &self,
        usuario_id: Option<i32>,
        page: i64,
        size: i64,
    ) -> AppResult<Vec<Prestamo>> {
        let offset = super::page_offset(page, size);

        let loans = match usuario_id {
            Some(uid) => {
                sqlx::query_as::<_, Prestamo>(
                    r#"
                    SELECT * FROM prestamos
                    WHERE estado = 'activo' AND usuario_id = $1
                    ORDER BY fecha_prestamo DESC
                    LIMIT $2 OFFSET $3
                    "#,
                )
                .bind(uid)
                .bind(size)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Prestamo>(
                    r#"
                    SELECT * FROM prestamos
                    WHERE estado = 'activo'
                    ORDER BY fecha_prestamo DESC
                    LIMIT $1 OFFSET $2
                    "#,
                )
                .bind(size)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(loans)
    }

    /// Loan history for a user, optionally filtered by status, newest first
    pub async fn history(
        &self,
        usuario_id: i32,
        estado: Option<LoanStatus>,
        page: i64,
        size: i64,
    ) -> AppResult<Vec<Prestamo>> {
        let offset = super::page_offset(page, size);

        let loans = match estado {
            Some(estado) => {
                sqlx::query_as::<_, Prestamo>(
                    r#"
                    SELECT * FROM prestamos
                    WHERE usuario_id = $1 AND estado = $2
                    ORDER BY fecha_prestamo DESC
                    LIMIT $3 OFFSET $4
                    "#,
                )
                .bind(usuario_id)
                .bind(estado)
                .bind(size)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Prestamo>(
                    r#"
                    SELECT * FROM prestamos
                    WHERE usuario_id = $1
                    ORDER BY fecha_prestamo DESC
                    LIMIT $2 OFFSET $3
                    "#,
                )
                .bind(usuario_id)
                .bind(size)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(loans)
    }

    /// Count loans in a given state
    pub async fn count_by_estado(&self, estado: LoanStatus) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM prestamos WHERE estado = $1")
            .bind(estado)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Aggregate counts for the statistics endpoint
    pub async fn stats(&self) -> AppResult<PrestamoStats> {
        let row = sqlx::query(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE estado = 'activo') AS total_activos,
                COUNT(*) FILTER (WHERE estado = 'vencido') AS total_vencidos,
                COUNT(*) FILTER (WHERE estado = 'devuelto') AS total_devueltos,
                COUNT(*) FILTER (WHERE tipo_prestamo = 'sala') AS total_sala,
                COUNT(*) FILTER (WHERE tipo_prestamo = 'domicilio') AS total_domicilio
            FROM prestamos
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(PrestamoStats {
            total_activos: row.try_get("total_activos")?,
            total_vencidos: row.try_get("total_vencidos")?,
            total_devueltos: row.try_get("total_devueltos")?,
            total_sala: row.try_get("total_sala")?,
            total_domicilio: row.try_get("total_domicilio")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_codigo_never_repeats_for_the_same_document() {
        let a = auto_codigo(7);
        let b = auto_codigo(7);
        assert!(a.starts_with("AUTO-7-"));
        assert!(b.starts_with("AUTO-7-"));
        assert_ne!(a, b);
    }
}
