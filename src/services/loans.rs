//! Loan lifecycle service
//!
//! Single owner of loan state transitions. Both creation endpoints, the
//! overdue sweeps, notification marking and returns all go through here so
//! the eligibility rules are applied exactly once.

use std::sync::Arc;

use chrono::Utc;

use crate::{
    config::LoansConfig,
    error::{AppError, AppResult},
    models::{
        loan::{CreateLoan, CreateLoanFromRutIsbn, PrestamoStats},
        Biblioteca, CopyStatus, Documento, Ejemplar, LoanStatus, LoanType, Prestamo, Usuario,
    },
    repository::Repository,
};

use super::policy::ReturnPolicy;

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
    policy: Arc<dyn ReturnPolicy>,
    config: LoansConfig,
}

impl LoansService {
    pub fn new(repository: Repository, policy: Arc<dyn ReturnPolicy>, config: LoansConfig) -> Self {
        Self {
            repository,
            policy,
            config,
        }
    }

    /// Rules every new loan must pass, regardless of creation path
    async fn check_eligibility(&self, usuario: &Usuario) -> AppResult<()> {
        if usuario.esta_sancionado() {
            return Err(AppError::Validation(
                "El usuario está sancionado y no puede solicitar préstamos".to_string(),
            ));
        }

        let open = self.repository.loans.count_open_for_user(usuario.id).await?;
        if open >= self.config.max_active_per_user {
            return Err(AppError::Validation(format!(
                "El usuario ya tiene el máximo de {} préstamos activos",
                self.config.max_active_per_user
            )));
        }

        if self.repository.loans.has_overdue(usuario.id, Utc::now()).await? {
            return Err(AppError::Validation(
                "El usuario tiene préstamos vencidos pendientes".to_string(),
            ));
        }

        Ok(())
    }

    /// Counter flow: create a loan from a RUT and an ISBN.
    ///
    /// Picks (or auto-creates) a copy of the matching document and applies
    /// the fixed quick-loan return window.
    pub async fn create_from_rut_isbn(
        &self,
        data: CreateLoanFromRutIsbn,
    ) -> AppResult<(Prestamo, Usuario, Documento, Ejemplar, Biblioteca)> {
        let usuario = self
            .repository
            .users
            .get_by_rut(&data.rut)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("No existe un usuario con RUT {}", data.rut))
            })?;

        self.check_eligibility(&usuario).await?;

        let documento = self
            .repository
            .documents
            .get_by_isbn(&data.isbn)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("No existe un documento con ISBN {}", data.isbn))
            })?;

        let biblioteca = match data.biblioteca_id {
            Some(id) => self
                .repository
                .libraries
                .get_by_id(id)
                .await?
                .ok_or_else(|| AppError::NotFound("Biblioteca no encontrada".to_string()))?,
            None => self.repository.libraries.get_active_or_create_default().await?,
        };

        let fecha_devolucion = Utc::now() + self.policy.quick_loan_duration();

        let (prestamo, ejemplar) = self
            .repository
            .loans
            .create_for_document(
                usuario.id,
                biblioteca.id,
                documento.id,
                data.tipo,
                fecha_devolucion,
            )
            .await?;

        Ok((prestamo, usuario, documento, ejemplar, biblioteca))
    }

    /// Full flow: create a loan over an explicit set of copies.
    ///
    /// The return window is the longest duration any of the copies grants,
    /// so no copy comes due before the loan does.
    pub async fn create(&self, data: CreateLoan) -> AppResult<Prestamo> {
        if data.ejemplar_ids.is_empty() {
            return Err(AppError::Validation(
                "Debe indicar al menos un ejemplar".to_string(),
            ));
        }

        let mut unique = data.ejemplar_ids.clone();
        unique.sort_unstable();
        unique.dedup();
        if unique.len() != data.ejemplar_ids.len() {
            return Err(AppError::Validation(
                "La lista de ejemplares contiene duplicados".to_string(),
            ));
        }

        let usuario = self
            .repository
            .users
            .get_by_id(data.usuario_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Usuario no encontrado".to_string()))?;

        self.check_eligibility(&usuario).await?;

        let states = self.repository.loans.get_copy_states(&data.ejemplar_ids).await?;
        if states.len() != data.ejemplar_ids.len() {
            return Err(AppError::NotFound(
                "Uno o más ejemplares no existen".to_string(),
            ));
        }

        let mut duracion = self.policy.loan_duration(data.tipo, states[0].2);
        for (id, estado, tipo_doc) in &states {
            if *estado != CopyStatus::Disponible {
                return Err(AppError::Validation(format!(
                    "El ejemplar {} no está disponible",
                    id
                )));
            }
            let d = self.policy.loan_duration(data.tipo, *tipo_doc);
            if d > duracion {
                duracion = d;
            }
        }

        let fecha_devolucion = Utc::now() + duracion;
        self.repository.loans.create(&data, fecha_devolucion).await
    }

    /// Most recent open loan for any copy of the document with this ISBN
    pub async fn lookup_active_by_isbn(
        &self,
        isbn: &str,
    ) -> AppResult<(Prestamo, Usuario, Documento)> {
        let documento = self
            .repository
            .documents
            .get_by_isbn(isbn)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("No existe un documento con ISBN {}", isbn))
            })?;

        let prestamo = self
            .repository
            .loans
            .find_latest_open_by_document(documento.id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound("No hay préstamos abiertos para este documento".to_string())
            })?;

        let usuario = self
            .repository
            .users
            .get_by_id(prestamo.usuario_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Usuario no encontrado".to_string()))?;

        Ok((prestamo, usuario, documento))
    }

    /// Flip past-due activo loans of the given type to vencido and return
    /// the newly swept ones
    pub async fn sweep_overdue(&self, tipo: Option<LoanType>) -> AppResult<Vec<Prestamo>> {
        self.repository.loans.sweep_overdue(tipo, Utc::now()).await
    }

    /// Mark an overdue loan as notified. Only vencido loans qualify.
    pub async fn mark_notified(&self, id: i32) -> AppResult<Prestamo> {
        let loan = self
            .repository
            .loans
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Préstamo no encontrado".to_string()))?;

        if loan.estado != LoanStatus::Vencido {
            return Err(AppError::Validation(
                "Solo se pueden notificar préstamos vencidos".to_string(),
            ));
        }

        self.repository.loans.set_notificado(id).await
    }

    /// Sweep every loan type at once, returning the loans flipped to vencido
    /// by this call
    pub async fn sweep_all_overdue(&self) -> AppResult<Vec<Prestamo>> {
        self.repository.loans.sweep_overdue(None, Utc::now()).await
    }

    /// Close a loan and free its copies
    pub async fn return_loan(&self, id: i32) -> AppResult<Prestamo> {
        let loan = self
            .repository
            .loans
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Préstamo no encontrado".to_string()))?;

        if loan.estado == LoanStatus::Devuelto {
            return Err(AppError::Validation(
                "El préstamo ya fue devuelto".to_string(),
            ));
        }

        self.repository.loans.return_loan(id, Utc::now()).await
    }

    /// Active loans, optionally restricted to one user
    pub async fn list_active(
        &self,
        usuario_id: Option<i32>,
        page: Option<i64>,
        size: Option<i64>,
    ) -> AppResult<Vec<Prestamo>> {
        let page = page.unwrap_or(1).max(1);
        let size = size.unwrap_or(20).clamp(1, 200);
        self.repository.loans.list_active(usuario_id, page, size).await
    }

    /// Loan history for a user. An empty history is reported as not found.
    pub async fn history(
        &self,
        usuario_id: i32,
        estado: Option<LoanStatus>,
        page: Option<i64>,
        size: Option<i64>,
    ) -> AppResult<Vec<Prestamo>> {
        self.repository
            .users
            .get_by_id(usuario_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Usuario no encontrado".to_string()))?;

        let page = page.unwrap_or(1).max(1);
        let size = size.unwrap_or(20).clamp(1, 200);

        let loans = self
            .repository
            .loans
            .history(usuario_id, estado, page, size)
            .await?;

        if loans.is_empty() {
            return Err(AppError::NotFound(
                "El usuario no tiene préstamos registrados".to_string(),
            ));
        }
        Ok(loans)
    }

    /// Copies attached to a loan
    pub async fn get_copies(&self, prestamo_id: i32) -> AppResult<Vec<Ejemplar>> {
        self.repository.loans.get_copies(prestamo_id).await
    }

    /// Aggregate loan counts
    pub async fn stats(&self) -> AppResult<PrestamoStats> {
        self.repository.loans.stats().await
    }
}
