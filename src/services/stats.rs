//! Dashboard statistics service

use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::LoanStatus,
    repository::Repository,
};

/// Counters shown on the admin dashboard
#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardStats {
    pub total_libros: i64,
    pub usuarios_registrados: i64,
    pub prestamos_activos: i64,
    pub prestamos_atrasados: i64,
}

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
}

impl StatsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn dashboard(&self) -> AppResult<DashboardStats> {
        let total_libros = self.repository.documents.count().await?;
        let usuarios_registrados = self.repository.users.count().await?;
        let prestamos_activos = self.repository.loans.count_by_estado(LoanStatus::Activo).await?;
        let prestamos_atrasados = self.repository.loans.count_by_estado(LoanStatus::Vencido).await?;

        Ok(DashboardStats {
            total_libros,
            usuarios_registrados,
            prestamos_activos,
            prestamos_atrasados,
        })
    }
}
