//! Loan ("préstamo") model and related types

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::enums::{LoanStatus, LoanType};

/// Loan model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Prestamo {
    pub id: i32,
    pub tipo_prestamo: LoanType,
    pub usuario_id: i32,
    pub biblioteca_id: Option<i32>,
    pub bibliotecario_id: Option<i32>,
    pub fecha_prestamo: DateTime<Utc>,
    pub hora_prestamo: NaiveTime,
    pub fecha_devolucion_estimada: DateTime<Utc>,
    pub hora_devolucion_estimada: Option<NaiveTime>,
    pub fecha_devolucion_real: Option<DateTime<Utc>>,
    pub estado: LoanStatus,
    pub notificado: bool,
}

impl Prestamo {
    /// Overdue as observed right now, independent of the stored status.
    /// A loan already swept to Vencido stays overdue even if the clock moved.
    pub fn vencido_a(&self, ahora: DateTime<Utc>) -> bool {
        self.estado == LoanStatus::Vencido || self.fecha_devolucion_estimada < ahora
    }
}

/// Join row linking a loan to one borrowed copy
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct DetallePrestamo {
    pub id: i32,
    pub prestamo_id: i32,
    pub ejemplar_id: i32,
}

/// Validated command for full loan creation (POST /prestamos/registrar)
#[derive(Debug, Clone)]
pub struct CreateLoan {
    pub usuario_id: i32,
    pub ejemplar_ids: Vec<i32>,
    pub tipo: LoanType,
    pub bibliotecario_id: Option<i32>,
}

/// Validated command for the RUT+ISBN quick-loan path
#[derive(Debug, Clone)]
pub struct CreateLoanFromRutIsbn {
    /// Already normalized through `formatear_rut`
    pub rut: String,
    pub isbn: String,
    pub tipo: LoanType,
    pub biblioteca_id: Option<i32>,
}

/// Aggregate loan counts for the statistics endpoint
#[derive(Debug, Serialize, ToSchema)]
pub struct PrestamoStats {
    pub total_activos: i64,
    pub total_vencidos: i64,
    pub total_devueltos: i64,
    pub total_sala: i64,
    pub total_domicilio: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn prestamo(estado: LoanStatus, devolucion: DateTime<Utc>) -> Prestamo {
        Prestamo {
            id: 1,
            tipo_prestamo: LoanType::Domicilio,
            usuario_id: 1,
            biblioteca_id: None,
            bibliotecario_id: None,
            fecha_prestamo: devolucion - Duration::days(7),
            hora_prestamo: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            fecha_devolucion_estimada: devolucion,
            hora_devolucion_estimada: None,
            fecha_devolucion_real: None,
            estado,
            notificado: false,
        }
    }

    #[test]
    fn derived_overdue_flag_uses_date_even_when_status_is_active() {
        let ahora = Utc::now();
        let past_due = prestamo(LoanStatus::Activo, ahora - Duration::hours(1));
        assert!(past_due.vencido_a(ahora));

        let on_time = prestamo(LoanStatus::Activo, ahora + Duration::days(1));
        assert!(!on_time.vencido_a(ahora));
    }

    #[test]
    fn swept_loan_stays_overdue_regardless_of_date() {
        let ahora = Utc::now();
        let swept = prestamo(LoanStatus::Vencido, ahora + Duration::days(1));
        assert!(swept.vencido_a(ahora));
    }
}
