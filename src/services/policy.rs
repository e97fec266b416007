//! Return-duration policy
//!
//! How long a borrower may keep a loan depends on the loan type and on what
//! kind of material each copy belongs to. The trait keeps that rule swappable
//! without touching the lifecycle service.

use chrono::Duration;

use crate::{
    config::LoansConfig,
    models::{DocumentType, LoanType},
};

pub trait ReturnPolicy: Send + Sync {
    /// Duration granted for one copy of the given material under the given
    /// loan type.
    fn loan_duration(&self, tipo: LoanType, documento: DocumentType) -> Duration;

    /// Fixed window used by the RUT+ISBN counter flow, regardless of material.
    fn quick_loan_duration(&self) -> Duration;
}

/// Policy driven by the `[loans]` configuration section
pub struct DefaultReturnPolicy {
    config: LoansConfig,
}

impl DefaultReturnPolicy {
    pub fn new(config: LoansConfig) -> Self {
        Self { config }
    }
}

impl ReturnPolicy for DefaultReturnPolicy {
    fn loan_duration(&self, tipo: LoanType, documento: DocumentType) -> Duration {
        match tipo {
            LoanType::Sala => Duration::hours(self.config.sala_hours),
            LoanType::Domicilio => {
                let days = match documento {
                    DocumentType::Libro => self.config.domicilio_libro_days,
                    DocumentType::Revista => self.config.domicilio_revista_days,
                    DocumentType::Audio => self.config.domicilio_audio_days,
                    DocumentType::Video => self.config.domicilio_video_days,
                };
                Duration::days(days)
            }
        }
    }

    fn quick_loan_duration(&self) -> Duration {
        Duration::days(self.config.quick_loan_days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> DefaultReturnPolicy {
        DefaultReturnPolicy::new(LoansConfig::default())
    }

    #[test]
    fn sala_loans_are_measured_in_hours() {
        let d = policy().loan_duration(LoanType::Sala, DocumentType::Libro);
        assert_eq!(d, Duration::hours(4));
    }

    #[test]
    fn domicilio_duration_depends_on_material() {
        let p = policy();
        assert_eq!(p.loan_duration(LoanType::Domicilio, DocumentType::Libro), Duration::days(7));
        assert_eq!(p.loan_duration(LoanType::Domicilio, DocumentType::Revista), Duration::days(3));
        assert_eq!(p.loan_duration(LoanType::Domicilio, DocumentType::Audio), Duration::days(5));
        assert_eq!(p.loan_duration(LoanType::Domicilio, DocumentType::Video), Duration::days(5));
    }

    #[test]
    fn quick_loan_window_is_fixed() {
        assert_eq!(policy().quick_loan_duration(), Duration::days(7));
    }
}
