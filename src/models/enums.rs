//! Shared domain enums
//!
//! Loan and copy states are closed variants stored as their Spanish wire
//! strings in the database. All comparisons go through the enum, never
//! through raw strings.

use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, Postgres};
use utoipa::ToSchema;

macro_rules! string_enum_sqlx {
    ($ty:ty) => {
        impl sqlx::Type<Postgres> for $ty {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <String as sqlx::Type<Postgres>>::type_info()
            }
        }

        impl<'r> Decode<'r, Postgres> for $ty {
            fn decode(
                value: sqlx::postgres::PgValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                let s: String = Decode::<Postgres>::decode(value)?;
                s.parse().map_err(|e: String| e.into())
            }
        }

        impl Encode<'_, Postgres> for $ty {
            fn encode_by_ref(
                &self,
                buf: &mut sqlx::postgres::PgArgumentBuffer,
            ) -> sqlx::encode::IsNull {
                let s: String = self.as_str().to_string();
                <String as Encode<Postgres>>::encode(s, buf)
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }
    };
}

// ---------------------------------------------------------------------------
// LoanStatus
// ---------------------------------------------------------------------------

/// Loan lifecycle state (DB column `prestamos.estado`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    Activo,
    Vencido,
    Devuelto,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Activo => "activo",
            LoanStatus::Vencido => "vencido",
            LoanStatus::Devuelto => "devuelto",
        }
    }
}

impl std::str::FromStr for LoanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "activo" => Ok(LoanStatus::Activo),
            "vencido" => Ok(LoanStatus::Vencido),
            "devuelto" => Ok(LoanStatus::Devuelto),
            _ => Err(format!("Invalid loan status: {}", s)),
        }
    }
}

string_enum_sqlx!(LoanStatus);

// ---------------------------------------------------------------------------
// LoanType
// ---------------------------------------------------------------------------

/// Loan type (DB column `prestamos.tipo_prestamo`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LoanType {
    Domicilio,
    Sala,
}

impl LoanType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanType::Domicilio => "domicilio",
            LoanType::Sala => "sala",
        }
    }
}

impl std::str::FromStr for LoanType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "domicilio" => Ok(LoanType::Domicilio),
            "sala" => Ok(LoanType::Sala),
            _ => Err(format!("Invalid loan type: {}", s)),
        }
    }
}

string_enum_sqlx!(LoanType);

// ---------------------------------------------------------------------------
// CopyStatus
// ---------------------------------------------------------------------------

/// Physical copy state (DB column `ejemplares.estado`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CopyStatus {
    Disponible,
    Prestado,
}

impl CopyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CopyStatus::Disponible => "disponible",
            CopyStatus::Prestado => "prestado",
        }
    }
}

impl std::str::FromStr for CopyStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "disponible" => Ok(CopyStatus::Disponible),
            "prestado" => Ok(CopyStatus::Prestado),
            _ => Err(format!("Invalid copy status: {}", s)),
        }
    }
}

string_enum_sqlx!(CopyStatus);

// ---------------------------------------------------------------------------
// DocumentType
// ---------------------------------------------------------------------------

/// Document type (DB column `documentos.tipo`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Libro,
    Audio,
    Video,
    Revista,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Libro => "libro",
            DocumentType::Audio => "audio",
            DocumentType::Video => "video",
            DocumentType::Revista => "revista",
        }
    }
}

impl std::str::FromStr for DocumentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "libro" => Ok(DocumentType::Libro),
            "audio" => Ok(DocumentType::Audio),
            "video" => Ok(DocumentType::Video),
            "revista" => Ok(DocumentType::Revista),
            _ => Err(format!("Invalid document type: {}", s)),
        }
    }
}

string_enum_sqlx!(DocumentType);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loan_status_round_trips_through_db_strings() {
        for status in [LoanStatus::Activo, LoanStatus::Vencido, LoanStatus::Devuelto] {
            assert_eq!(status.as_str().parse::<LoanStatus>().unwrap(), status);
        }
    }

    #[test]
    fn loan_type_rejects_unknown_values() {
        assert!("oficina".parse::<LoanType>().is_err());
        assert_eq!("DOMICILIO".parse::<LoanType>().unwrap(), LoanType::Domicilio);
        assert_eq!("sala".parse::<LoanType>().unwrap(), LoanType::Sala);
    }

    #[test]
    fn copy_status_round_trips_through_db_strings() {
        assert_eq!("disponible".parse::<CopyStatus>().unwrap(), CopyStatus::Disponible);
        assert_eq!("prestado".parse::<CopyStatus>().unwrap(), CopyStatus::Prestado);
        assert!("perdido".parse::<CopyStatus>().is_err());
    }

    #[test]
    fn document_type_parses_all_variants() {
        for t in ["libro", "audio", "video", "revista"] {
            assert_eq!(t.parse::<DocumentType>().unwrap().as_str(), t);
        }
        assert!("periodico".parse::<DocumentType>().is_err());
    }
}
