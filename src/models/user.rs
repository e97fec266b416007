//! User model, RUT handling and JWT claims

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, DecodingKey, Validation};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

/// Normalized RUT shape: digits, dash, verifier digit or K
static RUT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{1,8}-[\dK]$").unwrap());

/// Normalize a Chilean RUT: strip dots and spaces, uppercase the verifier,
/// and insert the dash before the verifier when missing.
///
/// Returns an error when the result does not look like a RUT at all.
pub fn formatear_rut(raw: &str) -> AppResult<String> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '.' | ' '))
        .collect::<String>()
        .to_uppercase();

    // Only ASCII may pass this point: the slicing below is byte-indexed.
    if !cleaned.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(AppError::Validation(format!("RUT inválido: {}", raw)));
    }

    let with_dash = if cleaned.contains('-') {
        cleaned
    } else if cleaned.len() >= 2 {
        format!("{}-{}", &cleaned[..cleaned.len() - 1], &cleaned[cleaned.len() - 1..])
    } else {
        cleaned
    };

    if RUT_RE.is_match(&with_dash) {
        Ok(with_dash)
    } else {
        Err(AppError::Validation(format!("RUT inválido: {}", raw)))
    }
}

/// User model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Usuario {
    pub id: i32,
    pub rut: String,
    pub nombres: String,
    pub apellidos: String,
    pub email: Option<String>,
    pub rol: String,
    pub sancionado: bool,
    pub created_at: DateTime<Utc>,
}

impl Usuario {
    pub fn esta_sancionado(&self) -> bool {
        self.sancionado
    }
}

/// JWT claims carried by the admin bearer token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    /// User ID
    pub sub: i32,
    /// Role ("admin", "bibliotecario", "lector")
    pub rol: String,
    /// Expiration (unix timestamp)
    pub exp: usize,
}

impl UserClaims {
    /// Validate and decode a JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        let data = decode::<UserClaims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(data.claims)
    }

    pub fn is_admin(&self) -> bool {
        self.rol == "admin"
    }

    pub fn require_admin(&self) -> AppResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "Se requieren permisos de administrador".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rut_with_dots_and_dash_is_normalized() {
        assert_eq!(formatear_rut("11.111.111-1").unwrap(), "11111111-1");
    }

    #[test]
    fn rut_without_dash_gets_one_inserted() {
        assert_eq!(formatear_rut("111111111").unwrap(), "11111111-1");
        assert_eq!(formatear_rut("12345678k").unwrap(), "12345678-K");
    }

    #[test]
    fn garbage_rut_is_rejected() {
        assert!(formatear_rut("no-es-rut").is_err());
        assert!(formatear_rut("").is_err());
    }

    #[test]
    fn multibyte_rut_is_rejected_without_panicking() {
        assert!(formatear_rut("ñé").is_err());
        assert!(formatear_rut("12345678ñ").is_err());
        assert!(formatear_rut("11.111.111-ñ").is_err());
    }

    #[test]
    fn non_admin_claims_are_rejected() {
        let claims = UserClaims {
            sub: 1,
            rol: "lector".to_string(),
            exp: 0,
        };
        assert!(claims.require_admin().is_err());

        let admin = UserClaims {
            sub: 2,
            rol: "admin".to_string(),
            exp: 0,
        };
        assert!(admin.require_admin().is_ok());
    }
}
