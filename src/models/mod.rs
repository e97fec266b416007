//! Data models for the Biblioteca server

pub mod copy;
pub mod document;
pub mod enums;
pub mod library;
pub mod loan;
pub mod user;

// Re-export commonly used types
pub use copy::Ejemplar;
pub use document::Documento;
pub use enums::{CopyStatus, DocumentType, LoanStatus, LoanType};
pub use library::Biblioteca;
pub use loan::{DetallePrestamo, Prestamo};
pub use user::Usuario;
