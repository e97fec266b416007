//! Biblioteca Server
//!
//! REST JSON API for managing a library catalog, its copies and the loan
//! lifecycle: creation from the circulation counter, overdue sweeps,
//! notification tracking and returns.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
