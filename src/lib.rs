//! LabLoan - Laboratory Equipment Loan Tracker
//!
//! A REST JSON API server tracking equipment borrow requests through their
//! lifecycle, keeping per-equipment availability consistent with
//! outstanding loans and recording an append-only audit trail.

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
