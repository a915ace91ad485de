//! Statement Parser Service
//!
//! Accepts password-protected PDF credit-card statements, extracts their text
//! and asks a completion model to return the statement fields as JSON.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use handlers::{create_router, AppState};
