//! Portal Core Library
//!
//! This crate provides the domain models, error type, configuration and
//! folder-path planning shared by the portal API client, the upload and move
//! services, and the CLI.

pub mod config;
pub mod csrf;
pub mod error;
pub mod models;
pub mod paths;

// Re-export commonly used types
pub use config::ClientConfig;
pub use csrf::{discover_csrf_token, CsrfSource, CsrfToken};
pub use error::{PortalError, PortalResult};
pub use paths::{FolderPath, FolderPathIndex, FolderPlan};
