//! Data models for the portal client
//!
//! Remote representations mirror the portal's REST payloads; upload models
//! describe one client-side operation.

mod browse;
mod file;
mod folder;
mod upload;

pub use browse::*;
pub use file::*;
pub use folder::*;
pub use upload::*;

/// Primary key of a remote folder
pub type FolderId = i64;
/// Primary key of a remote file
pub type FileId = i64;
/// Primary key of an academic session
pub type SessionId = i64;
/// Primary key of a department
pub type DepartmentId = i64;
