use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{DepartmentId, FileId, FolderId, SessionId};

/// File as returned by the files endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileResponse {
    pub id: FileId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub original_filename: Option<String>,
    #[serde(default)]
    pub folder: Option<FolderId>,
    #[serde(default)]
    pub folder_name: Option<String>,
    #[serde(default)]
    pub folder_path: Option<String>,
    #[serde(default)]
    pub session: Option<SessionId>,
    #[serde(default)]
    pub department: Option<DepartmentId>,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub file_size: Option<i64>,
    #[serde(default)]
    pub file_size_display: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Multipart upload of a single file
#[derive(Debug, Clone)]
pub struct CreateFileRequest {
    pub session: SessionId,
    pub department: DepartmentId,
    pub folder: Option<FolderId>,
    pub file_name: String,
    pub payload: Bytes,
    pub is_public: bool,
}

/// Request body for moving a file; `None` moves it to the root
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateFileRequest {
    pub folder: Option<FolderId>,
}

/// A file being moved, with the name used when reporting failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef {
    pub id: FileId,
    pub name: String,
}

impl FileRef {
    pub fn new(id: FileId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

impl From<&FileResponse> for FileRef {
    fn from(file: &FileResponse) -> Self {
        FileRef::new(file.id, file.name.clone())
    }
}
