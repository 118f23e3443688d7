use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{DepartmentId, FolderId, SessionId};

/// Folder as returned by the folders endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderResponse {
    pub id: FolderId,
    pub name: String,
    #[serde(default)]
    pub parent: Option<FolderId>,
    #[serde(default)]
    pub session: Option<SessionId>,
    #[serde(default)]
    pub session_name: Option<String>,
    #[serde(default)]
    pub department: Option<DepartmentId>,
    #[serde(default)]
    pub department_name: Option<String>,
    #[serde(default)]
    pub owner_name: Option<String>,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub children_count: Option<i64>,
    #[serde(default)]
    pub files_count: Option<i64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Request body for creating a folder
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateFolderRequest {
    pub session: SessionId,
    pub department: DepartmentId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<FolderId>,
    pub is_public: bool,
}

/// Request body for re-parenting a folder; `None` moves it to the root
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateFolderRequest {
    pub parent: Option<FolderId>,
}
