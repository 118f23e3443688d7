use serde::{Deserialize, Serialize};

use super::{FileResponse, FolderId, FolderResponse};

/// Contents of a single folder (`GET /api/folders/{id}/children/`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderChildren {
    pub folder: FolderResponse,
    #[serde(default)]
    pub children: Vec<FolderResponse>,
    #[serde(default)]
    pub files: Vec<FileResponse>,
}

/// Recursive folder node of a session tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowseNode {
    pub id: FolderId,
    pub name: String,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub children: Vec<BrowseNode>,
    #[serde(default)]
    pub files: Vec<FileResponse>,
}

/// Session/department tree (`GET /api/browse/session/`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionBrowse {
    #[serde(default)]
    pub folders_tree: Vec<BrowseNode>,
    #[serde(default)]
    pub root_files: Vec<FileResponse>,
}

impl BrowseNode {
    /// Number of folders in this subtree, including the node itself.
    pub fn folder_count(&self) -> usize {
        1 + self.children.iter().map(BrowseNode::folder_count).sum::<usize>()
    }

    /// Number of files in this subtree.
    pub fn file_count(&self) -> usize {
        self.files.len() + self.children.iter().map(BrowseNode::file_count).sum::<usize>()
    }
}

impl SessionBrowse {
    pub fn total_files(&self) -> usize {
        self.root_files.len() + self.folders_tree.iter().map(BrowseNode::file_count).sum::<usize>()
    }
}
