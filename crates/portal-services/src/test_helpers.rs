//! In-memory portal and listeners for service tests

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use portal_api_client::PortalApi;
use portal_core::models::{
    CreateFileRequest, CreateFolderRequest, FileId, FileResponse, FolderId, FolderResponse,
};
use portal_core::{PortalError, PortalResult};

use crate::notify::{RefreshListener, RefreshTarget};

/// A remote call observed by [`FakePortal`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreateFolder {
        name: String,
        parent: Option<FolderId>,
        is_public: bool,
    },
    GetFolder(FolderId),
    UpdateFolderParent {
        folder: FolderId,
        parent: Option<FolderId>,
    },
    CreateFile {
        name: String,
        folder: Option<FolderId>,
    },
    UpdateFileFolder {
        file: FileId,
        folder: Option<FolderId>,
    },
}

pub struct FakePortal {
    calls: Mutex<Vec<Call>>,
    next_id: AtomicI64,
    parents: Mutex<HashMap<FolderId, Option<FolderId>>>,
    failing_folders: HashSet<String>,
    failing_uploads: HashSet<String>,
    failing_file_moves: HashSet<FileId>,
    missing_csrf: bool,
}

impl Default for FakePortal {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(100),
            parents: Mutex::new(HashMap::new()),
            failing_folders: HashSet::new(),
            failing_uploads: HashSet::new(),
            failing_file_moves: HashSet::new(),
            missing_csrf: false,
        }
    }
}

impl FakePortal {
    /// Folder creation fails for folders with this name.
    pub fn fail_folder(mut self, name: &str) -> Self {
        self.failing_folders.insert(name.to_string());
        self
    }

    /// Upload fails for files with this name.
    pub fn fail_upload(mut self, name: &str) -> Self {
        self.failing_uploads.insert(name.to_string());
        self
    }

    pub fn fail_file_move(mut self, file_id: FileId) -> Self {
        self.failing_file_moves.insert(file_id);
        self
    }

    /// Every mutation fails as if no anti-forgery token could be found.
    pub fn without_csrf(mut self) -> Self {
        self.missing_csrf = true;
        self
    }

    /// Register an existing remote folder.
    pub fn with_folder(self, id: FolderId, parent: Option<FolderId>) -> Self {
        self.parents.lock().unwrap().insert(id, parent);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn created_folders(&self) -> Vec<(String, Option<FolderId>)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::CreateFolder { name, parent, .. } => Some((name, parent)),
                _ => None,
            })
            .collect()
    }

    pub fn uploaded_files(&self) -> Vec<(String, Option<FolderId>)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::CreateFile { name, folder } => Some((name, folder)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn check_csrf(&self) -> PortalResult<()> {
        if self.missing_csrf {
            return Err(PortalError::MissingCsrfToken);
        }
        Ok(())
    }

    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }
}

#[async_trait]
impl PortalApi for FakePortal {
    async fn create_folder(&self, request: &CreateFolderRequest) -> PortalResult<FolderResponse> {
        self.record(Call::CreateFolder {
            name: request.name.clone(),
            parent: request.parent,
            is_public: request.is_public,
        });
        self.check_csrf()?;
        if self.failing_folders.contains(&request.name) {
            return Err(PortalError::api(400, "Folder changes allowed only in active session."));
        }

        let id = self.next_id();
        self.parents.lock().unwrap().insert(id, request.parent);
        Ok(folder(id, &request.name, request.parent))
    }

    async fn get_folder(&self, folder_id: FolderId) -> PortalResult<FolderResponse> {
        self.record(Call::GetFolder(folder_id));
        match self.parents.lock().unwrap().get(&folder_id) {
            Some(parent) => Ok(folder(folder_id, "folder", *parent)),
            None => Err(PortalError::api(404, "Not found.")),
        }
    }

    async fn update_folder_parent(
        &self,
        folder_id: FolderId,
        parent: Option<FolderId>,
    ) -> PortalResult<()> {
        self.record(Call::UpdateFolderParent {
            folder: folder_id,
            parent,
        });
        self.check_csrf()?;
        self.parents.lock().unwrap().insert(folder_id, parent);
        Ok(())
    }

    async fn create_file(&self, request: &CreateFileRequest) -> PortalResult<FileResponse> {
        self.record(Call::CreateFile {
            name: request.file_name.clone(),
            folder: request.folder,
        });
        self.check_csrf()?;
        if self.failing_uploads.contains(&request.file_name) {
            return Err(PortalError::api(413, "File too large"));
        }
        Ok(FileResponse {
            id: self.next_id(),
            name: request.file_name.clone(),
            original_filename: Some(request.file_name.clone()),
            folder: request.folder,
            folder_name: None,
            folder_path: None,
            session: Some(request.session),
            department: Some(request.department),
            is_public: request.is_public,
            file_size: Some(request.payload.len() as i64),
            file_size_display: None,
            created_at: None,
            updated_at: None,
        })
    }

    async fn update_file_folder(
        &self,
        file_id: FileId,
        folder: Option<FolderId>,
    ) -> PortalResult<()> {
        self.record(Call::UpdateFileFolder {
            file: file_id,
            folder,
        });
        self.check_csrf()?;
        if self.failing_file_moves.contains(&file_id) {
            return Err(PortalError::api(403, "Forbidden"));
        }
        Ok(())
    }
}

fn folder(id: FolderId, name: &str, parent: Option<FolderId>) -> FolderResponse {
    FolderResponse {
        id,
        name: name.to_string(),
        parent,
        session: None,
        session_name: None,
        department: None,
        department_name: None,
        owner_name: None,
        is_public: false,
        description: None,
        children_count: None,
        files_count: None,
        created_at: None,
        updated_at: None,
    }
}

/// Listener remembering every refresh it received
#[derive(Default)]
pub struct RecordingListener {
    targets: Mutex<Vec<RefreshTarget>>,
}

impl RecordingListener {
    pub fn targets(&self) -> Vec<RefreshTarget> {
        self.targets.lock().unwrap().clone()
    }
}

impl RefreshListener for RecordingListener {
    fn refresh(&self, target: RefreshTarget) {
        self.targets.lock().unwrap().push(target);
    }
}
