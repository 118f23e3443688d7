//! Domain methods for the portal API client.
//!
//! [`PortalApi`] covers the folder and file mutations the upload and move
//! services need; listing endpoints are inherent methods on [`ApiClient`].

use crate::{ApiClient, API_PREFIX};
use async_trait::async_trait;
use portal_core::models::{
    CreateFileRequest, CreateFolderRequest, DepartmentId, FileId, FileResponse, FolderChildren,
    FolderId, FolderResponse, SessionBrowse, SessionId, UpdateFileRequest, UpdateFolderRequest,
};
use portal_core::PortalResult;
use reqwest::multipart::{Form, Part};

/// Remote folder/file operations
#[async_trait]
pub trait PortalApi: Send + Sync {
    /// `POST /api/folders/`
    async fn create_folder(&self, request: &CreateFolderRequest) -> PortalResult<FolderResponse>;

    /// `GET /api/folders/{id}/`
    async fn get_folder(&self, folder_id: FolderId) -> PortalResult<FolderResponse>;

    /// `PATCH /api/folders/{id}/` setting `parent`
    async fn update_folder_parent(
        &self,
        folder_id: FolderId,
        parent: Option<FolderId>,
    ) -> PortalResult<()>;

    /// `POST /api/files/` as multipart form
    async fn create_file(&self, request: &CreateFileRequest) -> PortalResult<FileResponse>;

    /// `PATCH /api/files/{id}/` setting `folder`
    async fn update_file_folder(
        &self,
        file_id: FileId,
        folder: Option<FolderId>,
    ) -> PortalResult<()>;
}

#[async_trait]
impl PortalApi for ApiClient {
    async fn create_folder(&self, request: &CreateFolderRequest) -> PortalResult<FolderResponse> {
        tracing::debug!(name = %request.name, parent = ?request.parent, "Creating folder");
        self.post_json(&format!("{}/folders/", API_PREFIX), request)
            .await
    }

    async fn get_folder(&self, folder_id: FolderId) -> PortalResult<FolderResponse> {
        self.get(&format!("{}/folders/{}/", API_PREFIX, folder_id), &[])
            .await
    }

    async fn update_folder_parent(
        &self,
        folder_id: FolderId,
        parent: Option<FolderId>,
    ) -> PortalResult<()> {
        tracing::debug!(folder_id, parent = ?parent, "Moving folder");
        self.patch_json(
            &format!("{}/folders/{}/", API_PREFIX, folder_id),
            &UpdateFolderRequest { parent },
        )
        .await
    }

    async fn create_file(&self, request: &CreateFileRequest) -> PortalResult<FileResponse> {
        tracing::debug!(
            file = %request.file_name,
            folder = ?request.folder,
            size = request.payload.len(),
            "Uploading file"
        );
        self.post_multipart(&format!("{}/files/", API_PREFIX), || {
            Ok(upload_form(request))
        })
        .await
    }

    async fn update_file_folder(
        &self,
        file_id: FileId,
        folder: Option<FolderId>,
    ) -> PortalResult<()> {
        tracing::debug!(file_id, folder = ?folder, "Moving file");
        self.patch_json(
            &format!("{}/files/{}/", API_PREFIX, file_id),
            &UpdateFileRequest { folder },
        )
        .await
    }
}

impl ApiClient {
    /// Subfolders and files of one folder.
    pub async fn folder_children(&self, folder_id: FolderId) -> PortalResult<FolderChildren> {
        self.get(&format!("{}/folders/{}/children/", API_PREFIX, folder_id), &[])
            .await
    }

    /// Folder tree and root files of a session/department.
    pub async fn browse_session(
        &self,
        session: SessionId,
        department: DepartmentId,
    ) -> PortalResult<SessionBrowse> {
        let query = [
            ("session", session.to_string()),
            ("department", department.to_string()),
        ];
        self.get(&format!("{}/browse/session/", API_PREFIX), &query)
            .await
    }
}

fn upload_form(request: &CreateFileRequest) -> Form {
    let part = Part::bytes(request.payload.to_vec()).file_name(request.file_name.clone());

    let mut form = Form::new()
        .text("session", request.session.to_string())
        .text("department", request.department.to_string())
        .text("is_public", request.is_public.to_string());
    if let Some(folder) = request.folder {
        form = form.text("folder", folder.to_string());
    }
    form.part("file", part)
}
