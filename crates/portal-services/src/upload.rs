//! Folder-tree upload
//!
//! [`FolderUploader`] recreates the folder structure implied by a list of
//! files with relative paths, then uploads each file into its folder.
//!
//! All requests are sequential: folders are created in ascending depth so
//! every parent id is known before its children are created, then files are
//! uploaded in input order. The first failure aborts the operation. Nothing is
//! rolled back; folders and files created before the failure remain.

use std::sync::Arc;

use portal_api_client::PortalApi;
use portal_core::models::{
    CreateFileRequest, CreateFolderRequest, DepartmentId, FileId, FolderId, SessionId,
    UploadContext, UploadItem,
};
use portal_core::{FolderPath, FolderPathIndex, FolderPlan, PortalError, PortalResult};

use crate::notify::RefreshNotifier;

/// Folder created during an upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedFolder {
    pub path: String,
    pub id: FolderId,
    pub parent: Option<FolderId>,
}

/// File uploaded during an upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub path: String,
    pub id: FileId,
    pub folder: Option<FolderId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadSummary {
    pub folders: Vec<CreatedFolder>,
    pub files: Vec<UploadedFile>,
}

impl UploadSummary {
    fn is_empty(&self) -> bool {
        self.folders.is_empty() && self.files.is_empty()
    }
}

#[derive(Clone)]
pub struct FolderUploader {
    api: Arc<dyn PortalApi>,
    notifier: RefreshNotifier,
}

impl FolderUploader {
    pub fn new(api: Arc<dyn PortalApi>, notifier: RefreshNotifier) -> Self {
        Self { api, notifier }
    }

    /// Recreate the folder tree of `items` under `context.parent` and upload every file.
    ///
    /// Views are refreshed whenever at least one folder or file was created,
    /// including when the operation fails part-way.
    #[tracing::instrument(skip_all, fields(items = items.len(), parent = ?context.parent))]
    pub async fn upload(
        &self,
        items: &[UploadItem],
        context: &UploadContext,
    ) -> PortalResult<UploadSummary> {
        if items.is_empty() {
            return Err(PortalError::InvalidInput("nothing to upload".to_string()));
        }
        let (session, department) = context.require()?;

        let mut summary = UploadSummary::default();
        let result = self
            .run(items, context, session, department, &mut summary)
            .await;

        if !summary.is_empty() {
            self.notifier.notify_all();
        }

        match result {
            Ok(()) => {
                tracing::info!(
                    folders = summary.folders.len(),
                    files = summary.files.len(),
                    "Upload completed"
                );
                Ok(summary)
            }
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    folders_created = summary.folders.len(),
                    files_uploaded = summary.files.len(),
                    "Upload aborted"
                );
                Err(err)
            }
        }
    }

    async fn run(
        &self,
        items: &[UploadItem],
        context: &UploadContext,
        session: SessionId,
        department: DepartmentId,
        summary: &mut UploadSummary,
    ) -> PortalResult<()> {
        let plan = FolderPlan::from_items(items);
        let mut index = FolderPathIndex::new(context.parent);

        for path in plan.folders_to_create() {
            if index.contains(path) {
                continue;
            }
            let created = self
                .create_folder(path, &index, context, session, department)
                .await?;
            index.insert(path.clone(), created.id)?;
            summary.folders.push(created);
        }

        for item in items {
            let directory = FolderPath::directory_of(item.relative_path());
            let folder = index.resolve(&directory);
            let uploaded = self
                .upload_file(item, folder, context, session, department)
                .await?;
            summary.files.push(uploaded);
        }

        Ok(())
    }

    async fn create_folder(
        &self,
        path: &FolderPath,
        index: &FolderPathIndex,
        context: &UploadContext,
        session: SessionId,
        department: DepartmentId,
    ) -> PortalResult<CreatedFolder> {
        let name = path.name().ok_or_else(|| {
            PortalError::InvalidInput("the upload root has no folder to create".to_string())
        })?;
        let parent = index.parent_id_for(path);

        let request = CreateFolderRequest {
            session,
            department,
            name: name.to_string(),
            parent,
            is_public: context.is_public,
        };

        let folder = self
            .api
            .create_folder(&request)
            .await
            .map_err(|source| PortalError::FolderCreation {
                path: path.to_string(),
                source: Box::new(source),
            })?;

        tracing::debug!(path = %path, id = folder.id, parent = ?parent, "Folder created");
        Ok(CreatedFolder {
            path: path.to_string(),
            id: folder.id,
            parent,
        })
    }

    async fn upload_file(
        &self,
        item: &UploadItem,
        folder: Option<FolderId>,
        context: &UploadContext,
        session: SessionId,
        department: DepartmentId,
    ) -> PortalResult<UploadedFile> {
        let request = CreateFileRequest {
            session,
            department,
            folder,
            file_name: item.name().to_string(),
            payload: item.payload().clone(),
            is_public: context.is_public,
        };

        let file = self
            .api
            .create_file(&request)
            .await
            .map_err(|source| PortalError::FileUpload {
                file: item.display_name().to_string(),
                source: Box::new(source),
            })?;

        tracing::debug!(file = item.display_name(), id = file.id, folder = ?folder, "File uploaded");
        Ok(UploadedFile {
            path: item.display_name().to_string(),
            id: file.id,
            folder,
        })
    }
}
