//! Drag-and-drop moves
//!
//! A drop is validated locally before anything is sent: a folder cannot be
//! dropped onto itself and both ends of the move must be known. Folder moves
//! additionally walk the target's ancestor chain so a folder cannot be moved
//! beneath one of its own descendants (disable with
//! [`MoveOptions::check_ancestors`]).
//!
//! Multi-file drops move every file independently and report an aggregate;
//! single moves fail fast.

use std::fmt;
use std::sync::Arc;

use portal_api_client::PortalApi;
use portal_core::config::MAX_ANCESTOR_DEPTH;
use portal_core::models::{FileRef, FolderId};
use portal_core::{PortalError, PortalResult};

use crate::notify::{RefreshNotifier, RefreshTarget};

/// What the user is dragging
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragSession {
    Folder(Option<FolderId>),
    File(FileRef),
    /// Multi-file selection; each file is moved independently
    Files(Vec<FileRef>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOptions {
    /// Reject folder moves whose target lies inside the source folder
    pub check_ancestors: bool,
    /// Give up walking the ancestor chain after this many hops
    pub max_ancestor_depth: usize,
}

impl Default for MoveOptions {
    fn default() -> Self {
        Self {
            check_ancestors: true,
            max_ancestor_depth: MAX_ANCESTOR_DEPTH,
        }
    }
}

/// A file that could not be moved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveFailure {
    pub file: FileRef,
    pub error: String,
}

/// Result of a multi-file move
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchMoveReport {
    pub moved: Vec<FileRef>,
    pub failed: Vec<MoveFailure>,
}

impl BatchMoveReport {
    pub fn success_count(&self) -> usize {
        self.moved.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failed.len()
    }

    pub fn is_complete_success(&self) -> bool {
        self.failed.is_empty()
    }
}

impl fmt::Display for BatchMoveReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Moved {} file(s)", self.success_count())?;
        if !self.failed.is_empty() {
            let names: Vec<String> = self
                .failed
                .iter()
                .map(|failure| format!("{} ({})", failure.file.name, failure.error))
                .collect();
            write!(f, ", {} failed: {}", self.failure_count(), names.join(", "))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    Folder { folder: FolderId, parent: FolderId },
    File { file: FileRef, folder: FolderId },
    Batch(BatchMoveReport),
}

#[derive(Clone)]
pub struct MoveValidator {
    api: Arc<dyn PortalApi>,
    notifier: RefreshNotifier,
    options: MoveOptions,
}

impl MoveValidator {
    pub fn new(api: Arc<dyn PortalApi>, notifier: RefreshNotifier) -> Self {
        Self::with_options(api, notifier, MoveOptions::default())
    }

    pub fn with_options(
        api: Arc<dyn PortalApi>,
        notifier: RefreshNotifier,
        options: MoveOptions,
    ) -> Self {
        Self {
            api,
            notifier,
            options,
        }
    }

    /// Apply a drop of `drag` onto the folder `target`.
    pub async fn drop_on(
        &self,
        drag: &DragSession,
        target: Option<FolderId>,
    ) -> PortalResult<MoveOutcome> {
        match drag {
            DragSession::Folder(source) => self.move_folder(*source, target).await,
            DragSession::File(file) => self.move_file(file, target).await,
            DragSession::Files(files) => self
                .move_files(files, target)
                .await
                .map(MoveOutcome::Batch),
        }
    }

    /// Local checks for a folder move; no request is issued.
    pub fn validate_folder_move(
        source: Option<FolderId>,
        target: Option<FolderId>,
    ) -> PortalResult<(FolderId, FolderId)> {
        let source =
            source.ok_or_else(|| PortalError::InvalidMove("no folder is being dragged".to_string()))?;
        let target =
            target.ok_or_else(|| PortalError::InvalidMove("no target folder".to_string()))?;
        if source == target {
            return Err(PortalError::InvalidMove(
                "cannot move a folder into itself".to_string(),
            ));
        }
        Ok((source, target))
    }

    /// Re-parent folder `source` under `target`.
    #[tracing::instrument(skip(self))]
    pub async fn move_folder(
        &self,
        source: Option<FolderId>,
        target: Option<FolderId>,
    ) -> PortalResult<MoveOutcome> {
        let (source, target) = Self::validate_folder_move(source, target)?;

        if self.options.check_ancestors {
            self.ensure_not_descendant(source, target).await?;
        }

        self.api.update_folder_parent(source, Some(target)).await?;
        tracing::info!(folder = source, parent = target, "Folder moved");
        self.notifier.notify_all();

        Ok(MoveOutcome::Folder {
            folder: source,
            parent: target,
        })
    }

    async fn ensure_not_descendant(&self, source: FolderId, target: FolderId) -> PortalResult<()> {
        let mut current = target;
        for _ in 0..self.options.max_ancestor_depth {
            let folder = self.api.get_folder(current).await?;
            match folder.parent {
                Some(parent) if parent == source => {
                    return Err(PortalError::InvalidMove(
                        "cannot move a folder into one of its own subfolders".to_string(),
                    ));
                }
                Some(parent) => current = parent,
                None => return Ok(()),
            }
        }

        Err(PortalError::InvalidMove(format!(
            "target folder is nested deeper than {} levels",
            self.options.max_ancestor_depth
        )))
    }

    /// Move a single file into `target`; errors propagate.
    #[tracing::instrument(skip(self, file), fields(file = file.id))]
    pub async fn move_file(
        &self,
        file: &FileRef,
        target: Option<FolderId>,
    ) -> PortalResult<MoveOutcome> {
        let target =
            target.ok_or_else(|| PortalError::InvalidMove("no target folder".to_string()))?;

        self.api.update_file_folder(file.id, Some(target)).await?;
        tracing::info!(file = file.id, folder = target, "File moved");
        self.notifier.notify(RefreshTarget::Grid);

        Ok(MoveOutcome::File {
            file: file.clone(),
            folder: target,
        })
    }

    /// Move every file into `target`, continuing past individual failures.
    #[tracing::instrument(skip(self, files), fields(files = files.len()))]
    pub async fn move_files(
        &self,
        files: &[FileRef],
        target: Option<FolderId>,
    ) -> PortalResult<BatchMoveReport> {
        let target =
            target.ok_or_else(|| PortalError::InvalidMove("no target folder".to_string()))?;
        if files.is_empty() {
            return Err(PortalError::InvalidMove("no files selected".to_string()));
        }

        let mut report = BatchMoveReport::default();
        for file in files {
            match self.api.update_file_folder(file.id, Some(target)).await {
                Ok(()) => report.moved.push(file.clone()),
                Err(err) => {
                    tracing::warn!(file = file.id, name = %file.name, error = %err, "File move failed");
                    report.failed.push(MoveFailure {
                        file: file.clone(),
                        error: err.to_string(),
                    });
                }
            }
        }

        if report.success_count() > 0 {
            self.notifier.notify(RefreshTarget::Grid);
        }
        tracing::info!(
            moved = report.success_count(),
            failed = report.failure_count(),
            folder = target,
            "Batch move finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{Call, FakePortal, RecordingListener};

    fn validator(api: Arc<FakePortal>, options: MoveOptions) -> (MoveValidator, Arc<RecordingListener>) {
        let listener = Arc::new(RecordingListener::default());
        let notifier = RefreshNotifier::new().with_listener(listener.clone());
        (MoveValidator::with_options(api, notifier, options), listener)
    }

    #[test]
    fn default_depth_matches_client_config() {
        let options = MoveOptions::default();
        assert!(options.check_ancestors);
        assert_eq!(
            options.max_ancestor_depth,
            portal_core::ClientConfig::default().max_ancestor_depth
        );
    }

    #[tokio::test]
    async fn folder_onto_itself_is_rejected_without_calls() {
        let api = Arc::new(FakePortal::default());
        let (validator, listener) = validator(api.clone(), MoveOptions::default());

        let err = validator
            .drop_on(&DragSession::Folder(Some(5)), Some(5))
            .await
            .unwrap_err();

        assert!(matches!(err, PortalError::InvalidMove(_)));
        assert!(api.calls().is_empty());
        assert!(listener.targets().is_empty());
    }

    #[tokio::test]
    async fn missing_ids_are_rejected_without_calls() {
        let api = Arc::new(FakePortal::default());
        let (validator, _) = validator(api.clone(), MoveOptions::default());

        assert!(validator.move_folder(None, Some(3)).await.is_err());
        assert!(validator.move_folder(Some(3), None).await.is_err());
        assert!(validator
            .move_file(&FileRef::new(1, "a.txt"), None)
            .await
            .is_err());
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn folder_move_sets_parent() {
        // 1 -> root, 2 -> root
        let api = Arc::new(FakePortal::default().with_folder(1, None).with_folder(2, None));
        let (validator, listener) = validator(api.clone(), MoveOptions::default());

        let outcome = validator.move_folder(Some(1), Some(2)).await.unwrap();

        assert_eq!(outcome, MoveOutcome::Folder { folder: 1, parent: 2 });
        assert_eq!(
            api.calls(),
            vec![
                Call::GetFolder(2),
                Call::UpdateFolderParent {
                    folder: 1,
                    parent: Some(2)
                },
            ]
        );
        assert_eq!(listener.targets().len(), 2);
    }

    #[tokio::test]
    async fn folder_into_its_grandchild_is_rejected() {
        // 1 <- 2 <- 3
        let api = Arc::new(
            FakePortal::default()
                .with_folder(1, None)
                .with_folder(2, Some(1))
                .with_folder(3, Some(2)),
        );
        let (validator, _) = validator(api.clone(), MoveOptions::default());

        let err = validator.move_folder(Some(1), Some(3)).await.unwrap_err();

        assert!(matches!(err, PortalError::InvalidMove(_)));
        assert!(!api
            .calls()
            .iter()
            .any(|call| matches!(call, Call::UpdateFolderParent { .. })));
    }

    #[tokio::test]
    async fn direct_compare_only_when_ancestor_check_disabled() {
        let api = Arc::new(FakePortal::default().with_folder(3, Some(1)));
        let options = MoveOptions {
            check_ancestors: false,
            ..MoveOptions::default()
        };
        let (validator, _) = validator(api.clone(), options);

        validator.move_folder(Some(1), Some(3)).await.unwrap();
        assert_eq!(
            api.calls(),
            vec![Call::UpdateFolderParent {
                folder: 1,
                parent: Some(3)
            }]
        );
    }

    #[tokio::test]
    async fn batch_move_continues_past_failures() {
        let api = Arc::new(FakePortal::default().fail_file_move(2));
        let (validator, listener) = validator(api.clone(), MoveOptions::default());

        let files = vec![
            FileRef::new(1, "one.pdf"),
            FileRef::new(2, "two.pdf"),
            FileRef::new(3, "three.pdf"),
        ];
        let outcome = validator
            .drop_on(&DragSession::Files(files), Some(9))
            .await
            .unwrap();

        let MoveOutcome::Batch(report) = outcome else {
            panic!("expected batch outcome");
        };
        assert_eq!(report.success_count(), 2);
        assert_eq!(report.failure_count(), 1);
        assert_eq!(report.failed[0].file.name, "two.pdf");
        assert_eq!(
            report.moved.iter().map(|f| f.id).collect::<Vec<_>>(),
            vec![1, 3]
        );
        assert_eq!(
            report.to_string(),
            "Moved 2 file(s), 1 failed: two.pdf (Forbidden)"
        );
        // every file was attempted
        assert_eq!(api.calls().len(), 3);
        assert_eq!(listener.targets(), vec![RefreshTarget::Grid]);
    }

    #[tokio::test]
    async fn single_file_move_propagates_error() {
        let api = Arc::new(FakePortal::default().fail_file_move(4));
        let (validator, listener) = validator(api.clone(), MoveOptions::default());

        let err = validator
            .drop_on(&DragSession::File(FileRef::new(4, "four.pdf")), Some(9))
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(403));
        assert!(listener.targets().is_empty());
    }
}
