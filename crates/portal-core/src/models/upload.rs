use bytes::Bytes;

use super::{DepartmentId, FolderId, SessionId};
use crate::error::{PortalError, PortalResult};

/// A file payload plus its optional slash-delimited path relative to the upload root
#[derive(Debug, Clone)]
pub struct UploadItem {
    name: String,
    relative_path: Option<String>,
    payload: Bytes,
}

impl UploadItem {
    /// A loose file with no directory component.
    pub fn new(name: impl Into<String>, payload: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            relative_path: None,
            payload: payload.into(),
        }
    }

    /// A file at `relative_path` (e.g. `unit1/notes.pdf`); its name is the last segment.
    ///
    /// Rejects paths without a file name and paths containing `..`.
    pub fn with_relative_path(
        relative_path: impl Into<String>,
        payload: impl Into<Bytes>,
    ) -> PortalResult<Self> {
        let relative_path = relative_path.into().replace('\\', "/");

        if relative_path.split('/').any(|segment| segment == "..") {
            return Err(PortalError::InvalidInput(format!(
                "relative path must not contain '..': {}",
                relative_path
            )));
        }

        let name = match relative_path.rsplit('/').next() {
            Some(last) if !last.is_empty() && last != "." => last.to_string(),
            _ => {
                return Err(PortalError::InvalidInput(format!(
                    "relative path has no file name: {:?}",
                    relative_path
                )))
            }
        };

        Ok(Self {
            name,
            relative_path: Some(relative_path),
            payload: payload.into(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn relative_path(&self) -> Option<&str> {
        self.relative_path.as_deref()
    }

    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Relative path when present, otherwise the file name.
    pub fn display_name(&self) -> &str {
        self.relative_path.as_deref().unwrap_or(&self.name)
    }
}

/// Caller-supplied parameters, constant for one upload operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadContext {
    pub session: Option<SessionId>,
    pub department: Option<DepartmentId>,
    /// Destination parent folder; `None` uploads to the session/department root
    pub parent: Option<FolderId>,
    pub is_public: bool,
}

impl UploadContext {
    pub fn new(session: SessionId, department: DepartmentId) -> Self {
        Self {
            session: Some(session),
            department: Some(department),
            parent: None,
            is_public: false,
        }
    }

    pub fn with_parent(mut self, parent: Option<FolderId>) -> Self {
        self.parent = parent;
        self
    }

    pub fn public(mut self, is_public: bool) -> Self {
        self.is_public = is_public;
        self
    }

    /// Session and department, or a precondition error naming the missing one.
    pub fn require(&self) -> PortalResult<(SessionId, DepartmentId)> {
        let session = self.session.ok_or(PortalError::MissingContext("session"))?;
        let department = self
            .department
            .ok_or(PortalError::MissingContext("department"))?;
        Ok((session, department))
    }
}
