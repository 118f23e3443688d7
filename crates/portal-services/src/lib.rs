//! Portal services
//!
//! Client-side operations built on the [`PortalApi`](portal_api_client::PortalApi) seam:
//! reconstructing a local folder tree remotely, drag-and-drop moves, and
//! refresh notifications for the views that display folders and files.

pub mod moves;
pub mod notify;
pub mod upload;

#[cfg(test)]
mod test_helpers;

pub use moves::{BatchMoveReport, DragSession, MoveFailure, MoveOptions, MoveOutcome, MoveValidator};
pub use notify::{RefreshListener, RefreshNotifier, RefreshTarget};
pub use upload::{CreatedFolder, FolderUploader, UploadSummary, UploadedFile};
