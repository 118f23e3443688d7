use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use portal_core::models::{BrowseNode, FileId, FileRef, SessionBrowse, UploadItem};
use portal_services::{BatchMoveReport, RefreshListener, RefreshTarget};
use walkdir::WalkDir;

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Enumerate upload items from command-line paths.
///
/// A file becomes a loose item. A directory is walked recursively and each file
/// gets a relative path starting with the directory's own name, so
/// `upload notes/` recreates `notes/...` remotely.
pub fn collect_upload_items(paths: &[PathBuf]) -> Result<Vec<UploadItem>> {
    let mut items = Vec::new();

    for path in paths {
        let metadata = std::fs::metadata(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        if metadata.is_file() {
            let name = file_name(path)?;
            let payload =
                std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
            items.push(UploadItem::new(name, payload));
            continue;
        }

        let root = std::fs::canonicalize(path)
            .with_context(|| format!("Failed to resolve {}", path.display()))?;
        let root_name = file_name(&root)?;

        for entry in WalkDir::new(&root).follow_links(false).sort_by_file_name() {
            let entry = entry.with_context(|| format!("Failed to walk {}", root.display()))?;
            if !entry.file_type().is_file() {
                continue;
            }

            let relative = entry
                .path()
                .strip_prefix(&root)
                .with_context(|| format!("{} is outside {}", entry.path().display(), root.display()))?;
            let mut segments = vec![root_name.clone()];
            segments.extend(
                relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned()),
            );

            let payload = std::fs::read(entry.path())
                .with_context(|| format!("Failed to read {}", entry.path().display()))?;
            items.push(UploadItem::with_relative_path(segments.join("/"), payload)?);
        }
    }

    Ok(items)
}

fn file_name(path: &Path) -> Result<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .with_context(|| format!("{} has no file name", path.display()))
}

/// Render a session tree as indented text.
pub fn render_tree(browse: &SessionBrowse) -> String {
    let mut out = String::new();
    for node in &browse.folders_tree {
        render_node(node, 0, &mut out);
    }
    for file in &browse.root_files {
        out.push_str(&format!("{} (#{})\n", file.name, file.id));
    }
    out
}

fn render_node(node: &BrowseNode, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    let visibility = if node.is_public { " [public]" } else { "" };
    out.push_str(&format!("{}{}/ (#{}){}\n", indent, node.name, node.id, visibility));
    for child in &node.children {
        render_node(child, depth + 1, out);
    }
    for file in &node.files {
        out.push_str(&format!("{}  {} (#{})\n", indent, file.name, file.id));
    }
}

/// File references for ids given on the command line.
///
/// Only ids are known here, so each reference is labelled `#<id>` rather than
/// carrying a file name.
pub fn file_refs(ids: &[FileId]) -> Vec<FileRef> {
    ids.iter()
        .map(|id| FileRef::new(*id, format!("#{}", id)))
        .collect()
}

/// JSON summary of a multi-file move, keyed by file id.
pub fn batch_report_json(report: &BatchMoveReport) -> serde_json::Value {
    let moved: Vec<FileId> = report.moved.iter().map(|file| file.id).collect();
    let failed: Vec<serde_json::Value> = report
        .failed
        .iter()
        .map(|failure| serde_json::json!({ "file_id": failure.file.id, "error": failure.error }))
        .collect();
    serde_json::json!({
        "moved_ids": moved,
        "failed": failed,
        "message": report.to_string(),
    })
}

/// Refresh listener for the terminal: there is no view to redraw, so it logs.
pub struct LogRefreshListener;

impl RefreshListener for LogRefreshListener {
    fn refresh(&self, target: RefreshTarget) {
        tracing::debug!(target = ?target, "Remote state changed");
    }
}
