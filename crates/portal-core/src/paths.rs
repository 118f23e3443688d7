//! Folder-path planning for tree uploads
//!
//! A [`FolderPath`] is the directory portion of an upload item's relative path.
//! [`FolderPlan`] collects every distinct folder path implied by a set of items,
//! ordered so that each path comes after its parent. [`FolderPathIndex`] maps
//! paths to the remote folder ids created for them during one upload.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use crate::error::{PortalError, PortalResult};
use crate::models::{FolderId, UploadItem};

/// Slash-delimited folder path relative to the upload root; empty is the root itself
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FolderPath {
    segments: Vec<String>,
}

impl FolderPath {
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a folder path, ignoring empty and `.` segments.
    pub fn parse(path: &str) -> Self {
        let segments = path
            .split(['/', '\\'])
            .filter(|segment| !segment.is_empty() && *segment != ".")
            .map(str::to_string)
            .collect();
        Self { segments }
    }

    /// Directory portion of a file's relative path (everything but the last segment).
    pub fn directory_of(relative_path: Option<&str>) -> Self {
        let Some(relative_path) = relative_path else {
            return Self::root();
        };
        let mut path = Self::parse(relative_path);
        path.segments.pop();
        path
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of segments
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Last segment, the folder's own name. `None` for the root.
    pub fn name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// All but the last segment. `None` for the root.
    pub fn parent(&self) -> Option<FolderPath> {
        if self.is_root() {
            return None;
        }
        Some(FolderPath {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// Every non-empty prefix from shortest to longest, ending with `self`.
    pub fn prefixes(&self) -> impl Iterator<Item = FolderPath> + '_ {
        (1..=self.segments.len()).map(move |len| FolderPath {
            segments: self.segments[..len].to_vec(),
        })
    }
}

impl fmt::Display for FolderPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

/// Distinct folder paths implied by a set of upload items, in creation order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderPlan {
    paths: Vec<FolderPath>,
}

impl FolderPlan {
    /// Collect every folder path prefix referenced by `items`.
    ///
    /// Items without a directory component contribute the root path only.
    /// The result is sorted by ascending depth, ties broken lexically.
    pub fn from_items(items: &[UploadItem]) -> Self {
        let mut distinct = BTreeSet::new();
        for item in items {
            let directory = FolderPath::directory_of(item.relative_path());
            if directory.is_root() {
                distinct.insert(FolderPath::root());
                continue;
            }
            for prefix in directory.prefixes() {
                distinct.insert(prefix);
            }
        }

        let mut paths: Vec<FolderPath> = distinct.into_iter().collect();
        // BTreeSet already yields lexical order; a stable sort keeps it within a depth.
        paths.sort_by_key(FolderPath::depth);
        Self { paths }
    }

    pub fn paths(&self) -> &[FolderPath] {
        &self.paths
    }

    /// Paths that need a remote folder, i.e. everything but the root.
    pub fn folders_to_create(&self) -> impl Iterator<Item = &FolderPath> {
        self.paths.iter().filter(|path| !path.is_root())
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Resolved remote folder id for each folder path of one upload
#[derive(Debug, Clone)]
pub struct FolderPathIndex {
    resolved: HashMap<FolderPath, Option<FolderId>>,
}

impl FolderPathIndex {
    /// Seed the root path with the destination folder (`None` for the session root).
    pub fn new(destination: Option<FolderId>) -> Self {
        let mut resolved = HashMap::new();
        resolved.insert(FolderPath::root(), destination);
        Self { resolved }
    }

    pub fn destination(&self) -> Option<FolderId> {
        self.resolved.get(&FolderPath::root()).copied().flatten()
    }

    pub fn contains(&self, path: &FolderPath) -> bool {
        self.resolved.contains_key(path)
    }

    /// Record the folder created for `path`. Its parent must already be resolved.
    pub fn insert(&mut self, path: FolderPath, folder_id: FolderId) -> PortalResult<()> {
        let parent = path.parent().ok_or_else(|| {
            PortalError::InvalidInput("the upload root is seeded, not inserted".to_string())
        })?;
        if !self.resolved.contains_key(&parent) {
            return Err(PortalError::InvalidInput(format!(
                "parent folder \"{}\" of \"{}\" is not resolved",
                parent, path
            )));
        }
        self.resolved.insert(path, Some(folder_id));
        Ok(())
    }

    /// Folder id for `path`, falling back to the destination when unresolved.
    pub fn resolve(&self, path: &FolderPath) -> Option<FolderId> {
        match self.resolved.get(path) {
            Some(id) => *id,
            None => self.destination(),
        }
    }

    /// Parent folder id to create `path` under.
    pub fn parent_id_for(&self, path: &FolderPath) -> Option<FolderId> {
        match path.parent() {
            Some(parent) => self.resolve(&parent),
            None => self.destination(),
        }
    }

    pub fn len(&self) -> usize {
        self.resolved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(paths: &[&str]) -> Vec<UploadItem> {
        paths
            .iter()
            .map(|p| UploadItem::with_relative_path(*p, "data").unwrap())
            .collect()
    }

    fn plan_strings(plan: &FolderPlan) -> Vec<String> {
        plan.paths().iter().map(ToString::to_string).collect()
    }

    #[test]
    fn nested_paths_yield_every_prefix() {
        let plan = FolderPlan::from_items(&items(&["a/b/f1.txt", "a/f2.txt", "a/b/c/f3.txt"]));
        assert_eq!(plan_strings(&plan), vec!["a", "a/b", "a/b/c"]);
    }

    #[test]
    fn items_resolve_to_their_directory() {
        assert_eq!(
            FolderPath::directory_of(Some("a/b/f1.txt")).to_string(),
            "a/b"
        );
        assert_eq!(FolderPath::directory_of(Some("a/f2.txt")).to_string(), "a");
        assert_eq!(
            FolderPath::directory_of(Some("a/b/c/f3.txt")).to_string(),
            "a/b/c"
        );
    }

    #[test]
    fn flat_items_yield_only_root() {
        let flat = vec![UploadItem::new("one.txt", "1"), UploadItem::new("two.txt", "2")];
        let plan = FolderPlan::from_items(&flat);
        assert_eq!(plan.paths(), &[FolderPath::root()]);
        assert_eq!(plan.folders_to_create().count(), 0);
    }

    #[test]
    fn every_path_follows_its_parent() {
        let plan = FolderPlan::from_items(&items(&[
            "z/y/x/w/deep.txt",
            "b/file.txt",
            "a/c/file.txt",
            "z/top.txt",
            "loose.txt",
            "a/c/d/e/f.txt",
            "m//n/./file.txt",
        ]));

        for (position, path) in plan.paths().iter().enumerate() {
            if let Some(parent) = path.parent() {
                if parent.is_root() {
                    continue;
                }
                let parent_position = plan
                    .paths()
                    .iter()
                    .position(|p| *p == parent)
                    .expect("parent present in plan");
                assert!(parent_position < position, "{} before {}", parent, path);
            }
        }

        let depths: Vec<usize> = plan.paths().iter().map(FolderPath::depth).collect();
        let mut sorted = depths.clone();
        sorted.sort();
        assert_eq!(depths, sorted);
        assert!(plan.paths().contains(&FolderPath::parse("m/n")));
    }

    #[test]
    fn index_enforces_parent_before_child() {
        let mut index = FolderPathIndex::new(Some(5));
        assert!(index.insert(FolderPath::parse("a/b"), 2).is_err());
        index.insert(FolderPath::parse("a"), 1).unwrap();
        index.insert(FolderPath::parse("a/b"), 2).unwrap();
        assert!(index.insert(FolderPath::root(), 3).is_err());

        assert_eq!(index.resolve(&FolderPath::parse("a/b")), Some(2));
        assert_eq!(index.parent_id_for(&FolderPath::parse("a/b")), Some(1));
        assert_eq!(index.parent_id_for(&FolderPath::parse("a")), Some(5));
        // unresolved paths fall back to the destination
        assert_eq!(index.resolve(&FolderPath::parse("q")), Some(5));
    }

    #[test]
    fn root_destination_may_be_absent() {
        let index = FolderPathIndex::new(None);
        assert_eq!(index.resolve(&FolderPath::root()), None);
        assert!(index.contains(&FolderPath::root()));
    }
}
