//! Display-refresh notifications
//!
//! Services tell the folder-tree and grid views that remote state changed;
//! how those views re-render is up to them.

use std::sync::Arc;

/// View that displays remote state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefreshTarget {
    FolderTree,
    Grid,
}

impl RefreshTarget {
    pub const ALL: [RefreshTarget; 2] = [RefreshTarget::FolderTree, RefreshTarget::Grid];
}

/// Collaborator notified after remote state changed
pub trait RefreshListener: Send + Sync {
    fn refresh(&self, target: RefreshTarget);
}

/// Fan-out to every subscribed listener
#[derive(Clone, Default)]
pub struct RefreshNotifier {
    listeners: Vec<Arc<dyn RefreshListener>>,
}

impl RefreshNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: Arc<dyn RefreshListener>) {
        self.listeners.push(listener);
    }

    pub fn with_listener(mut self, listener: Arc<dyn RefreshListener>) -> Self {
        self.subscribe(listener);
        self
    }

    pub fn notify(&self, target: RefreshTarget) {
        tracing::debug!(target = ?target, listeners = self.listeners.len(), "Notifying refresh");
        for listener in &self.listeners {
            listener.refresh(target);
        }
    }

    /// Refresh both the folder tree and the grid.
    pub fn notify_all(&self) {
        for target in RefreshTarget::ALL {
            self.notify(target);
        }
    }
}

impl std::fmt::Debug for RefreshNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshNotifier")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::RecordingListener;

    #[test]
    fn notify_all_reaches_every_listener() {
        let first = Arc::new(RecordingListener::default());
        let second = Arc::new(RecordingListener::default());
        let notifier = RefreshNotifier::new()
            .with_listener(first.clone())
            .with_listener(second.clone());

        notifier.notify_all();

        assert_eq!(first.targets(), vec![RefreshTarget::FolderTree, RefreshTarget::Grid]);
        assert_eq!(second.targets().len(), 2);
    }
}
