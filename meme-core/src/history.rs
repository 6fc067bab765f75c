//! Linear undo/redo history of layer snapshots.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::{ImageLayer, TextLayer};

/// Maximum number of snapshots retained.
pub const MAX_HISTORY: usize = 50;

/// A deep copy of all layers at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Text layers, in draw order.
    pub texts: Vec<TextLayer>,
    /// Image layers, in draw order.
    pub images: Vec<ImageLayer>,
}

/// Append-only snapshot log with a cursor.
///
/// Pushing after an undo drops every entry beyond the cursor; there is no
/// branching. When the log is full the oldest entry is evicted.
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<Snapshot>,
    index: usize,
    capacity: usize,
}

impl History {
    /// Create an empty history holding at most `capacity` entries.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            index: 0,
            capacity: capacity.max(1),
        }
    }

    /// Append a snapshot at the cursor, truncating any redo tail.
    pub fn push(&mut self, snapshot: Snapshot) {
        if !self.entries.is_empty() {
            self.entries.truncate(self.index + 1);
        }
        self.entries.push_back(snapshot);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        self.index = self.entries.len() - 1;
    }

    /// Drop everything and start over from a single snapshot.
    pub fn reset(&mut self, snapshot: Snapshot) {
        self.entries.clear();
        self.index = 0;
        self.entries.push_back(snapshot);
    }

    /// Step back one entry. Returns `None` at the oldest entry.
    pub fn undo(&mut self) -> Option<&Snapshot> {
        if self.index == 0 || self.entries.is_empty() {
            return None;
        }
        self.index -= 1;
        self.entries.get(self.index)
    }

    /// Step forward one entry. Returns `None` at the newest entry.
    pub fn redo(&mut self) -> Option<&Snapshot> {
        if self.index + 1 >= self.entries.len() {
            return None;
        }
        self.index += 1;
        self.entries.get(self.index)
    }

    /// Whether [`History::undo`] would move the cursor.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    /// Whether [`History::redo`] would move the cursor.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    /// Number of retained entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no snapshot has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cursor position.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// The snapshot under the cursor.
    #[must_use]
    pub fn current(&self) -> Option<&Snapshot> {
        self.entries.get(self.index)
    }

    /// Retained entries, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &Snapshot> {
        self.entries.iter()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(MAX_HISTORY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LayerId, TextLayer};

    fn snapshot(n: usize) -> Snapshot {
        Snapshot {
            texts: (0..n)
                .map(|i| TextLayer::new(LayerId::from(format!("t{i}"))))
                .collect(),
            images: Vec::new(),
        }
    }

    #[test]
    fn test_undo_redo_bounds() {
        let mut history = History::default();
        assert!(history.undo().is_none());

        history.push(snapshot(0));
        history.push(snapshot(1));
        assert_eq!(history.undo().map(|s| s.texts.len()), Some(0));
        assert!(history.undo().is_none());
        assert_eq!(history.redo().map(|s| s.texts.len()), Some(1));
        assert!(history.redo().is_none());
    }

    #[test]
    fn test_push_after_undo_truncates() {
        let mut history = History::default();
        history.push(snapshot(0));
        history.push(snapshot(1));
        history.push(snapshot(2));
        history.undo();
        history.undo();
        history.push(snapshot(5));

        assert_eq!(history.len(), 2);
        assert!(!history.can_redo());
        assert_eq!(history.current().map(|s| s.texts.len()), Some(5));
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut history = History::new(3);
        for n in 0..5 {
            history.push(snapshot(n));
        }
        let kept: Vec<_> = history.entries().map(|s| s.texts.len()).collect();
        assert_eq!(kept, vec![2, 3, 4]);
        assert_eq!(history.index(), 2);
    }
}
