//! Merging an imported snapshot into a board
//!
//! Imported tasks keep their relative order but receive fresh IDs starting at
//! the board's `next_id`, assigned in ascending order of their original IDs.
//! Edges and cascade roots are rewritten through the same mapping. The current
//! limits are kept.

use std::collections::BTreeMap;

use super::board::{Board, BoardError, Snapshot};
use super::id::TaskId;
use super::task::Hold;

/// What a merge added
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Imported ID to assigned ID
    pub mapping: BTreeMap<TaskId, TaskId>,

    /// Number of edges imported
    pub edges: usize,
}

impl MergeReport {
    pub fn tasks(&self) -> usize {
        self.mapping.len()
    }
}

impl Board {
    /// Merges `snapshot` into this board
    ///
    /// The snapshot is validated as a board of its own first; on any error the
    /// board is left unchanged.
    pub fn merge(&mut self, snapshot: Snapshot) -> Result<MergeReport, BoardError> {
        let imported = Board::restore(snapshot, self.limits)?;

        let mut mapping = BTreeMap::new();
        let mut next = self.next_id;
        for id in imported.tasks.keys() {
            mapping.insert(*id, next);
            next = next.next().ok_or(BoardError::IdsExhausted)?;
        }

        let mut merged = self.clone();
        for (old, task) in &imported.tasks {
            let new_id = mapping[old];
            let mut task = task.with_id(new_id);

            // Restore guarantees every cascade root is an imported task
            if let Some(root) = task.hold.as_ref().and_then(Hold::root) {
                if let (Some(&new_root), Some(root_task)) =
                    (mapping.get(&root), imported.tasks.get(&root))
                {
                    task.hold = Some(Hold::cascade(new_root, &root_task.title));
                }
            }

            merged.graph.add_task(new_id);
            merged.tasks.insert(new_id, task);
        }

        let edges = imported.edges();
        for edge in &edges {
            merged
                .graph
                .link(mapping[&edge.blocker], mapping[&edge.dependent])?;
        }

        merged.next_id = next;
        *self = merged;

        Ok(MergeReport {
            mapping,
            edges: edges.len(),
        })
    }
}
