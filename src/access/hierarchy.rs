//! Designation hierarchy.
//!
//! Designations form a tree through their `parent_id`. [`DesignationTree`]
//! keeps it as an adjacency list and walks it iteratively with an explicit
//! stack. Every walk tracks the nodes it has visited, so a corrupt parent
//! chain containing a cycle terminates instead of looping.

use std::collections::{BTreeMap, BTreeSet};

use tracing::warn;

use crate::error::EngineResult;
use crate::models::{Designation, DesignationId};
use crate::store::LeaveStore;

/// The designation tree as an adjacency list.
///
/// # Example
///
/// ```
/// use leave_engine::access::DesignationTree;
/// use leave_engine::models::Designation;
///
/// let tree = DesignationTree::new(vec![
///     Designation { id: 1, name: "Director".to_string(), parent_id: None },
///     Designation { id: 2, name: "Manager".to_string(), parent_id: Some(1) },
///     Designation { id: 3, name: "Engineer".to_string(), parent_id: Some(2) },
/// ]);
///
/// assert_eq!(tree.descendants(1).into_iter().collect::<Vec<_>>(), vec![2, 3]);
/// assert_eq!(tree.ancestors(3), vec![2, 1]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct DesignationTree {
    parents: BTreeMap<DesignationId, Option<DesignationId>>,
    children: BTreeMap<DesignationId, Vec<DesignationId>>,
}

impl DesignationTree {
    /// Builds the tree from a list of designations.
    pub fn new(designations: impl IntoIterator<Item = Designation>) -> Self {
        let mut tree = Self::default();
        for designation in designations {
            tree.parents.insert(designation.id, designation.parent_id);
            if let Some(parent) = designation.parent_id {
                tree.children.entry(parent).or_default().push(designation.id);
            }
        }
        for children in tree.children.values_mut() {
            children.sort_unstable();
        }
        tree
    }

    /// Builds the tree from every designation in `store`.
    pub fn from_store<S: LeaveStore>(store: &S) -> EngineResult<Self> {
        Ok(Self::new(store.designations()?))
    }

    /// Returns true if the designation is part of the tree.
    pub fn contains(&self, id: DesignationId) -> bool {
        self.parents.contains_key(&id)
    }

    /// Returns the direct children of a designation.
    pub fn children(&self, id: DesignationId) -> &[DesignationId] {
        self.children.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns every designation below `id`, excluding `id` itself.
    pub fn descendants(&self, id: DesignationId) -> BTreeSet<DesignationId> {
        let mut visited = BTreeSet::new();
        let mut stack: Vec<DesignationId> = self.children(id).to_vec();

        while let Some(current) = stack.pop() {
            if current == id || !visited.insert(current) {
                continue;
            }
            stack.extend(self.children(current).iter().copied());
        }

        visited
    }

    /// Returns the chain of designations above `id`, nearest first.
    ///
    /// The walk stops at a root, at an unknown parent, or when it would
    /// revisit a designation.
    pub fn ancestors(&self, id: DesignationId) -> Vec<DesignationId> {
        let mut chain = Vec::new();
        let mut visited = BTreeSet::from([id]);
        let mut current = self.parents.get(&id).copied().flatten();

        while let Some(parent) = current {
            if !visited.insert(parent) {
                warn!(
                    designation_id = id,
                    repeated = parent,
                    "Cycle in designation hierarchy"
                );
                break;
            }
            chain.push(parent);
            current = self.parents.get(&parent).copied().flatten();
        }

        chain
    }

    /// Returns true if `id` lies strictly below `ancestor`.
    pub fn is_descendant_of(&self, id: DesignationId, ancestor: DesignationId) -> bool {
        self.ancestors(id).contains(&ancestor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn designation(id: DesignationId, parent_id: Option<DesignationId>) -> Designation {
        Designation {
            id,
            name: format!("Designation {}", id),
            parent_id,
        }
    }

    fn create_test_tree() -> DesignationTree {
        //        1
        //      /   \
        //     2     3
        //    / \
        //   4   5
        //   |
        //   6
        DesignationTree::new(vec![
            designation(1, None),
            designation(2, Some(1)),
            designation(3, Some(1)),
            designation(4, Some(2)),
            designation(5, Some(2)),
            designation(6, Some(4)),
        ])
    }

    #[test]
    fn test_descendants_cover_whole_subtree() {
        let tree = create_test_tree();
        assert_eq!(tree.descendants(2), BTreeSet::from([4, 5, 6]));
        assert_eq!(tree.descendants(1).len(), 5);
        assert!(tree.descendants(6).is_empty());
    }

    #[test]
    fn test_ancestors_nearest_first() {
        let tree = create_test_tree();
        assert_eq!(tree.ancestors(6), vec![4, 2, 1]);
        assert!(tree.ancestors(1).is_empty());
        assert!(tree.is_descendant_of(6, 2));
        assert!(!tree.is_descendant_of(3, 2));
    }

    #[test]
    fn test_cycle_terminates() {
        let tree = DesignationTree::new(vec![
            designation(1, Some(3)),
            designation(2, Some(1)),
            designation(3, Some(2)),
        ]);
        assert_eq!(tree.descendants(1), BTreeSet::from([2, 3]));
        assert_eq!(tree.ancestors(1), vec![3, 2]);
    }

    #[test]
    fn test_unknown_designation_has_no_relatives() {
        let tree = create_test_tree();
        assert!(!tree.contains(42));
        assert!(tree.descendants(42).is_empty());
        assert!(tree.ancestors(42).is_empty());
        assert!(tree.children(42).is_empty());
    }
}
