//! Directory membership index
//!
//! Records which children have been observed under each directory. The
//! relation only grows: a child seen once stays a member for the rest of the
//! run even if a later listing of the backing store omits it, because it may
//! already carry staged changes that must stay visible.

use std::collections::{HashMap, HashSet};

use hashlink::LinkedHashSet;

use crate::key::PathKey;

/// Bidirectional parent/child relation over path keys
#[derive(Debug, Default)]
pub struct MembershipIndex {
    /// Children per parent, in order of first observation
    children: HashMap<PathKey, LinkedHashSet<PathKey>>,
    /// Reverse relation
    parents: HashMap<PathKey, HashSet<PathKey>>,
}

impl MembershipIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `child` under `parent`. Returns `true` if the pair is new.
    ///
    /// Re-recording an existing pair keeps its original position.
    pub fn insert(&mut self, parent: PathKey, child: PathKey) -> bool {
        let members = self.children.entry(parent).or_default();
        if members.contains(&child) {
            return false;
        }
        members.insert(child);
        self.parents.entry(child).or_default().insert(parent);
        true
    }

    /// Children observed under `parent`, oldest first.
    pub fn children_of(&self, parent: &PathKey) -> impl Iterator<Item = &PathKey> {
        self.children.get(parent).into_iter().flatten()
    }

    /// Directories `child` has been observed under.
    pub fn parents_of(&self, child: &PathKey) -> impl Iterator<Item = &PathKey> {
        self.parents.get(child).into_iter().flatten()
    }

    pub fn contains(&self, parent: &PathKey, child: &PathKey) -> bool {
        self.children
            .get(parent)
            .is_some_and(|members| members.contains(child))
    }

    /// Number of distinct parent/child pairs
    pub fn len(&self) -> usize {
        self.children.values().map(LinkedHashSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
