//! Disjoint-set forest over the faces being clustered.

use std::collections::{BTreeSet, HashMap};

use crate::shared::gallery_image::FaceKey;

/// Faces addressed by their position in the clustered slice, merged into
/// identity groups.
///
/// The root of a set is always its lowest position, so roots do not depend
/// on the order merges happen in.
pub struct FaceForest {
    keys: Vec<FaceKey>,
    parent: Vec<usize>,
}

impl FaceForest {
    /// Every face starts in its own set.
    pub fn new(keys: Vec<FaceKey>) -> Self {
        let parent = (0..keys.len()).collect();
        Self { keys, parent }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Root of the set holding face `face`. Compresses the walked path.
    fn root(&mut self, face: usize) -> usize {
        let mut root = face;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut node = face;
        while self.parent[node] != root {
            let next = self.parent[node];
            self.parent[node] = root;
            node = next;
        }
        root
    }

    /// Joins the sets of faces `a` and `b`. Returns `false` when they already
    /// belonged to the same person.
    pub fn merge(&mut self, a: usize, b: usize) -> bool {
        let (ra, rb) = (self.root(a), self.root(b));
        if ra == rb {
            return false;
        }
        self.parent[ra.max(rb)] = ra.min(rb);
        true
    }

    /// Member keys of every set, ordered by each group's smallest key.
    pub fn into_groups(mut self) -> Vec<BTreeSet<FaceKey>> {
        let mut by_root: HashMap<usize, BTreeSet<FaceKey>> = HashMap::new();
        for face in 0..self.keys.len() {
            let root = self.root(face);
            by_root
                .entry(root)
                .or_default()
                .insert(self.keys[face].clone());
        }
        let mut groups: Vec<BTreeSet<FaceKey>> = by_root.into_values().collect();
        groups.sort_by(|a, b| a.first().cmp(&b.first()));
        groups
    }
}
