//! Indexed version graph and traversal algorithms.
//!
//! [`VersionGraph`] stores parent links in a [`HashMap`] and maintains a
//! forward-edge index (`children`) for descendant queries. Parents that
//! were never loaded are allowed: a partial history (e.g. an import that
//! omitted objects the peer already has) is still a usable graph, and a
//! missing parent simply ends the walk along that edge.

use std::collections::{HashMap, HashSet, VecDeque};

use facet_store::Version;
use facet_types::Ref;
use tracing::debug;

use crate::error::{DagError, DagResult};

/// Parent/child index over a set of versions.
#[derive(Clone, Debug, Default)]
pub struct VersionGraph {
    /// Parent links of every loaded version.
    parents: HashMap<Ref, Vec<Ref>>,
    /// Forward-edge index: parent -> children.
    children: HashMap<Ref, Vec<Ref>>,
}

impl VersionGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from already loaded versions.
    pub fn from_versions<'a>(versions: impl IntoIterator<Item = &'a Version>) -> Self {
        let mut graph = Self::new();
        for version in versions {
            graph.add_version(version);
        }
        graph
    }

    /// Number of loaded versions.
    pub fn len(&self) -> usize {
        self.parents.len()
    }

    /// Returns `true` if no version has been loaded.
    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    /// Add a version. Re-adding a ref replaces its parent links.
    pub fn add_version(&mut self, version: &Version) {
        self.add_node(version.id, version.parents.clone());
    }

    /// Add a node by ref and parent list.
    pub fn add_node(&mut self, id: Ref, parents: Vec<Ref>) {
        if let Some(previous) = self.parents.remove(&id) {
            for parent in previous {
                if let Some(children) = self.children.get_mut(&parent) {
                    children.retain(|c| *c != id);
                }
            }
        }
        for parent in &parents {
            self.children.entry(*parent).or_default().push(id);
        }
        debug!(version = %id.short_hex(), parents = parents.len(), "added version node");
        self.parents.insert(id, parents);
    }

    pub fn contains(&self, id: &Ref) -> bool {
        self.parents.contains_key(id)
    }

    /// Parent links of a loaded version.
    pub fn parents(&self, id: &Ref) -> Option<&[Ref]> {
        self.parents.get(id).map(Vec::as_slice)
    }

    /// Direct children of a ref among loaded versions.
    pub fn children(&self, id: &Ref) -> &[Ref] {
        self.children.get(id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Parent refs that are referenced but not loaded.
    pub fn missing_parents(&self) -> Vec<Ref> {
        let mut missing: Vec<Ref> = self
            .parents
            .values()
            .flatten()
            .filter(|p| !self.parents.contains_key(*p))
            .copied()
            .collect();
        missing.sort();
        missing.dedup();
        missing
    }

    // ---------------------------------------------------------------
    // Ancestor queries
    // ---------------------------------------------------------------

    /// `start` and everything reachable through parent links, in BFS order
    /// (closest first). Unloaded parents are included but not expanded.
    pub fn ancestors_ordered(&self, start: &Ref) -> Vec<Ref> {
        let mut visited = HashSet::new();
        let mut result = Vec::new();
        let mut queue = VecDeque::new();
        visited.insert(*start);
        queue.push_back(*start);

        while let Some(current) = queue.pop_front() {
            result.push(current);
            if let Some(parents) = self.parents.get(&current) {
                for parent in parents {
                    if visited.insert(*parent) {
                        queue.push_back(*parent);
                    }
                }
            }
        }

        result
    }

    /// `start` and all of its ancestors as a set.
    pub fn ancestors_set(&self, start: &Ref) -> HashSet<Ref> {
        self.ancestors_ordered(start).into_iter().collect()
    }

    /// `true` if `ancestor` is `descendant` or one of its ancestors.
    pub fn is_ancestor(&self, ancestor: &Ref, descendant: &Ref) -> bool {
        self.ancestors_set(descendant).contains(ancestor)
    }

    /// The common ancestor of `a` and `b` closest to `a`.
    ///
    /// Returns `None` for unrelated histories.
    pub fn common_ancestor(&self, a: &Ref, b: &Ref) -> Option<Ref> {
        let ancestors_b = self.ancestors_set(b);
        self.ancestors_ordered(a)
            .into_iter()
            .find(|r| ancestors_b.contains(r))
    }

    // ---------------------------------------------------------------
    // Topological sort
    // ---------------------------------------------------------------

    /// All loaded versions in topological order (parents before children).
    ///
    /// Uses Kahn's algorithm over loaded nodes only; links to unloaded
    /// parents do not count toward in-degree. Ties are broken by ref so the
    /// output is deterministic.
    pub fn topological_order(&self) -> DagResult<Vec<Ref>> {
        let mut in_degree: HashMap<Ref, usize> = self
            .parents
            .iter()
            .map(|(id, parents)| {
                let loaded = parents.iter().filter(|p| self.parents.contains_key(*p)).count();
                (*id, loaded)
            })
            .collect();

        let mut ready: Vec<Ref> = in_degree
            .iter()
            .filter(|(_, deg)| **deg == 0)
            .map(|(id, _)| *id)
            .collect();
        ready.sort();
        let mut queue: VecDeque<Ref> = ready.into();

        let mut result = Vec::with_capacity(self.parents.len());
        while let Some(current) = queue.pop_front() {
            result.push(current);
            let mut next: Vec<Ref> = Vec::new();
            for child in self.children(&current) {
                if let Some(deg) = in_degree.get_mut(child) {
                    *deg -= 1;
                    if *deg == 0 {
                        next.push(*child);
                    }
                }
            }
            next.sort();
            queue.extend(next);
        }

        if result.len() != self.parents.len() {
            let emitted: HashSet<&Ref> = result.iter().collect();
            let stuck = self
                .parents
                .keys()
                .filter(|id| !emitted.contains(id))
                .min()
                .copied()
                .unwrap_or_else(Ref::null);
            return Err(DagError::CycleDetected(stuck));
        }
        Ok(result)
    }
}
