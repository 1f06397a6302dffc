//! Best-effort walks over a component's history.

use std::collections::{HashMap, HashSet, VecDeque};

use facet_store::{ModelComponent, Version};
use facet_types::Ref;
use tracing::debug;

use crate::error::{DagError, DagResult};
use crate::graph::VersionGraph;

/// Something versions can be loaded from: the store, an incoming batch,
/// or a layering of both.
pub trait VersionSource {
    /// Load a version. `Ok(None)` means the object is absent.
    fn load_version(&self, id: &Ref) -> DagResult<Option<Version>>;
}

impl VersionSource for HashMap<Ref, Version> {
    fn load_version(&self, id: &Ref) -> DagResult<Option<Version>> {
        Ok(self.get(id).cloned())
    }
}

impl<F> VersionSource for F
where
    F: Fn(&Ref) -> DagResult<Option<Version>>,
{
    fn load_version(&self, id: &Ref) -> DagResult<Option<Version>> {
        self(id)
    }
}

/// One ref visited while walking a component's history.
#[derive(Clone, Debug, PartialEq)]
pub struct VersionInfo {
    pub id: Ref,
    /// Tag pointing at this ref, if any.
    pub tag: Option<String>,
    /// Parents of the loaded version; empty when it could not be loaded.
    pub parents: Vec<Ref>,
    /// Reachable from the head rather than only from a tag.
    pub is_part_of_history: bool,
    /// Set when the version object could not be loaded.
    pub error: Option<String>,
}

struct Walker<'a, S: VersionSource + ?Sized> {
    source: &'a S,
    tags_by_ref: HashMap<Ref, String>,
    throws: bool,
    seen: HashSet<Ref>,
    results: Vec<VersionInfo>,
}

impl<S: VersionSource + ?Sized> Walker<'_, S> {
    fn visit(&mut self, start: Ref, is_part_of_history: bool) -> DagResult<()> {
        let mut queue = VecDeque::from([start]);
        if !self.seen.insert(start) {
            return Ok(());
        }
        while let Some(current) = queue.pop_front() {
            let tag = self.tags_by_ref.get(&current).cloned();
            match self.source.load_version(&current)? {
                Some(version) => {
                    for parent in &version.parents {
                        if self.seen.insert(*parent) {
                            queue.push_back(*parent);
                        }
                    }
                    self.results.push(VersionInfo {
                        id: current,
                        tag,
                        parents: version.parents,
                        is_part_of_history,
                        error: None,
                    });
                }
                None if self.throws => return Err(DagError::VersionNotFound(current)),
                None => {
                    debug!(version = %current.short_hex(), "version missing during history walk");
                    self.results.push(VersionInfo {
                        id: current,
                        tag,
                        parents: Vec::new(),
                        is_part_of_history,
                        error: Some(format!("version object {current} is missing")),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Walk a component's history.
///
/// Starts from `start` (or the component's lane-local head, or its head)
/// and follows parents; every ref found this way is part of history. Tags
/// not reached are then walked too and flagged as outside history. With
/// `throws == false` missing versions are recorded with an error instead of
/// failing the walk.
pub fn collect_versions_info<S: VersionSource + ?Sized>(
    component: &ModelComponent,
    start: Option<Ref>,
    source: &S,
    throws: bool,
) -> DagResult<Vec<VersionInfo>> {
    let tags_by_ref = component
        .versions
        .iter()
        .map(|(tag, r)| (*r, tag.clone()))
        .collect();
    let mut walker = Walker {
        source,
        tags_by_ref,
        throws,
        seen: HashSet::new(),
        results: Vec::new(),
    };

    if let Some(head) = start.or(component.lane_head_local).or(component.head) {
        walker.visit(head, true)?;
    }
    let tagged: Vec<Ref> = component.versions.values().copied().collect();
    for r in tagged {
        walker.visit(r, false)?;
    }
    Ok(walker.results)
}

/// Refs that belong to the history of `start` (or the component's head).
pub fn all_version_hashes<S: VersionSource + ?Sized>(
    component: &ModelComponent,
    start: Option<Ref>,
    source: &S,
    throws: bool,
) -> DagResult<Vec<Ref>> {
    Ok(collect_versions_info(component, start, source, throws)?
        .into_iter()
        .filter(|info| info.is_part_of_history)
        .map(|info| info.id)
        .collect())
}

/// Load every version reachable from `starts` into a graph, skipping
/// versions the source does not have.
pub fn load_graph<S: VersionSource + ?Sized>(
    starts: &[Ref],
    source: &S,
) -> DagResult<VersionGraph> {
    let mut graph = VersionGraph::new();
    let mut seen = HashSet::new();
    let mut queue: VecDeque<Ref> = VecDeque::new();
    for start in starts {
        if seen.insert(*start) {
            queue.push_back(*start);
        }
    }
    while let Some(current) = queue.pop_front() {
        if let Some(version) = source.load_version(&current)? {
            for parent in &version.parents {
                if seen.insert(*parent) {
                    queue.push_back(*parent);
                }
            }
            graph.add_node(current, version.parents);
        }
    }
    Ok(graph)
}
