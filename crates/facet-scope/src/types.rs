use facet_store::{ModelComponent, ScopeObject, Source, Version};
use facet_types::{ComponentId, Ref};

/// A component together with objects that should be stored alongside it.
#[derive(Clone, Debug, PartialEq)]
pub struct ComponentTree {
    pub component: ModelComponent,
    pub objects: Vec<ScopeObject>,
}

/// Everything needed to reproduce a component elsewhere.
#[derive(Clone, Debug, PartialEq)]
pub struct ComponentObjects {
    pub component: ModelComponent,
    /// Reachable versions, parents before children.
    pub versions: Vec<Version>,
    pub sources: Vec<Source>,
}

impl ComponentObjects {
    /// Flatten into objects ready to be staged, component last.
    pub fn into_objects(self) -> Vec<ScopeObject> {
        let mut objects: Vec<ScopeObject> =
            self.sources.into_iter().map(ScopeObject::from).collect();
        objects.extend(self.versions.into_iter().map(ScopeObject::from));
        objects.push(self.component.into());
        objects
    }
}

/// Result of resolving one id in a batch lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComponentDef {
    pub id: ComponentId,
    pub component: Option<ModelComponent>,
}

/// Outcome of merging one incoming component.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MergeResult {
    pub component: ModelComponent,
    /// Tags that changed or were added, followed by new snaps (hex).
    pub merged_versions: Vec<String>,
}

/// Outcome of merging one entry of an incoming lane.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LaneMergeResult {
    /// The component with its lane heads filled in.
    pub component: ModelComponent,
    pub merged_versions: Vec<Ref>,
}

/// What a persist made durable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PersistReport {
    pub written: usize,
    pub removed: usize,
    pub unmerged_cleared: usize,
}
