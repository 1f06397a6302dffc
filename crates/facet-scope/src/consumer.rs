//! The working-tree side of a snapshot: what the checkout hands over when a
//! component is tagged or snapped.

use std::collections::{BTreeMap, HashMap};

use facet_store::{BuildStatus, DependencyRecord, Log};
use facet_types::ComponentId;

/// One file as it exists in the working tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceFile {
    pub relative_path: String,
    pub contents: Vec<u8>,
    pub test: bool,
}

impl SourceFile {
    pub fn new(relative_path: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            relative_path: relative_path.into(),
            contents: contents.into(),
            test: false,
        }
    }
}

/// Label the new version is released under.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VersionRelease {
    Tag(String),
    /// Labelled by the hex of its own ref.
    Snap,
}

/// A component as loaded from the working tree.
#[derive(Clone, Debug, PartialEq)]
pub struct ConsumerComponent {
    pub id: ComponentId,
    pub release: Option<VersionRelease>,
    pub files: Vec<SourceFile>,
    pub main_file: String,
    /// Directory shared by all files when authored, stripped on checkout.
    pub originally_shared_dir: Option<String>,
    /// Directory the files were wrapped in on checkout.
    pub wrap_dir: Option<String>,
    pub dependencies: Vec<DependencyRecord>,
    pub dev_dependencies: Vec<DependencyRecord>,
    pub dists: Vec<SourceFile>,
    pub main_dist_file: Option<String>,
    pub compiler_files: Vec<SourceFile>,
    pub tester_files: Vec<SourceFile>,
    pub artifacts: Vec<SourceFile>,
    pub extensions: BTreeMap<String, serde_json::Value>,
    pub build_status: BuildStatus,
    pub log: Log,
}

impl ConsumerComponent {
    pub fn new(id: ComponentId, main_file: impl Into<String>, files: Vec<SourceFile>) -> Self {
        Self {
            id,
            release: None,
            files,
            main_file: main_file.into(),
            originally_shared_dir: None,
            wrap_dir: None,
            dependencies: Vec::new(),
            dev_dependencies: Vec::new(),
            dists: Vec::new(),
            main_dist_file: None,
            compiler_files: Vec::new(),
            tester_files: Vec::new(),
            artifacts: Vec::new(),
            extensions: BTreeMap::new(),
            build_status: BuildStatus::default(),
            log: Log::default(),
        }
    }

    pub fn tagged(mut self, tag: impl Into<String>) -> Self {
        self.release = Some(VersionRelease::Tag(tag.into()));
        self
    }

    pub fn snapped(mut self) -> Self {
        self.release = Some(VersionRelease::Snap);
        self
    }
}

/// How a component got into the workspace.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ComponentOrigin {
    Authored,
    Imported,
    Nested,
}

/// What the checkout recorded about a component.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkspaceEntry {
    pub origin: ComponentOrigin,
    pub originally_shared_dir: Option<String>,
    pub wrap_dir: Option<String>,
}

impl WorkspaceEntry {
    pub fn authored() -> Self {
        Self {
            origin: ComponentOrigin::Authored,
            originally_shared_dir: None,
            wrap_dir: None,
        }
    }
}

/// Checkout bookkeeping consulted while reverting dependency paths.
pub trait WorkspaceMap {
    fn entry(&self, id: &ComponentId, ignore_version: bool) -> Option<WorkspaceEntry>;
}

/// A workspace that knows no components.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmptyWorkspace;

impl WorkspaceMap for EmptyWorkspace {
    fn entry(&self, _id: &ComponentId, _ignore_version: bool) -> Option<WorkspaceEntry> {
        None
    }
}

impl WorkspaceMap for HashMap<ComponentId, WorkspaceEntry> {
    fn entry(&self, id: &ComponentId, ignore_version: bool) -> Option<WorkspaceEntry> {
        if let Some(entry) = self.get(id) {
            return Some(entry.clone());
        }
        if ignore_version {
            return self
                .iter()
                .find(|(key, _)| key.is_same_component(id))
                .map(|(_, entry)| entry.clone());
        }
        None
    }
}
