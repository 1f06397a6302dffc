use std::collections::BTreeMap;

use facet_crypto::ContentHasher;
use facet_types::{ComponentId, Ref};
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};
use crate::object::{decode_json, encode_json, ObjectKind, StoredObject};

/// A file captured in a version, pointing at its [`Source`](crate::Source).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    /// Base name of the file.
    pub name: String,
    /// Path relative to the component root, `/`-separated.
    pub relative_path: String,
    /// Ref of the source object holding the contents.
    pub file: Ref,
    /// Whether the file is a test file.
    #[serde(default)]
    pub test: bool,
}

impl FileRef {
    pub fn new(relative_path: impl Into<String>, file: Ref) -> Self {
        let relative_path = relative_path.into();
        let name = relative_path
            .rsplit('/')
            .next()
            .unwrap_or(relative_path.as_str())
            .to_string();
        Self {
            name,
            relative_path,
            file,
            test: false,
        }
    }
}

/// How an import inside the component maps onto a dependency's files.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelativePath {
    pub source_relative_path: String,
    pub destination_relative_path: String,
    #[serde(default)]
    pub custom_resolve_used: bool,
}

/// A dependency edge recorded in a version.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyRecord {
    pub id: ComponentId,
    #[serde(default)]
    pub relative_paths: Vec<RelativePath>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildStatus {
    #[default]
    Pending,
    Succeed,
    Failed,
    Skipped,
}

/// Who created a version and why.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Log {
    pub message: String,
    /// Milliseconds since the Unix epoch.
    pub date_ms: u64,
    pub username: Option<String>,
    pub email: Option<String>,
}

impl Log {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }
}

/// Immutable node in a component's history graph.
///
/// The ref is sealed once from the canonical content (see
/// [`Version::compute_hash`]) and never recomputed. Repairing a parent link
/// after a removal rewrites the object under the same ref.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Version {
    /// Sealed ref; null until [`Version::seal`] runs.
    pub id: Ref,
    pub main_file: String,
    pub files: Vec<FileRef>,
    #[serde(default)]
    pub dists: Vec<FileRef>,
    #[serde(default)]
    pub main_dist_file: Option<String>,
    #[serde(default)]
    pub compiler_files: Vec<FileRef>,
    #[serde(default)]
    pub tester_files: Vec<FileRef>,
    #[serde(default)]
    pub artifacts: Vec<FileRef>,
    #[serde(default)]
    pub dependencies: Vec<DependencyRecord>,
    #[serde(default)]
    pub dev_dependencies: Vec<DependencyRecord>,
    #[serde(default)]
    pub extensions: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub build_status: BuildStatus,
    #[serde(default)]
    pub parents: Vec<Ref>,
    #[serde(default)]
    pub log: Log,
}

/// The hashed projection of a version. Excludes the log's date and author.
#[derive(Serialize)]
struct CanonicalVersion<'a> {
    main_file: &'a str,
    files: &'a [FileRef],
    dists: &'a [FileRef],
    main_dist_file: Option<&'a str>,
    compiler_files: &'a [FileRef],
    tester_files: &'a [FileRef],
    artifacts: &'a [FileRef],
    dependencies: &'a [DependencyRecord],
    dev_dependencies: &'a [DependencyRecord],
    extensions: &'a BTreeMap<String, serde_json::Value>,
    build_status: BuildStatus,
    parents: &'a [Ref],
    message: &'a str,
}

fn sort_by_path(files: &mut [FileRef]) {
    files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
}

impl Version {
    /// An unsealed root version with the given files.
    pub fn new(main_file: impl Into<String>, files: Vec<FileRef>) -> Self {
        Self {
            id: Ref::null(),
            main_file: main_file.into(),
            files,
            dists: Vec::new(),
            main_dist_file: None,
            compiler_files: Vec::new(),
            tester_files: Vec::new(),
            artifacts: Vec::new(),
            dependencies: Vec::new(),
            dev_dependencies: Vec::new(),
            extensions: BTreeMap::new(),
            build_status: BuildStatus::default(),
            parents: Vec::new(),
            log: Log::default(),
        }
    }

    /// Hash of the canonical content. Independent of file order.
    pub fn compute_hash(&self) -> StoreResult<Ref> {
        let mut files = self.files.clone();
        let mut dists = self.dists.clone();
        sort_by_path(&mut files);
        sort_by_path(&mut dists);
        let canonical = CanonicalVersion {
            main_file: &self.main_file,
            files: &files,
            dists: &dists,
            main_dist_file: self.main_dist_file.as_deref(),
            compiler_files: &self.compiler_files,
            tester_files: &self.tester_files,
            artifacts: &self.artifacts,
            dependencies: &self.dependencies,
            dev_dependencies: &self.dev_dependencies,
            extensions: &self.extensions,
            build_status: self.build_status,
            parents: &self.parents,
            message: &self.log.message,
        };
        ContentHasher::VERSION
            .hash_json(&canonical)
            .map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Sort files, compute the ref and fix it on this version.
    pub fn seal(&mut self) -> StoreResult<Ref> {
        sort_by_path(&mut self.files);
        sort_by_path(&mut self.dists);
        self.id = self.compute_hash()?;
        Ok(self.id)
    }

    pub fn is_sealed(&self) -> bool {
        !self.id.is_null()
    }

    pub fn has_parent(&self, parent: &Ref) -> bool {
        self.parents.contains(parent)
    }

    /// Append a parent unless it is already present or is this version.
    pub fn add_parent(&mut self, parent: Ref) {
        if parent != self.id && !self.has_parent(&parent) {
            self.parents.push(parent);
        }
    }

    /// Drop a parent link. Returns `true` if it was present.
    pub fn remove_parent(&mut self, parent: &Ref) -> bool {
        let before = self.parents.len();
        self.parents.retain(|p| p != parent);
        self.parents.len() != before
    }

    /// Every source ref this version points at.
    pub fn source_refs(&self) -> Vec<Ref> {
        self.files
            .iter()
            .chain(&self.dists)
            .chain(&self.compiler_files)
            .chain(&self.tester_files)
            .chain(&self.artifacts)
            .map(|f| f.file)
            .collect()
    }

    /// Convert into a `StoredObject` for storage.
    pub fn to_stored_object(&self) -> StoreResult<StoredObject> {
        if !self.is_sealed() {
            return Err(StoreError::NullRef);
        }
        encode_json(self.id, ObjectKind::Version, self)
    }

    /// Decode from a `StoredObject`.
    pub fn from_stored_object(obj: &StoredObject) -> StoreResult<Self> {
        let version: Self = decode_json(obj, ObjectKind::Version)?;
        if version.id != obj.id {
            return Err(StoreError::CorruptObject {
                id: obj.id,
                reason: format!("version records ref {}", version.id),
            });
        }
        Ok(version)
    }
}
