//! Turning a working-tree component into the version that represents it
//! in history.
//!
//! Every path is mapped back to its authored form and text content is
//! line-ending normalized before hashing, so two checkouts of the same
//! content produce the same ref however their files were laid out on disk.

use facet_store::{DependencyRecord, FileRef, Source, Version};
use tracing::debug;

use crate::config::SnapshotConfig;
use crate::consumer::{ComponentOrigin, ConsumerComponent, SourceFile, WorkspaceMap};
use crate::paths::{normalize_path, revert_dir_manipulation, to_linux_eol};

/// An unsealed version (no parents yet) and the sources it references.
#[derive(Clone, Debug, PartialEq)]
pub struct SnapshotParts {
    pub version: Version,
    pub sources: Vec<Source>,
}

/// Builds versions from working-tree components under a fixed
/// [`SnapshotConfig`].
pub struct SnapshotBuilder<'a, W: WorkspaceMap + ?Sized> {
    config: SnapshotConfig,
    workspace: &'a W,
}

/// Where the files of one set come from and how to treat them.
#[derive(Clone, Copy)]
struct FileSet<'a> {
    shared_dir: Option<&'a str>,
    wrap_dir: Option<&'a str>,
    normalize_eol: bool,
}

impl<'a, W: WorkspaceMap + ?Sized> SnapshotBuilder<'a, W> {
    pub fn new(config: &SnapshotConfig, workspace: &'a W) -> Self {
        Self {
            config: config.clone(),
            workspace,
        }
    }

    /// Build the version for `consumer`. The consumer is only read.
    pub fn build(&self, consumer: &ConsumerComponent) -> SnapshotParts {
        let shared_dir = consumer.originally_shared_dir.as_deref();
        let wrap_dir = consumer.wrap_dir.as_deref();
        let sources_set = FileSet {
            shared_dir,
            wrap_dir,
            normalize_eol: self.config.normalize_line_endings,
        };
        let aux_set = FileSet {
            shared_dir: None,
            wrap_dir: None,
            normalize_eol: self.config.normalize_line_endings,
        };
        let raw_set = FileSet {
            shared_dir: None,
            wrap_dir: None,
            normalize_eol: false,
        };

        let mut sources = Vec::new();
        let files = file_refs(&consumer.files, sources_set, &mut sources);
        let main_file = revert_dir_manipulation(&consumer.main_file, shared_dir, wrap_dir);
        let mut version = Version::new(main_file, files);
        version.dists = file_refs(&consumer.dists, raw_set, &mut sources);
        version.main_dist_file = consumer.main_dist_file.as_deref().map(normalize_path);
        version.compiler_files = file_refs(&consumer.compiler_files, aux_set, &mut sources);
        version.tester_files = file_refs(&consumer.tester_files, aux_set, &mut sources);
        version.artifacts = file_refs(&consumer.artifacts, raw_set, &mut sources);
        version.dependencies =
            self.revert_dependencies(&consumer.dependencies, shared_dir, wrap_dir);
        version.dev_dependencies =
            self.revert_dependencies(&consumer.dev_dependencies, shared_dir, wrap_dir);
        version.extensions = consumer.extensions.clone();
        version.build_status = consumer.build_status;
        version.log = consumer.log.clone();

        debug!(
            component = %consumer.id,
            files = version.files.len(),
            sources = sources.len(),
            "built snapshot"
        );
        SnapshotParts { version, sources }
    }

    fn revert_dependencies(
        &self,
        dependencies: &[DependencyRecord],
        shared_dir: Option<&str>,
        wrap_dir: Option<&str>,
    ) -> Vec<DependencyRecord> {
        dependencies
            .iter()
            .map(|dep| {
                let entry = self
                    .workspace
                    .entry(&dep.id, self.config.dependency_lookup_ignores_version);
                // Link targets of non-authored dependencies were laid out with
                // that dependency's own manipulation.
                let (dep_shared, dep_wrap) = match &entry {
                    Some(e) if e.origin != ComponentOrigin::Authored => {
                        (e.originally_shared_dir.as_deref(), e.wrap_dir.as_deref())
                    }
                    _ => (None, None),
                };
                let revert_custom = self.config.revert_custom_resolved_paths;
                let mut dep = dep.clone();
                for rp in &mut dep.relative_paths {
                    rp.source_relative_path = if rp.custom_resolve_used && !revert_custom {
                        normalize_path(&rp.source_relative_path)
                    } else {
                        revert_dir_manipulation(&rp.source_relative_path, shared_dir, wrap_dir)
                    };
                    rp.destination_relative_path = revert_dir_manipulation(
                        &rp.destination_relative_path,
                        dep_shared,
                        dep_wrap,
                    );
                }
                dep
            })
            .collect()
    }
}

fn file_refs(files: &[SourceFile], set: FileSet<'_>, sources: &mut Vec<Source>) -> Vec<FileRef> {
    let mut refs: Vec<FileRef> = files
        .iter()
        .map(|file| {
            let contents = if set.normalize_eol {
                to_linux_eol(&file.contents).into_owned()
            } else {
                file.contents.clone()
            };
            let source = Source::new(contents);
            let mut file_ref = FileRef::new(
                revert_dir_manipulation(&file.relative_path, set.shared_dir, set.wrap_dir),
                source.id(),
            );
            file_ref.test = file.test;
            sources.push(source);
            file_ref
        })
        .collect();
    refs.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    refs
}
