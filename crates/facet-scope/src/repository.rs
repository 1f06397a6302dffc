use std::collections::{BTreeSet, HashMap};
use std::io::Write;
use std::path::PathBuf;

use facet_dag::{collect_versions_info, DagError, DagResult, VersionGraph};
use facet_store::{
    FsObjectStore, InMemoryObjectStore, Lane, ModelComponent, ObjectStore, ScopeObject, Source,
    Staged, StoreError, StoreResult, UnmergedComponents, UnmergedEntry, Version, WriteBatch,
};
use facet_types::{is_hash, validate_tag_name, ComponentId, LaneId, Ref};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::config::ScopeConfig;
use crate::consumer::{ConsumerComponent, VersionRelease, WorkspaceMap};
use crate::error::{ScopeError, ScopeResult};
use crate::snapshot::SnapshotBuilder;
use crate::types::{ComponentDef, ComponentObjects, ComponentTree, PersistReport};

/// File next to `objects/` holding the unmerged tracker.
pub const UNMERGED_FILE: &str = "unmerged.json";

/// The component-level repository.
///
/// Operations never write to the store directly. They stage into the
/// [`WriteBatch`] they are handed and read through it, so a sequence of
/// operations sees its own pending changes. An operation that fails leaves
/// the batch as it found it. Nothing is durable until
/// [`SourceRepository::persist`].
pub struct SourceRepository<S: ObjectStore> {
    store: S,
    config: ScopeConfig,
    unmerged: UnmergedComponents,
    unmerged_path: Option<PathBuf>,
}

impl SourceRepository<InMemoryObjectStore> {
    /// A repository backed by memory only.
    pub fn in_memory(config: ScopeConfig) -> Self {
        Self::new(InMemoryObjectStore::new(), config)
    }
}

impl SourceRepository<FsObjectStore> {
    /// Open the filesystem repository at `config.store.path`.
    pub fn open(config: ScopeConfig) -> ScopeResult<Self> {
        let root = config
            .store
            .path
            .clone()
            .ok_or_else(|| ScopeError::Config("store.path is not set".into()))?;
        let store = FsObjectStore::open(&root, config.store.compression_level)?;
        let unmerged_path = root.join(UNMERGED_FILE);
        let unmerged = match std::fs::read(&unmerged_path) {
            Ok(bytes) => UnmergedComponents::from_bytes(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => UnmergedComponents::new(),
            Err(e) => return Err(e.into()),
        };
        info!(path = %root.display(), unmerged = unmerged.len(), "opened repository");
        Ok(Self {
            store,
            config,
            unmerged,
            unmerged_path: Some(unmerged_path),
        })
    }
}

impl<S: ObjectStore> SourceRepository<S> {
    pub fn new(store: S, config: ScopeConfig) -> Self {
        Self {
            store,
            config,
            unmerged: UnmergedComponents::new(),
            unmerged_path: None,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &ScopeConfig {
        &self.config
    }

    pub fn unmerged(&self) -> &UnmergedComponents {
        &self.unmerged
    }

    // ---- Object reads ----

    /// Read an object, staged state first.
    pub(crate) fn read_object(
        &self,
        id: &Ref,
        batch: &WriteBatch,
    ) -> StoreResult<Option<ScopeObject>> {
        match batch.lookup(id) {
            Staged::Object(object) => Ok(Some(object.clone())),
            Staged::Removed => Ok(None),
            Staged::Untouched => match self.store.read(id)? {
                Some(stored) => Ok(Some(ScopeObject::from_stored_object(&stored)?)),
                None => Ok(None),
            },
        }
    }

    fn object_exists(&self, id: &Ref, batch: &WriteBatch) -> StoreResult<bool> {
        match batch.lookup(id) {
            Staged::Object(_) => Ok(true),
            Staged::Removed => Ok(false),
            Staged::Untouched => self.store.exists(id),
        }
    }

    /// Version loader for history walks over `batch` and the store.
    pub(crate) fn version_loader<'a>(
        &'a self,
        batch: &'a WriteBatch,
    ) -> impl Fn(&Ref) -> DagResult<Option<Version>> + 'a {
        move |id: &Ref| Ok(self.read_object(id, batch)?.and_then(ScopeObject::into_version))
    }

    pub fn load_version(&self, id: &Ref, batch: &WriteBatch) -> ScopeResult<Option<Version>> {
        Ok(self.read_object(id, batch)?.and_then(ScopeObject::into_version))
    }

    pub fn load_source(&self, id: &Ref, batch: &WriteBatch) -> ScopeResult<Option<Source>> {
        match self.read_object(id, batch)? {
            Some(ScopeObject::Source(source)) => Ok(Some(source)),
            _ => Ok(None),
        }
    }

    pub fn load_lane(&self, id: &LaneId, batch: &WriteBatch) -> ScopeResult<Option<Lane>> {
        match self.read_object(&Lane::identity_ref(id), batch)? {
            Some(ScopeObject::Lane(lane)) => Ok(Some(lane)),
            _ => Ok(None),
        }
    }

    // ---- Resolution ----

    /// The component stored under `id`'s identity, following a symlink one
    /// hop. The version part of `id` is ignored.
    pub fn find_component(
        &self,
        id: &ComponentId,
        batch: &WriteBatch,
    ) -> ScopeResult<Option<ModelComponent>> {
        let object_ref = ModelComponent::identity_ref(id);
        match self.read_object(&object_ref, batch)? {
            None => Ok(None),
            Some(ScopeObject::Component(component)) => Ok(Some(component)),
            Some(ScopeObject::Symlink(symlink)) => {
                let target_ref = symlink.target_ref();
                match self.read_object(&target_ref, batch)? {
                    Some(ScopeObject::Component(component)) => Ok(Some(component)),
                    Some(other) => Err(StoreError::CorruptObject {
                        id: target_ref,
                        reason: format!("symlink target is a {} object", other.kind()),
                    }
                    .into()),
                    None => {
                        let hex = object_ref.to_hex();
                        Err(ScopeError::DanglingSymlink {
                            symlink: symlink.id.to_string(),
                            target: symlink.target.to_string(),
                            object_path: format!("objects/{}/{}", &hex[..2], &hex[2..]),
                        })
                    }
                }
            }
            Some(other) => Err(StoreError::CorruptObject {
                id: object_ref,
                reason: format!("expected a component, found a {} object", other.kind()),
            }
            .into()),
        }
    }

    /// Resolve `id`, including its version if it carries one.
    ///
    /// A snap version resolves when the object exists; a tag must be in the
    /// component's map and its version must load. Misses are `Ok(None)`.
    pub fn get(&self, id: &ComponentId, batch: &WriteBatch) -> ScopeResult<Option<ModelComponent>> {
        let Some(component) = self.find_component(id, batch)? else {
            debug!(component = %id, "component not found");
            return Ok(None);
        };
        let Some(version) = id.version() else {
            return Ok(Some(component));
        };

        let found = if is_hash(version) {
            self.object_exists(&Ref::from_hex(version)?, batch)?
        } else {
            match component.versions.get(version) {
                Some(r) => self.load_version(r, batch)?.is_some(),
                None => false,
            }
        };
        if !found {
            debug!(component = %id, version, "version not found");
            return Ok(None);
        }
        Ok(Some(component))
    }

    pub fn get_many(
        &self,
        ids: &[ComponentId],
        batch: &WriteBatch,
    ) -> ScopeResult<Vec<ComponentDef>> {
        ids.iter()
            .map(|id| {
                Ok(ComponentDef {
                    id: id.clone(),
                    component: self.get(id, batch)?,
                })
            })
            .collect()
    }

    /// The stored component, or a fresh unstaged one.
    pub fn find_or_add_component(
        &self,
        id: &ComponentId,
        batch: &WriteBatch,
    ) -> ScopeResult<ModelComponent> {
        Ok(self
            .find_component(id, batch)?
            .unwrap_or_else(|| ModelComponent::new(id)))
    }

    // ---- Export and import ----

    /// The component with every version it can reach and every source
    /// those versions reference.
    pub fn get_objects(
        &self,
        id: &ComponentId,
        batch: &WriteBatch,
    ) -> ScopeResult<ComponentObjects> {
        let component = self
            .find_component(id, batch)?
            .ok_or_else(|| ScopeError::ComponentNotFound(id.to_string()))?;
        let loader = self.version_loader(batch);
        let infos = collect_versions_info(&component, None, &loader, true)?;

        let mut by_ref = HashMap::with_capacity(infos.len());
        for info in &infos {
            let version = loader(&info.id)?.ok_or(DagError::VersionNotFound(info.id))?;
            by_ref.insert(info.id, version);
        }
        let order = VersionGraph::from_versions(by_ref.values()).topological_order()?;
        let versions: Vec<Version> = order.iter().filter_map(|r| by_ref.remove(r)).collect();

        let source_refs: BTreeSet<Ref> = versions.iter().flat_map(Version::source_refs).collect();
        let mut sources = Vec::with_capacity(source_refs.len());
        for r in source_refs {
            let source = self.load_source(&r, batch)?.ok_or(StoreError::NotFound(r))?;
            sources.push(source);
        }

        debug!(
            component = %id,
            versions = versions.len(),
            sources = sources.len(),
            "collected component objects"
        );
        Ok(ComponentObjects {
            component,
            versions,
            sources,
        })
    }

    /// Stage a component with its objects. A stored copy with more tags is
    /// kept instead of the incoming component.
    pub fn put(&self, tree: ComponentTree, batch: &mut WriteBatch) -> ScopeResult<()> {
        let existing = self.find_component(&tree.component.id(), batch)?;
        match existing {
            Some(existing) if existing.versions.len() > tree.component.versions.len() => {
                debug!(component = %existing.id(), "stored component has more tags, keeping it");
            }
            _ => {
                batch.stage(tree.component);
            }
        }
        batch.stage_many(tree.objects);
        Ok(())
    }

    pub fn put_objects(
        &self,
        objects: impl IntoIterator<Item = ScopeObject>,
        batch: &mut WriteBatch,
    ) {
        batch.stage_many(objects);
    }

    pub fn put_model_component(&self, component: ModelComponent, batch: &mut WriteBatch) {
        batch.stage(component);
    }

    // ---- Snapshots ----

    /// Record a working-tree component as a new version.
    ///
    /// With a lane the version is a snap on that lane: the lane entry moves
    /// and the component head stays. Without one the head advances and a
    /// tag, if any, is recorded. A pending merge blocks the snapshot unless
    /// it was resolved or `resolve_unmerged` is set; the snapshot then takes
    /// the other side's head as an extra parent and concludes the merge.
    pub fn add_source<W: WorkspaceMap + ?Sized>(
        &self,
        consumer: &ConsumerComponent,
        workspace: &W,
        lane: Option<&mut Lane>,
        resolve_unmerged: bool,
        batch: &mut WriteBatch,
    ) -> ScopeResult<ModelComponent> {
        let id = consumer.id.without_version();
        let release = consumer
            .release
            .as_ref()
            .ok_or_else(|| ScopeError::MissingRelease(id.to_string()))?;
        let tag = match release {
            VersionRelease::Tag(tag) => {
                if lane.is_some() {
                    return Err(ScopeError::TagOnLane {
                        component: id.to_string(),
                        tag: tag.clone(),
                    });
                }
                validate_tag_name(tag)?;
                Some(tag.as_str())
            }
            VersionRelease::Snap => None,
        };

        let unmerged = self.unmerged.get_entry(&id).cloned();
        if let Some(entry) = &unmerged {
            if !entry.resolved && !resolve_unmerged {
                return Err(ScopeError::Unmerged {
                    component: id.to_string(),
                    command: format!("merge {id} --resolve"),
                });
            }
        }

        let mut component = self.find_or_add_component(&id, batch)?;
        let parts = SnapshotBuilder::new(&self.config.snapshot, workspace).build(consumer);
        let mut version = parts.version;
        if let Some(parent) = component.parent_for_new_version(lane.as_deref()) {
            version.add_parent(parent);
        }
        if let Some(entry) = &unmerged {
            version.add_parent(entry.head);
            if version.log.message.is_empty() {
                version.log.message = UnmergedComponents::build_snap_message(entry);
            }
        }
        let version_ref = version.seal()?;

        let mut staged = WriteBatch::new();
        staged.stage_many(parts.sources);
        staged.stage(version);
        let lane_name = match lane {
            Some(lane) => {
                component.add_lane_version(version_ref, lane);
                staged.stage(lane.clone());
                Some(lane.id.to_string())
            }
            None => {
                component.add_version(version_ref, tag);
                None
            }
        };
        staged.stage(component.clone());
        if unmerged.is_some() {
            staged.remove_unmerged(id.to_string_without_version());
        }
        batch.extend(staged);

        info!(
            component = %id,
            version = %component.label_for_ref(&version_ref),
            lane = ?lane_name,
            resolved_merge = unmerged.is_some(),
            "added version"
        );
        Ok(component)
    }

    // ---- Unmerged tracker ----

    /// Record a merge left with conflicts. Takes effect immediately.
    pub fn mark_unmerged(&mut self, entry: UnmergedEntry) -> ScopeResult<()> {
        debug!(component = %entry.id, head = %entry.head.short_hex(), "marked unmerged");
        self.unmerged.add_entry(entry);
        self.save_unmerged()
    }

    /// Flag the pending merge of `id` as resolved so snapshots are allowed.
    pub fn mark_resolved(&mut self, id: &ComponentId) -> ScopeResult<bool> {
        if !self.unmerged.mark_resolved(id) {
            return Ok(false);
        }
        self.save_unmerged()?;
        Ok(true)
    }

    pub fn unmerged_entry(&self, id: &ComponentId) -> Option<&UnmergedEntry> {
        self.unmerged.get_entry(id)
    }

    fn save_unmerged(&self) -> ScopeResult<()> {
        let Some(path) = &self.unmerged_path else {
            return Ok(());
        };
        let dir = path.parent().unwrap_or_else(|| std::path::Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&self.unmerged.to_bytes()?)?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    // ---- Persist ----

    /// Make a batch durable: writes, then removals, then tracker changes.
    pub fn persist(&mut self, batch: WriteBatch) -> ScopeResult<PersistReport> {
        if batch.is_empty() {
            return Ok(PersistReport::default());
        }
        let objects = batch.to_stored_objects()?;
        let removals: Vec<Ref> = batch.removals().copied().collect();
        self.store.write_batch(&objects)?;
        let removed = self.store.delete_batch(&removals)?;

        let mut unmerged_cleared = 0;
        for name in batch.unmerged_removals() {
            if self.unmerged.remove(name) {
                unmerged_cleared += 1;
            }
        }
        if unmerged_cleared > 0 {
            self.save_unmerged()?;
        }

        let report = PersistReport {
            written: objects.len(),
            removed,
            unmerged_cleared,
        };
        info!(
            written = report.written,
            removed = report.removed,
            unmerged_cleared = report.unmerged_cleared,
            "persisted batch"
        );
        Ok(report)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use facet_store::Symlink;

    use crate::consumer::{EmptyWorkspace, SourceFile};

    pub(crate) fn repo() -> SourceRepository<InMemoryObjectStore> {
        SourceRepository::in_memory(ScopeConfig::default())
    }

    pub(crate) fn button() -> ComponentId {
        ComponentId::new(Some("acme"), "button")
    }

    pub(crate) fn consumer(id: &ComponentId, content: &str) -> ConsumerComponent {
        ConsumerComponent::new(id.clone(), "index.ts", vec![SourceFile::new("index.ts", content)])
    }

    /// Tag `id` with `content` and persist.
    pub(crate) fn tag(
        repo: &mut SourceRepository<InMemoryObjectStore>,
        id: &ComponentId,
        content: &str,
        tag: &str,
    ) -> ModelComponent {
        let mut batch = WriteBatch::new();
        let input = consumer(id, content).tagged(tag);
        let component = repo
            .add_source(&input, &EmptyWorkspace, None, false, &mut batch)
            .unwrap();
        repo.persist(batch).unwrap();
        component
    }

    /// Snap `id` with `content` and persist.
    pub(crate) fn snap(
        repo: &mut SourceRepository<InMemoryObjectStore>,
        id: &ComponentId,
        content: &str,
    ) -> Ref {
        let mut batch = WriteBatch::new();
        let component = repo
            .add_source(&consumer(id, content).snapped(), &EmptyWorkspace, None, false, &mut batch)
            .unwrap();
        repo.persist(batch).unwrap();
        component.head.unwrap()
    }

    fn none() -> WriteBatch {
        WriteBatch::new()
    }

    // -----------------------------------------------------------------------
    // Snapshots and resolution
    // -----------------------------------------------------------------------

    #[test]
    fn tag_then_lookup_round_trips_content() {
        let mut repo = repo();
        let component = tag(&mut repo, &button(), "export const a = 1;\r\n", "1.0.0");
        let r = component.versions["1.0.0"];
        assert_eq!(component.head, Some(r));
        assert!(component.local);

        let found = repo.get(&button().with_version("1.0.0"), &none()).unwrap().unwrap();
        let version = repo.load_version(&found.versions["1.0.0"], &none()).unwrap().unwrap();
        let source = repo.load_source(&version.files[0].file, &none()).unwrap().unwrap();
        assert_eq!(source.contents, b"export const a = 1;\n");
    }

    #[test]
    fn second_tag_has_first_as_parent() {
        let mut repo = repo();
        let first = tag(&mut repo, &button(), "a", "1.0.0");
        let second = tag(&mut repo, &button(), "b", "1.1.0");
        let v2 = repo.load_version(&second.versions["1.1.0"], &none()).unwrap().unwrap();
        assert_eq!(v2.parents, vec![first.versions["1.0.0"]]);
        assert_eq!(second.versions.len(), 2);
    }

    #[test]
    fn missing_versions_are_not_found() {
        let mut repo = repo();
        tag(&mut repo, &button(), "a", "1.0.0");
        assert!(repo.get(&button().with_version("2.0.0"), &none()).unwrap().is_none());
        let missing_snap = Ref::from_bytes(b"nope").to_hex();
        assert!(repo.get(&button().with_version(missing_snap), &none()).unwrap().is_none());
        assert!(repo.get(&ComponentId::new(Some("acme"), "card"), &none()).unwrap().is_none());
    }

    #[test]
    fn tag_without_its_version_object_is_not_found() {
        let mut repo = repo();
        let component = tag(&mut repo, &button(), "a", "1.0.0");
        let mut batch = WriteBatch::new();
        batch.remove(component.versions["1.0.0"]);

        assert!(repo.get(&button().with_version("1.0.0"), &batch).unwrap().is_none());
        assert!(repo.get(&button(), &batch).unwrap().is_some());
        assert!(repo.get(&button().with_version("1.0.0"), &none()).unwrap().is_some());
    }

    #[test]
    fn snap_resolves_by_existence() {
        let mut repo = repo();
        let head = snap(&mut repo, &button(), "a");
        let component = repo.get(&button().with_version(head.to_hex()), &none()).unwrap().unwrap();
        assert!(component.versions.is_empty());
        assert_eq!(component.head, Some(head));
    }

    #[test]
    fn nothing_is_durable_before_persist() {
        let repo = repo();
        let mut batch = WriteBatch::new();
        let input = consumer(&button(), "a").tagged("1.0.0");
        repo.add_source(&input, &EmptyWorkspace, None, false, &mut batch)
            .unwrap();
        assert!(repo.store().is_empty());
        // Reads through the batch see the staged component.
        assert!(repo.get(&button(), &batch).unwrap().is_some());
        assert!(repo.get(&button(), &none()).unwrap().is_none());
    }

    #[test]
    fn missing_release_and_bad_tag_are_rejected() {
        let repo = repo();
        let mut batch = WriteBatch::new();
        let err = repo
            .add_source(&consumer(&button(), "a"), &EmptyWorkspace, None, false, &mut batch)
            .unwrap_err();
        assert!(matches!(err, ScopeError::MissingRelease(_)));
        let input = consumer(&button(), "a").tagged("bad tag");
        let err = repo
            .add_source(&input, &EmptyWorkspace, None, false, &mut batch)
            .unwrap_err();
        assert!(matches!(err, ScopeError::Type(_)));
        assert!(batch.is_empty());
    }

    #[test]
    fn get_many_pairs_ids_with_results() {
        let mut repo = repo();
        tag(&mut repo, &button(), "a", "1.0.0");
        let card = ComponentId::new(Some("acme"), "card");
        let defs = repo.get_many(&[button(), card.clone()], &none()).unwrap();
        assert!(defs[0].component.is_some());
        assert_eq!(defs[1].id, card);
        assert!(defs[1].component.is_none());
    }

    // -----------------------------------------------------------------------
    // Symlinks
    // -----------------------------------------------------------------------

    #[test]
    fn symlink_is_followed_once() {
        let mut repo = repo();
        tag(&mut repo, &button(), "a", "1.0.0");
        let old = ComponentId::new(None, "button");
        let mut batch = WriteBatch::new();
        batch.stage(Symlink::new(old.clone(), button()));
        let found = repo.find_component(&old, &batch).unwrap().unwrap();
        assert_eq!(found.id(), button());
    }

    #[test]
    fn dangling_symlink_is_an_integrity_error() {
        let repo = repo();
        let old = ComponentId::new(None, "button");
        let mut batch = WriteBatch::new();
        batch.stage(Symlink::new(old.clone(), button()));
        let err = repo.find_component(&old, &batch).unwrap_err();
        match err {
            ScopeError::DanglingSymlink { symlink, target, object_path } => {
                assert_eq!(symlink, "button");
                assert_eq!(target, "acme/button");
                assert!(object_path.starts_with("objects/"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    // -----------------------------------------------------------------------
    // Lanes
    // -----------------------------------------------------------------------

    #[test]
    fn snap_on_lane_leaves_head() {
        let mut repo = repo();
        let main = tag(&mut repo, &button(), "a", "1.0.0");
        let mut lane = Lane::new(LaneId::new(Some("acme"), "feature").unwrap());

        let mut batch = WriteBatch::new();
        let input = consumer(&button(), "b").snapped();
        let component = repo
            .add_source(&input, &EmptyWorkspace, Some(&mut lane), false, &mut batch)
            .unwrap();
        assert_eq!(component.head, main.head);
        let lane_head = lane.get_component_head(&button()).unwrap();
        assert_eq!(component.lane_head_local, Some(lane_head));

        let version = repo.load_version(&lane_head, &batch).unwrap().unwrap();
        assert_eq!(version.parents, vec![main.head.unwrap()]);
        assert_eq!(repo.load_lane(&lane.id, &batch).unwrap(), Some(lane.clone()));

        // The next lane snap builds on the lane entry.
        let mut batch2 = batch.clone();
        let input = consumer(&button(), "c").snapped();
        let c2 = repo
            .add_source(&input, &EmptyWorkspace, Some(&mut lane), false, &mut batch2)
            .unwrap();
        let v3 = repo.load_version(&c2.lane_head_local.unwrap(), &batch2).unwrap().unwrap();
        assert_eq!(v3.parents, vec![lane_head]);
    }

    #[test]
    fn tag_on_lane_is_rejected() {
        let repo = repo();
        let mut lane = Lane::new(LaneId::new(None, "feature").unwrap());
        let mut batch = WriteBatch::new();
        let input = consumer(&button(), "a").tagged("1.0.0");
        let err = repo
            .add_source(&input, &EmptyWorkspace, Some(&mut lane), false, &mut batch)
            .unwrap_err();
        assert!(matches!(err, ScopeError::TagOnLane { .. }));
        assert!(lane.is_empty());
    }

    // -----------------------------------------------------------------------
    // Unmerged components
    // -----------------------------------------------------------------------

    #[test]
    fn unmerged_component_blocks_snapshot() {
        let mut repo = repo();
        tag(&mut repo, &button(), "a", "1.0.0");
        repo.mark_unmerged(UnmergedEntry::new(&button(), Ref::from_bytes(b"other"))).unwrap();

        let mut batch = WriteBatch::new();
        let input = consumer(&button(), "b").snapped();
        let err = repo
            .add_source(&input, &EmptyWorkspace, None, false, &mut batch)
            .unwrap_err();
        assert!(err.to_string().contains("merge acme/button --resolve"));
        assert!(batch.is_empty());
    }

    #[test]
    fn resolving_snapshot_takes_merge_parent() {
        let mut repo = repo();
        let main = tag(&mut repo, &button(), "a", "1.0.0");
        let other = Ref::from_bytes(b"other tip");
        repo.mark_unmerged(UnmergedEntry::new(&button(), other)).unwrap();

        let mut batch = WriteBatch::new();
        let input = consumer(&button(), "b").snapped();
        let component = repo
            .add_source(&input, &EmptyWorkspace, None, true, &mut batch)
            .unwrap();
        let version = repo.load_version(&component.head.unwrap(), &batch).unwrap().unwrap();
        assert_eq!(version.parents, vec![main.head.unwrap(), other]);
        assert_eq!(version.log.message, "merge main");

        // The entry goes away with the persist, not before.
        assert!(repo.unmerged_entry(&button()).is_some());
        let report = repo.persist(batch).unwrap();
        assert_eq!(report.unmerged_cleared, 1);
        assert!(repo.unmerged_entry(&button()).is_none());
    }

    #[test]
    fn resolved_entry_allows_snapshot() {
        let mut repo = repo();
        tag(&mut repo, &button(), "a", "1.0.0");
        repo.mark_unmerged(UnmergedEntry::new(&button(), Ref::from_bytes(b"x"))).unwrap();
        assert!(repo.mark_resolved(&button()).unwrap());
        let mut batch = WriteBatch::new();
        let mut c = consumer(&button(), "b").snapped();
        c.log.message = "reconciled".into();
        let component = repo.add_source(&c, &EmptyWorkspace, None, false, &mut batch).unwrap();
        let version = repo.load_version(&component.head.unwrap(), &batch).unwrap().unwrap();
        assert_eq!(version.log.message, "reconciled");
    }

    // -----------------------------------------------------------------------
    // Export and import
    // -----------------------------------------------------------------------

    #[test]
    fn get_objects_orders_parents_first() {
        let mut repo = repo();
        tag(&mut repo, &button(), "a", "1.0.0");
        snap(&mut repo, &button(), "b");
        tag(&mut repo, &button(), "c", "1.1.0");
        let objects = repo.get_objects(&button(), &none()).unwrap();
        assert_eq!(objects.versions.len(), 3);
        assert_eq!(objects.sources.len(), 3);
        for (i, v) in objects.versions.iter().enumerate().skip(1) {
            assert_eq!(v.parents, vec![objects.versions[i - 1].id]);
        }
        let count = objects.clone().into_objects().len();
        assert_eq!(count, 7);
    }

    #[test]
    fn get_objects_of_missing_component_fails() {
        let err = repo().get_objects(&button(), &none()).unwrap_err();
        assert!(matches!(err, ScopeError::ComponentNotFound(_)));
    }

    #[test]
    fn put_copies_objects_between_repositories() {
        let mut source = repo();
        tag(&mut source, &button(), "a", "1.0.0");
        tag(&mut source, &button(), "b", "1.1.0");
        let objects = source.get_objects(&button(), &none()).unwrap();

        let mut target = repo();
        let mut batch = WriteBatch::new();
        let component = objects.component.clone();
        let rest: Vec<ScopeObject> = objects
            .into_objects()
            .into_iter()
            .filter(|o| !matches!(o, ScopeObject::Component(_)))
            .collect();
        target.put(ComponentTree { component, objects: rest }, &mut batch).unwrap();
        target.persist(batch).unwrap();

        let found = target.get(&button().with_version("1.0.0"), &none()).unwrap().unwrap();
        assert_eq!(found.versions.len(), 2);
    }

    #[test]
    fn put_keeps_component_with_more_tags() {
        let mut repo = repo();
        let stored = tag(&mut repo, &button(), "a", "1.0.0");
        tag(&mut repo, &button(), "b", "1.1.0");

        let mut batch = WriteBatch::new();
        repo.put(
            ComponentTree {
                component: stored,
                objects: vec![],
            },
            &mut batch,
        )
        .unwrap();
        assert!(batch.is_empty());
    }

    // -----------------------------------------------------------------------
    // Filesystem repository
    // -----------------------------------------------------------------------

    #[test]
    fn filesystem_repository_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ScopeConfig::default();
        config.store.path = Some(dir.path().to_path_buf());

        let mut repo = SourceRepository::open(config.clone()).unwrap();
        let mut batch = WriteBatch::new();
        let input = consumer(&button(), "a").tagged("1.0.0");
        repo.add_source(&input, &EmptyWorkspace, None, false, &mut batch)
            .unwrap();
        let report = repo.persist(batch).unwrap();
        assert_eq!(report.written, 3);
        repo.mark_unmerged(UnmergedEntry::new(&button(), Ref::from_bytes(b"x"))).unwrap();
        drop(repo);

        let repo = SourceRepository::open(config).unwrap();
        assert!(repo.get(&button().with_version("1.0.0"), &none()).unwrap().is_some());
        assert!(repo.unmerged_entry(&button()).is_some());
    }

    #[test]
    fn open_without_path_is_config_error() {
        let err = SourceRepository::open(ScopeConfig::default()).err().unwrap();
        assert!(matches!(err, ScopeError::Config(_)));
    }
}
