//! Reconciling an incoming copy of a component with the stored one.

use std::collections::{HashMap, HashSet};

use facet_dag::{all_version_hashes, DagResult};
use facet_merge::{check_mergeable, merge_components, needs_update, ComponentMerge, Mergeability};
use facet_store::{ModelComponent, ObjectStore, Version, WriteBatch};
use facet_types::Ref;
use tracing::{debug, info};

use crate::error::{ScopeError, ScopeResult};
use crate::repository::SourceRepository;
use crate::types::MergeResult;

impl<S: ObjectStore> SourceRepository<S> {
    /// Merge `incoming` into the stored component of the same identity.
    ///
    /// `incoming_versions` is the part of the incoming history that came with
    /// it; anything else is looked up locally and may be absent. `local` is
    /// set when syncing from a remote into this repository, unset when this
    /// repository receives an export. Only the merged component is staged.
    pub fn merge(
        &self,
        incoming: &ModelComponent,
        incoming_versions: &[Version],
        local: bool,
        batch: &mut WriteBatch,
    ) -> ScopeResult<MergeResult> {
        let id = incoming.id();
        let (existing, incoming_history, existing_history) = {
            let by_ref: HashMap<Ref, &Version> =
                incoming_versions.iter().map(|v| (v.id, v)).collect();
            let local_loader = self.version_loader(batch);
            let loader = |r: &Ref| -> DagResult<Option<Version>> {
                match by_ref.get(r) {
                    Some(version) => Ok(Some((*version).clone())),
                    None => local_loader(r),
                }
            };
            let incoming_history = all_version_hashes(incoming, None, &loader, false)?;
            let existing = self.find_component(&id, batch)?;
            let existing_history: HashSet<Ref> = match &existing {
                Some(existing) => all_version_hashes(existing, None, &loader, false)?
                    .into_iter()
                    .collect(),
                None => HashSet::new(),
            };
            (existing, incoming_history, existing_history)
        };

        let Some(existing) = existing else {
            let mut merged_versions: Vec<String> = incoming.versions.keys().cloned().collect();
            let tagged: HashSet<&Ref> = incoming.versions.values().collect();
            merged_versions.extend(
                incoming_history
                    .iter()
                    .filter(|r| !tagged.contains(r))
                    .map(Ref::to_hex),
            );
            debug!(component = %id, "no stored component, adopting incoming");
            batch.stage(incoming.clone());
            return Ok(MergeResult {
                component: incoming.clone(),
                merged_versions,
            });
        };

        if let Some(head) = needs_update(&existing, incoming, &incoming_history, local) {
            return Err(ScopeError::NeedsUpdate {
                component: id.to_string(),
                head,
            });
        }
        if let Mergeability::Conflict(versions) = check_mergeable(&existing, incoming, local) {
            return Err(ScopeError::MergeConflict {
                component: id.to_string(),
                versions,
            });
        }

        let ComponentMerge { merged, merged_versions } =
            merge_components(&existing, incoming, &existing_history, &incoming_history, local);

        batch.stage(merged.clone());
        info!(component = %id, local, merged = ?merged_versions, "merged component");
        Ok(MergeResult {
            component: merged,
            merged_versions,
        })
    }
}
