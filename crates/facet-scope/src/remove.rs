//! Removing versions and whole components.

use facet_store::{ModelComponent, ObjectStore, Version, WriteBatch};
use facet_types::ComponentId;
use tracing::{debug, info};

use crate::error::{ScopeError, ScopeResult};
use crate::repository::SourceRepository;

impl<S: ObjectStore> SourceRepository<S> {
    /// Remove the versions behind `labels` from `component`.
    ///
    /// `all_versions` must hold every version of the component. A removed
    /// head moves to its only parent, or is cleared for a root; a head with
    /// several parents cannot be removed. Surviving versions that list a
    /// removed ref as parent are rewritten without it. The component is
    /// restaged, or removed once nothing is left. Returns the updated
    /// component, `None` if it was removed.
    pub fn remove_versions(
        &self,
        component: &ModelComponent,
        labels: &[String],
        all_versions: &[Version],
        batch: &mut WriteBatch,
    ) -> ScopeResult<Option<ModelComponent>> {
        let id = component.id();
        let mut component = component.clone();
        let mut versions: Vec<Version> = all_versions.to_vec();
        let mut staged = WriteBatch::new();

        for label in labels {
            let missing = || ScopeError::VersionObjectMissing {
                component: id.to_string(),
                version: label.clone(),
            };
            let removed_ref = component.remove_version(label).ok_or_else(missing)?;
            let index = versions
                .iter()
                .position(|v| v.id == removed_ref)
                .ok_or_else(missing)?;
            let removed = versions.remove(index);

            if component.head == Some(removed_ref) {
                let new_head = match removed.parents.as_slice() {
                    [] => None,
                    [parent] => Some(*parent),
                    parents => {
                        return Err(ScopeError::MultipleParents {
                            component: id.to_string(),
                            version: removed_ref,
                            parents: parents.len(),
                        })
                    }
                };
                component.set_head(new_head);
            }
            // A tag may point at the same ref under another name.
            component.versions.retain(|_, r| *r != removed_ref);

            for version in versions.iter_mut() {
                if version.remove_parent(&removed_ref) {
                    debug!(
                        version = %version.id.short_hex(),
                        removed = %removed_ref.short_hex(),
                        "repaired parent link"
                    );
                    staged.stage(version.clone());
                }
            }
            staged.remove(removed_ref);
        }

        staged.remove_unmerged(id.to_string_without_version());
        let result = if component.is_empty() {
            staged.remove(component.object_ref());
            None
        } else {
            staged.stage(component.clone());
            Some(component)
        };
        batch.extend(staged);

        info!(
            component = %id,
            versions = ?labels,
            removed_component = result.is_none(),
            "removed versions"
        );
        Ok(result)
    }

    /// Remove a component: its tagged versions, its head and the component
    /// object itself.
    pub fn remove_component(&self, component: &ModelComponent, batch: &mut WriteBatch) {
        for r in component.versions.values().chain(component.head.as_ref()) {
            batch.remove(*r);
        }
        batch.remove(component.object_ref());
        batch.remove_unmerged(component.id().to_string_without_version());
        info!(component = %component.id(), "removed component");
    }

    /// Remove the component stored under `id`. Returns `false` if there is
    /// none.
    pub fn remove_component_by_id(
        &self,
        id: &ComponentId,
        batch: &mut WriteBatch,
    ) -> ScopeResult<bool> {
        match self.find_component(id, batch)? {
            Some(component) => {
                self.remove_component(&component, batch);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
