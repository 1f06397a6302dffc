//! Merging two copies of the same component.

use std::collections::HashSet;

use facet_store::ModelComponent;
use facet_types::Ref;
use tracing::debug;

/// Labels defined by both components that point at different versions.
///
/// Symmetric: swapping the arguments yields the same labels.
pub fn conflicting_labels(existing: &ModelComponent, incoming: &ModelComponent) -> Vec<String> {
    existing
        .versions
        .iter()
        .filter(|(tag, r)| incoming.versions.get(*tag).is_some_and(|other| other != *r))
        .map(|(tag, _)| tag.clone())
        .collect()
}

/// No label is defined differently on the two sides.
pub fn is_compatible(existing: &ModelComponent, incoming: &ModelComponent) -> bool {
    conflicting_labels(existing, incoming).is_empty()
}

/// Whether an incoming component may be merged into an existing one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mergeability {
    Allowed,
    /// Labels whose content differs between the two sides.
    Conflict(Vec<String>),
}

/// A local sync into a component with no unpushed work is always allowed;
/// otherwise the two sides must be compatible.
pub fn check_mergeable(
    existing: &ModelComponent,
    incoming: &ModelComponent,
    local: bool,
) -> Mergeability {
    if local && !existing.is_locally_changed() {
        return Mergeability::Allowed;
    }
    let conflicts = conflicting_labels(existing, incoming);
    if conflicts.is_empty() {
        Mergeability::Allowed
    } else {
        Mergeability::Conflict(conflicts)
    }
}

/// For a non-local merge of an incoming component with a head: the existing
/// head, if the incoming history does not contain it while the components
/// are otherwise compatible. The sender is behind and must pull first.
pub fn needs_update(
    existing: &ModelComponent,
    incoming: &ModelComponent,
    incoming_history: &[Ref],
    local: bool,
) -> Option<Ref> {
    if local {
        return None;
    }
    incoming.head?;
    let head = existing.head?;
    if incoming_history.contains(&head) || !is_compatible(existing, incoming) {
        return None;
    }
    Some(head)
}

/// Result of merging two components.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComponentMerge {
    pub merged: ModelComponent,
    /// Tags that changed or were added, then newly introduced snaps (hex).
    pub merged_versions: Vec<String>,
}

/// Merge `incoming` into `existing`. The caller has already checked
/// mergeability.
///
/// Incoming tags win. Snaps of the incoming history unknown to the existing
/// history are reported as merged. The head moves to the incoming head,
/// unless this is a local sync and the local side is at or ahead of it; a
/// local sync always records the incoming head as the remote head.
pub fn merge_components(
    existing: &ModelComponent,
    incoming: &ModelComponent,
    existing_history: &HashSet<Ref>,
    incoming_history: &[Ref],
    local: bool,
) -> ComponentMerge {
    let mut merged = existing.clone();
    let mut merged_versions = Vec::new();

    for (tag, r) in &incoming.versions {
        if merged.versions.get(tag) != Some(r) {
            merged.versions.insert(tag.clone(), *r);
            merged_versions.push(tag.clone());
        }
    }

    let tagged: HashSet<Ref> = merged.versions.values().copied().collect();
    merged_versions.extend(
        incoming_history
            .iter()
            .filter(|r| !existing_history.contains(*r) && !tagged.contains(*r))
            .map(Ref::to_hex),
    );

    if let Some(incoming_head) = incoming.head {
        let keep_local_head = local
            && existing.head.is_some()
            && (existing_history.contains(&incoming_head) || existing.is_locally_changed());
        if !keep_local_head {
            merged.head = Some(incoming_head);
        }
        if local {
            merged.remote_head = Some(incoming_head);
        } else {
            merged.local = false;
        }
        debug!(
            component = %merged.id(),
            head = ?merged.head,
            kept_local_head = keep_local_head,
            "merged component head"
        );
    }

    ComponentMerge {
        merged,
        merged_versions,
    }
}
