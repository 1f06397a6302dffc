//! Divergence between a local and a remote head.

use std::collections::HashSet;

use facet_types::Ref;
use tracing::debug;

use crate::error::DagResult;
use crate::traverse::{load_graph, VersionSource};

/// How two heads relate in the version graph.
///
/// Snap lists are ordered closest-to-head first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DivergeData {
    /// Closest shared ancestor, `None` for unrelated histories.
    pub common_snap_before_diverge: Option<Ref>,
    pub snaps_on_local_only: Vec<Ref>,
    pub snaps_on_remote_only: Vec<Ref>,
}

impl DivergeData {
    /// Walk both heads' ancestors through `source` and compare them.
    ///
    /// Versions the source lacks end the walk along that edge.
    pub fn compute<S: VersionSource + ?Sized>(
        local_head: Option<Ref>,
        remote_head: Option<Ref>,
        source: &S,
    ) -> DagResult<Self> {
        if local_head == remote_head {
            return Ok(Self {
                common_snap_before_diverge: local_head,
                ..Self::default()
            });
        }
        let starts: Vec<Ref> = local_head.into_iter().chain(remote_head).collect();
        let graph = load_graph(&starts, source)?;

        let local = local_head.map(|h| graph.ancestors_ordered(&h)).unwrap_or_default();
        let remote = remote_head.map(|h| graph.ancestors_ordered(&h)).unwrap_or_default();
        let local_set: HashSet<Ref> = local.iter().copied().collect();
        let remote_set: HashSet<Ref> = remote.iter().copied().collect();

        let data = Self {
            common_snap_before_diverge: local.iter().find(|r| remote_set.contains(*r)).copied(),
            snaps_on_local_only: local
                .iter()
                .filter(|r| !remote_set.contains(*r))
                .copied()
                .collect(),
            snaps_on_remote_only: remote
                .iter()
                .filter(|r| !local_set.contains(*r))
                .copied()
                .collect(),
        };
        debug!(
            local_only = data.snaps_on_local_only.len(),
            remote_only = data.snaps_on_remote_only.len(),
            "computed divergence"
        );
        Ok(data)
    }

    /// Neither head is an ancestor of the other.
    pub fn is_diverged(&self) -> bool {
        !self.snaps_on_local_only.is_empty() && !self.snaps_on_remote_only.is_empty()
    }

    /// The local head is a strict ancestor of the remote head.
    pub fn is_remote_ahead(&self) -> bool {
        !self.snaps_on_remote_only.is_empty() && self.snaps_on_local_only.is_empty()
    }

    /// The remote head is a strict ancestor of the local head.
    pub fn is_local_ahead(&self) -> bool {
        !self.snaps_on_local_only.is_empty() && self.snaps_on_remote_only.is_empty()
    }

    /// Both heads are the same.
    pub fn is_up_to_date(&self) -> bool {
        self.snaps_on_local_only.is_empty() && self.snaps_on_remote_only.is_empty()
    }
}
