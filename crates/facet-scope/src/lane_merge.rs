//! Merging an incoming lane into the local lane of the same name.

use facet_dag::{all_version_hashes, DivergeData};
use facet_merge::LaneStep;
use facet_store::{Lane, ObjectStore, WriteBatch};
use tracing::{debug, info};

use crate::error::{ScopeError, ScopeResult};
use crate::repository::SourceRepository;
use crate::types::LaneMergeResult;

impl<S: ObjectStore> SourceRepository<S> {
    /// Merge every entry of `incoming` into the local lane.
    ///
    /// Entries missing locally are adopted with their whole history, entries
    /// behind the incoming head are fast-forwarded, and diverged entries are
    /// left for a merge snapshot during a local sync or rejected with
    /// [`ScopeError::NeedsUpdate`] otherwise. Either every entry is merged
    /// and the lane is staged, or nothing is.
    pub fn merge_lane(
        &self,
        incoming: &Lane,
        local: bool,
        batch: &mut WriteBatch,
    ) -> ScopeResult<Vec<LaneMergeResult>> {
        let (lane, results) = {
            let loader = self.version_loader(batch);
            let mut lane = self
                .load_lane(&incoming.id, batch)?
                .unwrap_or_else(|| Lane::new(incoming.id.clone()));
            let mut results = Vec::with_capacity(incoming.len());

            for entry in &incoming.components {
                let mut component = self
                    .find_component(&entry.id, batch)?
                    .ok_or_else(|| ScopeError::ComponentNotFound(entry.id.to_string()))?;
                let local_head = lane.get_component_head(&entry.id);
                component.lane_head_local = local_head;
                component.lane_head_remote = Some(entry.head);

                let step = LaneStep::classify(local_head, entry.head, local, |head| {
                    DivergeData::compute(Some(head), Some(entry.head), &loader)
                })?;
                debug!(component = %entry.id, step = ?step, "classified lane entry");

                let merged_versions = match step {
                    LaneStep::Adopt => {
                        component.lane_head_local = Some(entry.head);
                        lane.add_component(entry.id.clone(), entry.head);
                        all_version_hashes(&component, Some(entry.head), &loader, false)?
                    }
                    LaneStep::FastForward(snaps) => {
                        component.lane_head_local = Some(entry.head);
                        lane.add_component(entry.id.clone(), entry.head);
                        snaps
                    }
                    LaneStep::NeedsUpdate(head) => {
                        return Err(ScopeError::NeedsUpdate {
                            component: entry.id.to_string(),
                            head,
                        })
                    }
                    LaneStep::UpToDate | LaneStep::Diverged | LaneStep::LocalAhead => Vec::new(),
                };
                results.push(LaneMergeResult {
                    component,
                    merged_versions,
                });
            }
            (lane, results)
        };

        batch.stage(lane);
        info!(lane = %incoming.id, components = results.len(), local, "merged lane");
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use facet_store::InMemoryObjectStore;
    use facet_types::{ComponentId, LaneId, Ref};

    use crate::consumer::EmptyWorkspace;
    use crate::repository::tests::{button, consumer, repo, tag};
    use crate::repository::SourceRepository;

    use super::*;

    fn feature() -> LaneId {
        LaneId::new(Some("acme"), "feature").unwrap()
    }

    fn lane_at(head: Ref) -> Lane {
        let mut lane = Lane::new(feature());
        lane.add_component(button(), head);
        lane
    }

    /// Snap `content` on `lane` and persist.
    fn lane_snap(
        repo: &mut SourceRepository<InMemoryObjectStore>,
        lane: &mut Lane,
        content: &str,
    ) -> Ref {
        let mut batch = WriteBatch::new();
        let consumer = consumer(&button(), content).snapped();
        let component = repo
            .add_source(&consumer, &EmptyWorkspace, Some(lane), false, &mut batch)
            .unwrap();
        repo.persist(batch).unwrap();
        component.lane_head_local.unwrap()
    }

    fn staged_lane(repo: &SourceRepository<InMemoryObjectStore>, batch: &WriteBatch) -> Lane {
        repo.load_lane(&feature(), batch).unwrap().unwrap()
    }

    #[test]
    fn behind_entry_is_fast_forwarded() {
        let mut repo = repo();
        tag(&mut repo, &button(), "a", "1.0");
        let mut lane = Lane::new(feature());
        let h1 = lane_snap(&mut repo, &mut lane, "b");
        let h2 = lane_snap(&mut repo, &mut lane, "c");
        let h3 = lane_snap(&mut repo, &mut lane, "d");

        let mut batch = WriteBatch::new();
        batch.stage(lane_at(h1));
        let results = repo.merge_lane(&lane_at(h3), true, &mut batch).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].merged_versions, vec![h3, h2]);
        assert_eq!(results[0].component.lane_head_local, Some(h3));
        assert_eq!(results[0].component.lane_head_remote, Some(h3));
        assert_eq!(staged_lane(&repo, &batch).get_component_head(&button()), Some(h3));
    }

    #[test]
    fn diverged_local_sync_leaves_lane() {
        let mut repo = repo();
        tag(&mut repo, &button(), "a", "1.0");
        let mut base = Lane::new(feature());
        let h1 = lane_snap(&mut repo, &mut base, "b");
        let mut left = base.clone();
        let mut right = base.clone();
        let l = lane_snap(&mut repo, &mut left, "left");
        let r = lane_snap(&mut repo, &mut right, "right");
        assert_ne!(l, r);

        let mut batch = WriteBatch::new();
        batch.stage(left.clone());
        let results = repo.merge_lane(&right, true, &mut batch).unwrap();
        assert!(results[0].merged_versions.is_empty());
        assert_eq!(results[0].component.lane_head_local, Some(l));
        assert_eq!(results[0].component.lane_head_remote, Some(r));
        assert_eq!(staged_lane(&repo, &batch).get_component_head(&button()), Some(l));

        // A push of the diverged lane is rejected and nothing changes.
        let mut batch = WriteBatch::new();
        batch.stage(left.clone());
        let err = repo.merge_lane(&right, false, &mut batch).unwrap_err();
        assert!(matches!(err, ScopeError::NeedsUpdate { head, .. } if head == l));
        assert_eq!(staged_lane(&repo, &batch), left);
        assert_ne!(h1, l);
    }

    #[test]
    fn missing_local_lane_adopts_everything() {
        let mut repo = repo();
        let main = tag(&mut repo, &button(), "a", "1.0");
        let mut lane = Lane::new(feature());
        let h1 = lane_snap(&mut repo, &mut lane, "b");
        let h2 = lane_snap(&mut repo, &mut lane, "c");

        let mut batch = WriteBatch::new();
        batch.remove(Lane::identity_ref(&feature()));
        let results = repo.merge_lane(&lane, true, &mut batch).unwrap();
        assert_eq!(results[0].merged_versions, vec![h2, h1, main.head.unwrap()]);
        let adopted = staged_lane(&repo, &batch);
        assert_eq!(adopted.id, feature());
        assert_eq!(adopted.get_component_head(&button()), Some(h2));
    }

    #[test]
    fn same_head_and_local_ahead_are_noops() {
        let mut repo = repo();
        tag(&mut repo, &button(), "a", "1.0");
        let mut lane = Lane::new(feature());
        let h1 = lane_snap(&mut repo, &mut lane, "b");
        let h2 = lane_snap(&mut repo, &mut lane, "c");

        let mut batch = WriteBatch::new();
        let results = repo.merge_lane(&lane_at(h2), false, &mut batch).unwrap();
        assert!(results[0].merged_versions.is_empty());

        let results = repo.merge_lane(&lane_at(h1), false, &mut batch).unwrap();
        assert!(results[0].merged_versions.is_empty());
        assert_eq!(staged_lane(&repo, &batch).get_component_head(&button()), Some(h2));
    }

    #[test]
    fn unknown_component_fails_the_whole_lane() {
        let mut repo = repo();
        tag(&mut repo, &button(), "a", "1.0");
        let mut lane = Lane::new(feature());
        let h1 = lane_snap(&mut repo, &mut lane, "b");

        let mut incoming = lane_at(h1);
        incoming.add_component(ComponentId::new(Some("acme"), "ghost"), Ref::from_bytes(b"ghost"));
        let mut batch = WriteBatch::new();
        let err = repo.merge_lane(&incoming, true, &mut batch).unwrap_err();
        assert!(matches!(err, ScopeError::ComponentNotFound(_)));
        assert!(batch.is_empty());
    }
}
