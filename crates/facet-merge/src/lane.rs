//! What a lane merge does with one incoming lane entry.

use facet_dag::DivergeData;
use facet_types::Ref;

/// Outcome for one component of an incoming lane.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LaneStep {
    /// The local lane has no entry for the component; take the incoming one.
    Adopt,
    /// Both sides point at the same head.
    UpToDate,
    /// The local head is an ancestor of the incoming head; advance to it.
    /// Carries the snaps only the incoming side has.
    FastForward(Vec<Ref>),
    /// Histories diverged during a local sync; leave the entry for an
    /// explicit merge snapshot.
    Diverged,
    /// Histories diverged during a push; the sender must reconcile with
    /// this local head first.
    NeedsUpdate(Ref),
    /// The incoming head is an ancestor of the local head.
    LocalAhead,
}

impl LaneStep {
    /// Classify an entry. `divergence` is only invoked when both heads
    /// exist and differ.
    pub fn classify<E>(
        local_head: Option<Ref>,
        incoming_head: Ref,
        local: bool,
        divergence: impl FnOnce(Ref) -> Result<DivergeData, E>,
    ) -> Result<Self, E> {
        let Some(local_head) = local_head else {
            return Ok(Self::Adopt);
        };
        if local_head == incoming_head {
            return Ok(Self::UpToDate);
        }
        let data = divergence(local_head)?;
        Ok(if data.is_diverged() {
            if local {
                Self::Diverged
            } else {
                Self::NeedsUpdate(local_head)
            }
        } else if data.is_remote_ahead() {
            Self::FastForward(data.snaps_on_remote_only)
        } else {
            Self::LocalAhead
        })
    }
}
