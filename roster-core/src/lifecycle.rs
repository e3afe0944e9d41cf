//! Pull request lifecycle: `OPEN --merge--> MERGED`, terminal.

use crate::clock::Clock;
use crate::model::{PrStatus, PullRequest};
use crate::store::StoreTx;
use crate::Result;

impl PrStatus {
    /// Statuses reachable from this one
    pub fn valid_transitions(&self) -> &'static [PrStatus] {
        match self {
            PrStatus::Open => &[PrStatus::Merged],
            PrStatus::Merged => &[],
        }
    }

    pub fn can_transition_to(&self, to: PrStatus) -> bool {
        self.valid_transitions().contains(&to)
    }
}

/// Merge a pull request.
///
/// Idempotent: an already merged PR is returned unchanged, keeping its
/// original `merged_at`.
pub async fn merge(tx: &mut dyn StoreTx, clock: &dyn Clock, pr_id: &str) -> Result<PullRequest> {
    let mut pr = tx.get_pr(pr_id).await?;
    if !pr.status.can_transition_to(PrStatus::Merged) {
        tracing::debug!(pr_id = %pr_id, "Pull request already merged");
        return Ok(pr);
    }

    pr.mark_merged(clock.now());
    let merged = tx.update_pr(&pr).await?;

    tracing::info!(
        from = %PrStatus::Open,
        to = %merged.status,
        pr_id = %pr_id,
        "Pull request merged"
    );
    Ok(merged)
}
