//! Reviewer replacement, for one reviewer on one pull request or for every
//! open pull request a team is reviewing.

use crate::model::{Reassignment, ReassignmentSummary, ReviewerSet};
use crate::selector::CandidateSelector;
use crate::store::StoreTx;
use crate::{Conflict, Error, Result};

/// Replace `old_user_id` on `pr_id` with an active member of the same team.
///
/// The replacement is never the author or anyone already reviewing, and
/// takes the slot the old reviewer held.
pub async fn reassign(
    tx: &mut dyn StoreTx,
    selector: &CandidateSelector,
    pr_id: &str,
    old_user_id: &str,
) -> Result<Reassignment> {
    let mut pr = tx.get_pr(pr_id).await?;
    if pr.is_merged() {
        return Err(Conflict::PrMerged {
            pr_id: pr_id.to_string(),
        }
        .into());
    }
    if !pr.assigned_reviewers.contains(old_user_id) {
        return Err(Conflict::NotAssigned {
            pr_id: pr_id.to_string(),
            user_id: old_user_id.to_string(),
        }
        .into());
    }

    // The reviewer was valid when assigned, so a missing record is corruption
    let old_reviewer = tx.get_user(old_user_id).await.map_err(|e| match e {
        Error::NotFound(_) => Error::Infrastructure(format!(
            "reviewer {} of PR {} has no user record",
            old_user_id, pr_id
        )),
        other => other,
    })?;

    let exclude = pr.exclusion_set();
    let eligible = selector
        .select_candidates(tx, &old_reviewer.team_name, &exclude)
        .await?;
    let replacement = selector
        .sample(&eligible, 1)
        .into_iter()
        .next()
        .ok_or_else(|| Conflict::NoCandidate {
            pr_id: pr_id.to_string(),
            team_name: old_reviewer.team_name.clone(),
        })?;

    pr.assigned_reviewers.replace(old_user_id, replacement.clone())?;
    let updated = tx.update_pr(&pr).await?;

    tracing::info!(
        pr_id = %pr_id,
        old_reviewer = %old_user_id,
        new_reviewer = %replacement,
        "Reviewer reassigned"
    );
    Ok(Reassignment {
        pr: updated,
        replaced_by: replacement,
    })
}

/// Re-roll reviewers on every OPEN pull request that has at least one
/// reviewer from `team_name`.
///
/// Every slot of a qualifying PR is re-drawn from the team's eligible pool,
/// including slots held by reviewers from other teams. PRs with an empty
/// pool are skipped and not counted. Any store failure aborts the batch.
pub async fn reassign_team_prs(
    tx: &mut dyn StoreTx,
    selector: &CandidateSelector,
    team_name: &str,
) -> Result<ReassignmentSummary> {
    if !tx.team_exists(team_name).await? {
        return Err(Error::team_not_found(team_name));
    }

    let prs = tx.find_open_prs_touching_team(team_name).await?;
    tracing::debug!(team = %team_name, candidates = prs.len(), "Open PRs touching team");

    let mut reassigned = 0;
    for mut pr in prs {
        let slots = pr.assigned_reviewers.len();
        let exclude = pr.exclusion_set();
        let eligible = selector.select_candidates(tx, team_name, &exclude).await?;
        if eligible.is_empty() {
            tracing::warn!(
                pr_id = %pr.pull_request_id,
                team = %team_name,
                "No eligible reviewers, leaving PR unchanged"
            );
            continue;
        }

        let chosen = selector.sample(&eligible, slots);
        pr.set_reviewers(ReviewerSet::from_ids(chosen)?)?;

        match tx.update_pr(&pr).await {
            Ok(updated) => {
                tracing::debug!(
                    pr_id = %updated.pull_request_id,
                    reviewers = ?updated.assigned_reviewers.as_slice(),
                    "Reviewers re-rolled"
                );
                reassigned += 1;
            }
            // Merged since the snapshot was read: excluded, never rewritten
            Err(Error::Conflict(Conflict::PrMerged { pr_id })) => {
                tracing::warn!(pr_id = %pr_id, "PR merged during batch, skipping");
            }
            Err(e) => return Err(e),
        }
    }

    tracing::info!(
        team = %team_name,
        reassigned_prs = reassigned,
        "Team pull requests reassigned"
    );
    Ok(ReassignmentSummary {
        team_name: team_name.to_string(),
        reassigned_prs_count: reassigned,
    })
}
