//! Initial reviewer assignment for new pull requests

use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::model::{PullRequest, ReviewerSet};
use crate::selector::CandidateSelector;
use crate::store::StoreTx;
use crate::{Error, Result};

/// Request to open a pull request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPullRequest {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
}

impl NewPullRequest {
    pub fn new(
        pull_request_id: impl Into<String>,
        pull_request_name: impl Into<String>,
        author_id: impl Into<String>,
    ) -> Self {
        Self {
            pull_request_id: pull_request_id.into(),
            pull_request_name: pull_request_name.into(),
            author_id: author_id.into(),
        }
    }
}

/// Open a pull request and draw up to `reviewers_per_pr` reviewers from the
/// author's team, never the author. An empty reviewer set is valid.
pub async fn create_pull_request(
    tx: &mut dyn StoreTx,
    selector: &CandidateSelector,
    clock: &dyn Clock,
    reviewers_per_pr: usize,
    request: &NewPullRequest,
) -> Result<PullRequest> {
    let author = tx.get_user(&request.author_id).await?;
    if !tx.team_exists(&author.team_name).await? {
        return Err(Error::NotFound(format!(
            "team {} of author {}",
            author.team_name, author.user_id
        )));
    }

    let exclude = [author.user_id.clone()];
    let eligible = selector
        .select_candidates(tx, &author.team_name, &exclude)
        .await?;
    let chosen = selector.sample(&eligible, reviewers_per_pr);

    let pr = PullRequest::open(
        &request.pull_request_id,
        &request.pull_request_name,
        &author.user_id,
        ReviewerSet::from_ids(chosen)?,
        clock.now(),
    )?;
    let created = tx.create_pr(&pr).await?;

    tracing::info!(
        pr_id = %created.pull_request_id,
        author = %created.author_id,
        reviewers = ?created.assigned_reviewers.as_slice(),
        "Pull request created"
    );
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{assert_reviewer_invariants, ctx, ids, service_with, team};
    use crate::{PrStatus, ReviewService, SeededSampler};
    use std::collections::HashSet;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_two_eligible_reviewers_both_assigned() {
        let (service, clock) =
            service_with(&[team("T", &[("A", true), ("B", true), ("C", true)])]).await;

        let pr = service
            .create_pull_request(&ctx(), &NewPullRequest::new("pr-1", "Add search", "A"))
            .await
            .unwrap();

        assert_eq!(pr.status, PrStatus::Open);
        assert_eq!(pr.created_at, clock.now());
        assert!(pr.merged_at.is_none());
        let expected: HashSet<String> = ["B", "C"].iter().map(|s| s.to_string()).collect();
        assert_eq!(ids(&pr), expected);
        assert_reviewer_invariants(&pr);
    }

    #[tokio::test]
    async fn test_samples_two_of_larger_team() {
        let (service, _) = service_with(&[team(
            "T",
            &[("A", true), ("B", true), ("C", true), ("D", true), ("E", false)],
        )])
        .await;

        for i in 0..20 {
            let pr = service
                .create_pull_request(&ctx(), &NewPullRequest::new(format!("pr-{i}"), "x", "A"))
                .await
                .unwrap();
            assert_eq!(pr.assigned_reviewers.len(), 2);
            assert!(!pr.assigned_reviewers.contains("E"), "inactive user drawn");
            assert_reviewer_invariants(&pr);
        }
    }

    #[tokio::test]
    async fn test_no_candidates_is_not_an_error() {
        let (service, _) = service_with(&[team("solo", &[("A", true), ("B", false)])]).await;

        let pr = service
            .create_pull_request(&ctx(), &NewPullRequest::new("pr-1", "Lonely", "A"))
            .await
            .unwrap();
        assert!(pr.assigned_reviewers.is_empty());
    }

    #[tokio::test]
    async fn test_single_candidate() {
        let (service, _) = service_with(&[team("pair", &[("A", true), ("B", true)])]).await;

        let pr = service
            .create_pull_request(&ctx(), &NewPullRequest::new("pr-1", "Pair", "A"))
            .await
            .unwrap();
        assert_eq!(pr.assigned_reviewers.as_slice(), &["B".to_string()]);
    }

    #[tokio::test]
    async fn test_inactive_author_can_still_open() {
        let (service, _) = service_with(&[team("T", &[("A", false), ("B", true)])]).await;

        let pr = service
            .create_pull_request(&ctx(), &NewPullRequest::new("pr-1", "x", "A"))
            .await
            .unwrap();
        assert_eq!(pr.assigned_reviewers.as_slice(), &["B".to_string()]);
    }

    #[tokio::test]
    async fn test_unknown_author() {
        let (service, _) = service_with(&[team("T", &[("A", true)])]).await;

        let err = service
            .create_pull_request(&ctx(), &NewPullRequest::new("pr-1", "x", "ghost"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_duplicate_id_rejected_and_original_kept() {
        let (service, _) =
            service_with(&[team("T", &[("A", true), ("B", true), ("C", true)])]).await;

        let first = service
            .create_pull_request(&ctx(), &NewPullRequest::new("pr-1", "First", "A"))
            .await
            .unwrap();
        let err = service
            .create_pull_request(&ctx(), &NewPullRequest::new("pr-1", "Second", "B"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::PrExists(id) if id == "pr-1"));

        let stored = service.get_pull_request(&ctx(), "pr-1").await.unwrap();
        assert_eq!(stored, first);
    }

    #[tokio::test]
    async fn test_concurrent_creates_exactly_one_wins() {
        let (service, _) = service_with(&[team(
            "T",
            &[("A", true), ("B", true), ("C", true), ("D", true)],
        )])
        .await;

        let mut handles = Vec::new();
        for i in 0..16 {
            let service = service.clone();
            handles.push(tokio::spawn(async move {
                let request = NewPullRequest::new("pr-race", format!("attempt {i}"), "A");
                service.create_pull_request(&ctx(), &request).await
            }));
        }

        let mut created = 0;
        let mut collisions = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(Error::PrExists(_)) => collisions += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert_eq!(created, 1);
        assert_eq!(collisions, 15);
    }

    #[tokio::test]
    async fn test_configured_reviewer_count() {
        let (service, _) = service_with(&[team(
            "T",
            &[("A", true), ("B", true), ("C", true), ("D", true)],
        )])
        .await;
        let service: ReviewService<_> = service
            .with_config(crate::config::AssignmentConfig { reviewers_per_pr: 3 })
            .with_selector(CandidateSelector::new(Arc::new(SeededSampler::seeded(1))));

        let pr = service
            .create_pull_request(&ctx(), &NewPullRequest::new("pr-1", "x", "A"))
            .await
            .unwrap();
        assert_eq!(pr.assigned_reviewers.len(), 3);
        assert_reviewer_invariants(&pr);
    }
}
