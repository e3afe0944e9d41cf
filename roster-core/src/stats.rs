//! Reviewer load derived from pull request reviewer sets

use std::collections::HashMap;

use crate::model::{PullRequest, ReviewStat, UserReviews};
use crate::store::StoreTx;
use crate::{Error, Result};

/// Review count per user over every pull request, any status.
///
/// Ordered by count descending, then user id ascending.
pub async fn review_stats(tx: &mut dyn StoreTx) -> Result<Vec<ReviewStat>> {
    let prs = tx.list_prs().await?;
    Ok(aggregate(&prs))
}

/// Count reviewer appearances across `prs`
pub fn aggregate(prs: &[PullRequest]) -> Vec<ReviewStat> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for pr in prs {
        for reviewer in &pr.assigned_reviewers {
            *counts.entry(reviewer.as_str()).or_default() += 1;
        }
    }

    let mut stats: Vec<ReviewStat> = counts
        .into_iter()
        .map(|(user_id, review_count)| ReviewStat {
            user_id: user_id.to_string(),
            review_count,
        })
        .collect();
    stats.sort_by(|a, b| {
        b.review_count
            .cmp(&a.review_count)
            .then_with(|| a.user_id.cmp(&b.user_id))
    });
    stats
}

/// Pull requests `user_id` is reviewing. Unknown users have an empty queue.
pub async fn user_reviews(tx: &mut dyn StoreTx, user_id: &str) -> Result<UserReviews> {
    let pull_requests = match tx.get_user(user_id).await {
        Ok(_) => tx.find_prs_reviewed_by(user_id).await?,
        Err(Error::NotFound(_)) => Vec::new(),
        Err(e) => return Err(e),
    };
    Ok(UserReviews {
        user_id: user_id.to_string(),
        pull_requests,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ReviewerSet;
    use chrono::Utc;

    fn pr(id: &str, reviewers: &[&str]) -> PullRequest {
        PullRequest::open(
            id,
            id,
            "author",
            ReviewerSet::from_ids(reviewers.iter().copied()).unwrap(),
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn test_aggregate_orders_by_count() {
        let prs = vec![pr("p1", &["x", "y"]), pr("p2", &["x"]), pr("p3", &[])];
        let stats = aggregate(&prs);
        assert_eq!(
            stats,
            vec![
                ReviewStat {
                    user_id: "x".into(),
                    review_count: 2
                },
                ReviewStat {
                    user_id: "y".into(),
                    review_count: 1
                },
            ]
        );
    }

    #[test]
    fn test_aggregate_ties_by_user_id() {
        let prs = vec![pr("p1", &["zed", "amy"]), pr("p2", &["bob"])];
        let ids: Vec<String> = aggregate(&prs).into_iter().map(|s| s.user_id).collect();
        assert_eq!(ids, vec!["amy", "bob", "zed"]);
    }

    #[test]
    fn test_aggregate_counts_merged_prs() {
        let mut merged = pr("p1", &["x"]);
        merged.mark_merged(Utc::now());
        let stats = aggregate(&[merged, pr("p2", &["x"])]);
        assert_eq!(stats[0].review_count, 2);
    }

    #[test]
    fn test_aggregate_empty() {
        assert!(aggregate(&[]).is_empty());
    }
}
