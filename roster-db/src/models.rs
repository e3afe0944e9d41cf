//! Row types and their mapping onto the domain model

use chrono::{DateTime, Utc};
use roster_core::{PullRequest, PullRequestSummary, ReviewerSet, User};

use crate::error::Result;

/// Row of the `users` table
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub user_id: String,
    pub username: String,
    pub team_name: String,
    pub is_active: bool,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            user_id: row.user_id,
            username: row.username,
            team_name: row.team_name,
            is_active: row.is_active,
        }
    }
}

/// Row of the `pull_requests` table, without its reviewers
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PullRequestRow {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub merged_at: Option<DateTime<Utc>>,
}

impl PullRequestRow {
    /// Combine with the reviewer ids, in slot order
    pub fn into_pull_request(self, reviewers: Vec<String>) -> Result<PullRequest> {
        Ok(PullRequest {
            status: self.status.parse()?,
            assigned_reviewers: ReviewerSet::from_ids(reviewers)?,
            pull_request_id: self.pull_request_id,
            pull_request_name: self.pull_request_name,
            author_id: self.author_id,
            created_at: self.created_at,
            merged_at: self.merged_at,
        })
    }

    pub fn into_summary(self) -> Result<PullRequestSummary> {
        Ok(PullRequestSummary {
            status: self.status.parse()?,
            pull_request_id: self.pull_request_id,
            pull_request_name: self.pull_request_name,
            author_id: self.author_id,
        })
    }
}

/// Row of the `pull_request_reviewers` table
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReviewerRow {
    pub pull_request_id: String,
    pub slot: i64,
    pub user_id: String,
}
