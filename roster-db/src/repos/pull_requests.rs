//! Pull request repository.
//!
//! A pull request is one `pull_requests` row plus its reviewer rows in
//! `pull_request_reviewers`, ordered by slot.

use std::collections::HashMap;

use roster_core::{PrStatus, PullRequest, PullRequestSummary, ReviewerSet};
use sqlx::SqliteConnection;

use crate::error::Result;
use crate::models::{PullRequestRow, ReviewerRow};

const SELECT_PR: &str = r#"
    SELECT p.pull_request_id, p.pull_request_name, p.author_id, p.status,
           p.created_at, p.merged_at
    FROM pull_requests p
"#;

/// Repository for pull requests and their reviewer sets
pub struct PullRequestRepository<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> PullRequestRepository<'c> {
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        Self { conn }
    }

    /// Insert a pull request with its reviewers
    pub async fn insert(&mut self, pr: &PullRequest) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO pull_requests (
                pull_request_id, pull_request_name, author_id, status,
                created_at, merged_at
            )
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&pr.pull_request_id)
        .bind(&pr.pull_request_name)
        .bind(&pr.author_id)
        .bind(pr.status.as_str())
        .bind(pr.created_at)
        .bind(pr.merged_at)
        .execute(&mut *self.conn)
        .await?;

        self.insert_reviewers(&pr.pull_request_id, &pr.assigned_reviewers)
            .await
    }

    pub async fn get(&mut self, pr_id: &str) -> Result<Option<PullRequest>> {
        let row = sqlx::query_as::<_, PullRequestRow>(&format!(
            "{SELECT_PR} WHERE p.pull_request_id = ?"
        ))
        .bind(pr_id)
        .fetch_optional(&mut *self.conn)
        .await?;

        match row {
            Some(row) => {
                let reviewers = self.reviewers(pr_id).await?;
                Ok(Some(row.into_pull_request(reviewers)?))
            }
            None => Ok(None),
        }
    }

    /// Stored status, `None` if the pull request does not exist
    pub async fn status(&mut self, pr_id: &str) -> Result<Option<PrStatus>> {
        let status: Option<(String,)> =
            sqlx::query_as("SELECT status FROM pull_requests WHERE pull_request_id = ?")
                .bind(pr_id)
                .fetch_optional(&mut *self.conn)
                .await?;
        match status {
            Some((s,)) => Ok(Some(s.parse()?)),
            None => Ok(None),
        }
    }

    /// Reviewer ids in slot order
    pub async fn reviewers(&mut self, pr_id: &str) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT user_id FROM pull_request_reviewers WHERE pull_request_id = ? ORDER BY slot",
        )
        .bind(pr_id)
        .fetch_all(&mut *self.conn)
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Rewrite status, merge time and reviewers of a row that is still OPEN.
    ///
    /// Returns false, touching nothing, if the row is missing or merged.
    pub async fn update_open(&mut self, pr: &PullRequest) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE pull_requests
            SET status = ?, merged_at = ?
            WHERE pull_request_id = ? AND status = 'OPEN'
            "#,
        )
        .bind(pr.status.as_str())
        .bind(pr.merged_at)
        .bind(&pr.pull_request_id)
        .execute(&mut *self.conn)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        sqlx::query("DELETE FROM pull_request_reviewers WHERE pull_request_id = ?")
            .bind(&pr.pull_request_id)
            .execute(&mut *self.conn)
            .await?;
        self.insert_reviewers(&pr.pull_request_id, &pr.assigned_reviewers)
            .await?;
        Ok(true)
    }

    /// Summaries of pull requests (any status) `user_id` is reviewing
    pub async fn list_reviewed_by(&mut self, user_id: &str) -> Result<Vec<PullRequestSummary>> {
        let rows = sqlx::query_as::<_, PullRequestRow>(&format!(
            r#"{SELECT_PR}
            JOIN pull_request_reviewers r ON r.pull_request_id = p.pull_request_id
            WHERE r.user_id = ?
            ORDER BY p.created_at, p.pull_request_id"#
        ))
        .bind(user_id)
        .fetch_all(&mut *self.conn)
        .await?;

        rows.into_iter().map(PullRequestRow::into_summary).collect()
    }

    /// OPEN pull requests with at least one reviewer who belongs to `team_name`
    pub async fn list_open_touching_team(&mut self, team_name: &str) -> Result<Vec<PullRequest>> {
        let rows = sqlx::query_as::<_, PullRequestRow>(&format!(
            r#"{SELECT_PR}
            WHERE p.status = 'OPEN'
              AND EXISTS (
                SELECT 1
                FROM pull_request_reviewers r
                JOIN users u ON u.user_id = r.user_id
                WHERE r.pull_request_id = p.pull_request_id AND u.team_name = ?
              )
            ORDER BY p.created_at, p.pull_request_id"#
        ))
        .bind(team_name)
        .fetch_all(&mut *self.conn)
        .await?;

        let mut prs = Vec::with_capacity(rows.len());
        for row in rows {
            let reviewers = self.reviewers(&row.pull_request_id).await?;
            prs.push(row.into_pull_request(reviewers)?);
        }
        Ok(prs)
    }

    /// Every pull request, oldest first
    pub async fn list_all(&mut self) -> Result<Vec<PullRequest>> {
        let rows = sqlx::query_as::<_, PullRequestRow>(&format!(
            "{SELECT_PR} ORDER BY p.created_at, p.pull_request_id"
        ))
        .fetch_all(&mut *self.conn)
        .await?;

        let reviewer_rows = sqlx::query_as::<_, ReviewerRow>(
            "SELECT pull_request_id, slot, user_id FROM pull_request_reviewers ORDER BY pull_request_id, slot",
        )
        .fetch_all(&mut *self.conn)
        .await?;

        let mut by_pr: HashMap<String, Vec<String>> = HashMap::new();
        for r in reviewer_rows {
            by_pr.entry(r.pull_request_id).or_default().push(r.user_id);
        }

        rows.into_iter()
            .map(|row| {
                let reviewers = by_pr.remove(&row.pull_request_id).unwrap_or_default();
                row.into_pull_request(reviewers)
            })
            .collect()
    }

    async fn insert_reviewers(&mut self, pr_id: &str, reviewers: &ReviewerSet) -> Result<()> {
        for (slot, user_id) in reviewers.iter().enumerate() {
            sqlx::query(
                "INSERT INTO pull_request_reviewers (pull_request_id, slot, user_id) VALUES (?, ?, ?)",
            )
            .bind(pr_id)
            .bind(slot as i64)
            .bind(user_id)
            .execute(&mut *self.conn)
            .await?;
        }
        Ok(())
    }
}
