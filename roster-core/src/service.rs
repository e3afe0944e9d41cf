//! Operation entry points.
//!
//! Each public method is one logical transaction: it begins a store
//! transaction, runs the engine logic, and commits. Errors and cancellation
//! drop the transaction, which rolls it back.

use std::sync::Arc;

use crate::assignment::{self, NewPullRequest};
use crate::clock::{Clock, SystemClock};
use crate::config::AssignmentConfig;
use crate::context::OpContext;
use crate::lifecycle;
use crate::model::{
    DeactivationSummary, PullRequest, Reassignment, ReassignmentSummary, ReviewStat, Team, User,
    UserReviews,
};
use crate::reassignment;
use crate::selector::CandidateSelector;
use crate::stats;
use crate::store::ReviewStore;
use crate::Result;

/// Reviewer assignment service over a [`ReviewStore`]
#[derive(Clone)]
pub struct ReviewService<S> {
    store: S,
    selector: CandidateSelector,
    clock: Arc<dyn Clock>,
    config: AssignmentConfig,
}

impl<S: ReviewStore> ReviewService<S> {
    /// Service with a thread-local random sampler and the system clock
    pub fn new(store: S) -> Self {
        Self {
            store,
            selector: CandidateSelector::default(),
            clock: Arc::new(SystemClock),
            config: AssignmentConfig::default(),
        }
    }

    pub fn with_selector(mut self, selector: CandidateSelector) -> Self {
        self.selector = selector;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_config(mut self, config: AssignmentConfig) -> Self {
        self.config = config;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Create a team together with its members
    pub async fn create_team(&self, ctx: &OpContext, team: &Team) -> Result<Team> {
        ctx.run(async {
            let mut tx = self.store.begin().await?;
            let created = tx.create_team(team).await?;
            tx.commit().await?;

            tracing::info!(
                team = %created.team_name,
                members = created.members.len(),
                "Team created"
            );
            Ok(created)
        })
        .await
    }

    pub async fn get_team(&self, ctx: &OpContext, team_name: &str) -> Result<Team> {
        ctx.run(async {
            let mut tx = self.store.begin().await?;
            let team = tx.get_team(team_name).await?;
            tx.rollback().await?;
            Ok(team)
        })
        .await
    }

    /// Toggle whether a user can be drawn as a reviewer
    pub async fn set_user_active(
        &self,
        ctx: &OpContext,
        user_id: &str,
        is_active: bool,
    ) -> Result<User> {
        ctx.run(async {
            let mut tx = self.store.begin().await?;
            let user = tx.set_user_active(user_id, is_active).await?;
            tx.commit().await?;

            tracing::info!(user_id = %user_id, is_active, "User activity updated");
            Ok(user)
        })
        .await
    }

    /// Deactivate every member of a team. Reviewer sets are left alone.
    pub async fn deactivate_team(
        &self,
        ctx: &OpContext,
        team_name: &str,
    ) -> Result<DeactivationSummary> {
        ctx.run(async {
            let mut tx = self.store.begin().await?;
            let count = tx.deactivate_team_members(team_name).await?;
            tx.commit().await?;

            tracing::info!(team = %team_name, deactivated = count, "Team deactivated");
            Ok(DeactivationSummary {
                team_name: team_name.to_string(),
                deactivated_users_count: count,
            })
        })
        .await
    }

    /// Open a pull request with reviewers drawn from the author's team
    pub async fn create_pull_request(
        &self,
        ctx: &OpContext,
        request: &NewPullRequest,
    ) -> Result<PullRequest> {
        ctx.run(async {
            let mut tx = self.store.begin().await?;
            let pr = assignment::create_pull_request(
                tx.as_mut(),
                &self.selector,
                self.clock.as_ref(),
                self.config.reviewers_per_pr,
                request,
            )
            .await?;
            tx.commit().await?;
            Ok(pr)
        })
        .await
    }

    pub async fn get_pull_request(&self, ctx: &OpContext, pr_id: &str) -> Result<PullRequest> {
        ctx.run(async {
            let mut tx = self.store.begin().await?;
            let pr = tx.get_pr(pr_id).await?;
            tx.rollback().await?;
            Ok(pr)
        })
        .await
    }

    /// Replace one reviewer on one pull request
    pub async fn reassign(
        &self,
        ctx: &OpContext,
        pr_id: &str,
        old_user_id: &str,
    ) -> Result<Reassignment> {
        ctx.run(async {
            let mut tx = self.store.begin().await?;
            let outcome =
                reassignment::reassign(tx.as_mut(), &self.selector, pr_id, old_user_id).await?;
            tx.commit().await?;
            Ok(outcome)
        })
        .await
    }

    /// Re-roll reviewers on every open pull request touching a team
    pub async fn reassign_team_prs(
        &self,
        ctx: &OpContext,
        team_name: &str,
    ) -> Result<ReassignmentSummary> {
        ctx.run(async {
            let mut tx = self.store.begin().await?;
            let summary =
                reassignment::reassign_team_prs(tx.as_mut(), &self.selector, team_name).await?;
            tx.commit().await?;
            Ok(summary)
        })
        .await
    }

    /// Merge a pull request (idempotent)
    pub async fn merge(&self, ctx: &OpContext, pr_id: &str) -> Result<PullRequest> {
        ctx.run(async {
            let mut tx = self.store.begin().await?;
            let pr = lifecycle::merge(tx.as_mut(), self.clock.as_ref(), pr_id).await?;
            tx.commit().await?;
            Ok(pr)
        })
        .await
    }

    /// Review count per user, busiest first
    pub async fn review_stats(&self, ctx: &OpContext) -> Result<Vec<ReviewStat>> {
        ctx.run(async {
            let mut tx = self.store.begin().await?;
            let stats = stats::review_stats(tx.as_mut()).await?;
            tx.rollback().await?;
            Ok(stats)
        })
        .await
    }

    /// Pull requests a user is assigned to review
    pub async fn user_reviews(&self, ctx: &OpContext, user_id: &str) -> Result<UserReviews> {
        ctx.run(async {
            let mut tx = self.store.begin().await?;
            let reviews = stats::user_reviews(tx.as_mut(), user_id).await?;
            tx.rollback().await?;
            Ok(reviews)
        })
        .await
    }
}
