//! Persistence interface for memberships and pull requests.
//!
//! Every engine operation runs inside one [`StoreTx`]. A transaction that is
//! dropped without [`StoreTx::commit`] rolls back all of its writes, which is
//! what makes caller cancellation safe.

use async_trait::async_trait;

use crate::model::{PullRequest, PullRequestSummary, Team, User};
use crate::Result;

/// Handle that opens transactions against the backing stores
#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Begin a transaction.
    ///
    /// Transactions are serialized: reads inside one always observe every
    /// previously committed write.
    async fn begin(&self) -> Result<Box<dyn StoreTx>>;
}

/// One logical transaction over the membership and pull request stores
#[async_trait]
pub trait StoreTx: Send {
    /// Fetch a user, `NotFound` if absent
    async fn get_user(&mut self, user_id: &str) -> Result<User>;

    /// Ids of active members of `team_name`, minus `exclude_ids`, ordered by id
    async fn find_active_team_members(
        &mut self,
        team_name: &str,
        exclude_ids: &[String],
    ) -> Result<Vec<String>>;

    /// Toggle a user's active flag, `NotFound` if absent
    async fn set_user_active(&mut self, user_id: &str, is_active: bool) -> Result<User>;

    /// Create a team and its members
    async fn create_team(&mut self, team: &Team) -> Result<Team>;

    /// Fetch a team and its members, `NotFound` if absent
    async fn get_team(&mut self, team_name: &str) -> Result<Team>;

    async fn team_exists(&mut self, team_name: &str) -> Result<bool>;

    /// Deactivate every member of a team, returning how many changed
    async fn deactivate_team_members(&mut self, team_name: &str) -> Result<u64>;

    /// Fetch a pull request, `NotFound` if absent
    async fn get_pr(&mut self, pr_id: &str) -> Result<PullRequest>;

    /// Insert a pull request, `PrExists` on id collision
    async fn create_pr(&mut self, pr: &PullRequest) -> Result<PullRequest>;

    /// Persist status, merge time and reviewers of a pull request that is
    /// still OPEN in the store. A MERGED row is never rewritten.
    async fn update_pr(&mut self, pr: &PullRequest) -> Result<PullRequest>;

    /// Pull requests (any status) the user is assigned to review
    async fn find_prs_reviewed_by(&mut self, user_id: &str) -> Result<Vec<PullRequestSummary>>;

    /// OPEN pull requests with at least one reviewer from `team_name`
    async fn find_open_prs_touching_team(&mut self, team_name: &str) -> Result<Vec<PullRequest>>;

    /// Every pull request, any status
    async fn list_prs(&mut self) -> Result<Vec<PullRequest>>;

    /// Make all writes of this transaction durable
    async fn commit(self: Box<Self>) -> Result<()>;

    /// Discard all writes of this transaction
    async fn rollback(self: Box<Self>) -> Result<()>;
}
