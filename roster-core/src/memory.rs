//! In-memory implementation of [`ReviewStore`].
//!
//! All state lives behind one async mutex. A transaction holds the lock for
//! its whole lifetime and works on a private copy that replaces the shared
//! state on commit, so transactions are fully serialized and a dropped
//! transaction leaves no trace. State is lost on restart.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::model::{PrStatus, PullRequest, PullRequestSummary, Team, TeamMember, User};
use crate::store::{ReviewStore, StoreTx};
use crate::{Conflict, Error, Result};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    teams: BTreeSet<String>,
    users: BTreeMap<String, User>,
    prs: BTreeMap<String, PullRequest>,
    /// Forced outcomes for updates of specific PR ids
    #[cfg(test)]
    failing_updates: BTreeMap<String, UpdateFailure>,
}

/// How a forced update fails
#[cfg(test)]
#[derive(Debug, Clone, Copy)]
pub(crate) enum UpdateFailure {
    /// The backend breaks
    Infrastructure,
    /// The row was merged by someone else after it was read
    MergedConcurrently,
}

impl MemoryState {
    #[cfg(test)]
    fn check_forced_failure(&self, pr_id: &str) -> Result<()> {
        match self.failing_updates.get(pr_id) {
            Some(UpdateFailure::Infrastructure) => Err(Error::Infrastructure(format!(
                "forced update failure for PR {}",
                pr_id
            ))),
            Some(UpdateFailure::MergedConcurrently) => Err(Conflict::PrMerged {
                pr_id: pr_id.to_string(),
            }
            .into()),
            None => Ok(()),
        }
    }

    #[cfg(not(test))]
    fn check_forced_failure(&self, _pr_id: &str) -> Result<()> {
        Ok(())
    }

    fn sorted_prs(&self) -> Vec<&PullRequest> {
        let mut prs: Vec<&PullRequest> = self.prs.values().collect();
        prs.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.pull_request_id.cmp(&b.pull_request_id))
        });
        prs
    }
}

/// In-memory review store
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later update of `pr_id` fail with `failure`
    #[cfg(test)]
    pub(crate) async fn fail_updates(&self, pr_id: impl Into<String>, failure: UpdateFailure) {
        self.state
            .lock()
            .await
            .failing_updates
            .insert(pr_id.into(), failure);
    }
}

#[async_trait]
impl ReviewStore for InMemoryStore {
    async fn begin(&self) -> Result<Box<dyn StoreTx>> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryTx { guard, working }))
    }
}

struct MemoryTx {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
}

#[async_trait]
impl StoreTx for MemoryTx {
    async fn get_user(&mut self, user_id: &str) -> Result<User> {
        self.working
            .users
            .get(user_id)
            .cloned()
            .ok_or_else(|| Error::user_not_found(user_id))
    }

    async fn find_active_team_members(
        &mut self,
        team_name: &str,
        exclude_ids: &[String],
    ) -> Result<Vec<String>> {
        Ok(self
            .working
            .users
            .values()
            .filter(|u| u.team_name == team_name && u.is_active)
            .filter(|u| !exclude_ids.contains(&u.user_id))
            .map(|u| u.user_id.clone())
            .collect())
    }

    async fn set_user_active(&mut self, user_id: &str, is_active: bool) -> Result<User> {
        let user = self
            .working
            .users
            .get_mut(user_id)
            .ok_or_else(|| Error::user_not_found(user_id))?;
        user.is_active = is_active;
        Ok(user.clone())
    }

    async fn create_team(&mut self, team: &Team) -> Result<Team> {
        if self.working.teams.contains(&team.team_name) {
            return Err(Error::TeamExists(team.team_name.clone()));
        }
        for member in &team.members {
            if self.working.users.contains_key(&member.user_id) {
                return Err(Error::UserExists(member.user_id.clone()));
            }
        }

        self.working.teams.insert(team.team_name.clone());
        for member in &team.members {
            self.working
                .users
                .insert(member.user_id.clone(), member.to_user(&team.team_name));
        }
        self.get_team(&team.team_name).await
    }

    async fn get_team(&mut self, team_name: &str) -> Result<Team> {
        if !self.working.teams.contains(team_name) {
            return Err(Error::team_not_found(team_name));
        }
        let members = self
            .working
            .users
            .values()
            .filter(|u| u.team_name == team_name)
            .map(|u| TeamMember {
                user_id: u.user_id.clone(),
                username: u.username.clone(),
                is_active: u.is_active,
            })
            .collect();
        Ok(Team {
            team_name: team_name.to_string(),
            members,
        })
    }

    async fn team_exists(&mut self, team_name: &str) -> Result<bool> {
        Ok(self.working.teams.contains(team_name))
    }

    async fn deactivate_team_members(&mut self, team_name: &str) -> Result<u64> {
        if !self.working.teams.contains(team_name) {
            return Err(Error::team_not_found(team_name));
        }
        let mut changed = 0;
        for user in self.working.users.values_mut() {
            if user.team_name == team_name && user.is_active {
                user.is_active = false;
                changed += 1;
            }
        }
        Ok(changed)
    }

    async fn get_pr(&mut self, pr_id: &str) -> Result<PullRequest> {
        self.working
            .prs
            .get(pr_id)
            .cloned()
            .ok_or_else(|| Error::pr_not_found(pr_id))
    }

    async fn create_pr(&mut self, pr: &PullRequest) -> Result<PullRequest> {
        if self.working.prs.contains_key(&pr.pull_request_id) {
            return Err(Error::PrExists(pr.pull_request_id.clone()));
        }
        self.working
            .prs
            .insert(pr.pull_request_id.clone(), pr.clone());
        Ok(pr.clone())
    }

    async fn update_pr(&mut self, pr: &PullRequest) -> Result<PullRequest> {
        self.working.check_forced_failure(&pr.pull_request_id)?;
        let stored = self
            .working
            .prs
            .get_mut(&pr.pull_request_id)
            .ok_or_else(|| Error::pr_not_found(&pr.pull_request_id))?;
        if stored.status == PrStatus::Merged {
            return Err(Conflict::PrMerged {
                pr_id: pr.pull_request_id.clone(),
            }
            .into());
        }

        stored.status = pr.status;
        stored.merged_at = pr.merged_at;
        stored.assigned_reviewers = pr.assigned_reviewers.clone();
        Ok(stored.clone())
    }

    async fn find_prs_reviewed_by(&mut self, user_id: &str) -> Result<Vec<PullRequestSummary>> {
        Ok(self
            .working
            .sorted_prs()
            .into_iter()
            .filter(|pr| pr.assigned_reviewers.contains(user_id))
            .map(PullRequest::summary)
            .collect())
    }

    async fn find_open_prs_touching_team(&mut self, team_name: &str) -> Result<Vec<PullRequest>> {
        let users = &self.working.users;
        Ok(self
            .working
            .sorted_prs()
            .into_iter()
            .filter(|pr| pr.status == PrStatus::Open)
            .filter(|pr| {
                pr.assigned_reviewers.iter().any(|id| {
                    users
                        .get(id)
                        .is_some_and(|user| user.team_name == team_name)
                })
            })
            .cloned()
            .collect())
    }

    async fn list_prs(&mut self) -> Result<Vec<PullRequest>> {
        Ok(self.working.sorted_prs().into_iter().cloned().collect())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let MemoryTx { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ReviewerSet;
    use chrono::Utc;

    fn backend_team() -> Team {
        Team::new("backend")
            .with_member(TeamMember::new("u1", "Alice"))
            .with_member(TeamMember::new("u2", "Bob"))
            .with_member(TeamMember::new("u3", "Carol").inactive())
    }

    async fn seeded_store() -> InMemoryStore {
        let store = InMemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        tx.create_team(&backend_team()).await.unwrap();
        tx.commit().await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_create_and_get_team() {
        let store = seeded_store().await;
        let mut tx = store.begin().await.unwrap();

        let team = tx.get_team("backend").await.unwrap();
        assert_eq!(team.members.len(), 3);
        assert_eq!(team.members[0].user_id, "u1");

        let err = tx.create_team(&backend_team()).await.unwrap_err();
        assert!(matches!(err, Error::TeamExists(_)));
    }

    #[tokio::test]
    async fn test_member_in_other_team_rejected() {
        let store = seeded_store().await;
        let mut tx = store.begin().await.unwrap();

        let team = Team::new("frontend").with_member(TeamMember::new("u1", "Alice"));
        let err = tx.create_team(&team).await.unwrap_err();
        assert!(matches!(err, Error::UserExists(id) if id == "u1"));
        assert!(!tx.team_exists("frontend").await.unwrap());
    }

    #[tokio::test]
    async fn test_active_members_exclude() {
        let store = seeded_store().await;
        let mut tx = store.begin().await.unwrap();

        let all = tx.find_active_team_members("backend", &[]).await.unwrap();
        assert_eq!(all, vec!["u1".to_string(), "u2".to_string()]);

        let some = tx
            .find_active_team_members("backend", &["u1".to_string()])
            .await
            .unwrap();
        assert_eq!(some, vec!["u2".to_string()]);
    }

    #[tokio::test]
    async fn test_dropped_transaction_rolls_back() {
        let store = seeded_store().await;

        {
            let mut tx = store.begin().await.unwrap();
            tx.set_user_active("u1", false).await.unwrap();
        }

        let mut tx = store.begin().await.unwrap();
        assert!(tx.get_user("u1").await.unwrap().is_active);
    }

    #[tokio::test]
    async fn test_update_refuses_merged_row() {
        let store = seeded_store().await;
        let mut tx = store.begin().await.unwrap();

        let mut pr = PullRequest::open(
            "pr-1",
            "Add search",
            "u1",
            ReviewerSet::from_ids(["u2"]).unwrap(),
            Utc::now(),
        )
        .unwrap();
        tx.create_pr(&pr).await.unwrap();

        pr.mark_merged(Utc::now());
        tx.update_pr(&pr).await.unwrap();

        let err = tx.update_pr(&pr).await.unwrap_err();
        assert!(matches!(err, Error::Conflict(Conflict::PrMerged { .. })));
    }

    #[tokio::test]
    async fn test_deactivate_team_counts_changes() {
        let store = seeded_store().await;
        let mut tx = store.begin().await.unwrap();

        assert_eq!(tx.deactivate_team_members("backend").await.unwrap(), 2);
        assert_eq!(tx.deactivate_team_members("backend").await.unwrap(), 0);
        assert!(matches!(
            tx.deactivate_team_members("nope").await.unwrap_err(),
            Error::NotFound(_)
        ));
    }
}
