//! [`ReviewStore`] backed by SQLite.
//!
//! Every transaction bumps the one-row `write_lock` table before anything
//! else. That takes SQLite's database write lock up front, so transactions
//! run one at a time and a read inside one always sees every earlier commit.
//! Waiting for the lock is bounded by the connection busy timeout.

use async_trait::async_trait;
use roster_core::{
    Conflict, Error, PullRequest, PullRequestSummary, Result, ReviewStore, StoreTx, Team,
    TeamMember, User,
};
use sqlx::{Sqlite, Transaction};

use crate::db::Database;
use crate::error::DbError;
use crate::repos::{PullRequestRepository, TeamRepository, UserRepository};

/// SQLite review store
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

#[async_trait]
impl ReviewStore for SqliteStore {
    async fn begin(&self) -> Result<Box<dyn StoreTx>> {
        let mut tx = self.db.pool().begin().await.map_err(DbError::from)?;
        sqlx::query("UPDATE write_lock SET generation = generation + 1 WHERE id = 1")
            .execute(&mut *tx)
            .await
            .map_err(DbError::from)?;
        Ok(Box::new(SqliteTx { tx }))
    }
}

/// One serialized SQLite transaction. Dropping it rolls back.
pub struct SqliteTx {
    tx: Transaction<'static, Sqlite>,
}

impl SqliteTx {
    fn users(&mut self) -> UserRepository<'_> {
        UserRepository::new(&mut self.tx)
    }

    fn teams(&mut self) -> TeamRepository<'_> {
        TeamRepository::new(&mut self.tx)
    }

    fn prs(&mut self) -> PullRequestRepository<'_> {
        PullRequestRepository::new(&mut self.tx)
    }
}

#[async_trait]
impl StoreTx for SqliteTx {
    async fn get_user(&mut self, user_id: &str) -> Result<User> {
        self.users()
            .get(user_id)
            .await?
            .map(User::from)
            .ok_or_else(|| Error::user_not_found(user_id))
    }

    async fn find_active_team_members(
        &mut self,
        team_name: &str,
        exclude_ids: &[String],
    ) -> Result<Vec<String>> {
        let mut ids = self.users().active_ids_in_team(team_name).await?;
        ids.retain(|id| !exclude_ids.contains(id));
        Ok(ids)
    }

    async fn set_user_active(&mut self, user_id: &str, is_active: bool) -> Result<User> {
        if self.users().set_active(user_id, is_active).await? == 0 {
            return Err(Error::user_not_found(user_id));
        }
        self.get_user(user_id).await
    }

    async fn create_team(&mut self, team: &Team) -> Result<Team> {
        if self.teams().exists(&team.team_name).await? {
            return Err(Error::TeamExists(team.team_name.clone()));
        }
        for member in &team.members {
            if self.users().get(&member.user_id).await?.is_some() {
                return Err(Error::UserExists(member.user_id.clone()));
            }
        }

        self.teams().insert(&team.team_name).await?;
        for member in &team.members {
            self.users()
                .insert(
                    &member.user_id,
                    &member.username,
                    &team.team_name,
                    member.is_active,
                )
                .await
                .map_err(|e| {
                    if e.is_unique_violation() {
                        Error::UserExists(member.user_id.clone())
                    } else {
                        e.into()
                    }
                })?;
        }
        self.get_team(&team.team_name).await
    }

    async fn get_team(&mut self, team_name: &str) -> Result<Team> {
        if !self.teams().exists(team_name).await? {
            return Err(Error::team_not_found(team_name));
        }
        let members = self
            .users()
            .list_by_team(team_name)
            .await?
            .into_iter()
            .map(|row| TeamMember {
                user_id: row.user_id,
                username: row.username,
                is_active: row.is_active,
            })
            .collect();
        Ok(Team {
            team_name: team_name.to_string(),
            members,
        })
    }

    async fn team_exists(&mut self, team_name: &str) -> Result<bool> {
        Ok(self.teams().exists(team_name).await?)
    }

    async fn deactivate_team_members(&mut self, team_name: &str) -> Result<u64> {
        if !self.teams().exists(team_name).await? {
            return Err(Error::team_not_found(team_name));
        }
        Ok(self.users().deactivate_team(team_name).await?)
    }

    async fn get_pr(&mut self, pr_id: &str) -> Result<PullRequest> {
        self.prs()
            .get(pr_id)
            .await?
            .ok_or_else(|| Error::pr_not_found(pr_id))
    }

    async fn create_pr(&mut self, pr: &PullRequest) -> Result<PullRequest> {
        if self.prs().status(&pr.pull_request_id).await?.is_some() {
            return Err(Error::PrExists(pr.pull_request_id.clone()));
        }
        self.prs().insert(pr).await.map_err(|e| {
            if e.is_unique_violation() {
                Error::PrExists(pr.pull_request_id.clone())
            } else {
                e.into()
            }
        })?;
        self.get_pr(&pr.pull_request_id).await
    }

    async fn update_pr(&mut self, pr: &PullRequest) -> Result<PullRequest> {
        if !self.prs().update_open(pr).await? {
            return match self.prs().status(&pr.pull_request_id).await? {
                Some(_) => Err(Conflict::PrMerged {
                    pr_id: pr.pull_request_id.clone(),
                }
                .into()),
                None => Err(Error::pr_not_found(&pr.pull_request_id)),
            };
        }
        self.get_pr(&pr.pull_request_id).await
    }

    async fn find_prs_reviewed_by(&mut self, user_id: &str) -> Result<Vec<PullRequestSummary>> {
        Ok(self.prs().list_reviewed_by(user_id).await?)
    }

    async fn find_open_prs_touching_team(&mut self, team_name: &str) -> Result<Vec<PullRequest>> {
        Ok(self.prs().list_open_touching_team(team_name).await?)
    }

    async fn list_prs(&mut self) -> Result<Vec<PullRequest>> {
        Ok(self.prs().list_all().await?)
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx.commit().await.map_err(DbError::from)?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        self.tx.rollback().await.map_err(DbError::from)?;
        Ok(())
    }
}
