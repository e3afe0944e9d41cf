//! User repository

use sqlx::SqliteConnection;

use crate::error::Result;
use crate::models::UserRow;

/// Repository for team members
pub struct UserRepository<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> UserRepository<'c> {
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        Self { conn }
    }

    /// Insert a user into `team_name`
    pub async fn insert(
        &mut self,
        user_id: &str,
        username: &str,
        team_name: &str,
        is_active: bool,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO users (user_id, username, team_name, is_active) VALUES (?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(username)
        .bind(team_name)
        .bind(is_active)
        .execute(&mut *self.conn)
        .await?;
        Ok(())
    }

    pub async fn get(&mut self, user_id: &str) -> Result<Option<UserRow>> {
        sqlx::query_as::<_, UserRow>(
            "SELECT user_id, username, team_name, is_active FROM users WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(&mut *self.conn)
        .await
        .map_err(Into::into)
    }

    /// All members of a team, ordered by id
    pub async fn list_by_team(&mut self, team_name: &str) -> Result<Vec<UserRow>> {
        sqlx::query_as::<_, UserRow>(
            r#"
            SELECT user_id, username, team_name, is_active
            FROM users
            WHERE team_name = ?
            ORDER BY user_id
            "#,
        )
        .bind(team_name)
        .fetch_all(&mut *self.conn)
        .await
        .map_err(Into::into)
    }

    /// Ids of the active members of a team, ordered by id
    pub async fn active_ids_in_team(&mut self, team_name: &str) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT user_id FROM users WHERE team_name = ? AND is_active = 1 ORDER BY user_id",
        )
        .bind(team_name)
        .fetch_all(&mut *self.conn)
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Returns the number of rows changed (0 if the user does not exist)
    pub async fn set_active(&mut self, user_id: &str, is_active: bool) -> Result<u64> {
        let result = sqlx::query("UPDATE users SET is_active = ? WHERE user_id = ?")
            .bind(is_active)
            .bind(user_id)
            .execute(&mut *self.conn)
            .await?;
        Ok(result.rows_affected())
    }

    /// Deactivate every active member of a team
    pub async fn deactivate_team(&mut self, team_name: &str) -> Result<u64> {
        let result =
            sqlx::query("UPDATE users SET is_active = 0 WHERE team_name = ? AND is_active = 1")
                .bind(team_name)
                .execute(&mut *self.conn)
                .await?;
        Ok(result.rows_affected())
    }
}
