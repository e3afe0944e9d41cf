//! Team repository

use sqlx::SqliteConnection;

use crate::error::Result;

/// Repository for team names
pub struct TeamRepository<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> TeamRepository<'c> {
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        Self { conn }
    }

    pub async fn insert(&mut self, team_name: &str) -> Result<()> {
        sqlx::query("INSERT INTO teams (team_name) VALUES (?)")
            .bind(team_name)
            .execute(&mut *self.conn)
            .await?;
        Ok(())
    }

    pub async fn exists(&mut self, team_name: &str) -> Result<bool> {
        let (found,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM teams WHERE team_name = ?)")
                .bind(team_name)
                .fetch_one(&mut *self.conn)
                .await?;
        Ok(found)
    }
}
