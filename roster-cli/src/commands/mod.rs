//! CLI command implementations

pub mod pr;
pub mod stats;
pub mod team;
pub mod user;

use std::time::Duration;

use roster_core::{Config, OpContext, PullRequest, ReviewService};
use roster_db::{Database, DatabaseConfig, SqliteStore};
use tokio_util::sync::CancellationToken;

pub use pr::PrArgs;
pub use stats::StatsArgs;
pub use team::TeamArgs;
pub use user::UserArgs;

/// Everything a command needs to talk to the store
pub struct App {
    pub service: ReviewService<SqliteStore>,
    pub json: bool,
    timeout: Option<Duration>,
    cancel: CancellationToken,
}

impl App {
    /// Open the configured database and build the service over it
    pub async fn open(config: &Config, json: bool, cancel: CancellationToken) -> anyhow::Result<Self> {
        let db = Database::open(DatabaseConfig::from(&config.database))
            .await
            .map_err(|e| {
                anyhow::anyhow!(
                    "Failed to open database {}: {}",
                    config.database.path.display(),
                    e
                )
            })?;
        let service =
            ReviewService::new(SqliteStore::new(db)).with_config(config.assignment.clone());

        Ok(Self {
            service,
            json,
            timeout: config.operation.timeout,
            cancel,
        })
    }

    /// Fresh context for one operation, carrying the configured deadline
    pub fn ctx(&self) -> OpContext {
        let ctx = OpContext::new().with_cancellation(self.cancel.clone());
        match self.timeout {
            Some(timeout) => ctx.with_timeout(timeout),
            None => ctx,
        }
    }
}

/// Multi-line human rendering of a pull request
pub(crate) fn print_pull_request(pr: &PullRequest) {
    println!("{} [{}] {}", pr.pull_request_id, pr.status, pr.pull_request_name);
    println!("  author: {}", pr.author_id);
    if pr.assigned_reviewers.is_empty() {
        println!("  reviewers: (none)");
    } else {
        println!("  reviewers: {}", pr.assigned_reviewers.as_slice().join(", "));
    }
    println!("  created: {}", pr.created_at.to_rfc3339());
    if let Some(merged_at) = pr.merged_at {
        println!("  merged: {}", merged_at.to_rfc3339());
    }
}
