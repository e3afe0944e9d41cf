//! Reviewer load statistics

use clap::Args;

use super::App;
use crate::output;

/// Show how many pull requests each user is assigned to review
#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Only show the busiest N reviewers
    #[arg(short, long)]
    pub top: Option<usize>,
}

impl StatsArgs {
    /// Execute the stats command
    pub async fn execute(&self, app: &App) -> anyhow::Result<()> {
        let mut stats = app.service.review_stats(&app.ctx()).await?;
        if let Some(top) = self.top {
            stats.truncate(top);
        }

        output::emit(app.json, &stats, |stats| {
            if stats.is_empty() {
                println!("No reviews assigned.");
                return;
            }
            println!("{:<16} REVIEWS", "USER");
            for stat in stats {
                println!("{:<16} {}", stat.user_id, stat.review_count);
            }
        })
    }
}
