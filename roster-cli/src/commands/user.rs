//! User commands

use clap::{ArgAction, Args, Subcommand};
use roster_core::UserReviews;

use super::App;
use crate::output;

/// User commands
#[derive(Args, Debug)]
pub struct UserArgs {
    #[command(subcommand)]
    pub command: UserCommand,
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    /// Mark a user as available (true) or unavailable (false) for review
    SetActive {
        /// User id
        user_id: String,

        /// `true` or `false`
        #[arg(action = ArgAction::Set)]
        active: bool,
    },

    /// List pull requests a user is assigned to review
    Reviews {
        /// User id
        user_id: String,
    },
}

impl UserArgs {
    /// Execute the user command
    pub async fn execute(&self, app: &App) -> anyhow::Result<()> {
        match &self.command {
            UserCommand::SetActive { user_id, active } => {
                let user = app
                    .service
                    .set_user_active(&app.ctx(), user_id, *active)
                    .await?;
                output::emit(app.json, &user, |u| {
                    let state = if u.is_active { "active" } else { "inactive" };
                    println!("{} ({}) in team {} is now {}", u.user_id, u.username, u.team_name, state);
                })
            }
            UserCommand::Reviews { user_id } => {
                let reviews = app.service.user_reviews(&app.ctx(), user_id).await?;
                output::emit(app.json, &reviews, print_reviews)
            }
        }
    }
}

fn print_reviews(reviews: &UserReviews) {
    if reviews.pull_requests.is_empty() {
        println!("{} has no assigned reviews.", reviews.user_id);
        return;
    }

    println!("Reviews assigned to {}:", reviews.user_id);
    for pr in &reviews.pull_requests {
        println!(
            "  {:<16} {:<7} {} (by {})",
            pr.pull_request_id, pr.status, pr.pull_request_name, pr.author_id
        );
    }
}
