//! Pull request commands

use clap::{Args, Subcommand};
use roster_core::{NewPullRequest, Reassignment};

use super::{print_pull_request, App};
use crate::output;

/// Pull request commands
#[derive(Args, Debug)]
pub struct PrArgs {
    #[command(subcommand)]
    pub command: PrCommand,
}

#[derive(Subcommand, Debug)]
pub enum PrCommand {
    /// Open a pull request and assign reviewers from the author's team
    Create {
        /// Pull request id
        id: String,

        /// Pull request title
        name: String,

        /// Author user id
        #[arg(short, long)]
        author: String,
    },

    /// Show a pull request
    Show {
        /// Pull request id
        id: String,
    },

    /// Merge a pull request (repeating is harmless)
    Merge {
        /// Pull request id
        id: String,
    },

    /// Replace one reviewer with another member of their team
    Reassign {
        /// Pull request id
        id: String,

        /// Reviewer to replace
        #[arg(long)]
        old_reviewer: String,
    },
}

impl PrArgs {
    /// Execute the pull request command
    pub async fn execute(&self, app: &App) -> anyhow::Result<()> {
        match &self.command {
            PrCommand::Create { id, name, author } => {
                let request = NewPullRequest::new(id, name, author);
                let pr = app.service.create_pull_request(&app.ctx(), &request).await?;
                output::emit(app.json, &pr, print_pull_request)
            }
            PrCommand::Show { id } => {
                let pr = app.service.get_pull_request(&app.ctx(), id).await?;
                output::emit(app.json, &pr, print_pull_request)
            }
            PrCommand::Merge { id } => {
                let pr = app.service.merge(&app.ctx(), id).await?;
                output::emit(app.json, &pr, print_pull_request)
            }
            PrCommand::Reassign { id, old_reviewer } => {
                let outcome = app.service.reassign(&app.ctx(), id, old_reviewer).await?;
                output::emit(app.json, &outcome, |o: &Reassignment| {
                    println!("Replaced {} with {}", old_reviewer, o.replaced_by);
                    print_pull_request(&o.pr);
                })
            }
        }
    }
}
