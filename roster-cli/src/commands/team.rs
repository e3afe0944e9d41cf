//! Team management commands

use clap::{Args, Subcommand};
use roster_core::{DeactivationSummary, ReassignmentSummary, Team, TeamMember};
use serde::Serialize;

use super::App;
use crate::output;

/// Team management commands
#[derive(Args, Debug)]
pub struct TeamArgs {
    #[command(subcommand)]
    pub command: TeamCommand,
}

#[derive(Subcommand, Debug)]
pub enum TeamCommand {
    /// Create a team with its members
    Add {
        /// Team name
        name: String,

        /// Member as `id=username`, or `id=username:inactive`
        #[arg(short, long = "member", value_parser = parse_member)]
        members: Vec<TeamMember>,
    },

    /// Show a team and its members
    Show {
        /// Team name
        name: String,
    },

    /// Deactivate every member of a team
    Deactivate {
        /// Team name
        name: String,

        /// Also re-roll reviewers on the team's open pull requests
        #[arg(long)]
        reassign: bool,
    },

    /// Re-roll reviewers on every open pull request the team reviews
    Reassign {
        /// Team name
        name: String,
    },
}

#[derive(Serialize)]
struct DeactivationReport {
    #[serde(flatten)]
    deactivation: DeactivationSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    reassigned_prs_count: Option<usize>,
}

impl TeamArgs {
    /// Execute the team command
    pub async fn execute(&self, app: &App) -> anyhow::Result<()> {
        match &self.command {
            TeamCommand::Add { name, members } => {
                let team = members
                    .iter()
                    .cloned()
                    .fold(Team::new(name.as_str()), Team::with_member);
                let created = app.service.create_team(&app.ctx(), &team).await?;
                output::emit(app.json, &created, print_team)
            }
            TeamCommand::Show { name } => {
                let team = app.service.get_team(&app.ctx(), name).await?;
                output::emit(app.json, &team, print_team)
            }
            TeamCommand::Deactivate { name, reassign } => {
                let deactivation = app.service.deactivate_team(&app.ctx(), name).await?;
                let reassigned_prs_count = if *reassign {
                    let summary = app.service.reassign_team_prs(&app.ctx(), name).await?;
                    Some(summary.reassigned_prs_count)
                } else {
                    None
                };

                let report = DeactivationReport {
                    deactivation,
                    reassigned_prs_count,
                };
                output::emit(app.json, &report, |r| {
                    println!(
                        "Deactivated {} member(s) of {}",
                        r.deactivation.deactivated_users_count, r.deactivation.team_name
                    );
                    if let Some(count) = r.reassigned_prs_count {
                        println!("Reassigned reviewers on {} pull request(s)", count);
                    }
                })
            }
            TeamCommand::Reassign { name } => {
                let summary = app.service.reassign_team_prs(&app.ctx(), name).await?;
                output::emit(app.json, &summary, print_reassignment_summary)
            }
        }
    }
}

fn print_team(team: &Team) {
    println!("Team {} ({} member(s))", team.team_name, team.members.len());
    for member in &team.members {
        let state = if member.is_active { "active" } else { "inactive" };
        println!("  {:<16} {:<24} {}", member.user_id, member.username, state);
    }
}

fn print_reassignment_summary(summary: &ReassignmentSummary) {
    println!(
        "Reassigned reviewers on {} pull request(s) for team {}",
        summary.reassigned_prs_count, summary.team_name
    );
}

/// Parse `id=username[:inactive]`
fn parse_member(value: &str) -> Result<TeamMember, String> {
    let (user_id, rest) = value
        .split_once('=')
        .ok_or_else(|| format!("expected id=username, got '{}'", value))?;
    let (username, inactive) = match rest.rsplit_once(':') {
        Some((name, "inactive")) => (name, true),
        Some((name, "active")) => (name, false),
        _ => (rest, false),
    };

    if user_id.is_empty() || username.is_empty() {
        return Err(format!("empty id or username in '{}'", value));
    }

    let member = TeamMember::new(user_id, username);
    Ok(if inactive { member.inactive() } else { member })
}
