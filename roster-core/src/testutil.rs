//! Shared fixtures for engine tests

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{TimeZone, Utc};

use crate::{
    CandidateSelector, FixedClock, InMemoryStore, OpContext, PullRequest, ReviewService,
    SeededSampler, Team, TeamMember,
};

/// Team whose members are `(user_id, is_active)`
pub(crate) fn team(name: &str, members: &[(&str, bool)]) -> Team {
    members.iter().fold(Team::new(name), |team, (id, active)| {
        let member = TeamMember::new(*id, id.to_uppercase());
        team.with_member(if *active { member } else { member.inactive() })
    })
}

pub(crate) fn ctx() -> OpContext {
    OpContext::new()
}

/// Service over a fresh in-memory store holding `teams`, with a seeded
/// sampler and a fixed clock
pub(crate) async fn service_with(
    teams: &[Team],
) -> (ReviewService<InMemoryStore>, Arc<FixedClock>) {
    let clock = Arc::new(FixedClock::new(
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
    ));
    let service = ReviewService::new(InMemoryStore::new())
        .with_selector(CandidateSelector::new(Arc::new(SeededSampler::seeded(17))))
        .with_clock(clock.clone());
    for team in teams {
        service.create_team(&ctx(), team).await.unwrap();
    }
    (service, clock)
}

/// No author among reviewers, no duplicates
pub(crate) fn assert_reviewer_invariants(pr: &PullRequest) {
    assert!(
        !pr.assigned_reviewers.contains(&pr.author_id),
        "author {} reviews own PR {}",
        pr.author_id,
        pr.pull_request_id
    );
    let unique: HashSet<&String> = pr.assigned_reviewers.iter().collect();
    assert_eq!(unique.len(), pr.assigned_reviewers.len(), "duplicate reviewers");
}

pub(crate) fn ids(pr: &PullRequest) -> HashSet<String> {
    pr.assigned_reviewers.iter().cloned().collect()
}
