//! Roster Core - reviewer assignment engine for team pull requests
//!
//! This crate decides who reviews a pull request, picks replacements when a
//! reviewer becomes unavailable, bulk-reassigns a team's open pull requests,
//! enforces the OPEN -> MERGED lifecycle, and derives reviewer load.
//! Persistence is behind the [`ReviewStore`] trait.

pub mod assignment;
pub mod clock;
pub mod config;
pub mod context;
pub mod error;
pub mod lifecycle;
pub mod memory;
pub mod model;
pub mod reassignment;
pub mod selector;
pub mod service;
pub mod stats;
pub mod store;

#[cfg(test)]
mod testutil;

pub use assignment::NewPullRequest;
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::Config;
pub use context::OpContext;
pub use error::{Conflict, Error, ErrorCode, Result};
pub use memory::InMemoryStore;
pub use model::{
    DeactivationSummary, PrStatus, PullRequest, PullRequestSummary, Reassignment,
    ReassignmentSummary, ReviewStat, ReviewerSet, Team, TeamMember, User, UserReviews,
};
pub use selector::{CandidateSelector, Sampler, SeededSampler, ThreadRngSampler};
pub use service::ReviewService;
pub use store::{ReviewStore, StoreTx};
