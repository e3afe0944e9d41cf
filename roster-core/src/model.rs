//! Domain records for teams, users and pull requests

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A user and their single team membership
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Opaque unique identifier
    pub user_id: String,

    /// Display name
    pub username: String,

    /// Name of the team this user belongs to
    pub team_name: String,

    /// Whether the user can currently be picked as a reviewer
    pub is_active: bool,
}

/// A member entry as listed under a team
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    pub user_id: String,
    pub username: String,
    pub is_active: bool,
}

impl TeamMember {
    pub fn new(user_id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
            is_active: true,
        }
    }

    /// Mark the member as inactive
    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// Full user record for this member of `team_name`
    pub fn to_user(&self, team_name: &str) -> User {
        User {
            user_id: self.user_id.clone(),
            username: self.username.clone(),
            team_name: team_name.to_string(),
            is_active: self.is_active,
        }
    }
}

/// A team and its members
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub team_name: String,
    pub members: Vec<TeamMember>,
}

impl Team {
    pub fn new(team_name: impl Into<String>) -> Self {
        Self {
            team_name: team_name.into(),
            members: Vec::new(),
        }
    }

    /// Add a member to the team
    pub fn with_member(mut self, member: TeamMember) -> Self {
        self.members.push(member);
        self
    }
}

/// Pull request lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PrStatus {
    Open,
    Merged,
}

impl PrStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrStatus::Open => "OPEN",
            PrStatus::Merged => "MERGED",
        }
    }

    /// MERGED is terminal
    pub fn is_terminal(&self) -> bool {
        matches!(self, PrStatus::Merged)
    }
}

impl fmt::Display for PrStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for PrStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "OPEN" => Ok(PrStatus::Open),
            "MERGED" => Ok(PrStatus::Merged),
            other => Err(Error::Invariant(format!("unknown PR status '{}'", other))),
        }
    }
}

/// Reviewers assigned to a pull request.
///
/// Slots keep their position so a single replacement leaves the other
/// reviewer where it was. Ids are unique within the set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ReviewerSet(Vec<String>);

impl ReviewerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set, rejecting duplicate ids
    pub fn from_ids<I, S>(ids: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::new();
        for id in ids {
            set.push(id)?;
        }
        Ok(set)
    }

    fn push(&mut self, id: impl Into<String>) -> Result<()> {
        let id = id.into();
        if self.contains(&id) {
            return Err(Error::Invariant(format!("duplicate reviewer {}", id)));
        }
        self.0.push(id);
        Ok(())
    }

    pub fn contains(&self, user_id: &str) -> bool {
        self.0.iter().any(|id| id == user_id)
    }

    pub fn position(&self, user_id: &str) -> Option<usize> {
        self.0.iter().position(|id| id == user_id)
    }

    /// Replace `old` with `new` in the same slot
    pub fn replace(&mut self, old: &str, new: impl Into<String>) -> Result<()> {
        let new = new.into();
        let slot = self
            .position(old)
            .ok_or_else(|| Error::Invariant(format!("reviewer {} not in set", old)))?;
        if self.contains(&new) {
            return Err(Error::Invariant(format!("duplicate reviewer {}", new)));
        }
        self.0[slot] = new;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl<'de> Deserialize<'de> for ReviewerSet {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let ids = Vec::<String>::deserialize(deserializer)?;
        ReviewerSet::from_ids(ids).map_err(serde::de::Error::custom)
    }
}

impl<'a> IntoIterator for &'a ReviewerSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Pull request record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    /// Opaque unique identifier
    pub pull_request_id: String,

    pub pull_request_name: String,

    /// User id of the author
    pub author_id: String,

    pub status: PrStatus,

    /// Never contains the author
    pub assigned_reviewers: ReviewerSet,

    /// Set once at creation
    pub created_at: DateTime<Utc>,

    /// Set exactly once on the OPEN -> MERGED transition
    pub merged_at: Option<DateTime<Utc>>,
}

impl PullRequest {
    /// Create a new open pull request
    pub fn open(
        pull_request_id: impl Into<String>,
        pull_request_name: impl Into<String>,
        author_id: impl Into<String>,
        assigned_reviewers: ReviewerSet,
        created_at: DateTime<Utc>,
    ) -> Result<Self> {
        let pr = Self {
            pull_request_id: pull_request_id.into(),
            pull_request_name: pull_request_name.into(),
            author_id: author_id.into(),
            status: PrStatus::Open,
            assigned_reviewers,
            created_at,
            merged_at: None,
        };
        pr.check_author_not_reviewer()?;
        Ok(pr)
    }

    pub fn is_merged(&self) -> bool {
        self.status.is_terminal()
    }

    /// Ids that may never be drawn as a new reviewer for this PR: every
    /// current reviewer plus the author
    pub fn exclusion_set(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.assigned_reviewers.iter().cloned().collect();
        ids.push(self.author_id.clone());
        ids
    }

    /// Swap the whole reviewer set
    pub fn set_reviewers(&mut self, reviewers: ReviewerSet) -> Result<()> {
        self.assigned_reviewers = reviewers;
        self.check_author_not_reviewer()
    }

    /// Transition OPEN -> MERGED
    pub fn mark_merged(&mut self, merged_at: DateTime<Utc>) {
        if self.is_merged() {
            return;
        }
        self.status = PrStatus::Merged;
        self.merged_at = Some(merged_at);
    }

    pub fn summary(&self) -> PullRequestSummary {
        PullRequestSummary {
            pull_request_id: self.pull_request_id.clone(),
            pull_request_name: self.pull_request_name.clone(),
            author_id: self.author_id.clone(),
            status: self.status,
        }
    }

    fn check_author_not_reviewer(&self) -> Result<()> {
        if self.assigned_reviewers.contains(&self.author_id) {
            return Err(Error::Invariant(format!(
                "author {} cannot review PR {}",
                self.author_id, self.pull_request_id
            )));
        }
        Ok(())
    }
}

/// Short form of a pull request used in reviewer queues
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestSummary {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub author_id: String,
    pub status: PrStatus,
}

/// Result of replacing a single reviewer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reassignment {
    pub pr: PullRequest,
    pub replaced_by: String,
}

/// Result of a team-wide reassignment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReassignmentSummary {
    pub team_name: String,
    pub reassigned_prs_count: usize,
}

/// Result of a team-wide deactivation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeactivationSummary {
    pub team_name: String,
    pub deactivated_users_count: u64,
}

/// Pull requests a user is assigned to review
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserReviews {
    pub user_id: String,
    pub pull_requests: Vec<PullRequestSummary>,
}

/// Review load of a single user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewStat {
    pub user_id: String,
    pub review_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reviewers(ids: &[&str]) -> ReviewerSet {
        ReviewerSet::from_ids(ids.iter().copied()).unwrap()
    }

    #[test]
    fn test_reviewer_set_rejects_duplicates() {
        let err = ReviewerSet::from_ids(["u2", "u2"]).unwrap_err();
        assert!(matches!(err, Error::Invariant(_)));
    }

    #[test]
    fn test_replace_keeps_slot() {
        let mut set = reviewers(&["u2", "u3"]);
        set.replace("u2", "u4").unwrap();
        assert_eq!(set.as_slice(), &["u4".to_string(), "u3".to_string()]);

        assert!(set.replace("u3", "u4").is_err());
        assert!(set.replace("u9", "u5").is_err());
    }

    #[test]
    fn test_open_rejects_author_as_reviewer() {
        let err = PullRequest::open("pr-1", "Add search", "u1", reviewers(&["u1"]), Utc::now())
            .unwrap_err();
        assert!(matches!(err, Error::Invariant(_)));
    }

    #[test]
    fn test_mark_merged_is_sticky() {
        let mut pr =
            PullRequest::open("pr-1", "Add search", "u1", reviewers(&["u2"]), Utc::now()).unwrap();
        let first = Utc::now();
        pr.mark_merged(first);
        pr.mark_merged(first + chrono::Duration::hours(1));

        assert_eq!(pr.status, PrStatus::Merged);
        assert_eq!(pr.merged_at, Some(first));
    }

    #[test]
    fn test_exclusion_set_includes_author() {
        let pr = PullRequest::open("pr-1", "Fix", "u1", reviewers(&["u2", "u3"]), Utc::now())
            .unwrap();
        let excluded = pr.exclusion_set();
        assert_eq!(excluded.len(), 3);
        assert!(excluded.contains(&"u1".to_string()));
    }

    #[test]
    fn test_status_serde() {
        assert_eq!(serde_json::to_string(&PrStatus::Merged).unwrap(), "\"MERGED\"");
        assert_eq!("OPEN".parse::<PrStatus>().unwrap(), PrStatus::Open);
        assert!("closed".parse::<PrStatus>().is_err());
    }

    #[test]
    fn test_reviewer_set_deserialize_rejects_duplicates() {
        assert!(serde_json::from_str::<ReviewerSet>(r#"["a","a"]"#).is_err());
        let set: ReviewerSet = serde_json::from_str(r#"["a","b"]"#).unwrap();
        assert_eq!(set.len(), 2);
    }
}
