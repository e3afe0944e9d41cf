//! Error types for the review roster

use thiserror::Error;

/// Result type alias for roster operations
pub type Result<T> = std::result::Result<T, Error>;

/// Business-rule conflicts raised while mutating a pull request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Conflict {
    /// Reviewer mutation attempted on a merged pull request
    #[error("cannot reassign on merged PR {pr_id}")]
    PrMerged { pr_id: String },

    /// The reviewer to replace is not assigned to the pull request
    #[error("reviewer {user_id} is not assigned to PR {pr_id}")]
    NotAssigned { pr_id: String, user_id: String },

    /// No active replacement candidate left in the team
    #[error("no active replacement candidate in team {team_name} for PR {pr_id}")]
    NoCandidate { pr_id: String, team_name: String },
}

/// Error type for roster operations
#[derive(Error, Debug)]
pub enum Error {
    /// Referenced user, team or pull request does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Pull request id collision
    #[error("PR id already exists: {0}")]
    PrExists(String),

    /// Team name collision
    #[error("Team already exists: {0}")]
    TeamExists(String),

    /// User id already belongs to a team
    #[error("User already exists: {0}")]
    UserExists(String),

    /// Business-rule conflict
    #[error(transparent)]
    Conflict(#[from] Conflict),

    /// A data-model invariant would be broken
    #[error("Invariant violated: {0}")]
    Invariant(String),

    /// The caller cancelled the operation
    #[error("Operation cancelled")]
    Cancelled,

    /// The caller's deadline passed before the operation finished
    #[error("Operation deadline exceeded")]
    DeadlineExceeded,

    /// Store or transaction failure
    #[error("Infrastructure error: {0}")]
    Infrastructure(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Stable, transport-independent error code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NotFound,
    PrExists,
    TeamExists,
    UserExists,
    PrMerged,
    NotAssigned,
    NoCandidate,
    Internal,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::PrExists => "PR_EXISTS",
            ErrorCode::TeamExists => "TEAM_EXISTS",
            ErrorCode::UserExists => "USER_EXISTS",
            ErrorCode::PrMerged => "PR_MERGED",
            ErrorCode::NotAssigned => "NOT_ASSIGNED",
            ErrorCode::NoCandidate => "NO_CANDIDATE",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Error {
    /// Error code a boundary can map to a status
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::NotFound(_) => ErrorCode::NotFound,
            Error::PrExists(_) => ErrorCode::PrExists,
            Error::TeamExists(_) => ErrorCode::TeamExists,
            Error::UserExists(_) => ErrorCode::UserExists,
            Error::Conflict(Conflict::PrMerged { .. }) => ErrorCode::PrMerged,
            Error::Conflict(Conflict::NotAssigned { .. }) => ErrorCode::NotAssigned,
            Error::Conflict(Conflict::NoCandidate { .. }) => ErrorCode::NoCandidate,
            Error::Invariant(_)
            | Error::Cancelled
            | Error::DeadlineExceeded
            | Error::Infrastructure(_)
            | Error::Config(_)
            | Error::Io(_) => ErrorCode::Internal,
        }
    }

    /// Whether this is a recognised business-rule failure rather than an
    /// infrastructure one
    pub fn is_business(&self) -> bool {
        self.code() != ErrorCode::Internal
    }

    pub fn pr_not_found(pr_id: &str) -> Self {
        Error::NotFound(format!("pull request {}", pr_id))
    }

    pub fn user_not_found(user_id: &str) -> Self {
        Error::NotFound(format!("user {}", user_id))
    }

    pub fn team_not_found(team_name: &str) -> Self {
        Error::NotFound(format!("team {}", team_name))
    }
}
