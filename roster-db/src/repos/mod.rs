//! Repository implementations, each borrowing one connection or transaction

pub mod pull_requests;
pub mod teams;
pub mod users;

pub use pull_requests::PullRequestRepository;
pub use teams::TeamRepository;
pub use users::UserRepository;
