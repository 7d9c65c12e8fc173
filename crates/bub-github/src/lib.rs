//! GitHub REST transport for the robobub mention bot.
//! Provides the retrying API client, notification/issue/comment wire types,
//! and the comment reaction lifecycle used for command acknowledgement.

pub mod api_client;
pub mod reaction;
pub mod transport;
pub mod types;

pub use api_client::GithubApiClient;
pub use reaction::{CommentReactions, ReactionContent};
pub use transport::RetryPolicy;
pub use types::{
    trailing_resource_id, CreatedComment, GithubIssue, GithubIssueComment, GithubUser,
    MentionNotification, NotificationRepository, NotificationSubject,
};
