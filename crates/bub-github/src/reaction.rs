use tracing::warn;

use crate::api_client::GithubApiClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Reaction vocabulary accepted by the GitHub reactions API.
pub enum ReactionContent {
    PlusOne,
    MinusOne,
    Laugh,
    Confused,
    Heart,
    Hooray,
    Rocket,
    Eyes,
}

impl ReactionContent {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PlusOne => "+1",
            Self::MinusOne => "-1",
            Self::Laugh => "laugh",
            Self::Confused => "confused",
            Self::Heart => "heart",
            Self::Hooray => "hooray",
            Self::Rocket => "rocket",
            Self::Eyes => "eyes",
        }
    }
}

#[derive(Debug, Clone)]
/// Emoji acknowledgement lifecycle for one comment, owned by exactly one
/// mention task. `current` is `None` until an acknowledgement lands.
///
/// Reaction calls are best-effort: a failed add or remove is logged and the
/// pipeline carries on, so a transient duplicate reaction can occur but
/// never fails a mention.
pub struct CommentReactions {
    owner: String,
    repo: String,
    comment_id: u64,
    current: Option<u64>,
}

impl CommentReactions {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>, comment_id: u64) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            comment_id,
            current: None,
        }
    }

    pub fn current(&self) -> Option<u64> {
        self.current
    }

    /// Posts the pending acknowledgement (`+1`) and records its id.
    pub async fn acknowledge(&mut self, github: &GithubApiClient) {
        match github
            .add_reaction(&self.owner, &self.repo, self.comment_id, ReactionContent::PlusOne)
            .await
        {
            Ok(reaction_id) => self.current = Some(reaction_id),
            Err(error) => warn!(
                comment_id = self.comment_id,
                "failed to add acknowledgement reaction: {error:#}"
            ),
        }
    }

    /// Swaps the recorded reaction for a terminal one: removes the previous
    /// reaction when one exists, then adds `content`. The add proceeds even
    /// when the remove fails or nothing was recorded. Returns the new id.
    pub async fn resolve(
        &mut self,
        github: &GithubApiClient,
        content: ReactionContent,
    ) -> Option<u64> {
        if let Some(reaction_id) = self.current.take() {
            if let Err(error) = github
                .remove_reaction(&self.owner, &self.repo, self.comment_id, reaction_id)
                .await
            {
                warn!(
                    comment_id = self.comment_id,
                    reaction_id, "failed to remove pending reaction: {error:#}"
                );
            }
        }

        match github
            .add_reaction(&self.owner, &self.repo, self.comment_id, content)
            .await
        {
            Ok(reaction_id) => {
                self.current = Some(reaction_id);
                Some(reaction_id)
            }
            Err(error) => {
                warn!(
                    comment_id = self.comment_id,
                    "failed to add {} reaction: {error:#}",
                    content.as_str()
                );
                None
            }
        }
    }
}
