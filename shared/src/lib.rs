use std::fmt;

use serde::{Deserialize, Serialize};

// ── Votes ──

/// Direction of a comment vote, as it appears in the endpoint path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    Upvote,
    Downvote,
}

impl VoteDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            VoteDirection::Upvote => "upvote",
            VoteDirection::Downvote => "downvote",
        }
    }

    /// Accepts exactly the two path segments the server routes on.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "upvote" => Some(VoteDirection::Upvote),
            "downvote" => Some(VoteDirection::Downvote),
            _ => None,
        }
    }
}

impl fmt::Display for VoteDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies the comment being voted on. Both ids are opaque strings
/// lifted from the markup; the client never interprets them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VoteTarget {
    post_id: String,
    comment_id: String,
}

/// A vote control without usable ids. The vote must not be attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptyIdError;

impl fmt::Display for EmptyIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("vote target requires non-empty post and comment ids")
    }
}

impl std::error::Error for EmptyIdError {}

impl VoteTarget {
    pub fn new(post_id: &str, comment_id: &str) -> Result<Self, EmptyIdError> {
        let post_id = post_id.trim();
        let comment_id = comment_id.trim();
        if post_id.is_empty() || comment_id.is_empty() {
            return Err(EmptyIdError);
        }
        Ok(VoteTarget {
            post_id: post_id.to_string(),
            comment_id: comment_id.to_string(),
        })
    }

    pub fn post_id(&self) -> &str {
        &self.post_id
    }

    pub fn comment_id(&self) -> &str {
        &self.comment_id
    }

    /// Path of the server vote endpoint for this target and direction.
    pub fn endpoint(&self, direction: VoteDirection) -> String {
        format!(
            "/posts/{}/comments/{}/{}",
            self.post_id, self.comment_id, direction
        )
    }
}

impl fmt::Display for VoteTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "comment {} on post {}", self.comment_id, self.post_id)
    }
}

/// Server reply to a vote POST. `score` is only present when the vote
/// was accepted; the server-side tally is always authoritative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<i64>,
}
