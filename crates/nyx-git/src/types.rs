use serde::{Deserialize, Serialize};

/// A name/email pair identifying an author, committer or tagger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub name: String,
    pub email: String,
}

impl Identity {
    #[must_use]
    pub fn new(name: &str, email: &str) -> Self {
        Self {
            name: name.to_string(),
            email: email.to_string(),
        }
    }
}

/// A point in time as recorded by Git: UNIX epoch milliseconds plus the
/// recorded timezone offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeStamp {
    pub millis: i64,
    pub offset_minutes: i32,
}

/// An identity acting at a point in time (authoring or committing).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub identity: Identity,
    pub timestamp: TimeStamp,
}

/// A tag reference. Lightweight tags point directly at the commit;
/// annotated tags carry their own object with message and tagger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub target: String,
    pub annotated: bool,
}

/// A commit as streamed out of the history walk. Parents are SHAs only;
/// the tags are those resolved at the time the commit was visited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub sha: String,
    pub parents: Vec<String>,
    pub author_action: Action,
    pub commit_action: Action,
    pub message: String,
    pub tags: Vec<Tag>,
}

impl Commit {
    /// The first line of the commit message.
    #[must_use]
    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit_with_message(message: &str) -> Commit {
        let action = Action {
            identity: Identity::new("Test", "test@example.com"),
            timestamp: TimeStamp {
                millis: 0,
                offset_minutes: 0,
            },
        };
        Commit {
            sha: "0000000000000000000000000000000000000000".to_string(),
            parents: Vec::new(),
            author_action: action.clone(),
            commit_action: action,
            message: message.to_string(),
            tags: Vec::new(),
        }
    }

    #[test]
    fn summary_is_the_first_message_line() {
        let commit = commit_with_message("feat: add parser\n\nlong body");
        assert_eq!(commit.summary(), "feat: add parser");
    }

    #[test]
    fn summary_of_empty_message_is_empty() {
        assert_eq!(commit_with_message("").summary(), "");
    }
}
