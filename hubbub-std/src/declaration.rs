//! Declarative handler keys.
//!
//! Components may declare handlers under keys such as `hub/foo/bar` or
//! `hub/foo/bar(true)`. A [`Declaration`] is the parsed form: the topic plus
//! whether the subscription is memory-qualified.

use hubbub_core::{DeclarationError, Topic};
use std::{fmt, str::FromStr};

const PREFIX: &str = "hub/";

/// A parsed declarative key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    topic: Topic,
    memory: bool,
}

impl Declaration {
    /// Parse `hub/<topic>` or `hub/<topic>(<true|false>)`.
    pub fn parse(key: &str) -> Result<Self, DeclarationError> {
        let rest = key
            .strip_prefix(PREFIX)
            .ok_or_else(|| DeclarationError::MissingPrefix(key.to_string()))?;

        let (topic, memory) = match rest.strip_suffix(')') {
            Some(body) => {
                let (topic, qualifier) = body
                    .rsplit_once('(')
                    .ok_or_else(|| DeclarationError::Unbalanced(key.to_string()))?;
                let memory = match qualifier.trim() {
                    "true" => true,
                    "false" => false,
                    other => {
                        return Err(DeclarationError::UnknownQualifier {
                            key: key.to_string(),
                            qualifier: other.to_string(),
                        });
                    }
                };
                (topic, memory)
            }
            None => (rest, false),
        };

        if topic.contains(['(', ')']) {
            return Err(DeclarationError::Unbalanced(key.to_string()));
        }
        if topic.is_empty() {
            return Err(DeclarationError::EmptyTopic(key.to_string()));
        }

        Ok(Self {
            topic: Topic::from(topic),
            memory,
        })
    }

    /// The declared topic.
    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    /// Whether the declaration asks for memory replay.
    pub fn memory(&self) -> bool {
        self.memory
    }
}

impl FromStr for Declaration {
    type Err = DeclarationError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        Self::parse(key)
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.memory {
            write!(f, "{PREFIX}{}(true)", self.topic)
        } else {
            write!(f, "{PREFIX}{}", self.topic)
        }
    }
}
