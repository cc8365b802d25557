//! Transcript message entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Greeting the transcript is seeded with.
pub const WELCOME_MESSAGE: &str = "Hello! I'm an AI assistant representing the candidate. \
     Ask me about their experience, skills, projects, or availability.";

/// Assistant entry appended when an exchange fails for any reason.
pub const UNAVAILABLE_MESSAGE: &str =
    "Sorry, I'm having trouble connecting right now. Please try again in a moment.";

/// Who wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// A single transcript entry. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEntry {
    role: Role,
    content: String,
    timestamp: DateTime<Utc>,
}

impl MessageEntry {
    /// Create an entry stamped with the current time.
    #[must_use]
    pub fn now(role: Role, content: impl Into<String>) -> Self {
        Self::at(role, content, Utc::now())
    }

    /// Create an entry with an explicit timestamp.
    #[must_use]
    pub fn at(role: Role, content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp,
        }
    }

    /// User entry stamped now.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::now(Role::User, content)
    }

    /// Assistant entry stamped now.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::now(Role::Assistant, content)
    }

    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Same entry with the timestamp moved forward to at least `floor`.
    pub(crate) fn not_before(mut self, floor: DateTime<Utc>) -> Self {
        if self.timestamp < floor {
            self.timestamp = floor;
        }
        self
    }
}
