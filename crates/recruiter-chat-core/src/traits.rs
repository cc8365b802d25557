//! Remote assistant service boundary.

use async_trait::async_trait;
use thiserror::Error;

use crate::{SessionId, SessionIdentity};

/// Everything the assistant service receives for one turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeRequest {
    /// The user's message, as typed.
    pub message: String,
    /// Conversation identifier, identical for every turn of a session.
    pub session_id: SessionId,
    /// Visitor identity captured before the conversation started.
    pub identity: SessionIdentity,
}

/// Failure classification for an exchange.
///
/// All kinds collapse to the same placeholder in the transcript; the kind is
/// kept for logs and callers that want it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssistantErrorKind {
    /// No reply within the allowed time.
    Timeout,
    /// Connection refused, reset, DNS failure and the like.
    Transport,
    /// Service answered with a non-2xx status.
    Status(u16),
    /// 2xx answer whose body was not a valid reply.
    Malformed,
}

/// Exchange error with classification.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AssistantError {
    /// What went wrong.
    pub kind: AssistantErrorKind,
    /// Detail for logs; never shown to the visitor.
    pub message: String,
}

impl AssistantError {
    pub fn new(kind: AssistantErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(AssistantErrorKind::Timeout, message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(AssistantErrorKind::Transport, message)
    }

    pub fn status(code: u16, message: impl Into<String>) -> Self {
        Self::new(AssistantErrorKind::Status(code), message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(AssistantErrorKind::Malformed, message)
    }
}

/// Trait for remote assistant backends.
#[async_trait]
pub trait AssistantService: Send + Sync {
    /// Send one user message and wait for the reply text.
    async fn exchange(&self, request: &ExchangeRequest) -> Result<String, AssistantError>;
}

#[async_trait]
impl<T: AssistantService + ?Sized> AssistantService for std::sync::Arc<T> {
    async fn exchange(&self, request: &ExchangeRequest) -> Result<String, AssistantError> {
        (**self).exchange(request).await
    }
}
