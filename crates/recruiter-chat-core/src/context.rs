//! Session context for one conversation.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::SessionIdentity;

/// Opaque conversation identifier sent with every exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Generate a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Session context error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The session already carries an identity.
    #[error("Identity already attached to session {0}")]
    AlreadyAttached(SessionId),
}

/// Session identifier plus the visitor identity, once known.
///
/// The identifier is fixed at creation; the identity can be written once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionContext {
    session_id: SessionId,
    identity: Option<SessionIdentity>,
}

impl SessionContext {
    /// Create a new session with a fresh identifier and no identity.
    #[must_use]
    pub fn create() -> Self {
        let session_id = SessionId::generate();
        tracing::info!(%session_id, "session created");
        Self {
            session_id,
            identity: None,
        }
    }

    #[must_use]
    pub const fn session_id(&self) -> SessionId {
        self.session_id
    }

    #[must_use]
    pub const fn identity(&self) -> Option<&SessionIdentity> {
        self.identity.as_ref()
    }

    /// Attach the visitor identity.
    ///
    /// # Errors
    /// Returns [`SessionError::AlreadyAttached`] if an identity is already set.
    pub fn attach_identity(&mut self, identity: SessionIdentity) -> Result<(), SessionError> {
        if self.identity.is_some() {
            return Err(SessionError::AlreadyAttached(self.session_id));
        }
        self.identity = Some(identity);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IdentityFields;

    fn identity(name: &str) -> SessionIdentity {
        SessionIdentity::new(IdentityFields::new(name, "Acme", "hr@acme.io")).unwrap()
    }

    #[test]
    fn test_new_session_has_no_identity() {
        let ctx = SessionContext::create();
        assert!(ctx.identity().is_none());
    }

    #[test]
    fn test_sessions_get_distinct_ids() {
        assert_ne!(
            SessionContext::create().session_id(),
            SessionContext::create().session_id()
        );
    }

    #[test]
    fn test_identity_is_write_once() {
        let mut ctx = SessionContext::create();
        let id = ctx.session_id();

        ctx.attach_identity(identity("Dana")).unwrap();
        assert_eq!(
            ctx.attach_identity(identity("Eve")),
            Err(SessionError::AlreadyAttached(id))
        );
        assert_eq!(ctx.identity().unwrap().visitor_name(), "Dana");
        assert_eq!(ctx.session_id(), id);
    }

    #[test]
    fn test_session_id_serializes_as_plain_string() {
        let id = SessionId::generate();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
    }
}
