//! Core types for a single recruiter chat session.
//!
//! This crate provides the fundamental building blocks:
//! - `IdentityCapture` - Gate collecting the visitor's identity
//! - `SessionContext` - Session identifier + captured identity
//! - `Transcript` - Append-only, time-ordered message history
//! - `AssistantService` - Boundary to the remote assistant

pub mod context;
pub mod identity;
pub mod message;
pub mod traits;
pub mod transcript;

pub use context::{SessionContext, SessionError, SessionId};
pub use identity::{IdentityCapture, IdentityError, IdentityField, IdentityFields, SessionIdentity};
pub use message::{MessageEntry, Role, UNAVAILABLE_MESSAGE, WELCOME_MESSAGE};
pub use traits::{AssistantError, AssistantErrorKind, AssistantService, ExchangeRequest};
pub use transcript::Transcript;
