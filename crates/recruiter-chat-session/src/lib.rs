//! Session orchestration for the recruiter chat client.
//!
//! Provides:
//! - `ExchangeCoordinator` - Serialize user turns against the assistant service
//! - `ChatClient` - Presenter-facing events and view state

pub mod client;
pub mod coordinator;

#[cfg(test)]
mod proptests;
#[cfg(test)]
mod testing;

pub use client::{ChatClient, ChatView, ClientError, PresenterEvent};
pub use coordinator::{
    ChatEvent, ExchangeCoordinator, ExchangeState, PendingExchange, SubmitError, Turn,
    TurnOutcome,
};
