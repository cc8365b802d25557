//! Presenter-facing glue.
//!
//! A presenter forwards user intent as [`PresenterEvent`]s and renders the
//! [`ChatView`] it reads back. Accepted messages come back as a
//! [`PendingExchange`] for the presenter to run without blocking its loop.

use recruiter_chat_core::{
    AssistantService, IdentityCapture, IdentityError, IdentityField, IdentityFields,
    MessageEntry, SessionError, SessionId,
};
use thiserror::Error;

use crate::coordinator::{ExchangeCoordinator, PendingExchange, SubmitError};

/// User intent forwarded by a presenter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenterEvent {
    /// An identity form field was edited.
    IdentityFieldChanged { field: IdentityField, value: String },
    /// The identity form was submitted.
    IdentitySubmitted,
    /// The message input was edited.
    InputChanged(String),
    /// The message form was submitted.
    MessageSubmitted,
}

/// Client error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The identity form was rejected.
    #[error(transparent)]
    Identity(#[from] IdentityError),
    /// The identity could not be attached to the session.
    #[error(transparent)]
    Session(#[from] SessionError),
    /// The message was not accepted.
    #[error(transparent)]
    Submit(#[from] SubmitError),
}

/// Everything a presenter needs to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatView {
    /// Identifier sent with every exchange.
    pub session_id: SessionId,
    /// Transcript snapshot, oldest first.
    pub transcript: Vec<MessageEntry>,
    /// An exchange is in flight.
    pub busy: bool,
    /// Identity capture is still pending.
    pub gate_open: bool,
    /// Message input buffer.
    pub input: String,
    /// Identity form contents.
    pub identity_form: IdentityFields,
    /// Why the last identity submission was rejected.
    pub identity_error: Option<IdentityError>,
}

/// Identity gate, input buffer and exchange coordinator for one session.
pub struct ChatClient<A> {
    capture: IdentityCapture,
    identity_error: Option<IdentityError>,
    input: String,
    coordinator: ExchangeCoordinator<A>,
}

impl<A> ChatClient<A> {
    /// Create a client around a coordinator whose session has no identity yet.
    ///
    /// If the session already carries one, identity submissions fail with
    /// [`SessionError::AlreadyAttached`] and the form stays open.
    #[must_use]
    pub fn new(coordinator: ExchangeCoordinator<A>) -> Self {
        Self {
            capture: IdentityCapture::new(),
            identity_error: None,
            input: String::new(),
            coordinator,
        }
    }

    #[must_use]
    pub const fn coordinator(&self) -> &ExchangeCoordinator<A> {
        &self.coordinator
    }

    #[must_use]
    pub const fn is_gate_open(&self) -> bool {
        self.capture.is_open()
    }

    #[must_use]
    pub fn view(&self) -> ChatView {
        ChatView {
            session_id: self.coordinator.session_id(),
            transcript: self.coordinator.snapshot(),
            busy: self.coordinator.is_busy(),
            gate_open: self.capture.is_open(),
            input: self.input.clone(),
            identity_form: self.capture.fields().clone(),
            identity_error: self.identity_error.clone(),
        }
    }
}

impl<A: AssistantService> ChatClient<A> {
    /// Apply one presenter event.
    ///
    /// Returns the accepted exchange for `MessageSubmitted`; the caller runs
    /// it (typically on a spawned task) and re-renders on the events the
    /// coordinator emits.
    ///
    /// # Errors
    /// Returns the identity validation failure for a rejected identity form,
    /// or the [`SubmitError`] for a rejected message. Rejections leave the
    /// transcript and the input buffer untouched.
    pub fn handle(
        &mut self,
        event: PresenterEvent,
    ) -> Result<Option<PendingExchange<A>>, ClientError> {
        match event {
            PresenterEvent::IdentityFieldChanged { field, value } => {
                self.capture.set_field(field, value);
                self.identity_error = None;
                Ok(None)
            }
            PresenterEvent::IdentitySubmitted => {
                let identity = match self.capture.validate() {
                    Ok(identity) => identity,
                    Err(e) => {
                        if e != IdentityError::AlreadyCaptured {
                            self.identity_error = Some(e.clone());
                        }
                        return Err(e.into());
                    }
                };
                self.identity_error = None;
                // The gate only closes once the session holds this identity.
                self.coordinator.attach_identity(identity)?;
                self.capture.submit()?;
                Ok(None)
            }
            PresenterEvent::InputChanged(value) => {
                self.input = value;
                Ok(None)
            }
            PresenterEvent::MessageSubmitted => {
                if self.capture.is_open() {
                    return Err(SubmitError::IdentityRequired.into());
                }
                let pending = self.coordinator.begin(&self.input)?;
                self.input.clear();
                Ok(Some(pending))
            }
        }
    }
}
