//! Exchange coordinator: one user turn, one assistant turn.
//!
//! A turn appends the user entry, marks the session busy, calls the
//! assistant service once, then appends exactly one assistant entry (the
//! reply or a fixed placeholder) and marks the session idle again. While a
//! turn is pending every new submission is rejected.

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard},
    time::Duration,
};

use futures::StreamExt;
use recruiter_chat_core::{
    AssistantError, AssistantErrorKind, AssistantService, ExchangeRequest, MessageEntry,
    SessionContext, SessionError, SessionId, SessionIdentity, Transcript, UNAVAILABLE_MESSAGE,
    WELCOME_MESSAGE,
};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

const EVENT_CAPACITY: usize = 1024;

/// Whether an exchange is in flight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExchangeState {
    /// Ready for a new submission.
    #[default]
    Idle,
    /// Waiting on the assistant service.
    Pending,
}

/// Change notification for presenters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    /// An entry was added to the transcript.
    EntryAppended(MessageEntry),
    /// The exchange state changed.
    StateChanged(ExchangeState),
    /// A turn settled; the input control should take focus again.
    FocusInput,
}

/// Reason a submission was not accepted. Nothing is appended or sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    /// The message is empty or whitespace only.
    #[error("Message is empty")]
    EmptyMessage,
    /// No identity is attached to the session yet.
    #[error("Visitor identity has not been captured")]
    IdentityRequired,
    /// Another exchange is pending.
    #[error("An exchange is already in progress")]
    Busy,
}

/// How a turn ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The service replied; the reply is in the transcript.
    Replied,
    /// The service failed; the placeholder is in the transcript.
    Unavailable(AssistantErrorKind),
}

/// A completed turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    /// The accepted user entry.
    pub user: MessageEntry,
    /// The reply or placeholder entry that settled the turn.
    pub assistant: MessageEntry,
    /// Whether the service replied.
    pub outcome: TurnOutcome,
}

struct Inner<A> {
    service: A,
    context: RwLock<SessionContext>,
    transcript: Transcript,
    state: Mutex<ExchangeState>,
    events: broadcast::Sender<ChatEvent>,
}

/// Drives turns against an assistant service.
///
/// Cheap to clone; all clones share the same session, transcript and state.
pub struct ExchangeCoordinator<A> {
    inner: Arc<Inner<A>>,
    timeout: Option<Duration>,
}

impl<A> Clone for ExchangeCoordinator<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            timeout: self.timeout,
        }
    }
}

impl<A> ExchangeCoordinator<A> {
    /// Create a coordinator for `context` with a transcript seeded with the
    /// welcome greeting.
    #[must_use]
    pub fn new(service: A, context: SessionContext) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                service,
                context: RwLock::new(context),
                transcript: Transcript::seeded(WELCOME_MESSAGE),
                state: Mutex::new(ExchangeState::Idle),
                events,
            }),
            timeout: None,
        }
    }

    /// Bound each service call. Expiry settles the turn as a timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn session_id(&self) -> SessionId {
        self.context().session_id()
    }

    #[must_use]
    pub fn identity(&self) -> Option<SessionIdentity> {
        self.context().identity().cloned()
    }

    /// Attach the visitor identity to the session.
    ///
    /// # Errors
    /// Returns [`SessionError::AlreadyAttached`] if one is already set.
    pub fn attach_identity(&self, identity: SessionIdentity) -> Result<(), SessionError> {
        self.inner
            .context
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .attach_identity(identity)
    }

    #[must_use]
    pub fn state(&self) -> ExchangeState {
        *self.lock_state()
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.state() == ExchangeState::Pending
    }

    /// Current transcript, oldest first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<MessageEntry> {
        self.inner.transcript.snapshot()
    }

    /// Receiver for live change notifications.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.inner.events.subscribe()
    }

    /// Stream that yields every existing entry, then live notifications.
    #[must_use]
    pub fn history_plus_stream(&self) -> futures::stream::BoxStream<'static, ChatEvent> {
        // Appends happen under the state lock, so holding it here keeps the
        // snapshot and the subscription consistent with each other.
        let (history, rx) = {
            let _state = self.lock_state();
            (self.inner.transcript.snapshot(), self.inner.events.subscribe())
        };

        let hist = futures::stream::iter(history.into_iter().map(ChatEvent::EntryAppended));
        let live = BroadcastStream::new(rx).filter_map(|res| async move { res.ok() });

        Box::pin(hist.chain(live))
    }

    fn context(&self) -> RwLockReadGuard<'_, SessionContext> {
        self.inner
            .context
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_state(&self) -> MutexGuard<'_, ExchangeState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: ChatEvent) {
        let _ = self.inner.events.send(event); // no subscribers is fine
    }

    /// Append the assistant entry and return to idle.
    fn settle(&self, content: String) -> MessageEntry {
        let mut state = self.lock_state();
        let assistant = self.inner.transcript.append(MessageEntry::assistant(content));
        *state = ExchangeState::Idle;
        self.emit(ChatEvent::EntryAppended(assistant.clone()));
        self.emit(ChatEvent::StateChanged(ExchangeState::Idle));
        self.emit(ChatEvent::FocusInput);
        drop(state);
        assistant
    }
}

impl<A: AssistantService> ExchangeCoordinator<A> {
    /// Submit a user message and wait for the turn to settle.
    ///
    /// # Errors
    /// Returns [`SubmitError`] if the message was not accepted; in that case
    /// the transcript is untouched and no request is sent.
    pub async fn submit_user_message(&self, text: &str) -> Result<Turn, SubmitError> {
        Ok(self.begin(text)?.run().await)
    }

    /// Accept a user message: append it and mark the session busy.
    ///
    /// The returned exchange must be [`run`](PendingExchange::run) to send
    /// the request. Dropping it settles the turn with the placeholder.
    ///
    /// # Errors
    /// Returns [`SubmitError::EmptyMessage`] for blank text,
    /// [`SubmitError::IdentityRequired`] before identity capture, and
    /// [`SubmitError::Busy`] while another exchange is pending.
    pub fn begin(&self, text: &str) -> Result<PendingExchange<A>, SubmitError> {
        if text.trim().is_empty() {
            return Err(SubmitError::EmptyMessage);
        }
        let (session_id, identity) = {
            let ctx = self.context();
            let identity = ctx.identity().cloned().ok_or(SubmitError::IdentityRequired)?;
            (ctx.session_id(), identity)
        };

        let mut state = self.lock_state();
        if *state == ExchangeState::Pending {
            tracing::debug!(%session_id, "submission rejected: exchange pending");
            return Err(SubmitError::Busy);
        }
        let user = self.inner.transcript.append(MessageEntry::user(text));
        *state = ExchangeState::Pending;
        self.emit(ChatEvent::EntryAppended(user.clone()));
        self.emit(ChatEvent::StateChanged(ExchangeState::Pending));
        drop(state);

        tracing::debug!(%session_id, chars = text.len(), "exchange started");

        Ok(PendingExchange {
            coordinator: self.clone(),
            request: ExchangeRequest {
                message: text.to_string(),
                session_id,
                identity,
            },
            user,
            settled: false,
        })
    }

    async fn call(&self, request: &ExchangeRequest) -> Result<String, AssistantError> {
        let exchange = self.inner.service.exchange(request);
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, exchange)
                .await
                .unwrap_or_else(|_| {
                    Err(AssistantError::timeout(format!("No reply within {limit:?}")))
                }),
            None => exchange.await,
        }
    }
}

/// An accepted turn whose request has not settled yet.
#[must_use = "dropping a pending exchange settles it with the placeholder reply"]
pub struct PendingExchange<A> {
    coordinator: ExchangeCoordinator<A>,
    request: ExchangeRequest,
    user: MessageEntry,
    settled: bool,
}

impl<A> std::fmt::Debug for PendingExchange<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingExchange")
            .field("request", &self.request)
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

impl<A> PendingExchange<A> {
    /// The request that will be sent.
    #[must_use]
    pub const fn request(&self) -> &ExchangeRequest {
        &self.request
    }

    /// The user entry already appended for this turn.
    #[must_use]
    pub const fn user_entry(&self) -> &MessageEntry {
        &self.user
    }
}

impl<A: AssistantService> PendingExchange<A> {
    /// Send the request and settle the turn.
    pub async fn run(mut self) -> Turn {
        let result = self.coordinator.call(&self.request).await;
        let session_id = self.request.session_id;

        let (content, outcome) = match result {
            Ok(reply) => {
                tracing::debug!(%session_id, "exchange replied");
                (reply, TurnOutcome::Replied)
            }
            Err(e) => {
                tracing::warn!(%session_id, kind = ?e.kind, "exchange failed: {e}");
                (UNAVAILABLE_MESSAGE.to_string(), TurnOutcome::Unavailable(e.kind))
            }
        };

        self.settled = true;
        let assistant = self.coordinator.settle(content);
        Turn {
            user: self.user.clone(),
            assistant,
            outcome,
        }
    }
}

impl<A> Drop for PendingExchange<A> {
    fn drop(&mut self) {
        if !self.settled {
            tracing::warn!(
                session_id = %self.request.session_id,
                "exchange dropped before settling"
            );
            self.coordinator.settle(UNAVAILABLE_MESSAGE.to_string());
        }
    }
}
