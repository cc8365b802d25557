//! Mock assistant services for testing.
//!
//! These mocks let the coordinator run without any network I/O.

use std::{
    collections::VecDeque,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use recruiter_chat_core::{
    AssistantError, AssistantService, ExchangeRequest, IdentityFields, SessionContext,
    SessionIdentity,
};
use tokio::sync::mpsc;

pub fn identity() -> SessionIdentity {
    SessionIdentity::new(IdentityFields::new("Dana Reyes", "Acme Corp", "dana@acme.io")).unwrap()
}

/// Session context with the test identity attached.
pub fn identified_context() -> SessionContext {
    let mut ctx = SessionContext::create();
    ctx.attach_identity(identity()).unwrap();
    ctx
}

/// Assistant that answers immediately from a queue of scripted results.
#[derive(Default)]
pub struct ScriptedAssistant {
    replies: Mutex<VecDeque<Result<String, AssistantError>>>,
    requests: Mutex<Vec<ExchangeRequest>>,
}

impl ScriptedAssistant {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_reply(&self, reply: impl Into<String>) {
        self.replies.lock().unwrap().push_back(Ok(reply.into()));
    }

    pub fn queue_error(&self, error: AssistantError) {
        self.replies.lock().unwrap().push_back(Err(error));
    }

    pub fn recorded_requests(&self) -> Vec<ExchangeRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl AssistantService for ScriptedAssistant {
    async fn exchange(&self, request: &ExchangeRequest) -> Result<String, AssistantError> {
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AssistantError::transport("No scripted reply queued")))
    }
}

/// Assistant that stays pending until the test releases a result.
pub struct GatedAssistant {
    results: tokio::sync::Mutex<mpsc::UnboundedReceiver<Result<String, AssistantError>>>,
    calls: AtomicUsize,
}

impl GatedAssistant {
    /// Returns the assistant and the sender used to settle calls, in order.
    pub fn new() -> (Self, mpsc::UnboundedSender<Result<String, AssistantError>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let assistant = Self {
            results: tokio::sync::Mutex::new(rx),
            calls: AtomicUsize::new(0),
        };
        (assistant, tx)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AssistantService for GatedAssistant {
    async fn exchange(&self, _request: &ExchangeRequest) -> Result<String, AssistantError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.results
            .lock()
            .await
            .recv()
            .await
            .unwrap_or_else(|| Err(AssistantError::transport("gate closed")))
    }
}
