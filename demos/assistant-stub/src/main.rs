//! Local stand-in for the recruiter chat assistant service.
//!
//! Run with: cargo run -p assistant-stub
//!
//! Serves the same `/api/chat` and `/api/health` contract the chat client
//! expects, answering from canned replies instead of a language model.
//! Conversations live in memory only; once `MAX_SESSIONS` are held the least
//! recently active one is dropped. There is no rate limiting.

mod responder;

use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use recruiter_chat_core::{MessageEntry, Transcript};
use recruiter_chat_transport::{ChatRequest, ChatResponse, HealthStatus, RecruiterInfo};
use serde_json::{Value, json};
use tokio::sync::RwLock;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Conversations kept before the least recently active one is evicted.
const MAX_SESSIONS: usize = 1000;

/// Conversation state for one client session.
struct Conversation {
    recruiter_info: RecruiterInfo,
    messages: Transcript,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    /// Request sequence number of the latest turn.
    last_seen: u64,
}

impl Conversation {
    fn new(recruiter_info: RecruiterInfo) -> Self {
        let now = Utc::now();
        Self {
            recruiter_info,
            messages: Transcript::new(),
            created_at: now,
            updated_at: now,
            last_seen: 0,
        }
    }
}

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    sessions: Arc<RwLock<HashMap<String, Conversation>>>,
    requests: Arc<AtomicU64>,
    max_sessions: usize,
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_max_sessions(MAX_SESSIONS)
    }
}

impl AppState {
    fn with_max_sessions(max_sessions: usize) -> Self {
        Self {
            sessions: Arc::default(),
            requests: Arc::default(),
            max_sessions: max_sessions.max(1),
        }
    }
}

fn evict_least_recent(sessions: &mut HashMap<String, Conversation>) {
    let oldest = sessions
        .iter()
        .min_by_key(|(_, conversation)| conversation.last_seen)
        .map(|(id, _)| id.clone());
    if let Some(id) = oldest {
        sessions.remove(&id);
        tracing::info!(session_id = %id, "evicted idle conversation");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .init();

    let port: u16 = match std::env::var("PORT") {
        Ok(raw) => raw.parse()?,
        Err(_) => 8000,
    };
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Assistant stub listening on http://{addr}");
    axum::serve(listener, app(AppState::default())).await?;
    Ok(())
}

fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/api/chat", post(chat_handler))
        .route("/api/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root_handler() -> Json<Value> {
    Json(json!({ "message": "Recruiter Chat API is running!" }))
}

async fn chat_handler(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Json<ChatResponse> {
    let seq = state.requests.fetch_add(1, Ordering::Relaxed) + 1;
    let mut sessions = state.sessions.write().await;
    if !sessions.contains_key(&request.session_id) && sessions.len() >= state.max_sessions {
        evict_least_recent(&mut sessions);
    }
    let conversation = sessions
        .entry(request.session_id.clone())
        .or_insert_with(|| {
            tracing::info!(
                session_id = %request.session_id,
                company = %request.recruiter_info.company,
                "new conversation"
            );
            Conversation::new(request.recruiter_info.clone())
        });

    let history = conversation.messages.snapshot();
    let response = responder::reply(
        &conversation.recruiter_info,
        responder::context_window(&history),
        &request.message,
    );

    conversation.messages.append(MessageEntry::user(request.message));
    conversation
        .messages
        .append(MessageEntry::assistant(response.clone()));
    conversation.updated_at = Utc::now();
    conversation.last_seen = seq;
    tracing::debug!(
        session_id = %request.session_id,
        messages = conversation.messages.len(),
        age_secs = (conversation.updated_at - conversation.created_at).num_seconds(),
        "chat reply sent"
    );

    Json(ChatResponse {
        response,
        session_id: Some(request.session_id),
    })
}

async fn health_handler() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "healthy".to_string(),
        timestamp: Some(Utc::now().to_rfc3339()),
    })
}
