//! HTTP client for the remote assistant service.

use async_trait::async_trait;
use recruiter_chat_core::{AssistantError, AssistantService, ExchangeRequest};
use reqwest::{Client, StatusCode};

use crate::{
    config::ClientConfig,
    protocol::{CHAT_PATH, ChatRequest, ChatResponse, HEALTH_PATH, HealthStatus},
};

/// Transport setup error.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Assistant service reached over `POST /api/chat`.
#[derive(Debug, Clone)]
pub struct HttpAssistant {
    client: Client,
    chat_url: String,
    health_url: String,
}

impl HttpAssistant {
    /// Create a client for the configured service.
    ///
    /// # Errors
    /// Returns error if the configuration is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        config.validate()?;
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            client,
            chat_url: config.endpoint(CHAT_PATH),
            health_url: config.endpoint(HEALTH_PATH),
        })
    }

    /// Chat endpoint URL.
    #[must_use]
    pub fn chat_url(&self) -> &str {
        &self.chat_url
    }

    /// Query the service health endpoint.
    ///
    /// # Errors
    /// Returns the classified failure if the service is unreachable,
    /// unhealthy or answers with an unexpected body.
    pub async fn health(&self) -> Result<HealthStatus, AssistantError> {
        let response = self
            .client
            .get(&self.health_url)
            .send()
            .await
            .map_err(classify_send_error)?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AssistantError::transport(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(classify_status(status, &body));
        }
        serde_json::from_str(&body)
            .map_err(|e| AssistantError::malformed(format!("Failed to parse health status: {e}")))
    }
}

#[async_trait]
impl AssistantService for HttpAssistant {
    async fn exchange(&self, request: &ExchangeRequest) -> Result<String, AssistantError> {
        let body = ChatRequest::from(request);
        tracing::debug!(url = %self.chat_url, session_id = %body.session_id, "posting chat message");

        let response = self
            .client
            .post(&self.chat_url)
            .json(&body)
            .send()
            .await
            .map_err(classify_send_error)?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            if e.is_timeout() {
                AssistantError::timeout(format!("Timed out reading response: {e}"))
            } else {
                AssistantError::transport(format!("Failed to read response: {e}"))
            }
        })?;

        if !status.is_success() {
            return Err(classify_status(status, &text));
        }

        let reply: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| AssistantError::malformed(format!("Failed to parse response: {e}")))?;
        Ok(reply.response)
    }
}

fn classify_send_error(e: reqwest::Error) -> AssistantError {
    if e.is_timeout() {
        AssistantError::timeout(format!("Request timeout: {e}"))
    } else if e.is_connect() {
        AssistantError::transport(format!("Connection failed: {e}"))
    } else {
        AssistantError::transport(format!("Request failed: {e}"))
    }
}

fn classify_status(status: StatusCode, body: &str) -> AssistantError {
    AssistantError::status(status.as_u16(), format!("HTTP {status}: {body}"))
}

#[cfg(test)]
mod tests {
    use std::{
        net::SocketAddr,
        sync::{Arc, Mutex},
        time::Duration,
    };

    use axum::{
        Json, Router,
        http::StatusCode as AxumStatus,
        routing::{get, post},
    };
    use recruiter_chat_core::{AssistantErrorKind, IdentityFields, SessionId, SessionIdentity};
    use serde_json::{Value, json};

    use super::*;

    fn exchange_request(message: &str) -> ExchangeRequest {
        ExchangeRequest {
            message: message.to_string(),
            session_id: SessionId::generate(),
            identity: SessionIdentity::new(IdentityFields::new(
                "Dana Reyes",
                "Acme Corp",
                "dana@acme.io",
            ))
            .unwrap(),
        }
    }

    async fn serve(app: Router) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    fn assistant_for(addr: SocketAddr) -> HttpAssistant {
        let config = ClientConfig::default().with_base_url(format!("http://{addr}"));
        HttpAssistant::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_successful_exchange() {
        let seen = Arc::new(Mutex::new(None::<Value>));
        let recorder = Arc::clone(&seen);
        let app = Router::new().route(
            "/api/chat",
            post(move |Json(body): Json<Value>| {
                let recorder = Arc::clone(&recorder);
                async move {
                    let session_id = body["session_id"].clone();
                    *recorder.lock().unwrap() = Some(body);
                    Json(json!({ "response": "Skilled in X", "session_id": session_id }))
                }
            }),
        );
        let assistant = assistant_for(serve(app).await);
        let request = exchange_request("What are your skills?");

        let reply = assistant.exchange(&request).await.unwrap();

        assert_eq!(reply, "Skilled in X");
        let body = seen.lock().unwrap().clone().unwrap();
        assert_eq!(body["message"], "What are your skills?");
        assert_eq!(body["session_id"], request.session_id.to_string());
        assert_eq!(body["recruiter_info"]["company"], "Acme Corp");
    }

    #[tokio::test]
    async fn test_server_error_is_status_failure() {
        let app = Router::new().route(
            "/api/chat",
            post(|| async {
                (
                    AxumStatus::INTERNAL_SERVER_ERROR,
                    Json(json!({ "detail": "Error processing chat" })),
                )
            }),
        );
        let assistant = assistant_for(serve(app).await);

        let err = assistant.exchange(&exchange_request("Hi")).await.unwrap_err();
        assert_eq!(err.kind, AssistantErrorKind::Status(500));
    }

    #[tokio::test]
    async fn test_client_error_is_status_failure() {
        let app = Router::new().route(
            "/api/chat",
            post(|| async { (AxumStatus::TOO_MANY_REQUESTS, "slow down") }),
        );
        let assistant = assistant_for(serve(app).await);

        let err = assistant.exchange(&exchange_request("Hi")).await.unwrap_err();
        assert_eq!(err.kind, AssistantErrorKind::Status(429));
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let app = Router::new().route(
            "/api/chat",
            post(|| async { Json(json!({ "reply": "wrong field" })) }),
        );
        let assistant = assistant_for(serve(app).await);

        let err = assistant.exchange(&exchange_request("Hi")).await.unwrap_err();
        assert_eq!(err.kind, AssistantErrorKind::Malformed);
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_failure() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let assistant = assistant_for(addr);

        let err = assistant.exchange(&exchange_request("Hi")).await.unwrap_err();
        assert_eq!(err.kind, AssistantErrorKind::Transport);
    }

    #[tokio::test]
    async fn test_slow_service_times_out() {
        let app = Router::new().route(
            "/api/chat",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(json!({ "response": "too late" }))
            }),
        );
        let addr = serve(app).await;
        let config = ClientConfig {
            base_url: format!("http://{addr}"),
            timeout_secs: 1,
        };
        let assistant = HttpAssistant::new(&config).unwrap();

        let err = assistant.exchange(&exchange_request("Hi")).await.unwrap_err();
        assert_eq!(err.kind, AssistantErrorKind::Timeout);
    }

    #[tokio::test]
    async fn test_health() {
        let app = Router::new().route(
            "/api/health",
            get(|| async { Json(json!({ "status": "healthy", "timestamp": "2024-05-01T12:00:00" })) }),
        );
        let assistant = assistant_for(serve(app).await);

        let health = assistant.health().await.unwrap();
        assert!(health.is_healthy());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = ClientConfig::default().with_base_url("localhost");
        assert!(matches!(
            HttpAssistant::new(&config),
            Err(TransportError::Config(_))
        ));
    }
}
