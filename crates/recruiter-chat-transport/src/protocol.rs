//! Wire protocol for the assistant service.

use recruiter_chat_core::ExchangeRequest;
use serde::{Deserialize, Serialize};

/// Path of the chat endpoint, relative to the base URL.
pub const CHAT_PATH: &str = "/api/chat";

/// Path of the health endpoint, relative to the base URL.
pub const HEALTH_PATH: &str = "/api/health";

/// Visitor identity as sent on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecruiterInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub email: String,
}

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub session_id: String,
    #[serde(default)]
    pub recruiter_info: RecruiterInfo,
}

impl From<&ExchangeRequest> for ChatRequest {
    fn from(request: &ExchangeRequest) -> Self {
        Self {
            message: request.message.clone(),
            session_id: request.session_id.to_string(),
            recruiter_info: RecruiterInfo {
                name: request.identity.visitor_name().to_string(),
                company: request.identity.affiliation().to_string(),
                email: request.identity.contact().to_string(),
            },
        }
    }
}

/// Successful reply from `POST /api/chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// Reply from `GET /api/health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl HealthStatus {
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

#[cfg(test)]
mod tests {
    use recruiter_chat_core::{IdentityFields, SessionId, SessionIdentity};
    use serde_json::json;

    use super::*;

    #[test]
    fn test_request_body_shape() {
        let session_id = SessionId::generate();
        let exchange = ExchangeRequest {
            message: "What are your skills?".to_string(),
            session_id,
            identity: SessionIdentity::new(IdentityFields::new(
                "Dana Reyes",
                "Acme Corp",
                "dana@acme.io",
            ))
            .unwrap(),
        };

        let body = serde_json::to_value(ChatRequest::from(&exchange)).unwrap();

        assert_eq!(
            body,
            json!({
                "message": "What are your skills?",
                "session_id": session_id.to_string(),
                "recruiter_info": {
                    "name": "Dana Reyes",
                    "company": "Acme Corp",
                    "email": "dana@acme.io",
                }
            })
        );
    }

    #[test]
    fn test_response_session_id_is_optional() {
        let bare: ChatResponse = serde_json::from_str(r#"{"response":"Skilled in X"}"#).unwrap();
        assert_eq!(bare.response, "Skilled in X");
        assert!(bare.session_id.is_none());

        let full: ChatResponse =
            serde_json::from_str(r#"{"response":"ok","session_id":"abc"}"#).unwrap();
        assert_eq!(full.session_id.as_deref(), Some("abc"));
    }

    #[test]
    fn test_response_without_reply_is_rejected() {
        assert!(serde_json::from_str::<ChatResponse>(r#"{"detail":"boom"}"#).is_err());
        assert!(serde_json::from_str::<ChatResponse>(r#"{"response":42}"#).is_err());
    }

    #[test]
    fn test_request_without_identity_defaults() {
        let parsed: ChatRequest =
            serde_json::from_str(r#"{"message":"hi","session_id":"s1"}"#).unwrap();
        assert_eq!(parsed.recruiter_info, RecruiterInfo::default());
    }
}
