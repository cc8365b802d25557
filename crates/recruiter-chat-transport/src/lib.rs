//! Transport layer for the recruiter chat client.
//!
//! Provides:
//! - Wire protocol for the assistant service
//! - Client configuration
//! - HTTP assistant client (feature: http)
//! - TUI input bridge (feature: tui)

pub mod config;
pub mod protocol;

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "tui")]
pub mod tui;

pub use config::{BASE_URL_ENV, ClientConfig, ConfigError, DEFAULT_BASE_URL};
#[cfg(feature = "http")]
pub use http::{HttpAssistant, TransportError};
pub use protocol::{ChatRequest, ChatResponse, HealthStatus, RecruiterInfo};
