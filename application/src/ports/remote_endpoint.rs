//! Remote endpoint port
//!
//! Defines the interface for calling a slow, occasionally failing remote
//! completion endpoint. Adapters live in the infrastructure layer; tests
//! inject scripted implementations.

use async_trait::async_trait;
use consilium_domain::{Endpoint, ModelParams};
use std::time::Duration;
use thiserror::Error;

/// Whether a failure may be retried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Connection drop, rate limit, upstream 5xx, deadline exceeded
    Transient,
    /// Malformed request, authentication failure
    Permanent,
}

/// Errors raised by a remote endpoint
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Upstream error (status {status}): {message}")]
    Upstream { status: u16, message: String },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl RemoteError {
    /// Classify an unsuccessful HTTP status.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            429 => RemoteError::RateLimited(message),
            408 | 500..=599 => RemoteError::Upstream { status, message },
            401 | 403 => RemoteError::Unauthorized(message),
            _ => RemoteError::InvalidRequest(format!("status {}: {}", status, message)),
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            RemoteError::Connection(_)
            | RemoteError::Timeout(_)
            | RemoteError::RateLimited(_)
            | RemoteError::Upstream { .. } => ErrorClass::Transient,
            RemoteError::Unauthorized(_)
            | RemoteError::InvalidRequest(_)
            | RemoteError::MalformedResponse(_) => ErrorClass::Permanent,
        }
    }

    pub fn is_transient(&self) -> bool {
        self.class() == ErrorClass::Transient
    }
}

/// One logical remote call: opaque payload plus optional instructions
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// System-level instructions, if any
    pub instructions: Option<String>,
    /// The opaque payload built from domain input
    pub payload: String,
    pub params: ModelParams,
}

impl CompletionRequest {
    pub fn new(payload: impl Into<String>, params: ModelParams) -> Self {
        Self {
            instructions: None,
            payload: payload.into(),
            params,
        }
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }
}

/// Token accounting reported by the endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Usage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

/// Successful completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    pub usage: Option<Usage>,
}

impl Completion {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            usage: None,
        }
    }

    pub fn with_usage(mut self, usage: Usage) -> Self {
        self.usage = Some(usage);
        self
    }
}

/// A remote completion endpoint
///
/// Implementations perform exactly one network call per invocation;
/// retries, caching and circuit breaking are layered on top by
/// [`ResilientClient`](crate::resilience::ResilientClient).
#[async_trait]
pub trait RemoteEndpoint: Send + Sync {
    async fn complete(
        &self,
        endpoint: &Endpoint,
        request: &CompletionRequest,
    ) -> Result<Completion, RemoteError>;
}
