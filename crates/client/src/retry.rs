//! Retry bookkeeping for the 401 → refresh → retry flow

use crate::error::ClientError;
use crate::request::{ApiResponse, RequestDescriptor};
use reqwest::StatusCode;
use std::sync::Arc;

/// How many times a request may be replayed after a token refresh
pub const MAX_AUTH_RETRIES: u8 = 1;

/// Immutable per-attempt state of a logical request
#[derive(Debug, Clone)]
pub struct RequestContext {
    descriptor: Arc<RequestDescriptor>,
    retry_count: u8,
    token: Option<String>,
}

impl RequestContext {
    /// First attempt, sent with `token` (if any)
    pub fn new(descriptor: RequestDescriptor, token: Option<String>) -> Self {
        Self {
            descriptor: Arc::new(descriptor),
            retry_count: 0,
            token,
        }
    }

    /// Next attempt of the same request, sent with a fresh token
    #[must_use]
    pub fn retried(&self, token: Option<String>) -> Self {
        Self {
            descriptor: Arc::clone(&self.descriptor),
            retry_count: self.retry_count.saturating_add(1),
            token,
        }
    }

    pub fn descriptor(&self) -> &RequestDescriptor {
        &self.descriptor
    }

    pub const fn retry_count(&self) -> u8 {
        self.retry_count
    }

    /// Access token this attempt was sent with
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

/// What to do with the outcome of an attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Hand the outcome to the caller as is
    Complete,
    /// Refresh the access token and replay the request once
    RefreshAndRetry,
}

/// Decide whether an attempt's outcome warrants a refresh and replay.
///
/// Only a definite 401 on a request that has not been replayed yet qualifies.
/// Network errors carry no status and always complete.
pub fn decide(ctx: &RequestContext, outcome: &Result<ApiResponse, ClientError>) -> RetryDecision {
    match outcome {
        Err(err)
            if err.status() == Some(StatusCode::UNAUTHORIZED)
                && ctx.retry_count() < MAX_AUTH_RETRIES
                && ctx.descriptor().refresh_on_unauthorized() =>
        {
            RetryDecision::RefreshAndRetry
        }
        _ => RetryDecision::Complete,
    }
}
