//! Authenticated Assetdesk API client

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::request::{ApiResponse, RequestDescriptor};
use crate::retry::{self, RequestContext, RetryDecision};
use crate::session::AuthSession;
use crate::types::{ApiEnvelope, TokenData};
use futures::FutureExt;
use futures::future::BoxFuture;
use reqwest::header::{self, HeaderValue};
use reqwest::{Client, ClientBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Assetdesk API client
///
/// Attaches the session's access token to every request and, when a request
/// is rejected with 401, refreshes the token once through the refresh cookie
/// and replays the request. Clones share the session and the cookie jar.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    refresh_path: String,
    session: AuthSession,
}

impl ApiClient {
    /// Create a new client with default configuration and an in-memory session
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::builder().base_url(base_url).build()
    }

    /// Create a new client builder
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Session holding the access token
    pub const fn session(&self) -> &AuthSession {
        &self.session
    }

    /// Send a request, refreshing the access token once on 401
    pub async fn request(&self, descriptor: RequestDescriptor) -> Result<ApiResponse, ClientError> {
        let mut ctx = RequestContext::new(descriptor, self.session.access_token()?);

        loop {
            let outcome = self.dispatch(&ctx).await;

            match retry::decide(&ctx, &outcome) {
                RetryDecision::Complete => return outcome,
                RetryDecision::RefreshAndRetry => match self.recover_token(&ctx).await? {
                    Some(token) => ctx = ctx.retried(Some(token)),
                    None => return outcome,
                },
            }
        }
    }

    /// Send a request and decode the JSON body
    pub async fn execute<T: DeserializeOwned>(
        &self,
        descriptor: RequestDescriptor,
    ) -> Result<T, ClientError> {
        self.request(descriptor).await?.json()
    }

    pub async fn get(&self, path: &str) -> Result<ApiResponse, ClientError> {
        self.request(RequestDescriptor::get(path)).await
    }

    pub async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ApiResponse, ClientError> {
        self.request(RequestDescriptor::post(path).json(body)?).await
    }

    pub async fn put<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ApiResponse, ClientError> {
        self.request(RequestDescriptor::put(path).json(body)?).await
    }

    pub async fn patch<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ApiResponse, ClientError> {
        self.request(RequestDescriptor::patch(path).json(body)?).await
    }

    pub async fn delete(&self, path: &str) -> Result<ApiResponse, ClientError> {
        self.request(RequestDescriptor::delete(path)).await
    }

    /// Exchange the refresh cookie for a new access token
    pub async fn refresh_token(&self) -> Result<String, ClientError> {
        self.session.refresh_with(|| self.refresh_call()).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn dispatch(&self, ctx: &RequestContext) -> Result<ApiResponse, ClientError> {
        let descriptor = ctx.descriptor();

        let mut headers = descriptor.headers().clone();
        if let Some(token) = ctx.token() {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))?;
            value.set_sensitive(true);
            headers.insert(header::AUTHORIZATION, value);
        }

        let mut request = self
            .client
            .request(descriptor.method().clone(), self.url(descriptor.path()))
            .headers(headers);

        if !descriptor.query_params().is_empty() {
            request = request.query(descriptor.query_params());
        }
        if let Some(body) = descriptor.body() {
            request = request.json(body);
        }

        debug!(
            method = %descriptor.method(),
            path = descriptor.path(),
            attempt = ctx.retry_count(),
            authenticated = ctx.token().is_some(),
            "sending request"
        );

        let response = request.send().await?;
        ApiResponse::from_response(response).await
    }

    /// Token to replay `ctx` with, or `None` when the original 401 should stand.
    async fn recover_token(&self, ctx: &RequestContext) -> Result<Option<String>, ClientError> {
        match (self.session.access_token()?, ctx.token()) {
            // Another request refreshed (or a login happened) after this one was sent
            (Some(current), sent) if sent != Some(current.as_str()) => {
                debug!("access token changed while request was in flight, replaying");
                Ok(Some(current))
            }
            // The session was invalidated after this one was sent
            (None, Some(_)) => Ok(None),
            _ => self.refresh_token().await.map(Some),
        }
    }

    fn refresh_call(&self) -> BoxFuture<'static, Result<String, ClientError>> {
        let client = self.client.clone();
        let url = self.url(&self.refresh_path);

        async move {
            debug!("requesting new access token");
            let response = ApiResponse::from_response(client.get(url).send().await?).await?;
            let envelope: ApiEnvelope<Option<TokenData>> = response.json()?;

            envelope
                .data
                .and_then(|data| data.access_token)
                .filter(|token| !token.is_empty())
                .ok_or_else(|| {
                    ClientError::InvalidRefreshResponse("response carried no access token".into())
                })
        }
        .boxed()
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

/// Builder for [`ApiClient`]
#[derive(Default)]
pub struct ApiClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    refresh_path: Option<String>,
    session: Option<AuthSession>,
}

impl ApiClientBuilder {
    /// Start from a loaded configuration
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::default()
            .base_url(config.base_url.clone())
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .refresh_path(config.refresh_path.clone())
    }

    /// Set the base URL
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Set the refresh endpoint path
    #[must_use]
    pub fn refresh_path(mut self, path: impl Into<String>) -> Self {
        self.refresh_path = Some(path.into());
        self
    }

    /// Use an existing session instead of a fresh in-memory one
    #[must_use]
    pub fn session(mut self, session: AuthSession) -> Self {
        self.session = Some(session);
        self
    }

    /// Build the client
    pub fn build(self) -> Result<ApiClient, ClientError> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::Configuration("base_url is required".into()))?;

        // Ensure base_url ends without a trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();

        let refresh_path = self
            .refresh_path
            .unwrap_or_else(|| ClientConfig::default().refresh_path);
        if !refresh_path.starts_with('/') {
            return Err(ClientError::Configuration(format!(
                "refresh_path must start with '/': {refresh_path}"
            )));
        }

        // The refresh token lives in a server-set cookie
        let mut client_builder = ClientBuilder::new().cookie_store(true);

        if let Some(timeout) = self.timeout {
            client_builder = client_builder.timeout(timeout);
        }

        if let Some(user_agent) = self.user_agent {
            client_builder = client_builder.user_agent(user_agent);
        } else {
            client_builder = client_builder.user_agent(ClientConfig::default().user_agent);
        }

        let client = client_builder.build()?;

        Ok(ApiClient {
            client,
            base_url,
            refresh_path,
            session: self.session.unwrap_or_else(AuthSession::in_memory),
        })
    }
}
