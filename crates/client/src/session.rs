//! Authentication session shared by every clone of the client
//!
//! The session owns the access token slot, broadcasts [`SessionEvent`]s to the
//! application shell, and makes sure concurrent authorization failures share a
//! single in-flight token refresh.

use crate::error::ClientError;
use crate::store::{MemoryTokenStore, TokenStore};
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::broadcast;

const EVENT_CHANNEL_CAPACITY: usize = 16;

type RefreshOutcome = Result<String, Arc<ClientError>>;
type InFlightRefresh = Shared<BoxFuture<'static, RefreshOutcome>>;

/// Session lifecycle notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Credentials were exchanged for an access token
    LoggedIn,
    /// The access token was replaced by a refresh
    TokenRefreshed,
    /// The user signed out
    LoggedOut,
    /// The refresh token was rejected; the user has to sign in again
    Unauthenticated,
}

/// Handle to an authentication session
#[derive(Clone)]
pub struct AuthSession {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    store: Arc<dyn TokenStore>,
    events: broadcast::Sender<SessionEvent>,
    in_flight: Mutex<Option<InFlightRefresh>>,
}

impl AuthSession {
    /// Create a session backed by `store`
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(SessionInner {
                store,
                events,
                in_flight: Mutex::new(None),
            }),
        }
    }

    /// Session with a process-local token slot
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryTokenStore::new()))
    }

    /// Current access token
    pub fn access_token(&self) -> Result<Option<String>, ClientError> {
        self.inner.store.load()
    }

    /// Whether an access token is stored
    pub fn is_authenticated(&self) -> bool {
        matches!(self.access_token(), Ok(Some(_)))
    }

    /// Store a token obtained from login
    pub fn sign_in(&self, token: &str) -> Result<(), ClientError> {
        self.inner.store.save(token)?;
        self.emit(SessionEvent::LoggedIn);
        Ok(())
    }

    /// Forget the access token after a logout
    pub fn sign_out(&self) -> Result<(), ClientError> {
        self.inner.store.clear()?;
        self.emit(SessionEvent::LoggedOut);
        Ok(())
    }

    /// Subscribe to session events
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is not an error
        let _ = self.inner.events.send(event);
    }

    /// Run `refresh` unless a refresh is already in flight, in which case
    /// await that one instead.
    ///
    /// On success the new token is stored and `TokenRefreshed` is emitted. On
    /// failure the token is cleared and `Unauthenticated` is emitted. Both
    /// happen once per refresh, however many callers are waiting on it.
    pub(crate) async fn refresh_with<F>(&self, refresh: F) -> Result<String, ClientError>
    where
        F: FnOnce() -> BoxFuture<'static, Result<String, ClientError>>,
    {
        let flight = {
            let mut slot = self
                .inner
                .in_flight
                .lock()
                .unwrap_or_else(PoisonError::into_inner);

            if let Some(flight) = slot.as_ref() {
                tracing::debug!("joining in-flight token refresh");
                flight.clone()
            } else {
                let flight = self.clone().run_refresh(refresh()).boxed().shared();
                *slot = Some(flight.clone());
                flight
            }
        };

        let outcome = flight.clone().await;

        {
            let mut slot = self
                .inner
                .in_flight
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if slot.as_ref().is_some_and(|current| current.ptr_eq(&flight)) {
                *slot = None;
            }
        }

        outcome.map_err(ClientError::RefreshFailed)
    }

    async fn run_refresh(
        self,
        refresh: BoxFuture<'static, Result<String, ClientError>>,
    ) -> RefreshOutcome {
        let stored = match refresh.await {
            Ok(token) => self.inner.store.save(&token).map(|()| token),
            Err(err) => Err(err),
        };

        match stored {
            Ok(token) => {
                tracing::info!("access token refreshed");
                self.emit(SessionEvent::TokenRefreshed);
                Ok(token)
            }
            Err(err) => {
                tracing::warn!(error = %err, "token refresh failed, clearing session");
                if let Err(clear_err) = self.inner.store.clear() {
                    tracing::error!(error = %clear_err, "failed to clear stored access token");
                }
                self.emit(SessionEvent::Unauthenticated);
                Err(Arc::new(err))
            }
        }
    }
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}
