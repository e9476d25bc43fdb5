//! Authentication API client methods

use crate::client::ApiClient;
use crate::error::ClientError;
use crate::request::RequestDescriptor;
use crate::types::{ApiEnvelope, LoginData, LoginRequest, UserProfile};
use tracing::{info, warn};

impl ApiClient {
    /// Exchange credentials for an access token and store it in the session
    pub async fn login(&self, credentials: &LoginRequest) -> Result<UserProfile, ClientError> {
        // A 401 here means bad credentials, not an expired token
        let request = RequestDescriptor::post("/auth/login")
            .json(credentials)?
            .without_refresh();
        let envelope: ApiEnvelope<LoginData> = self.execute(request).await?;

        self.session().sign_in(&envelope.data.access_token)?;
        info!(user_id = %envelope.data.user.id, "signed in");
        Ok(envelope.data.user)
    }

    /// Get the current user's profile
    pub async fn me(&self) -> Result<UserProfile, ClientError> {
        let envelope: ApiEnvelope<UserProfile> =
            self.execute(RequestDescriptor::get("/auth/me")).await?;
        Ok(envelope.data)
    }

    /// Invalidate the server session and forget the local token.
    ///
    /// The local token is cleared even when the server call fails. An expired
    /// token is not refreshed just to be thrown away.
    pub async fn logout(&self) -> Result<(), ClientError> {
        let result = self
            .request(RequestDescriptor::delete("/auth/logout").without_refresh())
            .await;

        self.session().sign_out()?;

        match result {
            Ok(_) => Ok(()),
            Err(e) => {
                warn!(error = %e, "server logout failed, local session cleared anyway");
                Err(e)
            }
        }
    }
}
