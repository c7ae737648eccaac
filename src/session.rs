use crate::config::IdentityTable;
use crate::errors::TrackerError;
use crate::models::{Identity, Session};
use crate::remote::Backend;
use std::sync::Arc;
use tracing::{info, warn};

const LOGIN_FAILED: &str = "Login failed. Please check your credentials.";
const FALLBACK_FRIEND: &str = "Friend";

pub struct SessionController {
    backend: Arc<dyn Backend>,
    identities: IdentityTable,
}

impl SessionController {
    pub fn new(backend: Arc<dyn Backend>, identities: IdentityTable) -> Self {
        Self { backend, identities }
    }

    /// Exchanges a login token for a backend session. Unknown tokens never reach the backend.
    pub async fn login(&self, token: &str) -> Result<Session, TrackerError> {
        let credential = self
            .identities
            .resolve(token)
            .ok_or(TrackerError::InvalidCredentials)?;

        self.backend
            .create_session(&credential.email, self.identities.password())
            .await
            .map_err(|err| auth_error(err.to_string()))?;

        let identity = self
            .backend
            .current_identity()
            .await
            .map_err(|err| auth_error(err.to_string()))?
            .ok_or_else(|| auth_error(String::new()))?;

        info!(user = %identity.id, "logged in");
        Ok(self.session_for(identity))
    }

    /// Remote failures are logged only; the caller always clears local state.
    pub async fn logout(&self) {
        match self.backend.delete_session().await {
            Ok(()) => info!("logged out"),
            Err(err) => warn!("logout error: {err}"),
        }
    }

    pub async fn current_session(&self) -> Option<Session> {
        match self.backend.current_identity().await {
            Ok(identity) => identity.map(|identity| self.session_for(identity)),
            Err(err) => {
                warn!("session check failed: {err}");
                None
            }
        }
    }

    fn session_for(&self, identity: Identity) -> Session {
        let friend_name = self
            .identities
            .friend_of(&identity.email)
            .unwrap_or(FALLBACK_FRIEND)
            .to_string();
        Session {
            identity,
            friend_name,
        }
    }
}

fn auth_error(message: String) -> TrackerError {
    if message.trim().is_empty() {
        TrackerError::Auth(LOGIN_FAILED.to_string())
    } else {
        TrackerError::Auth(message)
    }
}
