//! Authenticated user/token pair and the login/logout lifecycle.
//!
//! The session is either unauthenticated or authenticated; there is no
//! intermediate state and no token refresh. Memory and the persisted storage
//! are always updated together.

mod storage;

pub use storage::{SessionStorage, StorageError, TOKEN_KEY, USER_KEY};

use crate::api::ApiClient;
use crate::api::auth::AuthApi;
use crate::api::types::{AuthPayload, User};
use crate::error::ApiError;
use crate::permissions::{self, Action, Role};
use crate::validation::{self, FieldErrors};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LoginError {
    /// Rejected locally; nothing was sent.
    #[error("invalid login form")]
    Form(FieldErrors),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("unauthorized")]
    Unauthorized,

    #[error("no response: {0}")]
    NoResponse(String),

    #[error("{0}")]
    Other(String),
}

impl LoginError {
    pub fn user_message(&self) -> String {
        match self {
            Self::Form(errors) => errors.first().unwrap_or(validation::MSG_REQUIRED).to_string(),
            Self::InvalidCredentials => "Matricule ou mot de passe incorrect".to_string(),
            Self::Unauthorized => "Accès non autorisé".to_string(),
            Self::NoResponse(_) => {
                "Aucune réponse du serveur, vérifiez votre connexion".to_string()
            }
            Self::Other(msg) if !msg.is_empty() => msg.clone(),
            Self::Other(_) => "Erreur de connexion".to_string(),
        }
    }
}

impl From<ApiError> for LoginError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Validation(_) => Self::InvalidCredentials,
            ApiError::Unauthorized => Self::Unauthorized,
            ApiError::Network(msg) => Self::NoResponse(msg),
            ApiError::Rejected(msg) => Self::Other(msg),
            other => Self::Other(other.user_message()),
        }
    }
}

/// Checks the form, then posts the credentials. Returns the pair to hand to
/// [`Session::establish`].
pub async fn login(
    client: &ApiClient,
    identifier: &str,
    secret: &str,
) -> Result<AuthPayload, LoginError> {
    let req = validation::validate_login(identifier, secret).map_err(LoginError::Form)?;
    client.login(&req).await.map_err(|e| {
        tracing::warn!(error = %e, "login failed");
        LoginError::from(e)
    })
}

#[derive(Debug)]
pub struct Session {
    storage: SessionStorage,
    user: Option<User>,
    token: Option<String>,
}

impl Session {
    pub fn new(storage: SessionStorage) -> Self {
        Self {
            storage,
            user: None,
            token: None,
        }
    }

    /// Restores a persisted session, or wipes storage if what is there is
    /// incomplete or carries a role outside the known set.
    pub fn initialize(storage: SessionStorage, client: &ApiClient) -> Self {
        let mut session = Self::new(storage);

        match session.read_persisted() {
            Ok(Some((user, token))) => {
                tracing::info!(matricule = %user.matricule, role = %user.role, "session restored");
                client.set_token(Some(token.clone()));
                session.user = Some(user);
                session.token = Some(token);
            }
            Ok(None) => {
                if let Err(e) = session.storage.clear() {
                    tracing::error!(error = %e, "failed to clear session storage");
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "persisted session unreadable, discarding");
                if let Err(e) = session.storage.clear() {
                    tracing::error!(error = %e, "failed to clear session storage");
                }
            }
        }
        session
    }

    fn read_persisted(&self) -> Result<Option<(User, String)>, StorageError> {
        let token = self.storage.get(TOKEN_KEY)?;
        let raw_user = self.storage.get(USER_KEY)?;
        let (Some(token), Some(raw_user)) = (token, raw_user) else {
            return Ok(None);
        };
        if token.trim().is_empty() {
            return Ok(None);
        }
        match serde_json::from_str::<User>(&raw_user) {
            Ok(user) => Ok(Some((user, token))),
            Err(e) => {
                tracing::warn!(error = %e, "stored user rejected");
                Ok(None)
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.token.is_some()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|u| u.role)
    }

    pub fn has_role(&self, allowed: &[Role]) -> bool {
        self.role().is_some_and(|r| permissions::has_role(r, allowed))
    }

    pub fn can(&self, action: Action) -> bool {
        self.role().is_some_and(|r| permissions::can(r, action))
    }

    /// Stores a successful login in memory first, then on disk. A disk
    /// failure leaves the in-memory session usable.
    pub fn establish(&mut self, client: &ApiClient, payload: AuthPayload) -> Result<(), StorageError> {
        tracing::info!(matricule = %payload.user.matricule, role = %payload.user.role, "signed in");
        client.set_token(Some(payload.token.clone()));
        self.token = Some(payload.token);
        self.user = Some(payload.user);
        self.persist()
    }

    /// Replaces the cached user with a fresh copy from `me`.
    pub fn refresh_user(&mut self, user: User) -> Result<(), StorageError> {
        if !self.is_authenticated() {
            return Ok(());
        }
        self.user = Some(user);
        self.persist()
    }

    fn persist(&self) -> Result<(), StorageError> {
        if let (Some(user), Some(token)) = (&self.user, &self.token) {
            let raw = serde_json::to_string(user).map_err(|source| StorageError::Corrupt {
                path: self.storage.path().to_path_buf(),
                source,
            })?;
            self.storage.set(TOKEN_KEY, token)?;
            self.storage.set(USER_KEY, &raw)?;
        }
        Ok(())
    }

    /// Tells the backend (best effort, in the background) and clears the
    /// local session regardless of how that goes. Needs a tokio runtime.
    pub fn logout(&mut self, client: &ApiClient) {
        if let Some(token) = self.token.clone() {
            let notifier = client.detached(Some(token));
            tokio::spawn(async move {
                if let Err(e) = notifier.logout().await {
                    tracing::warn!(error = %e, "logout notification failed");
                }
            });
        }
        tracing::info!("signed out");
        self.expire(client);
    }

    /// Drops the session locally without telling the backend.
    pub fn expire(&mut self, client: &ApiClient) {
        self.user = None;
        self.token = None;
        client.set_token(None);
        if let Err(e) = self.storage.clear() {
            tracing::error!(error = %e, "failed to clear session storage");
        }
    }
}

/// `GET me`: asks the backend who the token belongs to.
pub async fn check_auth(client: &ApiClient) -> Result<User, ApiError> {
    client.me().await
}
