use reqwest::StatusCode;

/// Failure of a call against the backend, already classified for display.
///
/// The variants carry plain strings so events holding them stay `Clone` and
/// can cross the task boundary back to the UI loop.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    #[error("unauthorized")]
    Unauthorized,

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("validation rejected: {0}")]
    Validation(String),

    #[error("server error {status}: {message}")]
    Server { status: u16, message: String },

    #[error("request rejected: {0}")]
    Rejected(String),

    #[error("no response from server: {0}")]
    Network(String),

    #[error("unexpected payload: {0}")]
    Decode(String),

    #[error("local I/O failure: {0}")]
    Io(String),
}

impl ApiError {
    /// Maps a non-success status plus the server-supplied message (if any).
    pub fn from_status(status: StatusCode, message: Option<String>) -> Self {
        let message = message.unwrap_or_default();
        match status {
            StatusCode::UNAUTHORIZED => Self::Unauthorized,
            StatusCode::FORBIDDEN => Self::Forbidden(message),
            StatusCode::NOT_FOUND => Self::NotFound(message),
            StatusCode::UNPROCESSABLE_ENTITY => Self::Validation(message),
            _ => Self::Server {
                status: status.as_u16(),
                message,
            },
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// French message shown in the status bar.
    pub fn user_message(&self) -> String {
        match self {
            Self::Unauthorized => "Session expirée, veuillez vous reconnecter".to_string(),
            Self::Forbidden(_) => "Action non autorisée pour votre rôle".to_string(),
            Self::NotFound(_) => "Élément introuvable".to_string(),
            Self::Validation(msg) | Self::Rejected(msg) if !msg.is_empty() => msg.clone(),
            Self::Validation(_) => "Données invalides".to_string(),
            Self::Rejected(_) => "La requête a été refusée".to_string(),
            Self::Network(_) => "Impossible de joindre le serveur".to_string(),
            Self::Server { .. } | Self::Decode(_) => "Une erreur est survenue".to_string(),
            Self::Io(msg) => format!("Erreur locale: {msg}"),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            Self::from_status(status, None)
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn status_classification() {
        assert_eq!(
            ApiError::from_status(StatusCode::UNAUTHORIZED, Some("x".into())),
            ApiError::Unauthorized
        );
        assert_matches!(
            ApiError::from_status(StatusCode::UNPROCESSABLE_ENTITY, Some("bad".into())),
            ApiError::Validation(m) if m == "bad"
        );
        assert_matches!(
            ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, None),
            ApiError::Server { status: 500, .. }
        );
    }

    #[test]
    fn server_message_wins_for_validation() {
        let err = ApiError::Validation("Le numéro de série existe déjà".into());
        assert_eq!(err.user_message(), "Le numéro de série existe déjà");
        assert_eq!(ApiError::Validation(String::new()).user_message(), "Données invalides");
    }
}
