pub mod auth;
pub mod cameras;
pub mod dashboard;
pub mod incidents;
pub mod persons;
pub mod reports;
pub mod trash;
pub mod types;
pub mod users;

use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use crate::session::SessionStorage;
use anyhow::{Context, Result};
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use std::sync::{Arc, RwLock};
use types::{Envelope, Page};

/// Thin wrapper over the backend REST API.
///
/// Clones share the bearer token slot, so a login performed through one clone
/// is seen by every background task holding another.
#[derive(Clone, Debug)]
pub struct ApiClient {
    pub(crate) client: Client,
    pub(crate) config: ApiConfig,
    token: Arc<RwLock<Option<String>>>,
    storage: Option<SessionStorage>,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            config,
            token: Arc::new(RwLock::new(None)),
            storage: None,
        })
    }

    /// Storage wiped whenever the backend answers 401.
    pub fn with_storage(mut self, storage: SessionStorage) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn set_token(&self, token: Option<String>) {
        *self
            .token
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = token;
    }

    /// A copy with its own token slot, unaffected by later `set_token` calls
    /// on `self`.
    pub fn detached(&self, token: Option<String>) -> Self {
        Self {
            client: self.client.clone(),
            config: self.config.clone(),
            token: Arc::new(RwLock::new(token)),
            storage: None,
        }
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.config.base_url, path.trim_start_matches('/'))
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, self.url(path))
            .header("Accept", "application/json");
        match self.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Drops the session for a 401, unless a newer login has already
    /// replaced the token the failed request carried.
    fn on_unauthorized(&self, sent_token: Option<&str>) {
        {
            let mut slot = self
                .token
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if slot.as_deref() != sent_token {
                tracing::debug!("ignoring 401 for a superseded token");
                return;
            }
            *slot = None;
        }
        tracing::warn!("backend answered 401, dropping session");
        if let Some(storage) = &self.storage {
            if let Err(e) = storage.clear() {
                tracing::error!(error = %e, "failed to clear persisted session");
            }
        }
    }

    async fn execute(&self, builder: RequestBuilder) -> ApiResult<reqwest::Response> {
        let (client, request) = builder.build_split();
        let request = request.map_err(|e| ApiError::Network(e.to_string()))?;
        let sent_token = request
            .headers()
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::to_string);

        let response = client.execute(request).await.map_err(|e| {
            tracing::warn!(error = %e, "request failed before a response arrived");
            ApiError::Network(e.to_string())
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        tracing::debug!(%status, body = %text, "non-success response");

        if status == reqwest::StatusCode::UNAUTHORIZED {
            self.on_unauthorized(sent_token.as_deref());
            return Err(ApiError::Unauthorized);
        }

        let message = serde_json::from_str::<Envelope<serde_json::Value>>(&text)
            .ok()
            .and_then(|env| env.message);
        Err(ApiError::from_status(status, message))
    }

    pub(crate) async fn envelope<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> ApiResult<Envelope<T>> {
        let response = self.execute(builder).await?;
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let envelope: Envelope<T> =
            serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))?;

        if !envelope.success {
            return Err(ApiError::Rejected(envelope.message.unwrap_or_default()));
        }
        Ok(envelope)
    }

    pub(crate) async fn data<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ApiResult<T> {
        self.envelope::<T>(builder)
            .await?
            .data
            .ok_or_else(|| ApiError::Decode("response carried no data".to_string()))
    }

    pub(crate) async fn page<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> ApiResult<Page<T>> {
        let envelope = self.envelope::<Vec<T>>(builder).await?;
        Ok(Page {
            items: envelope.data.unwrap_or_default(),
            pagination: envelope.pagination,
        })
    }

    /// For endpoints that only acknowledge; returns the server message.
    pub(crate) async fn ack(&self, builder: RequestBuilder) -> ApiResult<Option<String>> {
        Ok(self
            .envelope::<serde_json::Value>(builder)
            .await?
            .message)
    }

    pub(crate) async fn bytes(&self, builder: RequestBuilder) -> ApiResult<Vec<u8>> {
        let response = self.execute(builder).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

/// Reads a local file into a multipart part named after the file.
pub(crate) async fn file_part(path: &std::path::Path) -> ApiResult<reqwest::multipart::Part> {
    let bytes = tokio::fs::read(path).await?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    Ok(reqwest::multipart::Part::bytes(bytes).file_name(file_name))
}


#[cfg(test)]
mod tests {
    use super::mock;
    use super::types::Alert;
    use crate::error::ApiError;
    use crate::session::SessionStorage;
    use assert_matches::assert_matches;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use reqwest::Method;
    use serde_json::json;

    #[tokio::test]
    async fn unsuccessful_envelope_surfaces_server_message() {
        let router = Router::new().route(
            "/api/dashboard/alertes",
            get(|| async { Json(json!({"success": false, "message": "Service indisponible"})) }),
        );
        let client = mock::serve(router).await;
        let err = client
            .data::<Vec<Alert>>(client.request(Method::GET, "dashboard/alertes"))
            .await
            .unwrap_err();
        assert_eq!(err, ApiError::Rejected("Service indisponible".into()));
    }

    #[tokio::test]
    async fn unauthorized_clears_token_and_storage() {
        let dir = tempfile::tempdir().unwrap();
        let storage = SessionStorage::new(dir.path().join("session.json"));
        storage.set("token", "abc").unwrap();

        let router = Router::new().route(
            "/api/cameras",
            get(|| async { (StatusCode::UNAUTHORIZED, Json(json!({"message": "Unauthenticated."}))) }),
        );
        let client = mock::serve(router).await.with_storage(storage.clone());
        client.set_token(Some("abc".into()));

        let err = client
            .ack(client.request(Method::GET, "cameras"))
            .await
            .unwrap_err();

        assert_matches!(err, ApiError::Unauthorized);
        assert_eq!(client.token(), None);
        assert_eq!(storage.get("token").unwrap(), None);
    }

    #[tokio::test]
    async fn late_unauthorized_keeps_a_newer_token() {
        let dir = tempfile::tempdir().unwrap();
        let storage = SessionStorage::new(dir.path().join("session.json"));
        let router = Router::new().route(
            "/api/cameras",
            get(|| async {
                tokio::time::sleep(std::time::Duration::from_millis(100)).await;
                (StatusCode::UNAUTHORIZED, Json(json!({"message": "Unauthenticated."})))
            }),
        );
        let client = mock::serve(router).await.with_storage(storage.clone());
        client.set_token(Some("old".into()));

        let pending = {
            let client = client.clone();
            tokio::spawn(async move { client.ack(client.request(Method::GET, "cameras")).await })
        };
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        client.set_token(Some("new".into()));
        storage.set("token", "new").unwrap();

        let err = pending.await.unwrap().unwrap_err();
        assert_matches!(err, ApiError::Unauthorized);
        assert_eq!(client.token().as_deref(), Some("new"));
        assert_eq!(storage.get("token").unwrap().as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn transport_failure_is_a_network_error() {
        let client = mock::unreachable();
        let err = client
            .ack(client.request(Method::GET, "dashboard"))
            .await
            .unwrap_err();
        assert_matches!(err, ApiError::Network(_));
    }

    #[tokio::test]
    async fn detached_clone_keeps_its_own_token() {
        let client = mock::unreachable();
        client.set_token(Some("first".into()));
        let detached = client.detached(client.token());
        client.set_token(None);
        assert_eq!(detached.token().as_deref(), Some("first"));
    }
}
