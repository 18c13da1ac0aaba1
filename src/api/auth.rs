use super::ApiClient;
use super::types::{AuthPayload, LoginRequest, User};
use crate::error::ApiResult;
use reqwest::Method;

pub(crate) trait AuthApi {
    async fn login(&self, req: &LoginRequest) -> ApiResult<AuthPayload>;
    async fn logout(&self) -> ApiResult<()>;
    async fn me(&self) -> ApiResult<User>;
}

impl AuthApi for ApiClient {
    async fn login(&self, req: &LoginRequest) -> ApiResult<AuthPayload> {
        tracing::info!(matricule = %req.matricule, "signing in");
        self.data(self.request(Method::POST, "login").json(req)).await
    }

    async fn logout(&self) -> ApiResult<()> {
        self.ack(self.request(Method::POST, "logout")).await?;
        Ok(())
    }

    async fn me(&self) -> ApiResult<User> {
        self.data(self.request(Method::GET, "me")).await
    }
}
