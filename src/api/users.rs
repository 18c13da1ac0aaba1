use super::types::{NewUser, Page, ResetPasswordRequest, UpdateUserRequest, User};
use super::{ApiClient, file_part};
use crate::error::ApiResult;
use reqwest::Method;
use reqwest::multipart::Form;

pub(crate) trait UsersApi {
    async fn get_users(&self, page: u32) -> ApiResult<Page<User>>;
    async fn create_user(&self, req: &NewUser) -> ApiResult<User>;
    async fn update_user(&self, id: i64, req: &UpdateUserRequest) -> ApiResult<User>;
    async fn delete_user(&self, id: i64) -> ApiResult<()>;
    async fn reset_password(&self, id: i64, password: &str) -> ApiResult<Option<String>>;
    async fn toggle_status(&self, id: i64) -> ApiResult<User>;
    async fn get_user_statistics(&self) -> ApiResult<serde_json::Value>;
}

impl UsersApi for ApiClient {
    async fn get_users(&self, page: u32) -> ApiResult<Page<User>> {
        self.page(
            self.request(Method::GET, "users")
                .query(&[("page", page.to_string())]),
        )
        .await
    }

    async fn create_user(&self, req: &NewUser) -> ApiResult<User> {
        let mut form = Form::new()
            .text("matricule", req.matricule.clone())
            .text("name", req.name.clone())
            .text("role", req.role.as_str())
            .text("password", req.password.clone())
            .text("password_confirmation", req.password.clone());
        if let Some(email) = &req.email {
            form = form.text("email", email.clone());
        }
        if let Some(phone) = &req.phone {
            form = form.text("phone", phone.clone());
        }
        if let Some(photo) = &req.photo {
            form = form.part("photo", file_part(photo).await?);
        }

        tracing::info!(matricule = %req.matricule, role = %req.role, "creating user");
        self.data(self.request(Method::POST, "users").multipart(form))
            .await
    }

    async fn update_user(&self, id: i64, req: &UpdateUserRequest) -> ApiResult<User> {
        self.data(self.request(Method::PUT, &format!("users/{id}")).json(req))
            .await
    }

    async fn delete_user(&self, id: i64) -> ApiResult<()> {
        tracing::info!(id, "moving user to trash");
        self.ack(self.request(Method::DELETE, &format!("users/{id}")))
            .await?;
        Ok(())
    }

    async fn reset_password(&self, id: i64, password: &str) -> ApiResult<Option<String>> {
        tracing::info!(id, "resetting password");
        let body = ResetPasswordRequest {
            password: password.to_string(),
        };
        self.ack(
            self.request(Method::POST, &format!("users/{id}/reset-password"))
                .json(&body),
        )
        .await
    }

    async fn toggle_status(&self, id: i64) -> ApiResult<User> {
        self.data(self.request(Method::POST, &format!("users/{id}/toggle-status")))
            .await
    }

    async fn get_user_statistics(&self) -> ApiResult<serde_json::Value> {
        self.data(self.request(Method::GET, "users-statistics"))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock;
    use crate::permissions::Role;
    use axum::extract::{Multipart, Path};
    use axum::http::HeaderMap;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::json;

    #[tokio::test]
    async fn toggle_status_carries_bearer_token() {
        let router = Router::new().route(
            "/api/users/{id}/toggle-status",
            post(|Path(id): Path<i64>, headers: HeaderMap| async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                assert_eq!(auth, "Bearer tok-1");
                Json(json!({"success": true, "data": {
                    "id": id, "matricule": "1234567", "name": "Salma",
                    "role": "agent", "email": null, "phone": null, "is_active": false
                }}))
            }),
        );
        let client = mock::serve(router).await;
        client.set_token(Some("tok-1".into()));

        let user = client.toggle_status(8).await.unwrap();
        assert!(!user.is_active);
        assert_eq!(user.role, Role::Agent);
    }

    #[tokio::test]
    async fn create_sends_password_confirmation() {
        let router = Router::new().route(
            "/api/users",
            post(|mut multipart: Multipart| async move {
                let mut confirmation = None;
                while let Some(field) = multipart.next_field().await.unwrap() {
                    if field.name() == Some("password_confirmation") {
                        confirmation = Some(field.text().await.unwrap());
                    }
                }
                assert_eq!(confirmation.as_deref(), Some("s3cretpass"));
                Json(json!({"success": true, "data": {
                    "id": 30, "matricule": "7654321", "name": "Youssef",
                    "role": "technicien", "email": "y@port.ma", "phone": null
                }}))
            }),
        );
        let client = mock::serve(router).await;

        let user = client
            .create_user(&NewUser {
                matricule: "7654321".into(),
                name: "Youssef".into(),
                role: Role::Technicien,
                email: Some("y@port.ma".into()),
                phone: None,
                password: "s3cretpass".into(),
                photo: None,
            })
            .await
            .unwrap();
        assert!(user.is_active);
        assert_eq!(user.role, Role::Technicien);
    }
}
