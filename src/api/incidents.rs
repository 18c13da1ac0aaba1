use super::types::{
    Incident, IncidentDecision, IncidentStatus, NewIncident, Page, UpdateIncidentRequest,
    ValidateIncidentRequest,
};
use super::{ApiClient, file_part};
use crate::error::ApiResult;
use reqwest::Method;
use reqwest::multipart::Form;

pub(crate) trait IncidentsApi {
    async fn get_incidents(
        &self,
        page: u32,
        status: Option<IncidentStatus>,
    ) -> ApiResult<Page<Incident>>;
    async fn get_incident(&self, id: i64) -> ApiResult<Incident>;
    async fn create_incident(&self, req: &NewIncident) -> ApiResult<Incident>;
    async fn update_incident(&self, id: i64, req: &UpdateIncidentRequest) -> ApiResult<Incident>;
    async fn validate_incident(&self, id: i64, decision: IncidentDecision) -> ApiResult<Incident>;
    async fn delete_incident(&self, id: i64) -> ApiResult<()>;
    async fn get_incident_statistics(&self) -> ApiResult<serde_json::Value>;
}

impl IncidentsApi for ApiClient {
    async fn get_incidents(
        &self,
        page: u32,
        status: Option<IncidentStatus>,
    ) -> ApiResult<Page<Incident>> {
        let mut builder = self
            .request(Method::GET, "incidents")
            .query(&[("page", page.to_string())]);
        if let Some(status) = status {
            builder = builder.query(&[("status", status.as_str())]);
        }
        self.page(builder).await
    }

    async fn get_incident(&self, id: i64) -> ApiResult<Incident> {
        self.data(self.request(Method::GET, &format!("incidents/{id}")))
            .await
    }

    async fn create_incident(&self, req: &NewIncident) -> ApiResult<Incident> {
        let mut form = Form::new()
            .text("incident_type", req.incident_type.clone())
            .text("description", req.description.clone())
            .text("zone", req.zone.clone());
        if let Some(camera_id) = req.camera_id {
            form = form.text("camera_id", camera_id.to_string());
        }
        for path in &req.photos {
            form = form.part("photos[]", file_part(path).await?);
        }

        tracing::info!(kind = %req.incident_type, photos = req.photos.len(), "reporting incident");
        self.data(self.request(Method::POST, "incidents").multipart(form))
            .await
    }

    async fn update_incident(&self, id: i64, req: &UpdateIncidentRequest) -> ApiResult<Incident> {
        self.data(self.request(Method::PUT, &format!("incidents/{id}")).json(req))
            .await
    }

    async fn validate_incident(&self, id: i64, decision: IncidentDecision) -> ApiResult<Incident> {
        tracing::info!(id, ?decision, "reviewing incident");
        let body = ValidateIncidentRequest { status: decision };
        self.data(
            self.request(Method::POST, &format!("incidents/{id}/validate"))
                .json(&body),
        )
        .await
    }

    async fn delete_incident(&self, id: i64) -> ApiResult<()> {
        tracing::info!(id, "moving incident to trash");
        self.ack(self.request(Method::DELETE, &format!("incidents/{id}")))
            .await?;
        Ok(())
    }

    async fn get_incident_statistics(&self) -> ApiResult<serde_json::Value> {
        self.data(self.request(Method::GET, "incidents-statistics"))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock;
    use crate::error::ApiError;
    use assert_matches::assert_matches;
    use axum::extract::{Multipart, Path};
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{Value, json};

    fn incident_json(id: i64, status: &str) -> Value {
        json!({
            "id": id,
            "occurred_at": "2026-02-11T22:40:00Z",
            "incident_type": "Vol",
            "description": "Conteneur ouvert",
            "zone": "Zone B",
            "photos": [],
            "camera_id": null,
            "user_id": 3,
            "status": status
        })
    }

    #[tokio::test]
    async fn single_incident_carries_camera_and_reporter() {
        let router = Router::new().route(
            "/api/incidents/{id}",
            get(|Path(id): Path<i64>| async move {
                let mut inc = incident_json(id, "validated");
                inc["camera_id"] = json!(4);
                inc["camera"] = json!({
                    "id": 4,
                    "serial_number": "CAM-0004",
                    "ip_address": "10.0.3.4",
                    "zone": "Zone B",
                    "location": "Quai 1",
                    "status": "active"
                });
                inc["user"] = json!({
                    "id": 3,
                    "matricule": "7654321",
                    "name": "Youssef",
                    "role": "agent"
                });
                Json(json!({"success": true, "data": inc}))
            }),
        );
        let client = mock::serve(router).await;

        let incident = client.get_incident(8).await.unwrap();

        assert_eq!(incident.id, 8);
        assert_eq!(incident.status, IncidentStatus::Validated);
        assert_eq!(incident.camera.unwrap().serial_number, "CAM-0004");
        assert_eq!(incident.user.unwrap().name, "Youssef");
    }

    #[tokio::test]
    async fn unknown_incident_is_not_found() {
        let router = Router::new().route(
            "/api/incidents/{id}",
            get(|| async { (StatusCode::NOT_FOUND, Json(json!({"message": "Incident introuvable"}))) }),
        );
        let client = mock::serve(router).await;

        let err = client.get_incident(404).await.unwrap_err();
        assert_matches!(err, ApiError::NotFound(_));
    }

    #[tokio::test]
    async fn create_uploads_fields_and_photos_as_multipart() {
        let dir = tempfile::tempdir().unwrap();
        let photo = dir.path().join("quai.jpg");
        std::fs::write(&photo, b"\xff\xd8fake-jpeg").unwrap();

        let router = Router::new().route(
            "/api/incidents",
            post(|mut multipart: Multipart| async move {
                let mut names = Vec::new();
                while let Some(field) = multipart.next_field().await.unwrap() {
                    names.push(field.name().unwrap_or_default().to_string());
                }
                assert!(names.contains(&"photos[]".to_string()));
                assert!(names.contains(&"camera_id".to_string()));
                let mut inc = incident_json(41, "pending");
                inc["photos"] = json!(["incidents/quai.jpg"]);
                Json(json!({"success": true, "data": inc}))
            }),
        );
        let client = mock::serve(router).await;

        let incident = client
            .create_incident(&NewIncident {
                incident_type: "Vol".into(),
                description: "Conteneur ouvert".into(),
                zone: "Zone B".into(),
                camera_id: Some(4),
                photos: vec![photo],
            })
            .await
            .unwrap();

        assert_eq!(incident.id, 41);
        assert_eq!(incident.photos, vec!["incidents/quai.jpg".to_string()]);
    }

    #[tokio::test]
    async fn missing_photo_fails_before_sending() {
        let client = mock::unreachable();
        let err = client
            .create_incident(&NewIncident {
                incident_type: "Vol".into(),
                description: "x".into(),
                zone: "Zone B".into(),
                camera_id: None,
                photos: vec!["/definitely/not/here.jpg".into()],
            })
            .await
            .unwrap_err();
        assert_matches!(err, ApiError::Io(_));
    }

    #[tokio::test]
    async fn validate_posts_decision() {
        let router = Router::new().route(
            "/api/incidents/{id}/validate",
            post(|Path(id): Path<i64>, Json(body): Json<Value>| async move {
                let status = body["status"].as_str().unwrap_or_default().to_string();
                Json(json!({"success": true, "data": incident_json(id, &status)}))
            }),
        );
        let client = mock::serve(router).await;

        let inc = client
            .validate_incident(7, IncidentDecision::Rejected)
            .await
            .unwrap();
        assert_eq!(inc.status, IncidentStatus::Rejected);
    }

    #[tokio::test]
    async fn server_validation_message_is_kept() {
        let router = Router::new().route(
            "/api/incidents/{id}/validate",
            post(|| async {
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Json(json!({"success": false, "message": "Incident déjà traité"})),
                )
            }),
        );
        let client = mock::serve(router).await;
        let err = client
            .validate_incident(7, IncidentDecision::Validated)
            .await
            .unwrap_err();
        assert_eq!(err, ApiError::Validation("Incident déjà traité".into()));
    }
}
