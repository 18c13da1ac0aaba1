use super::ApiClient;
use super::types::{Camera, CameraRequest, CameraStatus, Page};
use crate::error::ApiResult;
use reqwest::Method;

pub(crate) trait CamerasApi {
    async fn get_cameras(&self, page: u32, status: Option<CameraStatus>) -> ApiResult<Page<Camera>>;
    async fn get_camera(&self, id: i64) -> ApiResult<Camera>;
    async fn create_camera(&self, req: &CameraRequest) -> ApiResult<Camera>;
    async fn update_camera(&self, id: i64, req: &CameraRequest) -> ApiResult<Camera>;
    async fn delete_camera(&self, id: i64) -> ApiResult<()>;
    async fn get_camera_statistics(&self) -> ApiResult<serde_json::Value>;
}

impl CamerasApi for ApiClient {
    async fn get_cameras(&self, page: u32, status: Option<CameraStatus>) -> ApiResult<Page<Camera>> {
        let mut builder = self
            .request(Method::GET, "cameras")
            .query(&[("page", page.to_string())]);
        if let Some(status) = status {
            builder = builder.query(&[("status", status.as_str())]);
        }
        self.page(builder).await
    }

    async fn get_camera(&self, id: i64) -> ApiResult<Camera> {
        self.data(self.request(Method::GET, &format!("cameras/{id}")))
            .await
    }

    async fn create_camera(&self, req: &CameraRequest) -> ApiResult<Camera> {
        tracing::info!(serial = %req.serial_number, "creating camera");
        self.data(self.request(Method::POST, "cameras").json(req))
            .await
    }

    async fn update_camera(&self, id: i64, req: &CameraRequest) -> ApiResult<Camera> {
        tracing::info!(id, "updating camera");
        self.data(self.request(Method::PUT, &format!("cameras/{id}")).json(req))
            .await
    }

    async fn delete_camera(&self, id: i64) -> ApiResult<()> {
        tracing::info!(id, "moving camera to trash");
        self.ack(self.request(Method::DELETE, &format!("cameras/{id}")))
            .await?;
        Ok(())
    }

    async fn get_camera_statistics(&self) -> ApiResult<serde_json::Value> {
        self.data(self.request(Method::GET, "cameras-statistics"))
            .await
    }
}
