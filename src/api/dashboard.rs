use super::ApiClient;
use super::types::{Alert, DashboardStats};
use crate::error::ApiResult;
use reqwest::Method;

pub(crate) trait DashboardApi {
    async fn get_dashboard(&self) -> ApiResult<DashboardStats>;
    async fn get_alerts(&self) -> ApiResult<Vec<Alert>>;
}

impl DashboardApi for ApiClient {
    async fn get_dashboard(&self) -> ApiResult<DashboardStats> {
        self.data(self.request(Method::GET, "dashboard")).await
    }

    async fn get_alerts(&self) -> ApiResult<Vec<Alert>> {
        Ok(self
            .page(self.request(Method::GET, "dashboard/alertes"))
            .await?
            .items)
    }
}
