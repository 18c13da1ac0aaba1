use super::ApiClient;
use super::types::{TrashItem, TrashKind};
use crate::error::ApiResult;
use reqwest::Method;

pub(crate) trait TrashApi {
    async fn get_trash(&self) -> ApiResult<Vec<TrashItem>>;
    async fn restore(&self, kind: TrashKind, id: i64) -> ApiResult<()>;
    async fn delete_permanently(&self, kind: TrashKind, id: i64) -> ApiResult<()>;
    async fn empty_trash(&self) -> ApiResult<()>;
}

impl TrashApi for ApiClient {
    async fn get_trash(&self) -> ApiResult<Vec<TrashItem>> {
        Ok(self.page(self.request(Method::GET, "trash")).await?.items)
    }

    async fn restore(&self, kind: TrashKind, id: i64) -> ApiResult<()> {
        tracing::info!(kind = kind.as_path(), id, "restoring from trash");
        self.ack(self.request(
            Method::POST,
            &format!("trash/{}/{id}/restore", kind.as_path()),
        ))
        .await?;
        Ok(())
    }

    async fn delete_permanently(&self, kind: TrashKind, id: i64) -> ApiResult<()> {
        tracing::warn!(kind = kind.as_path(), id, "purging from trash");
        self.ack(self.request(
            Method::DELETE,
            &format!("trash/{}/{id}/permanent", kind.as_path()),
        ))
        .await?;
        Ok(())
    }

    async fn empty_trash(&self) -> ApiResult<()> {
        tracing::warn!("emptying trash");
        self.ack(self.request(Method::DELETE, "trash/empty")).await?;
        Ok(())
    }
}
