//! Work log endpoints.

use wl_core::error::WlResult;
use wl_models::models::page::ListBody;
use wl_models::models::work_log::{WorkLog, WorkLogFilter, WorkLogInput};

use crate::client::ApiClient;

impl ApiClient {
    /// List work logs matching the filter. Returns the page and the server total.
    pub async fn list_work_logs(&self, filter: &WorkLogFilter) -> WlResult<(Vec<WorkLog>, u64)> {
        let body: ListBody<WorkLog> = self.get_json_query("/work-logs", filter).await?;
        let total = body.total();
        Ok((body.into_items(), total))
    }

    pub async fn get_work_log(&self, id: i64) -> WlResult<WorkLog> {
        self.get_json(&format!("/work-logs/{id}")).await
    }

    pub async fn create_work_log(&self, input: &WorkLogInput) -> WlResult<WorkLog> {
        self.post_json("/work-logs", input).await
    }

    pub async fn update_work_log(&self, id: i64, input: &WorkLogInput) -> WlResult<WorkLog> {
        self.put_json(&format!("/work-logs/{id}"), input).await
    }

    pub async fn delete_work_log(&self, id: i64) -> WlResult<()> {
        self.delete(&format!("/work-logs/{id}")).await
    }
}
