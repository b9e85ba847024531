//! Operations on the `/tasks` resource.

use taskdeck_core::models::task::{CreateTask, Task, TaskFilters, TaskMove, UpdateTask};
use taskdeck_core::types::DbId;

use crate::client::ApiClient;
use crate::error::ApiResult;
use crate::request::ApiRequest;

/// Provides CRUD operations for tasks.
pub struct TasksApi;

impl TasksApi {
    /// GET /tasks
    ///
    /// Only the filters that are set are sent as query parameters; the
    /// server evaluates them. Empty filters list every visible task.
    pub async fn list(client: &ApiClient, filters: &TaskFilters) -> ApiResult<Vec<Task>> {
        client
            .send(ApiRequest::get("/tasks").query(filters.query_pairs()))
            .await
    }

    /// GET /tasks/{id}
    pub async fn get(client: &ApiClient, id: DbId) -> ApiResult<Task> {
        client.send(ApiRequest::get(format!("/tasks/{id}"))).await
    }

    /// POST /tasks/
    pub async fn create(client: &ApiClient, input: &CreateTask) -> ApiResult<Task> {
        client.send(ApiRequest::post("/tasks/").json(input)?).await
    }

    /// PATCH /tasks/{id}
    pub async fn update(client: &ApiClient, id: DbId, input: &UpdateTask) -> ApiResult<Task> {
        client
            .send(ApiRequest::patch(format!("/tasks/{id}")).json(input)?)
            .await
    }

    /// DELETE /tasks/{id}
    pub async fn delete(client: &ApiClient, id: DbId) -> ApiResult<()> {
        client
            .send_empty(ApiRequest::delete(format!("/tasks/{id}")))
            .await
    }

    /// PUT /tasks/{id}/move
    ///
    /// Places the task in `target.column_id` at `target.position`.
    pub async fn move_task(client: &ApiClient, id: DbId, target: TaskMove) -> ApiResult<Task> {
        client
            .send(ApiRequest::put(format!("/tasks/{id}/move")).json(&target)?)
            .await
    }
}
