//! Operations on the `/projects` resource.

use taskdeck_core::models::project::{CreateProject, Project, UpdateProject};
use taskdeck_core::types::DbId;

use crate::client::ApiClient;
use crate::error::ApiResult;
use crate::request::ApiRequest;

/// Provides CRUD operations for projects.
pub struct ProjectsApi;

impl ProjectsApi {
    /// GET /projects
    pub async fn list(client: &ApiClient) -> ApiResult<Vec<Project>> {
        client.send(ApiRequest::get("/projects")).await
    }

    /// GET /projects/{id}
    pub async fn get(client: &ApiClient, id: DbId) -> ApiResult<Project> {
        client.send(ApiRequest::get(format!("/projects/{id}"))).await
    }

    /// POST /projects
    ///
    /// A `key` already used by another project is rejected by the server
    /// with [`ApiError::Validation`](crate::ApiError::Validation).
    pub async fn create(client: &ApiClient, input: &CreateProject) -> ApiResult<Project> {
        client.send(ApiRequest::post("/projects").json(input)?).await
    }

    /// PUT /projects/{id}
    pub async fn update(client: &ApiClient, id: DbId, input: &UpdateProject) -> ApiResult<Project> {
        client
            .send(ApiRequest::put(format!("/projects/{id}")).json(input)?)
            .await
    }

    /// DELETE /projects/{id}
    pub async fn delete(client: &ApiClient, id: DbId) -> ApiResult<()> {
        client
            .send_empty(ApiRequest::delete(format!("/projects/{id}")))
            .await
    }
}
