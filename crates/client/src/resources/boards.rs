//! Operations on the `/boards` resource and its columns.

use taskdeck_core::models::board::{
    Board, BoardWithColumns, Column, CreateBoard, CreateColumn, UpdateBoard, UpdateColumn,
};
use taskdeck_core::types::DbId;

use crate::client::ApiClient;
use crate::error::ApiResult;
use crate::request::ApiRequest;

/// Provides CRUD operations for boards and board columns.
pub struct BoardsApi;

impl BoardsApi {
    /// GET /boards/project/{project_id}
    pub async fn list_for_project(client: &ApiClient, project_id: DbId) -> ApiResult<Vec<Board>> {
        client
            .send(ApiRequest::get(format!("/boards/project/{project_id}")))
            .await
    }

    /// GET /boards/{id}
    ///
    /// Returns the board together with its columns.
    pub async fn get(client: &ApiClient, id: DbId) -> ApiResult<BoardWithColumns> {
        client.send(ApiRequest::get(format!("/boards/{id}"))).await
    }

    /// POST /boards/
    pub async fn create(client: &ApiClient, input: &CreateBoard) -> ApiResult<Board> {
        client.send(ApiRequest::post("/boards/").json(input)?).await
    }

    /// PATCH /boards/{id}
    pub async fn update(client: &ApiClient, id: DbId, input: &UpdateBoard) -> ApiResult<Board> {
        client
            .send(ApiRequest::patch(format!("/boards/{id}")).json(input)?)
            .await
    }

    /// DELETE /boards/{id}
    pub async fn delete(client: &ApiClient, id: DbId) -> ApiResult<()> {
        client
            .send_empty(ApiRequest::delete(format!("/boards/{id}")))
            .await
    }

    /// POST /boards/columns
    pub async fn create_column(client: &ApiClient, input: &CreateColumn) -> ApiResult<Column> {
        client
            .send(ApiRequest::post("/boards/columns").json(input)?)
            .await
    }

    /// PATCH /boards/columns/{id}
    pub async fn update_column(
        client: &ApiClient,
        id: DbId,
        input: &UpdateColumn,
    ) -> ApiResult<Column> {
        client
            .send(ApiRequest::patch(format!("/boards/columns/{id}")).json(input)?)
            .await
    }

    /// DELETE /boards/columns/{id}
    pub async fn delete_column(client: &ApiClient, id: DbId) -> ApiResult<()> {
        client
            .send_empty(ApiRequest::delete(format!("/boards/columns/{id}")))
            .await
    }
}
