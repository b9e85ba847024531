//! Operations on the `/users` resource.

use taskdeck_core::models::user::{UpdateUser, User};
use taskdeck_core::types::DbId;

use crate::client::ApiClient;
use crate::error::ApiResult;
use crate::request::ApiRequest;

/// Provides user lookups and profile updates.
pub struct UsersApi;

impl UsersApi {
    /// GET /users/me
    pub async fn me(client: &ApiClient) -> ApiResult<User> {
        client.send(ApiRequest::get("/users/me")).await
    }

    /// PUT /users/me
    pub async fn update_me(client: &ApiClient, input: &UpdateUser) -> ApiResult<User> {
        client.send(ApiRequest::put("/users/me").json(input)?).await
    }

    /// GET /users/{id}
    pub async fn get(client: &ApiClient, id: DbId) -> ApiResult<User> {
        client.send(ApiRequest::get(format!("/users/{id}"))).await
    }

    /// GET /users
    pub async fn list(client: &ApiClient) -> ApiResult<Vec<User>> {
        client.send(ApiRequest::get("/users")).await
    }
}
