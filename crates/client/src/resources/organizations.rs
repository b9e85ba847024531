//! Operations on the `/organizations` resource.

use taskdeck_core::models::organization::{
    CreateOrganization, CreateOrganizationMember, Organization, OrganizationMember,
    OrganizationWithMembers, UpdateOrganization,
};
use taskdeck_core::types::DbId;

use crate::client::ApiClient;
use crate::error::ApiResult;
use crate::request::ApiRequest;

/// Provides CRUD and membership operations for organizations.
pub struct OrganizationsApi;

impl OrganizationsApi {
    /// GET /organizations
    pub async fn list(client: &ApiClient) -> ApiResult<Vec<Organization>> {
        client.send(ApiRequest::get("/organizations")).await
    }

    /// POST /organizations
    pub async fn create(client: &ApiClient, input: &CreateOrganization) -> ApiResult<Organization> {
        client
            .send(ApiRequest::post("/organizations").json(input)?)
            .await
    }

    /// GET /organizations/{id}, including the member list.
    pub async fn get(client: &ApiClient, id: DbId) -> ApiResult<OrganizationWithMembers> {
        client
            .send(ApiRequest::get(format!("/organizations/{id}")))
            .await
    }

    /// PUT /organizations/{id}
    pub async fn update(
        client: &ApiClient,
        id: DbId,
        input: &UpdateOrganization,
    ) -> ApiResult<Organization> {
        client
            .send(ApiRequest::put(format!("/organizations/{id}")).json(input)?)
            .await
    }

    /// DELETE /organizations/{id}
    pub async fn delete(client: &ApiClient, id: DbId) -> ApiResult<()> {
        client
            .send_empty(ApiRequest::delete(format!("/organizations/{id}")))
            .await
    }

    /// GET /organizations/{id}/members
    pub async fn list_members(client: &ApiClient, id: DbId) -> ApiResult<Vec<OrganizationMember>> {
        client
            .send(ApiRequest::get(format!("/organizations/{id}/members")))
            .await
    }

    /// POST /organizations/{id}/members
    pub async fn add_member(
        client: &ApiClient,
        id: DbId,
        input: &CreateOrganizationMember,
    ) -> ApiResult<OrganizationMember> {
        client
            .send(ApiRequest::post(format!("/organizations/{id}/members")).json(input)?)
            .await
    }
}
