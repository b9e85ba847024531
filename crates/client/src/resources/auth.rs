//! Operations on the `/auth` resource, plus the session bookkeeping that
//! belongs to each of them.

use taskdeck_core::models::user::{LoginRequest, RegisterRequest, TokenResponse, User};

use crate::client::ApiClient;
use crate::error::ApiResult;
use crate::request::ApiRequest;

/// Provides registration, login and logout.
pub struct AuthApi;

impl AuthApi {
    /// POST /auth/register
    ///
    /// Creates the account only; the caller still has to log in.
    pub async fn register(client: &ApiClient, input: &RegisterRequest) -> ApiResult<User> {
        client
            .send(ApiRequest::post("/auth/register").json(input)?)
            .await
    }

    /// POST /auth/login
    ///
    /// On success the returned token pair is stored in the client's session
    /// via [`SessionStore::set_tokens`](crate::SessionStore::set_tokens).
    /// Bad credentials come back as [`ApiError::Unauthorized`](crate::ApiError::Unauthorized).
    pub async fn login(client: &ApiClient, input: &LoginRequest) -> ApiResult<TokenResponse> {
        let tokens: TokenResponse = client
            .send(ApiRequest::post("/auth/login").json(input)?)
            .await?;

        client
            .session()
            .set_tokens(&tokens.access_token, &tokens.refresh_token)?;
        tracing::info!(email = %input.email, "Logged in");
        Ok(tokens)
    }

    /// POST /auth/logout
    ///
    /// The local session is cleared whether or not the server call
    /// succeeds; the server's result is still returned to the caller.
    pub async fn logout(client: &ApiClient) -> ApiResult<()> {
        let result = client.send_empty(ApiRequest::post("/auth/logout")).await;
        client.session().clear_auth();
        tracing::info!("Logged out");
        result
    }

    /// GET /users/me, then record the user in the session.
    pub async fn load_current_user(client: &ApiClient) -> ApiResult<User> {
        let user: User = client.send(ApiRequest::get("/users/me")).await?;
        client.session().set_user(Some(user.clone()))?;
        Ok(user)
    }
}
