use serde::Deserialize;
use serde_json::json;

use super::MessageResponse;
use crate::api::ApiClient;
use crate::error::ApiError;
use crate::models::{AuthStatus, Role};

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub message: String,
    pub user_email: String,
    pub role: Role,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user_email: String,
}

pub async fn status(client: &ApiClient) -> Result<AuthStatus, ApiError> {
    client.get("/auth/status").await
}

pub async fn login(
    client: &ApiClient,
    email: &str,
    password: &str,
) -> Result<LoginResponse, ApiError> {
    client
        .post_json("/auth/login", &json!({ "email": email, "password": password }))
        .await
}

/// Registration requires the site-issued authorization code.
pub async fn register(
    client: &ApiClient,
    email: &str,
    password: &str,
    auth_code: &str,
) -> Result<RegisterResponse, ApiError> {
    client
        .post_json(
            "/auth/register",
            &json!({ "email": email, "password": password, "auth_code": auth_code }),
        )
        .await
}

pub async fn logout(client: &ApiClient) -> Result<MessageResponse, ApiError> {
    client.post_empty("/auth/logout").await
}
