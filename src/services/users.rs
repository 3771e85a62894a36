//! User management endpoints. Everything except the self-service password
//! change is admin-gated server-side.

use serde::Deserialize;
use serde_json::json;

use super::MessageResponse;
use crate::api::ApiClient;
use crate::error::ApiError;
use crate::models::{ManagedUser, Role};

#[derive(Debug, Clone, Deserialize)]
pub struct UserUpdate {
    pub message: String,
    pub user: ManagedUser,
}

/// Admin emails for the ticket-assignment dropdown.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminList {
    pub admins: Vec<String>,
}

/// Emails appear in URL paths and need escaping (`@`, `+`).
fn user_endpoint(email: &str, suffix: &str) -> String {
    format!("/users/{}{}", urlencoding::encode(email), suffix)
}

pub async fn list(client: &ApiClient) -> Result<Vec<ManagedUser>, ApiError> {
    client.get("/users/").await
}

pub async fn get(client: &ApiClient, email: &str) -> Result<ManagedUser, ApiError> {
    client.get(&user_endpoint(email, "")).await
}

pub async fn list_admins(client: &ApiClient) -> Result<AdminList, ApiError> {
    client.get("/users/admins").await
}

pub async fn set_role(
    client: &ApiClient,
    email: &str,
    role: Role,
) -> Result<UserUpdate, ApiError> {
    client
        .put_json(&user_endpoint(email, "/role"), &json!({ "role": role }))
        .await
}

pub async fn set_associations(
    client: &ApiClient,
    email: &str,
    associations: &str,
) -> Result<UserUpdate, ApiError> {
    client
        .put_json(
            &user_endpoint(email, "/associations"),
            &json!({ "associations": associations }),
        )
        .await
}

/// Admin-set password for another account.
pub async fn set_password(
    client: &ApiClient,
    email: &str,
    new_password: &str,
) -> Result<UserUpdate, ApiError> {
    client
        .put_json(
            &user_endpoint(email, "/password"),
            &json!({ "new_password": new_password }),
        )
        .await
}

/// Super-admin only.
pub async fn delete(client: &ApiClient, email: &str) -> Result<MessageResponse, ApiError> {
    client.delete(&user_endpoint(email, "")).await
}

/// Password change for the logged-in account.
pub async fn change_own_password(
    client: &ApiClient,
    old_password: &str,
    new_password: &str,
) -> Result<MessageResponse, ApiError> {
    client
        .put_json(
            "/users/self/password",
            &json!({ "old_password": old_password, "new_password": new_password }),
        )
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_endpoint_escapes_email() {
        assert_eq!(
            user_endpoint("it.admin+desk@example.org", "/role"),
            "/users/it.admin%2Bdesk%40example.org/role"
        );
    }
}
