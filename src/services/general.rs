use serde_json::json;

use super::MessageResponse;
use crate::api::ApiClient;
use crate::error::ApiError;

/// File a bug report against the platform itself.
pub async fn report_bug(
    client: &ApiClient,
    title: &str,
    description: &str,
    location: Option<&str>,
) -> Result<MessageResponse, ApiError> {
    client
        .post_json(
            "/report_bug",
            &json!({ "title": title, "description": description, "location": location }),
        )
        .await
}
