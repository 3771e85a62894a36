use serde::Deserialize;
use serde_json::json;

use crate::api::ApiClient;
use crate::error::ApiError;

#[derive(Debug, Clone, Deserialize)]
pub struct AssistantReply {
    pub response: String,
}

/// Ask the server-side helpdesk assistant. The model call happens on the
/// backend; the client only relays the question.
pub async fn generate(client: &ApiClient, question: &str) -> Result<AssistantReply, ApiError> {
    client
        .post_json("/gemini/generate", &json!({ "question": question }))
        .await
}
