use std::sync::Arc;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::json;

use super::MessageResponse;
use crate::api::{with_query, ApiClient};
use crate::error::ApiError;
use crate::models::{Comment, Department, Ticket};
use crate::query::RecordSource;

/// Server-side filters for the ticket list. Empty fields are omitted from
/// the query string entirely; `status == "all"` likewise means "do not
/// filter by status".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TicketFilters {
    pub search: String,
    pub department: String,
    pub status: String,
    pub sort_by: String,
    /// Admin-only tickets. `None` leaves the server default; non-admin
    /// callers pass `Some(false)`.
    pub include_shimmer: Option<bool>,
}

impl TicketFilters {
    fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if !self.search.is_empty() {
            params.push(("search", self.search.clone()));
        }
        if !self.department.is_empty() {
            params.push(("department", self.department.clone()));
        }
        if let Some(include) = self.include_shimmer {
            params.push(("include_shimmer", include.to_string()));
        }
        if !self.status.is_empty() && self.status != "all" {
            params.push(("status", self.status.clone()));
        }
        if !self.sort_by.is_empty() {
            params.push(("sort_by", self.sort_by.clone()));
        }
        params
    }
}

/// Fields for a new ticket. The attachment travels separately as a
/// multipart file part.
#[derive(Debug, Clone)]
pub struct NewTicket {
    pub title: String,
    pub description: String,
    pub location: String,
    pub shimmer: bool,
    pub department: Department,
}

/// In-memory file attachment for multipart uploads.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentCount {
    pub ticket_id: String,
    pub total_comments: u64,
}

/// Envelope for mutations that return the updated ticket.
#[derive(Debug, Clone, Deserialize)]
pub struct TicketUpdate {
    pub message: String,
    pub ticket: Ticket,
}

pub async fn list(client: &ApiClient, filters: &TicketFilters) -> Result<Vec<Ticket>, ApiError> {
    let params = filters.query_params();
    let borrowed: Vec<(&str, &str)> = params.iter().map(|(k, v)| (*k, v.as_str())).collect();
    client.get(&with_query("/tickets", &borrowed)).await
}

pub async fn get(client: &ApiClient, ticket_id: &str) -> Result<Ticket, ApiError> {
    client.get(&format!("/tickets/{ticket_id}")).await
}

/// Create a ticket. Always multipart, with or without a file, matching
/// the upload endpoint's expectations.
pub async fn create(
    client: &ApiClient,
    ticket: NewTicket,
    file: Option<FileUpload>,
) -> Result<Ticket, ApiError> {
    let mut form = Form::new()
        .text("title", ticket.title)
        .text("description", ticket.description)
        .text("location", ticket.location)
        .text("shimmer", ticket.shimmer.to_string())
        .text("department", ticket.department.as_str());
    if let Some(file) = file {
        form = form.part("file", Part::bytes(file.bytes).file_name(file.filename));
    }
    client.post_form("/tickets/", form).await
}

pub async fn add_comment(
    client: &ApiClient,
    ticket_id: &str,
    text: &str,
    file: Option<FileUpload>,
) -> Result<Comment, ApiError> {
    let mut form = Form::new().text("comment_text", text.to_string());
    if let Some(file) = file {
        form = form.part("file", Part::bytes(file.bytes).file_name(file.filename));
    }
    client
        .post_form(&format!("/tickets/{ticket_id}/comments"), form)
        .await
}

pub async fn comment_count(client: &ApiClient, ticket_id: &str) -> Result<CommentCount, ApiError> {
    client
        .get(&format!("/tickets/{ticket_id}/comments/count"))
        .await
}

pub async fn close(client: &ApiClient, ticket_id: &str) -> Result<TicketUpdate, ApiError> {
    client.put_empty(&format!("/tickets/{ticket_id}/close")).await
}

/// Admin only.
pub async fn delete(client: &ApiClient, ticket_id: &str) -> Result<MessageResponse, ApiError> {
    client.delete(&format!("/tickets/{ticket_id}")).await
}

/// Admin only.
pub async fn assign(
    client: &ApiClient,
    ticket_id: &str,
    assignee_email: &str,
) -> Result<TicketUpdate, ApiError> {
    client
        .put_json(
            &format!("/tickets/{ticket_id}/assign"),
            &json!({ "assignee_email": assignee_email }),
        )
        .await
}

/// Direct-download link for an attachment; the UI opens it outside the
/// client.
pub fn attachment_url(client: &ApiClient, attachment_id: i64) -> String {
    client.absolute_url(&format!("/tickets/attachments/{attachment_id}"))
}

/// Ticket list backing store: bulk fetch filtered server-side, comment
/// counts fetched per visible row.
pub struct TicketDirectory {
    client: Arc<ApiClient>,
}

impl TicketDirectory {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RecordSource for TicketDirectory {
    type Record = Ticket;
    type Filters = TicketFilters;

    async fn fetch_all(&self, filters: &TicketFilters) -> Result<Vec<Ticket>, ApiError> {
        list(&self.client, filters).await
    }

    async fn enrich(&self, ticket: &Ticket) -> Result<u64, ApiError> {
        comment_count(&self.client, &ticket.id)
            .await
            .map(|c| c.total_comments)
    }
}
