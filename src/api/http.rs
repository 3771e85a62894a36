use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::interrupt::InterruptSlot;
use crate::config::ClientConfig;
use crate::error::{ApiError, ConfigError};

/// Request body for [`ApiClient::request`].
///
/// JSON payloads are serialized with `Content-Type: application/json`.
/// Multipart payloads carry no explicit content-type so the transport
/// generates the boundary itself.
pub enum Payload {
    Empty,
    Json(Value),
    Form(reqwest::multipart::Form),
}

pub struct RequestOptions {
    pub method: Method,
    pub payload: Payload,
    /// Extra headers; a caller-supplied `Content-Type` overrides the
    /// JSON default.
    pub headers: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            payload: Payload::Empty,
            headers: Vec::new(),
        }
    }

    pub fn json(method: Method, body: &impl Serialize) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body)
            .map_err(|e| ApiError::Decode(format!("Failed to serialize request body: {e}")))?;
        Ok(Self {
            method,
            payload: Payload::Json(value),
            headers: Vec::new(),
        })
    }

    pub fn form(method: Method, form: reqwest::multipart::Form) -> Self {
        Self {
            method,
            payload: Payload::Form(form),
            headers: Vec::new(),
        }
    }
}

/// Response body after content-type normalization.
enum RawBody {
    Json(Value),
    Text(String),
}

/// HTTP client for the DeskMate API.
///
/// The server identifies the caller purely via a session cookie, so the
/// client keeps a cookie jar and never attaches bearer tokens. Does not
/// retry and does not cache. A 503 from any endpoint fires the interrupt
/// slot before the call fails.
pub struct ApiClient {
    http: reqwest::Client,
    origin: String,
    interrupts: InterruptSlot,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self {
            http,
            origin: config.origin(),
            interrupts: InterruptSlot::new(),
        })
    }

    /// The interrupt slot fired on every observed 503. Registered once at
    /// bootstrap by the session store.
    pub fn interrupts(&self) -> &InterruptSlot {
        &self.interrupts
    }

    /// Issue one request and deserialize the JSON response into `T`.
    pub async fn request<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        match self.dispatch(endpoint, options).await? {
            RawBody::Json(value) => serde_json::from_value(value)
                .map_err(|e| ApiError::Decode(format!("Response did not match expected shape: {e}"))),
            // Plain-text success bodies still deserialize into String targets.
            RawBody::Text(text) => serde_json::from_value(Value::String(text))
                .map_err(|e| ApiError::Decode(format!("Expected JSON response body: {e}"))),
        }
    }

    /// Issue one request and return the response body as text, JSON or not.
    pub async fn request_text(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<String, ApiError> {
        match self.dispatch(endpoint, options).await? {
            RawBody::Json(value) => Ok(value.to_string()),
            RawBody::Text(text) => Ok(text),
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        self.request(endpoint, RequestOptions::new(Method::GET)).await
    }

    pub async fn post_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &impl Serialize,
    ) -> Result<T, ApiError> {
        self.request(endpoint, RequestOptions::json(Method::POST, body)?)
            .await
    }

    /// POST with no body (logout and friends).
    pub async fn post_empty<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        self.request(endpoint, RequestOptions::new(Method::POST))
            .await
    }

    pub async fn put_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &impl Serialize,
    ) -> Result<T, ApiError> {
        self.request(endpoint, RequestOptions::json(Method::PUT, body)?)
            .await
    }

    /// PUT with no body, used by state-transition endpoints (close,
    /// approve, deny, toggle).
    pub async fn put_empty<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        self.request(endpoint, RequestOptions::new(Method::PUT)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        self.request(endpoint, RequestOptions::new(Method::DELETE))
            .await
    }

    /// DELETE carrying a JSON body (the task endpoints expect the
    /// category there).
    pub async fn delete_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &impl Serialize,
    ) -> Result<T, ApiError> {
        self.request(endpoint, RequestOptions::json(Method::DELETE, body)?)
            .await
    }

    pub async fn post_form<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T, ApiError> {
        self.request(endpoint, RequestOptions::form(Method::POST, form))
            .await
    }

    /// Absolute URL for an endpoint, for direct-download links the UI
    /// opens outside the client (attachments, log exports).
    pub fn absolute_url(&self, endpoint: &str) -> String {
        format!("{}{}", self.origin, endpoint)
    }

    async fn dispatch(&self, endpoint: &str, options: RequestOptions) -> Result<RawBody, ApiError> {
        let url = format!("{}{}", self.origin, endpoint);
        debug!("{} {}", options.method, url);

        let mut req = self.http.request(options.method, &url);
        req = match options.payload {
            Payload::Empty => req,
            Payload::Json(value) => req.json(&value),
            Payload::Form(form) => req.multipart(form),
        };
        for (name, value) in &options.headers {
            req = req.header(name.as_str(), value.as_str());
        }

        let response = req.send().await.map_err(map_transport_error)?;

        // The license/service-unavailable signal is checked before any
        // body parsing.
        if response.status() == StatusCode::SERVICE_UNAVAILABLE {
            warn!("Service unavailable response from {}", endpoint);
            self.interrupts.fire();
            return Err(ApiError::ServiceUnavailable);
        }

        let status = response.status();
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.contains("application/json"))
            .unwrap_or(false);
        let text = response.text().await.map_err(map_transport_error)?;

        let body = if is_json {
            match serde_json::from_str::<Value>(&text) {
                Ok(value) => RawBody::Json(value),
                Err(e) if status.is_success() => {
                    return Err(ApiError::Decode(format!("Invalid JSON in response: {e}")));
                }
                // A broken error body still yields a usable error below.
                Err(_) => RawBody::Text(text),
            }
        } else {
            RawBody::Text(text)
        };

        if !status.is_success() {
            let err = error_from_body(status.as_u16(), body);
            warn!("{} {} failed: {}", status.as_u16(), endpoint, err);
            return Err(err);
        }

        Ok(body)
    }
}

/// Append `params` to `endpoint` as a query string, skipping empty values
/// so an omitted filter is never sent as `key=`.
pub fn with_query(endpoint: &str, params: &[(&str, &str)]) -> String {
    let mut out = String::from(endpoint);
    let mut separator = '?';
    for (key, value) in params {
        if value.is_empty() {
            continue;
        }
        out.push(separator);
        separator = '&';
        out.push_str(key);
        out.push('=');
        out.push_str(&urlencoding::encode(value));
    }
    out
}

fn map_transport_error(e: reqwest::Error) -> ApiError {
    if e.is_timeout() {
        ApiError::Transport(format!("Request timed out: {e}"))
    } else if e.is_connect() {
        ApiError::Transport(format!("Connection failed: {e}"))
    } else {
        ApiError::Transport(e.to_string())
    }
}

fn error_from_body(status: u16, body: RawBody) -> ApiError {
    match body {
        RawBody::Json(value) => {
            let server_message = value
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string);
            let detail = match server_message {
                // With a proper message, the secondary `error` field is
                // the only detail worth carrying.
                Some(_) => value.get("error").map(stringify_detail),
                // Without one, keep the whole body for diagnosis.
                None => Some(value.to_string()),
            };
            ApiError::Http {
                status,
                message: server_message.unwrap_or_else(|| format!("HTTP error! Status: {status}")),
                detail,
            }
        }
        RawBody::Text(text) => {
            let trimmed = text.trim();
            let message = if trimmed.is_empty() {
                format!("HTTP error! Status: {status}")
            } else {
                trimmed.to_string()
            };
            ApiError::Http {
                status,
                message,
                detail: None,
            }
        }
    }
}

fn stringify_detail(detail: &Value) -> String {
    match detail {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
