use std::collections::BTreeMap;

use thiserror::Error;

/// Error raised for every non-success outcome of an API call.
///
/// Callers distinguish a structured server rejection (`Http`, which always
/// carries a status code) from a transport-level failure (`Transport`,
/// which never does). A 503 is reserved for the platform-wide
/// license/service-unavailable signal and gets its own variant so it can
/// be detected before any error-body parsing.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Service Unavailable. The license might have expired.")]
    ServiceUnavailable,

    #[error("{message}")]
    Http {
        status: u16,
        message: String,
        /// Secondary detail field from the server's error body, if any.
        detail: Option<String>,
    },

    #[error("{0}")]
    Transport(String),

    #[error("Unexpected response body: {0}")]
    Decode(String),
}

impl ApiError {
    /// HTTP status code, when one was reached. `None` means the failure
    /// happened below the HTTP layer (DNS, refused connection, timeout).
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::ServiceUnavailable => Some(503),
            ApiError::Http { status, .. } => Some(*status),
            ApiError::Transport(_) | ApiError::Decode(_) => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("Invalid config file {path}: {reason}")]
    Parse { path: String, reason: String },

    #[error("Invalid API base URL '{0}'")]
    BadBaseUrl(String),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Client-side form validation failure, keyed by field name.
///
/// Produced before any request is issued; a form renders each entry next
/// to the offending input.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Validation failed for {} field(s)", fields.len())]
pub struct ValidationError {
    pub fields: BTreeMap<&'static str, String>,
}

impl ValidationError {
    pub fn new() -> Self {
        Self {
            fields: BTreeMap::new(),
        }
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.entry(field).or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns `Err(self)` when any field failed, for use at the end of a
    /// form validator.
    pub fn into_result(self) -> Result<(), ValidationError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl Default for ValidationError {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_unavailable_message_and_status() {
        let err = ApiError::ServiceUnavailable;
        assert_eq!(err.status(), Some(503));
        assert_eq!(
            err.to_string(),
            "Service Unavailable. The license might have expired."
        );
    }

    #[test]
    fn test_http_error_preserves_server_message() {
        let err = ApiError::Http {
            status: 401,
            message: "Invalid email or password.".to_string(),
            detail: None,
        };
        assert_eq!(err.to_string(), "Invalid email or password.");
        assert_eq!(err.status(), Some(401));
    }

    #[test]
    fn test_transport_error_has_no_status() {
        let err = ApiError::Transport("connection refused".to_string());
        assert_eq!(err.status(), None);
        assert!(err.is_transport());
    }

    #[test]
    fn test_validation_error_keeps_first_message_per_field() {
        let mut v = ValidationError::new();
        v.add("email", "Email is required.");
        v.add("email", "Second message should not replace the first.");
        assert_eq!(v.fields.get("email").unwrap(), "Email is required.");
    }

    #[test]
    fn test_validation_into_result() {
        assert!(ValidationError::new().into_result().is_ok());

        let mut v = ValidationError::new();
        v.add("title", "Title is required.");
        let err = v.into_result().unwrap_err();
        assert_eq!(err.fields.len(), 1);
    }
}
