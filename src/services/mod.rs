//! Thin typed wrappers over the remote API, one module per resource.
//!
//! Every function is `(client, args) -> Result<T, ApiError>` with a fixed
//! path and method; no service holds state.

pub mod assistant;
pub mod auth;
pub mod general;
pub mod requests;
pub mod tasks;
pub mod tickets;
pub mod users;

use serde::Deserialize;

/// Envelope for endpoints that return only an acknowledgement.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}
