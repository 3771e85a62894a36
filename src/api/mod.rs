//! Transport layer: the HTTP request wrapper and the cross-cutting
//! service-unavailable interrupt it propagates.

mod http;
mod interrupt;

pub use http::{with_query, ApiClient, Payload, RequestOptions};
pub use interrupt::{InterruptHook, InterruptSlot};
pub use reqwest::Method;
