//! HTTP access to the backend under test.

pub mod http;
pub mod traits;

pub use http::HttpTransport;
pub use traits::{ApiRequest, ApiResponse, ApiTransport, HttpMethod, TransportError};
