//! HTTP protocol layer module
//!
//! Response builders and the header composer, decoupled from the route handlers.

pub mod headers;
pub mod response;

// Re-export commonly used types
pub use headers::HeaderComposer;
pub use response::{
    build_404_response, build_405_response, build_413_response, build_empty_response,
    build_health_response, json_response, HttpResponse,
};
