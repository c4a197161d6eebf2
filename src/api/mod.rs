//! HTTP surface: router, extractors, error mapping and server lifecycle.
//!
//! Every route hangs off `build_router()`, which returns a `Router` ready
//! to be served or driven directly with `tower::ServiceExt::oneshot`.

pub mod endpoints;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use error::ApiError;
pub use router::build_router;
pub use server::{bind, serve, serve_on, ServerError};
pub use types::ApiContext;
