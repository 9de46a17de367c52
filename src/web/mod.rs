//! HTTP API for filebay.
//!
//! Thin handlers translate requests into [`crate::drive::Drive`] calls, the
//! listing filters, the icon resolver and the upload pipeline.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use router::create_router;
pub use server::WebServer;
