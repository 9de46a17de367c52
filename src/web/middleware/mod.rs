//! Middleware for the filebay API.

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::{nosniff_layer, sandbox_user_content};
