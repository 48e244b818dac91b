/// Middleware for the API server
///
/// - `security`: Security headers on every response
/// - `signed_url`: Capability-token check for signed routes

pub mod security;
pub mod signed_url;
