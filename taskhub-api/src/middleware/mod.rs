/// Middleware modules for the API server
///
/// This module contains custom middleware for:
/// - Bearer-token authentication
/// - Per-IP rate limiting
/// - Security headers

pub mod auth;
pub mod rate_limit;
pub mod security;
