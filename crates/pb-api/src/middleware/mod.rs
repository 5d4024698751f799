//! Middleware modules
//!
//! Contains API key authentication middleware.

pub mod auth;
