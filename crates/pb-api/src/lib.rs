//! pb-api: HTTP API for petbook scheduling
//!
//! Provides REST endpoints for validating calendar group schedules and
//! querying bookable timeslots. Built with axum for async HTTP handling.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;

pub use error::{ApiError, Result};
pub use server::{AppState, build_app, start_server};
