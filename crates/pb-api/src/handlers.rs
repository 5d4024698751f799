//! HTTP API handlers
//!
//! Request handlers for schedule validation and timeslot queries.

use std::collections::BTreeMap;

use axum::{Json, extract::State};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use pb_core::{ScheduleSetting, TimeslotInstance};
use pb_schedule::{
    BookedCount, BookingTally, ValidationReport, apply_bookings, group_by_date,
    materialize_timeslots, month_range, validate_for,
};

use crate::error::{ApiError, Result};
use crate::server::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

/// Schedule validation request payload
#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    /// Settings as edited in the scheduling form
    pub settings: Vec<ScheduleSetting>,
}

/// Schedule validation response payload
#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    /// Whether the schedule may be submitted
    pub ok: bool,
    #[serde(flatten)]
    pub report: ValidationReport,
}

/// Timeslot query for an explicit date range
#[derive(Debug, Deserialize)]
pub struct TimeslotRequest {
    pub settings: Vec<ScheduleSetting>,
    /// First day (inclusive)
    pub from: NaiveDate,
    /// Last day (inclusive)
    pub to: NaiveDate,
}

/// Timeslot list response
#[derive(Debug, Serialize)]
pub struct TimeslotResponse {
    pub timeslots: Vec<TimeslotInstance>,
}

/// Timeslot query for one calendar month
#[derive(Debug, Deserialize)]
pub struct MonthRequest {
    pub settings: Vec<ScheduleSetting>,
    pub year: i32,
    pub month: u32,
    /// Bookings already taken, subtracted from vacancies
    #[serde(default)]
    pub bookings: Vec<BookedCount>,
}

/// Month view response, keyed by `YYYY-MM-DD`
#[derive(Debug, Serialize)]
pub struct MonthResponse {
    pub year: i32,
    pub month: u32,
    pub days: BTreeMap<String, Vec<TimeslotInstance>>,
}

// ============================================================================
// Handler functions
// ============================================================================

/// Health check endpoint
pub async fn health() -> &'static str {
    "OK"
}

/// Validate a schedule before submission
///
/// A blocked schedule is a normal response with `ok: false`.
pub async fn validate_schedule(
    State(state): State<AppState>,
    Json(req): Json<ValidateRequest>,
) -> Json<ValidateResponse> {
    debug!("Validate request: {} settings", req.settings.len());

    let report = validate_for(&req.settings, &state.config.schedule);

    Json(ValidateResponse {
        ok: report.is_ok(),
        report,
    })
}

/// List bookable timeslots for a date range
pub async fn timeslots(
    State(state): State<AppState>,
    Json(req): Json<TimeslotRequest>,
) -> Result<Json<TimeslotResponse>> {
    let rules = &state.config.schedule;

    if req.to < req.from {
        return Err(ApiError::InvalidRequest(format!(
            "`to` ({}) is before `from` ({})",
            req.to, req.from
        )));
    }

    let days = (req.to - req.from).num_days() + 1;
    if days > i64::from(rules.max_query_days) {
        return Err(ApiError::InvalidRequest(format!(
            "date range covers {} days, at most {} allowed",
            days, rules.max_query_days
        )));
    }

    let timeslots = materialize_timeslots(&req.settings, req.from, req.to, rules.local_now());
    info!(
        "Timeslots {}..{}: {} available",
        req.from,
        req.to,
        timeslots.len()
    );

    Ok(Json(TimeslotResponse { timeslots }))
}

/// Month view of remaining timeslots for the booking calendar
pub async fn month_timeslots(
    State(state): State<AppState>,
    Json(req): Json<MonthRequest>,
) -> Result<Json<MonthResponse>> {
    let (from, to) = month_range(req.year, req.month).ok_or_else(|| {
        ApiError::InvalidRequest(format!("invalid month: {}-{}", req.year, req.month))
    })?;

    let slots = materialize_timeslots(
        &req.settings,
        from,
        to,
        state.config.schedule.local_now(),
    );
    let tally: BookingTally = req.bookings.into_iter().collect();
    let remaining = apply_bookings(slots, &tally);

    let days = group_by_date(remaining)
        .into_iter()
        .map(|(date, slots)| (date.to_string(), slots))
        .collect();

    Ok(Json(MonthResponse {
        year: req.year,
        month: req.month,
        days,
    }))
}
