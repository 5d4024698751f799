//! Route definitions
//!
//! Defines all HTTP API endpoints.

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::handlers::{health, month_timeslots, timeslots, validate_schedule};
use crate::middleware::auth::auth_middleware;
use crate::server::AppState;

/// Create the API router
pub fn routes(state: AppState) -> Router<AppState> {
    let api = Router::new()
        // Schedule validation
        .route("/api/schedules/validate", post(validate_schedule))
        // Timeslot queries
        .route("/api/timeslots", post(timeslots))
        .route("/api/timeslots/month", post(month_timeslots))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        // Health check
        .route("/health", get(health))
        .merge(api)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use chrono::{Datelike, Duration, NaiveDate, Utc};
    use pb_core::Config;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::server::build_app;

    fn days_from_today(days: i64) -> String {
        (Utc::now().date_naive() + Duration::days(days)).to_string()
    }

    fn daily(from: i64, to: i64, start: &str, end: &str) -> Value {
        json!({
            "days": [],
            "recurrence": {
                "pattern": "Daily",
                "startDate": days_from_today(from),
                "endDate": days_from_today(to),
                "timePeriods": [
                    { "id": "p1", "startTime": start, "endTime": end, "vacancies": 2 }
                ]
            }
        })
    }

    async fn post_json(config: Config, uri: &str, body: Value, key: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(key) = key {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", key));
        }
        let request = builder.body(Body::from(body.to_string())).unwrap();

        let response = build_app(config).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn test_health() {
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = build_app(Config::default()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"OK");
    }

    #[tokio::test]
    async fn test_validate_reports_conflict() {
        let body = json!({
            "settings": [
                daily(7, 30, "09:00", "10:00"),
                daily(20, 40, "09:30", "10:30"),
            ]
        });

        let (status, value) = post_json(Config::default(), "/api/schedules/validate", body, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["ok"], false);
        assert_eq!(value["conflict"]["indexA"], 0);
        assert_eq!(value["conflict"]["indexB"], 1);
        assert!(value["conflict"]["message"].as_str().unwrap().contains("Daily"));
    }

    #[tokio::test]
    async fn test_validate_daily_over_weekly_is_ok() {
        let weekly = json!({
            "days": ["MON", "TUE", "WED", "THU", "FRI", "SAT", "SUN"],
            "recurrence": {
                "pattern": "Weekly",
                "startDate": days_from_today(7),
                "endDate": days_from_today(30),
                "timePeriods": [
                    { "startTime": "09:00", "endTime": "10:00", "vacancies": 1 }
                ]
            }
        });
        let body = json!({ "settings": [weekly, daily(10, 20, "09:00", "10:00")] });

        let (status, value) = post_json(Config::default(), "/api/schedules/validate", body, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["ok"], true);
        assert!(value["conflict"].is_null());
        assert_eq!(value["notes"].as_array().unwrap().len(), 1);
        assert_eq!(value["notes"][0]["dailyIndex"], 1);
    }

    #[tokio::test]
    async fn test_validate_rejects_beyond_horizon() {
        let body = json!({ "settings": [daily(7, 200, "09:00", "10:00")] });

        let (_, value) = post_json(Config::default(), "/api/schedules/validate", body, None).await;
        assert_eq!(value["ok"], false);
        assert_eq!(value["fieldErrors"][0]["kind"], "beyondBookingHorizon");
    }

    #[tokio::test]
    async fn test_timeslots_for_range() {
        let body = json!({
            "settings": [daily(2, 8, "09:00", "10:00")],
            "from": days_from_today(2),
            "to": days_from_today(8),
        });

        let (status, value) = post_json(Config::default(), "/api/timeslots", body, None).await;
        assert_eq!(status, StatusCode::OK);

        let slots = value["timeslots"].as_array().unwrap();
        assert_eq!(slots.len(), 7);
        assert_eq!(slots[0]["date"], days_from_today(2));
        assert_eq!(slots[0]["startTime"], "09:00");
        assert_eq!(slots[0]["vacancies"], 2);
        assert_eq!(slots[0]["periodId"], "p1");
    }

    #[tokio::test]
    async fn test_timeslots_rejects_bad_ranges() {
        let inverted = json!({
            "settings": [daily(2, 8, "09:00", "10:00")],
            "from": days_from_today(8),
            "to": days_from_today(2),
        });
        let (status, value) = post_json(Config::default(), "/api/timeslots", inverted, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(value["error"].as_str().is_some());

        let too_long = json!({
            "settings": [daily(2, 8, "09:00", "10:00")],
            "from": days_from_today(0),
            "to": days_from_today(365),
        });
        let (status, _) = post_json(Config::default(), "/api/timeslots", too_long, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_month_view_applies_bookings() {
        let year = Utc::now().year() + 1;
        let first = NaiveDate::from_ymd_opt(year, 1, 1).unwrap();
        let setting = json!({
            "recurrence": {
                "pattern": "Daily",
                "startDate": first.to_string(),
                "endDate": format!("{}-01-31", year),
                "timePeriods": [
                    { "id": "p1", "startTime": "09:00", "endTime": "10:00", "vacancies": 2 }
                ]
            }
        });
        let body = json!({
            "settings": [setting],
            "year": year,
            "month": 1,
            "bookings": [
                { "date": first.to_string(), "periodId": "p1", "count": 2 },
                { "date": format!("{}-01-02", year), "periodId": "p1", "count": 1 }
            ]
        });

        let (status, value) = post_json(Config::default(), "/api/timeslots/month", body, None).await;
        assert_eq!(status, StatusCode::OK);

        let days = value["days"].as_object().unwrap();
        assert_eq!(days.len(), 30);
        assert!(days.get(&first.to_string()).is_none());
        assert_eq!(days[&format!("{}-01-02", year)][0]["vacancies"], 1);
    }

    #[tokio::test]
    async fn test_month_view_rejects_invalid_month() {
        let body = json!({ "settings": [], "year": 2024, "month": 13 });
        let (status, _) = post_json(Config::default(), "/api/timeslots/month", body, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_api_key_required_when_configured() {
        let mut config = Config::default();
        config.api.key = Some("secret".to_string());

        let body = json!({ "settings": [daily(7, 30, "09:00", "10:00")] });

        let (status, _) = post_json(config.clone(), "/api/schedules/validate", body.clone(), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) =
            post_json(config.clone(), "/api/schedules/validate", body.clone(), Some("wrong")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, value) =
            post_json(config.clone(), "/api/schedules/validate", body, Some("secret")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["ok"], true);

        // ヘルスチェックは認証不要
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = build_app(config).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
