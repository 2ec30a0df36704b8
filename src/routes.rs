use crate::dashboard::views::{CustomerLookup, DashboardInsights, DashboardSummary};
use crate::dashboard::{DashboardFilters, FilterOptions, TravelDashboard};
use crate::error::AppError;
use crate::infra::{resolve_source, AppState, SourceOrigin};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Deserialize)]
pub(crate) struct DashboardReportRequest {
    #[serde(default)]
    pub(crate) filters: DashboardFilters,
    #[serde(default)]
    pub(crate) customer_id: Option<String>,
    #[serde(default)]
    pub(crate) include_sessions_preview: bool,
    #[serde(default)]
    pub(crate) bookings_csv: Option<String>,
    #[serde(default)]
    pub(crate) sessions_csv: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct DashboardReportResponse {
    pub(crate) data_source: DataSourceMarker,
    pub(crate) filters: DashboardFilters,
    pub(crate) summary: DashboardSummary,
    pub(crate) insights: DashboardInsights,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) customer_lookup: Option<CustomerLookup>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub(crate) struct DataSourceMarker {
    pub(crate) bookings: SourceOrigin,
    pub(crate) sessions: SourceOrigin,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FilterOptionsRequest {
    #[serde(default)]
    pub(crate) bookings_csv: Option<String>,
    #[serde(default)]
    pub(crate) sessions_csv: Option<String>,
}

pub(crate) fn dashboard_router() -> axum::Router {
    axum::Router::new()
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/dashboard/report",
            axum::routing::post(dashboard_report_endpoint),
        )
        .route(
            "/api/v1/dashboard/options",
            axum::routing::post(dashboard_options_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn dashboard_report_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<DashboardReportRequest>,
) -> Result<Json<DashboardReportResponse>, AppError> {
    let DashboardReportRequest {
        filters,
        customer_id,
        include_sessions_preview,
        bookings_csv,
        sessions_csv,
    } = payload;

    let (dashboard, data_source) = load_dashboard(&state, bookings_csv, sessions_csv)?;

    let report = dashboard.report(&filters, include_sessions_preview)?;
    let insights = report.insights();
    let customer_lookup = customer_id
        .map(|customer_id| dashboard.customer_bookings(&customer_id))
        .transpose()?;

    Ok(Json(DashboardReportResponse {
        data_source,
        filters,
        summary: report.into_summary(),
        insights,
        customer_lookup,
    }))
}

pub(crate) async fn dashboard_options_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<FilterOptionsRequest>,
) -> Result<Json<FilterOptions>, AppError> {
    let FilterOptionsRequest {
        bookings_csv,
        sessions_csv,
    } = payload;

    let (dashboard, _) = load_dashboard(&state, bookings_csv, sessions_csv)?;
    Ok(Json(dashboard.filter_options()?))
}

fn load_dashboard(
    state: &AppState,
    bookings_csv: Option<String>,
    sessions_csv: Option<String>,
) -> Result<(TravelDashboard, DataSourceMarker), AppError> {
    let (bookings_source, bookings_origin) =
        resolve_source(bookings_csv, &state.datasets.bookings_path);
    let (sessions_source, sessions_origin) =
        resolve_source(sessions_csv, &state.datasets.sessions_path);

    let (bookings, sessions) = state.loader.load(&bookings_source, &sessions_source)?;
    Ok((
        TravelDashboard::new(bookings, sessions),
        DataSourceMarker {
            bookings: bookings_origin,
            sessions: sessions_origin,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::NOT_AVAILABLE;
    use crate::infra::testing::app_state;
    use tower::util::ServiceExt;

    const BOOKINGS_CSV: &str = "\
booking_id,customer_id,to_city,to_country,service_name,device_type_used,INR_Amount,distance_km,days_to_departure,booking_time
b1,1001,Delhi,India,GoFlight,mobile,1200,750,12,2024-07-01 09:30:00
b2,1002,Goa,India,GoStay,desktop,3400,410,3,2024-07-01 14:00:00
b3,1001,Delhi,India,GoFlight,mobile,900,750,30,2024-07-02 08:10:00
";

    const SESSIONS_CSV: &str = "\
session_id,search_id,device_type_used,search_time
s1,q1,mobile,2024-07-01 08:00:00
s2,q2,desktop,2024-07-01 09:15:00
";

    fn inline_request() -> DashboardReportRequest {
        DashboardReportRequest {
            filters: DashboardFilters::default(),
            customer_id: None,
            include_sessions_preview: false,
            bookings_csv: Some(BOOKINGS_CSV.to_string()),
            sessions_csv: Some(SESSIONS_CSV.to_string()),
        }
    }

    #[tokio::test]
    async fn report_endpoint_returns_summary_and_insights() {
        let Json(body) = dashboard_report_endpoint(Extension(app_state()), Json(inline_request()))
            .await
            .expect("report builds");

        assert_eq!(body.data_source.bookings, SourceOrigin::Inline);
        assert_eq!(body.summary.kpis.total_bookings, 3);
        assert_eq!(body.insights.most_booked_city, "Delhi");
        assert!(body.customer_lookup.is_none());
    }

    #[tokio::test]
    async fn report_endpoint_can_look_up_a_customer() {
        let request = DashboardReportRequest {
            customer_id: Some("1001".to_string()),
            ..inline_request()
        };

        let Json(body) = dashboard_report_endpoint(Extension(app_state()), Json(request))
            .await
            .expect("report builds");

        let lookup = body.customer_lookup.expect("lookup returned");
        assert_eq!(lookup.matches, 2);
    }

    #[tokio::test]
    async fn report_endpoint_degrades_missing_insights_to_sentinels() {
        let request = DashboardReportRequest {
            filters: DashboardFilters {
                cities: vec!["Atlantis".to_string()],
                services: Vec::new(),
            },
            ..inline_request()
        };

        let Json(body) = dashboard_report_endpoint(Extension(app_state()), Json(request))
            .await
            .expect("report builds");

        assert_eq!(body.summary.kpis.total_bookings, 0);
        assert_eq!(body.insights.most_booked_city, NOT_AVAILABLE);
        assert_eq!(body.insights.busiest_day, NOT_AVAILABLE);
    }

    #[tokio::test]
    async fn report_endpoint_fails_when_configured_paths_are_missing() {
        let request = DashboardReportRequest {
            bookings_csv: None,
            sessions_csv: None,
            ..inline_request()
        };

        let err = dashboard_report_endpoint(Extension(app_state()), Json(request))
            .await
            .expect_err("configured paths do not exist");
        assert!(matches!(err, AppError::Dataset(_)));
    }

    #[tokio::test]
    async fn options_endpoint_lists_sorted_choices() {
        let request = FilterOptionsRequest {
            bookings_csv: Some(BOOKINGS_CSV.to_string()),
            sessions_csv: Some(SESSIONS_CSV.to_string()),
        };

        let Json(options) = dashboard_options_endpoint(Extension(app_state()), Json(request))
            .await
            .expect("options build");

        assert_eq!(options.cities, vec!["Delhi", "Goa"]);
        assert_eq!(options.services, vec!["GoFlight", "GoStay"]);
    }

    #[tokio::test]
    async fn router_serves_health_and_report() {
        let app = dashboard_router().layer(Extension(app_state()));

        let response = app
            .clone()
            .oneshot(
                axum::http::Request::builder()
                    .uri("/health")
                    .body(axum::body::Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("health responds");
        assert_eq!(response.status(), StatusCode::OK);

        let body = serde_json::to_string(&json!({
            "bookings_csv": BOOKINGS_CSV,
            "sessions_csv": SESSIONS_CSV,
            "filters": { "cities": ["Goa"] },
        }))
        .expect("body serializes");

        let response = app
            .oneshot(
                axum::http::Request::builder()
                    .method("POST")
                    .uri("/api/v1/dashboard/report")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(axum::body::Body::from(body))
                    .expect("request builds"),
            )
            .await
            .expect("report responds");
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body reads");
        let payload: serde_json::Value = serde_json::from_slice(&bytes).expect("json parses");
        assert_eq!(payload["summary"]["kpis"]["total_bookings"], 1);
        assert_eq!(payload["insights"]["most_booked_city"], "Goa");
    }
}
