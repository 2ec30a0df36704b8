use crate::query::{DateCount, ValueCount};
use serde::Serialize;

/// Headline metrics for the filtered bookings table.
#[derive(Debug, Clone, Serialize)]
pub struct KpiOverview {
    pub total_bookings: usize,
    pub total_revenue_inr: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_ticket_price_inr: Option<f64>,
}

/// One paired observation for a scatter chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
}

impl From<(f64, f64)> for ScatterPoint {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// A display-only slice of table rows, column order preserved. Missing
/// cells serialize as nulls.
#[derive(Debug, Clone, Serialize)]
pub struct TableSlice {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

/// Result of an exact customer-identifier lookup.
#[derive(Debug, Clone, Serialize)]
pub struct CustomerLookup {
    pub customer_id: String,
    pub matches: usize,
    pub bookings: TableSlice,
}

/// Session-side figures for the dashboard footer.
#[derive(Debug, Clone, Serialize)]
pub struct SessionOverview {
    pub total_sessions: usize,
    pub distinct_devices: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<TableSlice>,
}

/// Everything the presentation layer renders for one interaction cycle.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub kpis: KpiOverview,
    pub distinct_destinations: usize,
    pub distinct_customers: usize,
    pub device_mix: Vec<ValueCount>,
    pub service_usage: Vec<ValueCount>,
    pub bookings_over_time: Vec<DateCount>,
    pub amount_vs_distance: Vec<ScatterPoint>,
    pub fare_vs_days_to_departure: Vec<ScatterPoint>,
    pub sessions: SessionOverview,
}

/// Auto-insight entries. Entries that could not be computed carry the
/// "Not available" sentinel instead of failing the report.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardInsights {
    pub most_booked_city: String,
    pub top_city_by_revenue: String,
    pub top_service_by_revenue: String,
    pub leading_device: String,
    pub busiest_day: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub observations: Vec<String>,
}
