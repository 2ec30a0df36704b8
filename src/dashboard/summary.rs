use super::views::{
    CustomerLookup, DashboardSummary, KpiOverview, ScatterPoint, SessionOverview, TableSlice,
};
use crate::datasets::table::Table;
use crate::query::{self, QueryError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const SESSIONS_PREVIEW_ROWS: usize = 5;

/// Optional multi-select filters from the dashboard sidebar. Empty
/// selections are identity filters.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DashboardFilters {
    #[serde(default)]
    pub cities: Vec<String>,
    #[serde(default)]
    pub services: Vec<String>,
}

impl DashboardFilters {
    pub fn is_empty(&self) -> bool {
        self.cities.is_empty() && self.services.is_empty()
    }
}

/// The loaded dataset pair, ready to answer one interaction cycle.
#[derive(Clone)]
pub struct TravelDashboard {
    bookings: Arc<Table>,
    sessions: Arc<Table>,
}

impl TravelDashboard {
    pub fn new(bookings: Arc<Table>, sessions: Arc<Table>) -> Self {
        Self { bookings, sessions }
    }

    pub fn bookings(&self) -> &Table {
        &self.bookings
    }

    pub fn sessions(&self) -> &Table {
        &self.sessions
    }

    /// Bookings after applying the sidebar filters.
    pub fn filtered_bookings(&self, filters: &DashboardFilters) -> Result<Table, QueryError> {
        let by_city = query::filter_by_values(&self.bookings, "destination_city", &filters.cities)?;
        query::filter_by_values(&by_city, "service_name", &filters.services)
    }

    /// Compute the full widget payload for one render cycle.
    pub fn report(
        &self,
        filters: &DashboardFilters,
        include_sessions_preview: bool,
    ) -> Result<DashboardReport, QueryError> {
        let filtered = self.filtered_bookings(filters)?;

        let kpis = KpiOverview {
            total_bookings: filtered.len(),
            total_revenue_inr: query::sum(&filtered, "amount_inr")?,
            average_ticket_price_inr: match query::mean(&filtered, "amount_inr") {
                Ok(average) => Some(average),
                Err(QueryError::EmptyInput) => None,
                Err(err) => return Err(err),
            },
        };

        let sessions = SessionOverview {
            total_sessions: self.sessions.len(),
            distinct_devices: query::distinct_count(&self.sessions, "device_type")?,
            preview: include_sessions_preview
                .then(|| table_slice(&self.sessions.head(SESSIONS_PREVIEW_ROWS))),
        };

        Ok(DashboardReport {
            summary: DashboardSummary {
                kpis,
                distinct_destinations: query::distinct_count(&filtered, "destination_city")?,
                distinct_customers: query::distinct_count(&filtered, "customer_id")?,
                device_mix: query::value_counts(&filtered, "device_type")?,
                service_usage: query::value_counts(&filtered, "service_name")?,
                bookings_over_time: query::time_series_counts(&filtered, "booking_time")?,
                amount_vs_distance: scatter(&filtered, "distance_km", "amount_inr")?,
                fare_vs_days_to_departure: scatter(&filtered, "days_to_departure", "amount_inr")?,
                sessions,
            },
            filtered,
        })
    }

    /// Exact string-equality lookup over `customer_id`. A customer with no
    /// bookings yields an empty slice, not an error.
    pub fn customer_bookings(&self, customer_id: &str) -> Result<CustomerLookup, QueryError> {
        let matched = query::filter_by_equality(&self.bookings, "customer_id", customer_id)?;
        Ok(CustomerLookup {
            customer_id: customer_id.to_string(),
            matches: matched.len(),
            bookings: table_slice(&matched),
        })
    }

    /// Option lists for the sidebar multi-selects.
    pub fn filter_options(&self) -> Result<FilterOptions, QueryError> {
        Ok(FilterOptions {
            cities: query::distinct_values(&self.bookings, "destination_city")?,
            services: query::distinct_values(&self.bookings, "service_name")?,
        })
    }
}

/// Distinct sidebar choices, sorted.
#[derive(Debug, Clone, Serialize)]
pub struct FilterOptions {
    pub cities: Vec<String>,
    pub services: Vec<String>,
}

/// One computed render cycle: the serializable summary plus the filtered
/// table the insights generator digs back into.
pub struct DashboardReport {
    summary: DashboardSummary,
    filtered: Table,
}

impl DashboardReport {
    pub fn summary(&self) -> &DashboardSummary {
        &self.summary
    }

    pub fn insights(&self) -> super::views::DashboardInsights {
        super::generate_insights(self)
    }

    pub fn into_summary(self) -> DashboardSummary {
        self.summary
    }

    pub(crate) fn filtered(&self) -> &Table {
        &self.filtered
    }
}

fn scatter(table: &Table, x: &str, y: &str) -> Result<Vec<ScatterPoint>, QueryError> {
    Ok(query::scatter_pairs(table, x, y)?
        .into_iter()
        .map(ScatterPoint::from)
        .collect())
}

pub(crate) fn table_slice(table: &Table) -> TableSlice {
    TableSlice {
        columns: table
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect(),
        rows: (0..table.len()).map(|row| table.row_display(row)).collect(),
    }
}
