mod insights;
mod summary;
pub mod views;

pub use insights::NOT_AVAILABLE;
pub use summary::{DashboardFilters, DashboardReport, FilterOptions, TravelDashboard};

pub(crate) use insights::generate_insights;
