use super::summary::DashboardReport;
use super::views::DashboardInsights;
use crate::query::{self, QueryError};

/// Placeholder shown when an insight cannot be computed for the current
/// selection. Substituting it keeps the rest of the page rendering.
pub const NOT_AVAILABLE: &str = "Not available";

pub(crate) fn generate_insights(report: &DashboardReport) -> DashboardInsights {
    let filtered = report.filtered();
    let summary = report.summary();

    let most_booked_city = or_not_available(query::top_n(filtered, "destination_city", 1).and_then(
        |top| {
            top.into_iter()
                .next()
                .map(|entry| entry.value)
                .ok_or(QueryError::EmptyInput)
        },
    ));

    let top_city_by_revenue = or_not_available(
        query::group_sum(filtered, "destination_city", "amount_inr")
            .and_then(|sums| query::argmax_group(&sums)),
    );

    let top_service_by_revenue = or_not_available(
        query::group_sum(filtered, "service_name", "amount_inr")
            .and_then(|sums| query::argmax_group(&sums)),
    );

    let leading_device = summary
        .device_mix
        .first()
        .map(|entry| entry.value.clone())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    let busiest_day = summary
        .bookings_over_time
        .iter()
        .max_by(|a, b| a.count.cmp(&b.count).then_with(|| b.date.cmp(&a.date)))
        .map(|entry| entry.date.to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    let mut observations = Vec::new();
    if summary.kpis.total_bookings > 0 {
        observations.push(format!(
            "{} bookings across {} destination(s) from {} customer(s)",
            summary.kpis.total_bookings, summary.distinct_destinations, summary.distinct_customers
        ));
    }

    if most_booked_city != NOT_AVAILABLE {
        observations.push(format!(
            "{most_booked_city} leads the current selection by booking volume"
        ));
    }

    if top_service_by_revenue != NOT_AVAILABLE {
        observations.push(format!(
            "{top_service_by_revenue} generates the most revenue in the selection"
        ));
    }

    if let Some(average) = summary.kpis.average_ticket_price_inr {
        observations.push(format!(
            "Average ticket price is INR {average:.2} over the filtered bookings"
        ));
    }

    if summary.sessions.total_sessions > 0 && summary.kpis.total_bookings > 0 {
        let ratio = summary.kpis.total_bookings as f64 / summary.sessions.total_sessions as f64;
        observations.push(format!(
            "Bookings-per-session ratio stands at {ratio:.2}"
        ));
    }

    if observations.is_empty() {
        observations.push("No bookings match the current selection".to_string());
    }

    DashboardInsights {
        most_booked_city,
        top_city_by_revenue,
        top_service_by_revenue,
        leading_device,
        busiest_day,
        observations,
    }
}

fn or_not_available(result: Result<String, QueryError>) -> String {
    result.unwrap_or_else(|_| NOT_AVAILABLE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::summary::{DashboardFilters, TravelDashboard};
    use crate::datasets::{DatasetKind, DatasetLoader, DatasetSource};

    const BOOKINGS_CSV: &str = "\
booking_id,customer_id,to_city,to_country,service_name,device_type_used,INR_Amount,distance_km,days_to_departure,booking_time
b1,1001,Delhi,India,GoFlight,mobile,1200,750,12,2024-07-01 09:30:00
b2,1002,Goa,India,GoStay,desktop,3400,410,3,2024-07-01 14:00:00
b3,1001,Delhi,India,GoFlight,mobile,900,750,30,2024-07-02 08:10:00
";

    const EMPTY_SESSIONS_CSV: &str = "session_id,search_id,device_type_used,search_time\n";

    fn dashboard(bookings_csv: &str) -> TravelDashboard {
        let loader = DatasetLoader::new();
        let bookings = loader
            .load_one(DatasetKind::Bookings, &DatasetSource::bytes(bookings_csv))
            .expect("bookings load");
        let sessions = loader
            .load_one(
                DatasetKind::Sessions,
                &DatasetSource::bytes(EMPTY_SESSIONS_CSV),
            )
            .expect("sessions load");
        TravelDashboard::new(bookings, sessions)
    }

    #[test]
    fn insights_name_the_leading_city_and_service() {
        let dashboard = dashboard(BOOKINGS_CSV);
        let report = dashboard
            .report(&DashboardFilters::default(), false)
            .expect("report builds");
        let insights = generate_insights(&report);

        assert_eq!(insights.most_booked_city, "Delhi");
        assert_eq!(insights.top_city_by_revenue, "Goa");
        assert_eq!(insights.top_service_by_revenue, "GoStay");
        assert_eq!(insights.leading_device, "mobile");
        assert_eq!(insights.busiest_day, "2024-07-01");
        assert!(!insights.observations.is_empty());
    }

    #[test]
    fn empty_selection_degrades_to_sentinels() {
        let header_only = "\
booking_id,customer_id,to_city,to_country,service_name,device_type_used,INR_Amount,distance_km,days_to_departure,booking_time
";
        let dashboard = dashboard(header_only);
        let report = dashboard
            .report(&DashboardFilters::default(), false)
            .expect("report still builds");
        let insights = generate_insights(&report);

        assert_eq!(insights.most_booked_city, NOT_AVAILABLE);
        assert_eq!(insights.top_city_by_revenue, NOT_AVAILABLE);
        assert_eq!(insights.top_service_by_revenue, NOT_AVAILABLE);
        assert_eq!(insights.leading_device, NOT_AVAILABLE);
        assert_eq!(insights.busiest_day, NOT_AVAILABLE);
        assert_eq!(
            insights.observations,
            vec!["No bookings match the current selection".to_string()]
        );
    }
}
