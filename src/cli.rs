use crate::config::AppConfig;
use crate::dashboard::views::{DashboardInsights, DashboardSummary};
use crate::dashboard::{DashboardFilters, TravelDashboard};
use crate::datasets::{DatasetKind, DatasetLoader, DatasetSource};
use crate::error::AppError;
use crate::server;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Travel Aggregator Insights",
    about = "Serve and render the travel aggregator analytics dashboard from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Render the dashboard report to stdout
    Report(ReportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// Bookings CSV path (defaults to the configured APP_BOOKINGS_CSV)
    #[arg(long)]
    bookings: Option<PathBuf>,
    /// Sessions CSV path (defaults to the configured APP_SESSIONS_CSV)
    #[arg(long)]
    sessions: Option<PathBuf>,
    /// Keep only bookings to this destination city (repeatable)
    #[arg(long = "city")]
    cities: Vec<String>,
    /// Keep only bookings for this service (repeatable)
    #[arg(long = "service")]
    services: Vec<String>,
    /// Look up bookings for one customer identifier
    #[arg(long)]
    customer: Option<String>,
    /// Include the first sessions rows in the output
    #[arg(long)]
    sessions_preview: bool,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Report(args) => run_report(args),
    }
}

fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let ReportArgs {
        bookings,
        sessions,
        cities,
        services,
        customer,
        sessions_preview,
    } = args;

    let config = AppConfig::load()?;
    let bookings_path = bookings.unwrap_or(config.datasets.bookings_path);
    let sessions_path = sessions.unwrap_or(config.datasets.sessions_path);

    let loader = DatasetLoader::new();
    let bookings = loader.load_one(DatasetKind::Bookings, &DatasetSource::path(bookings_path))?;
    let sessions = loader.load_one(DatasetKind::Sessions, &DatasetSource::path(sessions_path))?;
    let dashboard = TravelDashboard::new(bookings, sessions);

    let filters = DashboardFilters { cities, services };
    let report = dashboard.report(&filters, sessions_preview)?;
    let insights = report.insights();
    render_dashboard_report(&filters, report.summary(), &insights);

    if let Some(customer_id) = customer {
        let lookup = dashboard.customer_bookings(&customer_id)?;
        println!("\nCustomer lookup: {}", lookup.customer_id);
        if lookup.matches == 0 {
            println!("- no bookings found");
        } else {
            println!("- {} booking(s)", lookup.matches);
            render_rows(&lookup.bookings.rows);
        }
    }

    Ok(())
}

fn render_dashboard_report(
    filters: &DashboardFilters,
    summary: &DashboardSummary,
    insights: &DashboardInsights,
) {
    println!("Travel aggregator dashboard");
    if filters.is_empty() {
        println!("Filters: none (all bookings)");
    } else {
        if !filters.cities.is_empty() {
            println!("Filters: cities = {}", filters.cities.join(", "));
        }
        if !filters.services.is_empty() {
            println!("Filters: services = {}", filters.services.join(", "));
        }
    }

    println!("\nKey performance indicators");
    println!("- Total bookings: {}", summary.kpis.total_bookings);
    println!("- Total revenue (INR): {:.2}", summary.kpis.total_revenue_inr);
    match summary.kpis.average_ticket_price_inr {
        Some(average) => println!("- Average ticket price (INR): {average:.2}"),
        None => println!("- Average ticket price (INR): {}", crate::dashboard::NOT_AVAILABLE),
    }
    println!(
        "- Distinct destinations: {} | distinct customers: {}",
        summary.distinct_destinations, summary.distinct_customers
    );

    println!("\nDevice mix");
    for entry in &summary.device_mix {
        println!("- {}: {} bookings", entry.value, entry.count);
    }

    println!("\nService usage");
    for entry in &summary.service_usage {
        println!("- {}: {} bookings", entry.value, entry.count);
    }

    if summary.bookings_over_time.is_empty() {
        println!("\nBookings over time: no dated bookings");
    } else {
        println!("\nBookings over time");
        for entry in &summary.bookings_over_time {
            println!("- {}: {}", entry.date, entry.count);
        }
    }

    println!(
        "\nSessions: {} total across {} device type(s)",
        summary.sessions.total_sessions, summary.sessions.distinct_devices
    );
    if let Some(preview) = &summary.sessions.preview {
        println!("Sessions preview ({})", preview.columns.join(" | "));
        render_rows(&preview.rows);
    }

    println!("\nInsights");
    println!("- Most booked city: {}", insights.most_booked_city);
    println!("- Top city by revenue: {}", insights.top_city_by_revenue);
    println!(
        "- Top service by revenue: {}",
        insights.top_service_by_revenue
    );
    println!("- Leading device: {}", insights.leading_device);
    println!("- Busiest day: {}", insights.busiest_day);

    if !insights.observations.is_empty() {
        println!("\nObservations");
        for note in &insights.observations {
            println!("- {}", note);
        }
    }
}

fn render_rows(rows: &[Vec<Option<String>>]) {
    for row in rows {
        let cells: Vec<&str> = row
            .iter()
            .map(|cell| cell.as_deref().unwrap_or("-"))
            .collect();
        println!("  {}", cells.join(" | "));
    }
}
