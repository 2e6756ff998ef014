use std::fs::File;
use std::io::Write;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};

use crate::application::{
    AppError, COMPACT_TOP_CATEGORIES, DashboardData, ExpenseReport, FinancialSummary,
    RevenueReport, StudioService, TrendPoint, compact_breakdown,
};
use crate::domain::{
    ConsentKind, DEFAULT_LOOKAHEAD_DAYS, DateRange, LeadStatus, NewBooking, PageItem, Paged,
    day_from_str, format_amount, parse_amount,
};
use crate::io::Exporter;

const DEFAULT_API_URL: &str = "http://localhost:5000/api";

/// Inkdesk - Studio Dashboard & Analytics
#[derive(Parser)]
#[command(name = "inkdesk")]
#[command(about = "A terminal dashboard and analytics companion for tattoo & piercing studios")]
#[command(version)]
pub struct Cli {
    /// Base URL of the studio backend (defaults to $INKDESK_API_URL)
    #[arg(long)]
    pub api_url: Option<String>,

    /// Bearer token for the backend (defaults to $INKDESK_API_TOKEN)
    #[arg(long)]
    pub token: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the studio dashboard
    Dashboard {
        /// Start date (YYYY-MM-DD, defaults to the first of the month)
        #[arg(long)]
        from: Option<String>,

        /// End date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        to: Option<String>,

        /// Keep the dashboard on screen and re-render as data refreshes
        #[arg(short, long)]
        watch: bool,

        /// Seconds between re-renders in watch mode
        #[arg(long, default_value = "60")]
        every: u64,
    },

    /// Revenue, expense and summary reports
    #[command(subcommand)]
    Report(ReportCommands),

    /// List customers
    Customers {
        /// Filter by name, phone or email
        #[arg(short, long)]
        query: Option<String>,

        /// Page number
        #[arg(short, long, default_value = "1")]
        page: u32,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// List consent forms from both registers
    Consents {
        /// Restrict to one kind: tattoo, piercing
        #[arg(short, long)]
        kind: Option<String>,

        /// Page number
        #[arg(short, long, default_value = "1")]
        page: u32,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// List payments
    Payments {
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// End date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,

        /// Page number
        #[arg(short, long, default_value = "1")]
        page: u32,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Advance booking commands
    #[command(subcommand)]
    Bookings(BookingCommands),

    /// List leads
    Leads {
        /// Filter by stage: new, contacted, converted, lost
        #[arg(short, long)]
        status: Option<String>,

        /// Page number
        #[arg(short, long, default_value = "1")]
        page: u32,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Customers with birthdays coming up
    Birthdays {
        /// Lookahead window in days
        #[arg(short, long, default_value = "15")]
        days: i64,
    },

    /// Export data to CSV or JSON
    Export {
        /// What to export: customers, payments, consents, bookings, revenue, full
        export_type: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,

        /// Start date for the revenue export (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// End date for the revenue export (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Revenue breakdown over a date range
    Revenue {
        /// Start date (YYYY-MM-DD, defaults to the first of the month)
        #[arg(long)]
        from: Option<String>,

        /// End date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        to: Option<String>,

        /// Output format: table, json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Expense breakdown over a date range
    Expenses {
        /// Start date (YYYY-MM-DD, defaults to the first of the month)
        #[arg(long)]
        from: Option<String>,

        /// End date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        to: Option<String>,

        /// Output format: table, json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Revenue against expenses, with net profit
    Summary {
        /// Start date (YYYY-MM-DD, defaults to the first of the month)
        #[arg(long)]
        from: Option<String>,

        /// End date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        to: Option<String>,

        /// Output format: table, json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
}

#[derive(Subcommand)]
pub enum BookingCommands {
    /// List advance bookings
    List {
        /// Include fulfilled bookings
        #[arg(short, long)]
        all: bool,

        /// Page number
        #[arg(short, long, default_value = "1")]
        page: u32,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Record a new advance booking
    Add {
        /// Customer name
        customer: String,

        /// Appointment date (YYYY-MM-DD)
        #[arg(long)]
        date: String,

        /// Advance amount (e.g., "500.00" or "500")
        #[arg(short, long)]
        advance: String,

        /// Amount still due at the appointment
        #[arg(short, long)]
        due: Option<String>,

        /// Service booked (e.g., "tattoo", "piercing")
        #[arg(short, long)]
        service: Option<String>,

        /// Customer id, when known
        #[arg(long)]
        customer_id: Option<String>,
    },

    /// Mark a booking fulfilled
    Fulfill {
        /// Booking id
        id: String,
    },
}

impl Cli {
    fn service(&self) -> StudioService {
        let api_url = self
            .api_url
            .clone()
            .or_else(|| std::env::var("INKDESK_API_URL").ok())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let token = self
            .token
            .clone()
            .or_else(|| std::env::var("INKDESK_API_TOKEN").ok());
        StudioService::connect(&api_url, token)
    }

    pub async fn run(self) -> Result<()> {
        let service = self.service();

        match self.command {
            Commands::Dashboard {
                from,
                to,
                watch,
                every,
            } => {
                let range = parse_range(from, to)?;
                if watch {
                    run_watch_command(&service, range, every).await?;
                } else {
                    run_dashboard_command(&service, range).await?;
                }
            }
            Commands::Report(report_command) => {
                run_report_command(&service, report_command).await?;
            }
            Commands::Customers {
                query,
                page,
                format,
            } => {
                run_customers_command(&service, query.as_deref(), page, &format).await?;
            }
            Commands::Consents { kind, page, format } => {
                run_consents_command(&service, kind.as_deref(), page, &format).await?;
            }
            Commands::Payments {
                from,
                to,
                page,
                format,
            } => {
                run_payments_command(&service, from, to, page, &format).await?;
            }
            Commands::Bookings(booking_command) => {
                run_bookings_command(&service, booking_command).await?;
            }
            Commands::Leads {
                status,
                page,
                format,
            } => {
                run_leads_command(&service, status.as_deref(), page, &format).await?;
            }
            Commands::Birthdays { days } => {
                run_birthdays_command(&service, days).await?;
            }
            Commands::Export {
                export_type,
                output,
                from,
                to,
            } => {
                run_export_command(&service, &export_type, output.as_deref(), from, to).await?;
            }
        }

        print_fetch_warnings(&service);
        Ok(())
    }
}

async fn run_dashboard_command(service: &StudioService, range: DateRange) -> Result<()> {
    let today = Local::now().date_naive();
    let data = service
        .get_dashboard(range, today, DEFAULT_LOOKAHEAD_DAYS)
        .await?;
    render_dashboard(&data);
    Ok(())
}

async fn run_watch_command(service: &StudioService, range: DateRange, every: u64) -> Result<()> {
    let every = every.max(1);
    let _refreshers = service.start_watch();
    let mut ticker = tokio::time::interval(Duration::from_secs(every));

    loop {
        ticker.tick().await;
        let today = Local::now().date_naive();
        let data = service
            .get_dashboard(range, today, DEFAULT_LOOKAHEAD_DAYS)
            .await?;

        // ANSI clear screen, cursor to home
        print!("\x1b[2J\x1b[H");
        render_dashboard(&data);
        print_fetch_warnings(service);
        println!();
        println!("Refreshing every {}s. Press Ctrl+C to exit.", every);
    }
}

async fn run_report_command(service: &StudioService, command: ReportCommands) -> Result<()> {
    match command {
        ReportCommands::Revenue { from, to, format } => {
            let range = parse_range(from, to)?;
            let report = service.get_revenue_report(range).await?;

            match format.as_str() {
                "json" => println!("{}", serde_json::to_string_pretty(&report)?),
                "csv" => {
                    println!("group,category,total_paise,records");
                    for entry in &report.by_service {
                        println!("service,{},{},{}", entry.category, entry.total, entry.count);
                    }
                    for entry in &report.by_method {
                        println!("method,{},{},{}", entry.category, entry.total, entry.count);
                    }
                }
                _ => {
                    // Table format
                    render_revenue_table(&report);
                }
            }
        }
        ReportCommands::Expenses { from, to, format } => {
            let range = parse_range(from, to)?;
            let report = service.get_expense_report(range).await?;

            match format.as_str() {
                "json" => println!("{}", serde_json::to_string_pretty(&report)?),
                "csv" => {
                    println!("category,total_paise,records");
                    for entry in &report.by_purpose {
                        println!("{},{},{}", entry.category, entry.total, entry.count);
                    }
                }
                _ => {
                    // Table format
                    render_expense_table(&report);
                }
            }
        }
        ReportCommands::Summary { from, to, format } => {
            let range = parse_range(from, to)?;
            let summary = service.get_financial_summary(range).await?;

            match format.as_str() {
                "json" => println!("{}", serde_json::to_string_pretty(&summary)?),
                "csv" => {
                    println!("metric,amount_paise");
                    println!("revenue,{}", summary.revenue.total);
                    println!("gst,{}", summary.revenue.gst_total);
                    println!("expenses,{}", summary.expenses.total);
                    println!("net_profit,{}", summary.net_profit);
                }
                _ => {
                    // Table format
                    render_summary_table(&summary);
                }
            }
        }
    }
    Ok(())
}

async fn run_customers_command(
    service: &StudioService,
    query: Option<&str>,
    page: u32,
    format: &str,
) -> Result<()> {
    let paged = service.list_customers(query, page).await?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&paged)?),
        _ => {
            // Table format
            if paged.items.is_empty() {
                println!("No customers found.");
                return Ok(());
            }
            println!(
                "{:<20} {:<14} {:<24} {:<12}",
                "NAME", "PHONE", "EMAIL", "BORN"
            );
            println!("{}", "-".repeat(72));
            for customer in &paged.items {
                println!(
                    "{:<20} {:<14} {:<24} {:<12}",
                    truncate(customer.display_name(), 20),
                    customer.phone_number.as_deref().unwrap_or("-"),
                    truncate(customer.email.as_deref().unwrap_or("-"), 24),
                    day_or_dash(customer.date_of_birth)
                );
            }
            render_page_strip(&paged);
        }
    }
    Ok(())
}

async fn run_consents_command(
    service: &StudioService,
    kind: Option<&str>,
    page: u32,
    format: &str,
) -> Result<()> {
    let kind = match kind {
        Some(raw) => Some(ConsentKind::from_str(raw).ok_or_else(|| {
            anyhow::anyhow!("Invalid consent kind '{}'. Valid kinds: tattoo, piercing", raw)
        })?),
        None => None,
    };
    let paged = service.list_consents(kind, page).await?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&paged)?),
        _ => {
            // Table format
            if paged.items.is_empty() {
                println!("No consent forms found.");
                return Ok(());
            }
            println!(
                "{:<12} {:<10} {:<20} {:<14} {:<22} {:<6}",
                "DATE", "TYPE", "CUSTOMER", "ARTIST", "DETAIL", "HEALTH"
            );
            println!("{}", "-".repeat(90));
            for form in &paged.items {
                println!(
                    "{:<12} {:<10} {:<20} {:<14} {:<22} {:<6}",
                    day_or_dash(form.effective_date()),
                    form.kind(),
                    truncate(form.customer_name().unwrap_or("-"), 20),
                    truncate(form.artist().unwrap_or("-"), 14),
                    truncate(&form.detail(), 22),
                    if form.health().any_flagged() { "yes" } else { "-" }
                );
            }
            render_page_strip(&paged);
        }
    }
    Ok(())
}

async fn run_payments_command(
    service: &StudioService,
    from: Option<String>,
    to: Option<String>,
    page: u32,
    format: &str,
) -> Result<()> {
    let range = if from.is_none() && to.is_none() {
        None
    } else {
        Some(parse_range(from, to)?)
    };
    let paged = service.list_payments(range, page).await?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&paged)?),
        _ => {
            // Table format
            if paged.items.is_empty() {
                println!("No payments found.");
                return Ok(());
            }
            println!(
                "{:<12} {:<18} {:<10} {:<12} {:>12} {:>10}",
                "DATE", "CUSTOMER", "SERVICE", "METHOD", "AMOUNT", "GST"
            );
            println!("{}", "-".repeat(80));
            for payment in &paged.items {
                println!(
                    "{:<12} {:<18} {:<10} {:<12} {:>12} {:>10}",
                    day_or_dash(payment.payment_date),
                    truncate(payment.customer_name.as_deref().unwrap_or("-"), 18),
                    payment.category(),
                    truncate(payment.method_label(), 12),
                    format_amount(payment.amount_paise()),
                    format_amount(payment.gst_paise())
                );
            }
            render_page_strip(&paged);
        }
    }
    Ok(())
}

async fn run_bookings_command(service: &StudioService, command: BookingCommands) -> Result<()> {
    match command {
        BookingCommands::List { all, page, format } => {
            let paged = service.list_bookings(all, page).await?;

            match format.as_str() {
                "json" => println!("{}", serde_json::to_string_pretty(&paged)?),
                _ => {
                    // Table format
                    if paged.items.is_empty() {
                        println!("No bookings found.");
                        return Ok(());
                    }
                    println!(
                        "{:<24} {:<12} {:<18} {:>10} {:>10} {:<9}",
                        "ID", "DATE", "CUSTOMER", "ADVANCE", "DUE", "STATUS"
                    );
                    println!("{}", "-".repeat(90));
                    for booking in &paged.items {
                        println!(
                            "{:<24} {:<12} {:<18} {:>10} {:>10} {:<9}",
                            truncate(&booking.id, 24),
                            day_or_dash(booking.appointment_date),
                            truncate(booking.customer_name.as_deref().unwrap_or("-"), 18),
                            format_amount(booking.advance_paise()),
                            format_amount(booking.due_paise()),
                            if booking.fulfilled { "fulfilled" } else { "pending" }
                        );
                    }
                    render_page_strip(&paged);
                }
            }
        }
        BookingCommands::Add {
            customer,
            date,
            advance,
            due,
            service: service_label,
            customer_id,
        } => {
            let appointment = parse_day(&date)?;
            let advance_paise =
                parse_amount(&advance).context("Invalid amount format. Use '500.00' or '500'")?;

            let mut booking = NewBooking::new(customer, appointment, advance_paise);
            if let Some(due) = due {
                let due_paise =
                    parse_amount(&due).context("Invalid amount format. Use '500.00' or '500'")?;
                booking = booking.with_due_amount(due_paise);
            }
            if let Some(label) = service_label {
                booking = booking.with_service(label);
            }
            if let Some(id) = customer_id {
                booking = booking.with_customer_id(id);
            }

            let created = service.record_advance_booking(booking).await?;
            println!(
                "Recorded booking for {} on {} (advance {})",
                created.customer_name.as_deref().unwrap_or("-"),
                day_or_dash(created.appointment_date),
                format_amount(created.advance_paise())
            );
            if !created.id.is_empty() {
                println!("  ID: {}", created.id);
            }
        }
        BookingCommands::Fulfill { id } => {
            let booking = service.fulfill_booking(&id).await?;
            println!(
                "Marked booking {} fulfilled ({}, advance {})",
                booking.id,
                booking.customer_name.as_deref().unwrap_or("-"),
                format_amount(booking.advance_paise())
            );
        }
    }
    Ok(())
}

async fn run_leads_command(
    service: &StudioService,
    status: Option<&str>,
    page: u32,
    format: &str,
) -> Result<()> {
    let status = match status {
        Some(raw) => Some(LeadStatus::from_str(raw).ok_or_else(|| {
            anyhow::anyhow!(
                "Invalid lead status '{}'. Valid statuses: new, contacted, converted, lost",
                raw
            )
        })?),
        None => None,
    };
    let paged = service.list_leads(status, page).await?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&paged)?),
        _ => {
            // Table format
            if paged.items.is_empty() {
                println!("No leads found.");
                return Ok(());
            }
            println!(
                "{:<20} {:<14} {:<12} {:<10} {:<12}",
                "NAME", "PHONE", "SOURCE", "STAGE", "SINCE"
            );
            println!("{}", "-".repeat(72));
            for lead in &paged.items {
                println!(
                    "{:<20} {:<14} {:<12} {:<10} {:<12}",
                    truncate(lead.name.as_deref().unwrap_or("-"), 20),
                    lead.phone_number.as_deref().unwrap_or("-"),
                    truncate(lead.source.as_deref().unwrap_or("-"), 12),
                    lead.stage(),
                    day_or_dash(lead.created_at)
                );
            }
            render_page_strip(&paged);
        }
    }
    Ok(())
}

async fn run_birthdays_command(service: &StudioService, days: i64) -> Result<()> {
    let today = Local::now().date_naive();
    let upcoming = service.upcoming_birthdays(today, days).await?;

    if upcoming.is_empty() {
        println!("No birthdays in the next {} days.", days);
        return Ok(());
    }

    println!("{:<20} {:<8} {:<14} {:>6}", "CUSTOMER", "DATE", "PHONE", "IN");
    println!("{}", "-".repeat(52));
    for candidate in &upcoming {
        println!(
            "{:<20} {:<8} {:<14} {:>6}",
            truncate(candidate.customer.display_name(), 20),
            candidate.upcoming_anniversary.format("%d %b"),
            candidate.customer.phone_number.as_deref().unwrap_or("-"),
            format!("{}d", candidate.days_until)
        );
    }
    Ok(())
}

async fn run_export_command(
    service: &StudioService,
    export_type: &str,
    output: Option<&str>,
    from: Option<String>,
    to: Option<String>,
) -> Result<()> {
    let exporter = Exporter::new(service);

    // Determine output writer
    let writer: Box<dyn Write> = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(std::io::stdout()),
    };

    match export_type {
        "customers" => {
            let count = exporter.export_customers_csv(writer).await?;
            if output.is_some() {
                eprintln!("Exported {} customers", count);
            }
        }
        "payments" => {
            let count = exporter.export_payments_csv(writer).await?;
            if output.is_some() {
                eprintln!("Exported {} payments", count);
            }
        }
        "consents" => {
            let count = exporter.export_consents_csv(writer).await?;
            if output.is_some() {
                eprintln!("Exported {} consent forms", count);
            }
        }
        "bookings" => {
            let count = exporter.export_bookings_csv(writer).await?;
            if output.is_some() {
                eprintln!("Exported {} bookings", count);
            }
        }
        "revenue" => {
            let range = parse_range(from, to)?;
            let count = exporter.export_revenue_csv(range, writer).await?;
            if output.is_some() {
                eprintln!("Exported {} breakdown rows", count);
            }
        }
        "full" => {
            let snapshot = exporter.export_full_json(writer).await?;
            if output.is_some() {
                eprintln!(
                    "Exported snapshot: {} customers, {} payments, {} expenses, \
                     {} bookings, {} consents, {} leads",
                    snapshot.customers.len(),
                    snapshot.payments.len(),
                    snapshot.expenses.len(),
                    snapshot.bookings.len(),
                    snapshot.consents.len(),
                    snapshot.leads.len()
                );
            }
        }
        _ => {
            anyhow::bail!(
                "Invalid export type '{}'. Valid types: customers, payments, consents, \
                 bookings, revenue, full",
                export_type
            );
        }
    }

    Ok(())
}

fn render_dashboard(data: &DashboardData) {
    let summary = &data.summary;

    println!("Studio Dashboard");
    println!("Period: {}", summary.range);
    println!();
    println!("Revenue:      {:>12}", format_amount(summary.revenue.total));
    println!("  GST:        {:>12}", format_amount(summary.revenue.gst_total));
    println!("Expenses:     {:>12}", format_amount(summary.expenses.total));
    println!("{}", "-".repeat(26));
    println!("Net Profit:   {:>12}", format_amount(summary.net_profit));

    let services = compact_breakdown(&summary.revenue.by_service, COMPACT_TOP_CATEGORIES);
    if !services.top.is_empty() {
        println!();
        println!("Top services:");
        for entry in &services.top {
            println!(
                "  {:<18} {:>12}",
                truncate(&entry.category, 18),
                format_amount(entry.total)
            );
        }
        if services.rest_count > 0 {
            println!(
                "  {:<18} {:>12}",
                format!("({} more)", services.rest_count),
                format_amount(services.rest_total)
            );
        }
    }

    let methods = compact_breakdown(&summary.revenue.by_method, COMPACT_TOP_CATEGORIES);
    if !methods.top.is_empty() {
        println!();
        println!("Payment methods:");
        for entry in &methods.top {
            println!(
                "  {:<18} {:>12}",
                truncate(&entry.category, 18),
                format_amount(entry.total)
            );
        }
        if methods.rest_count > 0 {
            println!(
                "  {:<18} {:>12}",
                format!("({} more)", methods.rest_count),
                format_amount(methods.rest_total)
            );
        }
    }

    if !data.pending_bookings.is_empty() {
        println!();
        println!("Pending bookings:");
        for booking in data.pending_bookings.iter().take(5) {
            println!(
                "  {:<10} {:<20} {:>12}",
                day_or_dash(booking.appointment_date),
                truncate(booking.customer_name.as_deref().unwrap_or("-"), 20),
                format_amount(booking.due_paise())
            );
        }
        if data.pending_bookings.len() > 5 {
            println!("  ... and {} more", data.pending_bookings.len() - 5);
        }
    }

    if !data.upcoming_birthdays.is_empty() {
        println!();
        println!("Upcoming birthdays:");
        for candidate in &data.upcoming_birthdays {
            let when = match candidate.days_until {
                0 => "today".to_string(),
                1 => "tomorrow".to_string(),
                days => format!("in {} days", days),
            };
            println!(
                "  {:<20} {} ({})",
                truncate(candidate.customer.display_name(), 20),
                candidate.upcoming_anniversary.format("%d %b"),
                when
            );
        }
    }
}

fn render_revenue_table(report: &RevenueReport) {
    println!("Revenue Report");
    println!("Period: {}", report.range);
    println!();
    println!("{:<20} {:>12} {:>8}", "SERVICE", "TOTAL", "COUNT");
    println!("{}", "-".repeat(42));
    for entry in &report.by_service {
        println!(
            "{:<20} {:>12} {:>8}",
            truncate(&entry.category, 20),
            format_amount(entry.total),
            entry.count
        );
    }
    println!("{}", "-".repeat(42));
    println!("{:<20} {:>12}", "Total", format_amount(report.total));
    println!("{:<20} {:>12}", "GST collected", format_amount(report.gst_total));

    if !report.by_method.is_empty() {
        println!();
        println!("{:<20} {:>12} {:>8}", "METHOD", "TOTAL", "COUNT");
        println!("{}", "-".repeat(42));
        for entry in &report.by_method {
            println!(
                "{:<20} {:>12} {:>8}",
                truncate(&entry.category, 20),
                format_amount(entry.total),
                entry.count
            );
        }
    }

    render_trend(&report.series);
}

fn render_expense_table(report: &ExpenseReport) {
    println!("Expense Report");
    println!("Period: {}", report.range);
    println!();
    println!("{:<20} {:>12} {:>8}", "PURPOSE", "TOTAL", "COUNT");
    println!("{}", "-".repeat(42));
    for entry in &report.by_purpose {
        println!(
            "{:<20} {:>12} {:>8}",
            truncate(&entry.category, 20),
            format_amount(entry.total),
            entry.count
        );
    }
    println!("{}", "-".repeat(42));
    println!("{:<20} {:>12}", "Total", format_amount(report.total));

    render_trend(&report.series);
}

fn render_summary_table(summary: &FinancialSummary) {
    println!("Financial Summary");
    println!("Period: {}", summary.range);
    println!();
    println!("Total Revenue:   {:>12}", format_amount(summary.revenue.total));
    println!("  GST collected: {:>12}", format_amount(summary.revenue.gst_total));
    println!("Total Expenses:  {:>12}", format_amount(summary.expenses.total));
    println!("{}", "-".repeat(30));
    println!("Net Profit:      {:>12}", format_amount(summary.net_profit));
}

fn render_trend(series: &[TrendPoint]) {
    if series.is_empty() {
        return;
    }
    println!();
    println!("{:<10} {:>12} {:>14}", "PERIOD", "CURRENT", "PREV MONTH");
    println!("{}", "-".repeat(38));
    for point in series {
        println!(
            "{:<10} {:>12} {:>14}",
            point.label,
            format_amount(point.current),
            format_amount(point.previous)
        );
    }
}

fn render_page_strip<T>(paged: &Paged<T>) {
    if paged.total_pages <= 1 {
        return;
    }
    let strip: Vec<String> = paged
        .window()
        .into_iter()
        .map(|item| match item {
            PageItem::Page(number) if number == paged.page => format!("[{}]", number),
            PageItem::Page(number) => number.to_string(),
            PageItem::Ellipsis => "…".to_string(),
        })
        .collect();
    println!();
    println!(
        "Page {} of {} ({} total)  {}",
        paged.page,
        paged.total_pages,
        paged.total_items,
        strip.join(" ")
    );
}

fn print_fetch_warnings(service: &StudioService) {
    for warning in service.fetch_warnings() {
        eprintln!("warning: {} fetch failed: {}", warning.key, warning.error);
    }
}

/// Parse an optional from/to pair into an inclusive range. With no `from`
/// the range starts on the first of `to`'s month; with no `to` it ends today.
fn parse_range(from: Option<String>, to: Option<String>) -> Result<DateRange> {
    let end = match to {
        Some(raw) => parse_day(&raw)?,
        None => Local::now().date_naive(),
    };
    let range = match from {
        Some(raw) => {
            let start = parse_day(&raw)?;
            DateRange::new(start, end).map_err(|err| AppError::InvalidDateRange(err.to_string()))?
        }
        None => DateRange::month_to_date(end),
    };
    Ok(range)
}

fn parse_day(raw: &str) -> Result<NaiveDate> {
    let day = day_from_str(raw).ok_or_else(|| AppError::InvalidDate(raw.to_string()))?;
    Ok(day)
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

fn day_or_dash(day: Option<NaiveDate>) -> String {
    day.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string())
}
