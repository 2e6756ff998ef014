mod common;

use anyhow::Result;
use common::{StudioData, day, stub_service};
use inkdesk::domain::DateRange;
use inkdesk::storage::{FetchError, ResourceKey};

#[tokio::test]
async fn test_dashboard_composes_summary_bookings_and_birthdays() -> Result<()> {
    let (service, source) = stub_service();
    StudioData::seed_all(&source);

    let may = DateRange::new(day("2024-05-01"), day("2024-05-31")).unwrap();
    let dashboard = service.get_dashboard(may, day("2024-05-14"), 15).await?;

    // Financials over May
    assert_eq!(dashboard.summary.revenue.total, 650000);
    assert_eq!(dashboard.summary.revenue.gst_total, 117000);
    assert_eq!(dashboard.summary.expenses.total, 200000);
    assert_eq!(dashboard.summary.net_profit, 450000);

    // Only the unfulfilled booking shows up
    assert_eq!(dashboard.pending_bookings.len(), 1);
    assert_eq!(dashboard.pending_bookings[0].id, "b1");

    // Asha's birthday (May 18) is four days out; the others are not in
    // window
    assert_eq!(dashboard.upcoming_birthdays.len(), 1);
    let candidate = &dashboard.upcoming_birthdays[0];
    assert_eq!(candidate.customer.id, "c1");
    assert_eq!(candidate.days_until, 4);
    assert_eq!(candidate.upcoming_anniversary, day("2024-05-18"));
    Ok(())
}

#[tokio::test]
async fn test_dashboard_only_fetches_what_it_renders() -> Result<()> {
    let (service, source) = stub_service();
    StudioData::seed_all(&source);

    let may = DateRange::new(day("2024-05-01"), day("2024-05-31")).unwrap();
    service.get_dashboard(may, day("2024-05-14"), 15).await?;
    service.get_dashboard(may, day("2024-05-14"), 15).await?;

    // Each collection the dashboard draws on was fetched exactly once
    assert_eq!(source.fetch_count(ResourceKey::Payments), 1);
    assert_eq!(source.fetch_count(ResourceKey::Expenses), 1);
    assert_eq!(source.fetch_count(ResourceKey::AdvancePayments), 1);
    assert_eq!(source.fetch_count(ResourceKey::Customers), 1);

    // Consents and leads are not part of the dashboard
    assert_eq!(source.fetch_count(ResourceKey::TattooConsents), 0);
    assert_eq!(source.fetch_count(ResourceKey::PiercingConsents), 0);
    assert_eq!(source.fetch_count(ResourceKey::Leads), 0);
    Ok(())
}

#[tokio::test]
async fn test_birthday_window_wraps_past_new_year() -> Result<()> {
    let (service, source) = stub_service();
    StudioData::seed_all(&source);

    // Vikram was born Dec 30; a late-December query still finds him
    let upcoming = service.upcoming_birthdays(day("2024-12-27"), 15).await?;
    assert_eq!(upcoming.len(), 1);
    assert_eq!(upcoming[0].customer.id, "c2");
    assert_eq!(upcoming[0].days_until, 3);

    // The window looks forward only: three days into January his birthday
    // is a year away again
    let upcoming = service.upcoming_birthdays(day("2025-01-02"), 15).await?;
    assert!(upcoming.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_failed_collection_degrades_instead_of_erroring() -> Result<()> {
    let (service, source) = stub_service();
    StudioData::seed_all(&source);
    source.fail_with(
        ResourceKey::Expenses,
        FetchError::Transport {
            url: "http://localhost:5000/api/expenses".to_string(),
            message: "connection refused".to_string(),
        },
    );

    let may = DateRange::new(day("2024-05-01"), day("2024-05-31")).unwrap();
    let dashboard = service.get_dashboard(may, day("2024-05-14"), 15).await?;

    // Revenue still renders; the failed collection contributes nothing
    assert_eq!(dashboard.summary.revenue.total, 650000);
    assert_eq!(dashboard.summary.expenses.total, 0);
    assert_eq!(dashboard.summary.net_profit, 650000);

    let warnings = service.fetch_warnings();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].key, ResourceKey::Expenses);

    // Once the backend recovers the numbers fill back in
    source.clear_failure(ResourceKey::Expenses);
    let dashboard = service.get_dashboard(may, day("2024-05-14"), 15).await?;
    assert_eq!(dashboard.summary.expenses.total, 200000);
    assert!(service.fetch_warnings().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_auth_failure_aborts_the_dashboard() -> Result<()> {
    let (service, source) = stub_service();
    StudioData::seed_all(&source);
    source.fail_with(ResourceKey::Payments, FetchError::Unauthorized { status: 401 });

    let may = DateRange::new(day("2024-05-01"), day("2024-05-31")).unwrap();
    let outcome = service.get_dashboard(may, day("2024-05-14"), 15).await;
    assert!(outcome.is_err());
    Ok(())
}
