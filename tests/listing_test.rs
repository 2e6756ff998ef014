mod common;

use anyhow::Result;
use common::{StudioData, day, stub_service};
use inkdesk::domain::{DateRange, LeadStatus, PageItem};
use inkdesk::storage::ResourceKey;
use serde_json::json;

#[tokio::test]
async fn test_customer_search_matches_name_and_phone() -> Result<()> {
    let (service, source) = stub_service();
    StudioData::seed_all(&source);

    let by_name = service.list_customers(Some("asha"), 1).await?;
    assert_eq!(by_name.items.len(), 1);
    assert_eq!(by_name.items[0].id, "c1");

    let by_phone = service.list_customers(Some("9876500001"), 1).await?;
    assert_eq!(by_phone.items.len(), 1);
    assert_eq!(by_phone.items[0].id, "c1");

    let no_match = service.list_customers(Some("zzz"), 1).await?;
    assert!(no_match.items.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_customers_sorted_newest_first() -> Result<()> {
    let (service, source) = stub_service();
    StudioData::seed_all(&source);

    let customers = service.list_all_customers().await?;
    let ids: Vec<&str> = customers.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, ["c3", "c2", "c1"]);
    Ok(())
}

#[tokio::test]
async fn test_listing_pages_clamp_out_of_range_requests() -> Result<()> {
    let (service, source) = stub_service();

    // 25 customers spread over three pages of ten
    let customers: Vec<_> = (1..=25)
        .map(|n| {
            json!({
                "id": format!("c{n}"),
                "name": format!("Customer {n:02}"),
                "createdAt": format!("2024-01-{:02}", n),
            })
        })
        .collect();
    source.seed(ResourceKey::Customers, customers);

    let first = service.list_customers(None, 1).await?;
    assert_eq!(first.total_pages, 3);
    assert_eq!(first.total_items, 25);
    assert_eq!(first.items.len(), 10);

    // Past-the-end requests land on the last page
    let clamped = service.list_customers(None, 99).await?;
    assert_eq!(clamped.page, 3);
    assert_eq!(clamped.items.len(), 5);

    // Page zero is treated as the first page
    let zero = service.list_customers(None, 0).await?;
    assert_eq!(zero.page, 1);
    assert_eq!(zero.items.len(), 10);
    Ok(())
}

#[tokio::test]
async fn test_page_window_marks_current_page() -> Result<()> {
    let (service, source) = stub_service();

    let customers: Vec<_> = (1..=95)
        .map(|n| json!({ "id": format!("c{n}"), "name": format!("Customer {n}") }))
        .collect();
    source.seed(ResourceKey::Customers, customers);

    let paged = service.list_customers(None, 5).await?;
    assert_eq!(paged.total_pages, 10);

    let window = paged.window();
    assert!(window.contains(&PageItem::Page(5)));
    assert!(window.contains(&PageItem::Page(1)));
    assert!(window.contains(&PageItem::Page(10)));
    assert!(window.contains(&PageItem::Ellipsis));
    Ok(())
}

#[tokio::test]
async fn test_payment_listing_respects_date_range() -> Result<()> {
    let (service, source) = stub_service();
    StudioData::seed_all(&source);

    let may = DateRange::new(day("2024-05-01"), day("2024-05-31")).unwrap();
    let paged = service.list_payments(Some(may), 1).await?;
    assert_eq!(paged.items.len(), 2);
    assert!(paged.items.iter().all(|p| p.id != "p3"));

    let unbounded = service.list_payments(None, 1).await?;
    assert_eq!(unbounded.items.len(), 3);
    Ok(())
}

#[tokio::test]
async fn test_payments_sorted_newest_first() -> Result<()> {
    let (service, source) = stub_service();
    StudioData::seed_all(&source);

    let payments = service.list_all_payments().await?;
    let ids: Vec<&str> = payments.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, ["p2", "p1", "p3"]);
    Ok(())
}

#[tokio::test]
async fn test_lead_listing_filters_by_stage() -> Result<()> {
    let (service, source) = stub_service();
    StudioData::seed_all(&source);

    let fresh = service.list_leads(Some(LeadStatus::New), 1).await?;
    assert_eq!(fresh.items.len(), 1);
    assert_eq!(fresh.items[0].id, "l1");

    // The stub stores "Contacted" with a capital C; stage parsing is loose
    let contacted = service.list_leads(Some(LeadStatus::Contacted), 1).await?;
    assert_eq!(contacted.items.len(), 1);
    assert_eq!(contacted.items[0].id, "l2");

    let all = service.list_leads(None, 1).await?;
    assert_eq!(all.items.len(), 3);
    Ok(())
}
