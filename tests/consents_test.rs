mod common;

use anyhow::Result;
use common::{StudioData, day, stub_service};
use inkdesk::domain::ConsentKind;

#[tokio::test]
async fn test_merged_consents_interleave_newest_first() -> Result<()> {
    let (service, source) = stub_service();
    StudioData::seed_all(&source);

    let forms = service.merged_consents().await?;
    let ids: Vec<&str> = forms.iter().map(|form| form.id()).collect();
    assert_eq!(ids, ["pc1", "t1", "t2", "pc2"]);

    let kinds: Vec<ConsentKind> = forms.iter().map(|form| form.kind()).collect();
    assert_eq!(
        kinds,
        [
            ConsentKind::Piercing,
            ConsentKind::Tattoo,
            ConsentKind::Tattoo,
            ConsentKind::Piercing,
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_form_without_timestamp_falls_back_to_service_date() -> Result<()> {
    let (service, source) = stub_service();
    StudioData::seed_all(&source);

    let forms = service.merged_consents().await?;
    let t2 = forms.iter().find(|form| form.id() == "t2").unwrap();

    // t2 carries no createdAt; its date field places it on the timeline
    assert_eq!(t2.effective_date(), Some(day("2024-04-15")));
    Ok(())
}

#[tokio::test]
async fn test_health_flags_surface_on_merged_forms() -> Result<()> {
    let (service, source) = stub_service();
    StudioData::seed_all(&source);

    let forms = service.merged_consents().await?;
    let t1 = forms.iter().find(|form| form.id() == "t1").unwrap();
    let t2 = forms.iter().find(|form| form.id() == "t2").unwrap();

    assert!(!t1.health().any_flagged());
    assert!(t2.health().any_flagged());
    Ok(())
}

#[tokio::test]
async fn test_consent_listing_filters_by_kind() -> Result<()> {
    let (service, source) = stub_service();
    StudioData::seed_all(&source);

    let tattoos = service.list_consents(Some(ConsentKind::Tattoo), 1).await?;
    assert_eq!(tattoos.total_items, 2);
    assert!(
        tattoos
            .items
            .iter()
            .all(|form| form.kind() == ConsentKind::Tattoo)
    );

    let piercings = service.list_consents(Some(ConsentKind::Piercing), 1).await?;
    assert_eq!(piercings.total_items, 2);

    let all = service.list_consents(None, 1).await?;
    assert_eq!(all.total_items, 4);
    Ok(())
}

#[tokio::test]
async fn test_consent_detail_reads_per_kind() -> Result<()> {
    let (service, source) = stub_service();
    StudioData::seed_all(&source);

    let forms = service.merged_consents().await?;
    let t1 = forms.iter().find(|form| form.id() == "t1").unwrap();
    let pc1 = forms.iter().find(|form| form.id() == "pc1").unwrap();

    assert_eq!(t1.detail(), "Left forearm");
    assert_eq!(pc1.detail(), "Ear / Helix");
    assert_eq!(pc1.customer_name(), Some("Priya Nair"));
    assert_eq!(pc1.artist(), Some("Sana"));
    Ok(())
}
