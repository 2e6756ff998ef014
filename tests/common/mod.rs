// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use inkdesk::application::StudioService;
use inkdesk::storage::{CollectionSource, FetchError, ResourceKey};
use serde_json::{Value, json};

/// In-memory stand-in for the studio backend. Each collection serves
/// whatever JSON it was seeded with; fetches are counted and can be made to
/// fail per key.
pub struct StubSource {
    collections: Mutex<HashMap<ResourceKey, Vec<Value>>>,
    fetch_counts: Mutex<HashMap<ResourceKey, usize>>,
    failures: Mutex<HashMap<ResourceKey, FetchError>>,
    fetch_delay: Mutex<Option<Duration>>,
    next_id: Mutex<usize>,
}

impl StubSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            collections: Mutex::new(HashMap::new()),
            fetch_counts: Mutex::new(HashMap::new()),
            failures: Mutex::new(HashMap::new()),
            fetch_delay: Mutex::new(None),
            next_id: Mutex::new(0),
        })
    }

    pub fn seed(&self, key: ResourceKey, records: Vec<Value>) {
        self.collections.lock().unwrap().insert(key, records);
    }

    /// Make every fetch of `key` fail until `clear_failure`.
    pub fn fail_with(&self, key: ResourceKey, error: FetchError) {
        self.failures.lock().unwrap().insert(key, error);
    }

    pub fn clear_failure(&self, key: ResourceKey) {
        self.failures.lock().unwrap().remove(&key);
    }

    /// Delay every fetch, to widen the window in concurrency tests.
    pub fn set_fetch_delay(&self, delay: Duration) {
        *self.fetch_delay.lock().unwrap() = Some(delay);
    }

    pub fn fetch_count(&self, key: ResourceKey) -> usize {
        self.fetch_counts
            .lock()
            .unwrap()
            .get(&key)
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait]
impl CollectionSource for StubSource {
    async fn fetch_collection(&self, key: ResourceKey) -> Result<Vec<Value>, FetchError> {
        let delay = *self.fetch_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        *self.fetch_counts.lock().unwrap().entry(key).or_insert(0) += 1;
        if let Some(error) = self.failures.lock().unwrap().get(&key) {
            return Err(error.clone());
        }
        Ok(self
            .collections
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .unwrap_or_default())
    }

    async fn create_record(&self, key: ResourceKey, body: Value) -> Result<Value, FetchError> {
        let id = {
            let mut next = self.next_id.lock().unwrap();
            *next += 1;
            format!("gen-{}", *next)
        };
        let mut stored = body;
        if let Value::Object(ref mut fields) = stored {
            fields.insert("id".into(), Value::String(id));
        }
        self.collections
            .lock()
            .unwrap()
            .entry(key)
            .or_default()
            .push(stored.clone());
        Ok(stored)
    }

    async fn update_record(
        &self,
        key: ResourceKey,
        id: &str,
        patch: Value,
    ) -> Result<Value, FetchError> {
        let mut collections = self.collections.lock().unwrap();
        let records = collections.entry(key).or_default();
        for record in records.iter_mut() {
            if record.get("id").and_then(Value::as_str) == Some(id) {
                if let (Value::Object(fields), Value::Object(changes)) = (&mut *record, &patch) {
                    for (field, value) in changes {
                        fields.insert(field.clone(), value.clone());
                    }
                }
                return Ok(record.clone());
            }
        }
        Err(FetchError::Status {
            status: 404,
            url: format!("{}/{}", key.endpoint(), id),
        })
    }
}

/// Helper to create a service wired to a fresh stub backend.
pub fn stub_service() -> (StudioService, Arc<StubSource>) {
    let source = StubSource::new();
    let service = StudioService::new(source.clone());
    (service, source)
}

/// Helper to parse a date string into NaiveDate
pub fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// Test fixture: a small studio dataset centered on May 2024.
pub struct StudioData;

impl StudioData {
    pub fn customers() -> Vec<Value> {
        vec![
            json!({
                "id": "c1",
                "name": "Asha Rao",
                "phoneNumber": "9876500001",
                "email": "asha@example.com",
                "dateOfBirth": "1996-05-18",
                "createdAt": "2024-01-10"
            }),
            json!({
                "id": "c2",
                "name": "Vikram Shetty",
                "phoneNumber": "9876500002",
                "dateOfBirth": "1990-12-30",
                "createdAt": "2024-02-04"
            }),
            json!({
                "id": "c3",
                "name": "Priya Nair",
                "email": "priya@example.com",
                "createdAt": "2024-03-22"
            }),
        ]
    }

    pub fn payments() -> Vec<Value> {
        vec![
            json!({
                "id": "p1",
                "customerId": "c1",
                "customerName": "Asha Rao",
                "paymentDate": "2024-05-03",
                "amount": 5000,
                "gst": 900,
                "paymentType": "UPI",
                "serviceType": "tattoo",
                "invoiceRef": "INV-101"
            }),
            json!({
                "id": "p2",
                "customerId": "c2",
                "customerName": "Vikram Shetty",
                "paymentDate": "2024-05-10",
                "amount": 1500,
                "gst": 270,
                "paymentType": "Cash",
                "serviceType": "piercing"
            }),
            json!({
                "id": "p3",
                "customerId": "c1",
                "customerName": "Asha Rao",
                "paymentDate": "2024-04-28",
                "amount": 2000,
                "gst": 360,
                "paymentType": "UPI",
                "serviceType": "tattoo"
            }),
        ]
    }

    pub fn expenses() -> Vec<Value> {
        vec![
            json!({
                "id": "e1",
                "expenseDate": "2024-05-02",
                "amount": 1200,
                "purpose": "Ink stock",
                "paymentMethod": "UPI"
            }),
            json!({
                "id": "e2",
                "expenseDate": "2024-05-15",
                "amount": 800,
                "purpose": "Needles",
                "paymentMethod": "Cash"
            }),
        ]
    }

    pub fn bookings() -> Vec<Value> {
        vec![
            json!({
                "id": "b1",
                "customerId": "c2",
                "customerName": "Vikram Shetty",
                "appointmentDate": "2024-05-25",
                "advanceAmount": 500,
                "dueAmount": 1500,
                "service": "tattoo",
                "fulfilled": false
            }),
            json!({
                "id": "b2",
                "customerName": "Walk-in",
                "appointmentDate": "2024-05-08",
                "advanceAmount": 300,
                "dueAmount": 0,
                "fulfilled": true
            }),
        ]
    }

    pub fn tattoo_consents() -> Vec<Value> {
        vec![
            json!({
                "id": "t1",
                "customerId": "c1",
                "customerName": "Asha Rao",
                "artist": "Ravi",
                "location": "Left forearm",
                "createdAt": "2024-05-12",
                "allergies": "no",
                "medications": false
            }),
            json!({
                "id": "t2",
                "customerId": "c2",
                "customerName": "Vikram Shetty",
                "artist": "Ravi",
                "location": "Shoulder",
                "date": "2024-04-15",
                "allergies": "yes"
            }),
        ]
    }

    pub fn piercing_consents() -> Vec<Value> {
        vec![
            json!({
                "id": "pc1",
                "customerId": "c3",
                "customerName": "Priya Nair",
                "piercingType": "Ear",
                "subtype": "Helix",
                "artist": "Sana",
                "createdAt": "2024-05-20",
                "pregnancyNursing": false
            }),
            json!({
                "id": "pc2",
                "customerName": "Divya",
                "piercingType": "Nose",
                "artist": "Sana",
                "createdAt": "2024-03-02"
            }),
        ]
    }

    pub fn leads() -> Vec<Value> {
        vec![
            json!({
                "id": "l1",
                "name": "Meera Pillai",
                "phoneNumber": "9876500003",
                "source": "Instagram",
                "status": "new",
                "createdAt": "2024-05-19"
            }),
            json!({
                "id": "l2",
                "name": "Rahul Dev",
                "source": "Walk-in",
                "status": "Contacted",
                "createdAt": "2024-05-11"
            }),
            json!({
                "id": "l3",
                "name": "Sneha K",
                "source": "Referral",
                "status": "converted",
                "createdAt": "2024-04-30"
            }),
        ]
    }

    /// Seed every collection.
    pub fn seed_all(source: &StubSource) {
        source.seed(ResourceKey::Customers, Self::customers());
        source.seed(ResourceKey::Payments, Self::payments());
        source.seed(ResourceKey::Expenses, Self::expenses());
        source.seed(ResourceKey::AdvancePayments, Self::bookings());
        source.seed(ResourceKey::TattooConsents, Self::tattoo_consents());
        source.seed(ResourceKey::PiercingConsents, Self::piercing_consents());
        source.seed(ResourceKey::Leads, Self::leads());
    }
}
