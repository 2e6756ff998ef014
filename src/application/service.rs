use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tokio::task::JoinHandle;
use tracing::warn;

use crate::domain::{
    AdvanceBooking, BirthdayCandidate, ConsentForm, ConsentKind, Customer, DateRange, Expense,
    Lead, LeadStatus, NewBooking, Paged, Payment, PiercingConsent, TattooConsent,
    cmp_recent_first, cmp_soonest_first, merge_consent_forms, paginate, upcoming_birthdays,
};
use crate::storage::{ApiClient, CollectionSource, FetchError, ResourceCache, ResourceKey};

use super::AppError;
use super::reporting::{
    ExpenseReport, FinancialSummary, RevenueReport, expense_report, financial_summary,
    revenue_report,
};

/// Rows per page in paginated listings.
pub const LISTING_PAGE_SIZE: usize = 10;

/// Application service providing high-level operations over the studio's
/// remote collections. This is the primary interface for any client (CLI,
/// exporter, TUI, etc.).
pub struct StudioService {
    source: Arc<dyn CollectionSource>,
    cache: ResourceCache,
}

/// Everything the dashboard view renders in one pass.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardData {
    pub summary: FinancialSummary,
    pub pending_bookings: Vec<AdvanceBooking>,
    pub upcoming_birthdays: Vec<BirthdayCandidate>,
}

/// A collection that kept serving stale data after its last fetch failed.
#[derive(Debug, Clone)]
pub struct FetchWarning {
    pub key: ResourceKey,
    pub error: FetchError,
}

impl StudioService {
    /// Create a service over any collection source.
    pub fn new(source: Arc<dyn CollectionSource>) -> Self {
        let cache = ResourceCache::new(Arc::clone(&source));
        Self { source, cache }
    }

    /// Connect to the studio backend at `base_url`, optionally with a
    /// bearer token.
    pub fn connect(base_url: &str, token: Option<String>) -> Self {
        let mut client = ApiClient::new(base_url);
        if let Some(token) = token {
            client = client.with_token(token);
        }
        Self::new(Arc::new(client))
    }

    /// Fetch (or reuse) one collection and decode its records, dropping the
    /// ones that do not decode.
    async fn load<T: DeserializeOwned>(&self, key: ResourceKey) -> Result<Vec<T>, AppError> {
        let snapshot = self.cache.get_or_fetch(key, true).await?;
        Ok(decode_records(key, snapshot.records()))
    }

    // ========================
    // Customer operations
    // ========================

    /// All customers, newest first.
    pub async fn list_all_customers(&self) -> Result<Vec<Customer>, AppError> {
        let mut customers: Vec<Customer> = self.load(ResourceKey::Customers).await?;
        customers.sort_by(|a, b| cmp_recent_first(a.created_at, b.created_at));
        Ok(customers)
    }

    /// One page of customers, optionally filtered by a name/phone/email
    /// search.
    pub async fn list_customers(
        &self,
        query: Option<&str>,
        page: u32,
    ) -> Result<Paged<Customer>, AppError> {
        let mut customers = self.list_all_customers().await?;
        if let Some(query) = query {
            customers.retain(|customer| customer.matches(query));
        }
        Ok(paginate(&customers, page, LISTING_PAGE_SIZE))
    }

    /// Customers with a birthday in the next `lookahead_days` days, soonest
    /// first.
    pub async fn upcoming_birthdays(
        &self,
        today: NaiveDate,
        lookahead_days: i64,
    ) -> Result<Vec<BirthdayCandidate>, AppError> {
        let customers = self.list_all_customers().await?;
        Ok(upcoming_birthdays(&customers, today, lookahead_days))
    }

    // ========================
    // Consent operations
    // ========================

    /// Both consent collections merged into one sequence, newest first.
    pub async fn merged_consents(&self) -> Result<Vec<ConsentForm>, AppError> {
        let tattoo: Vec<TattooConsent> = self.load(ResourceKey::TattooConsents).await?;
        let piercing: Vec<PiercingConsent> = self.load(ResourceKey::PiercingConsents).await?;
        Ok(merge_consent_forms(tattoo, piercing))
    }

    /// One page of merged consent forms, optionally restricted to one kind.
    pub async fn list_consents(
        &self,
        kind: Option<ConsentKind>,
        page: u32,
    ) -> Result<Paged<ConsentForm>, AppError> {
        let mut forms = self.merged_consents().await?;
        if let Some(kind) = kind {
            forms.retain(|form| form.kind() == kind);
        }
        Ok(paginate(&forms, page, LISTING_PAGE_SIZE))
    }

    // ========================
    // Financial operations
    // ========================

    /// All payments, newest first.
    pub async fn list_all_payments(&self) -> Result<Vec<Payment>, AppError> {
        let mut payments: Vec<Payment> = self.load(ResourceKey::Payments).await?;
        payments.sort_by(|a, b| cmp_recent_first(a.payment_date, b.payment_date));
        Ok(payments)
    }

    /// One page of payments, optionally restricted to a date range.
    pub async fn list_payments(
        &self,
        range: Option<DateRange>,
        page: u32,
    ) -> Result<Paged<Payment>, AppError> {
        let mut payments = self.list_all_payments().await?;
        if let Some(range) = range {
            payments.retain(|payment| range.contains_opt(payment.payment_date));
        }
        Ok(paginate(&payments, page, LISTING_PAGE_SIZE))
    }

    /// All expenses, newest first.
    pub async fn list_all_expenses(&self) -> Result<Vec<Expense>, AppError> {
        let mut expenses: Vec<Expense> = self.load(ResourceKey::Expenses).await?;
        expenses.sort_by(|a, b| cmp_recent_first(a.expense_date, b.expense_date));
        Ok(expenses)
    }

    /// Revenue aggregated over `range`.
    pub async fn get_revenue_report(&self, range: DateRange) -> Result<RevenueReport, AppError> {
        let payments = self.list_all_payments().await?;
        Ok(revenue_report(&payments, range))
    }

    /// Expenses aggregated over `range`.
    pub async fn get_expense_report(&self, range: DateRange) -> Result<ExpenseReport, AppError> {
        let expenses = self.list_all_expenses().await?;
        Ok(expense_report(&expenses, range))
    }

    /// Revenue, expenses and net profit over `range`.
    pub async fn get_financial_summary(
        &self,
        range: DateRange,
    ) -> Result<FinancialSummary, AppError> {
        let payments = self.list_all_payments().await?;
        let expenses = self.list_all_expenses().await?;
        Ok(financial_summary(&payments, &expenses, range))
    }

    // ========================
    // Booking operations
    // ========================

    /// All advance bookings, soonest appointment first.
    pub async fn list_all_bookings(&self) -> Result<Vec<AdvanceBooking>, AppError> {
        let mut bookings: Vec<AdvanceBooking> = self.load(ResourceKey::AdvancePayments).await?;
        bookings.sort_by(|a, b| cmp_soonest_first(a.appointment_date, b.appointment_date));
        Ok(bookings)
    }

    /// One page of bookings; fulfilled ones are hidden unless asked for.
    pub async fn list_bookings(
        &self,
        include_fulfilled: bool,
        page: u32,
    ) -> Result<Paged<AdvanceBooking>, AppError> {
        let mut bookings = self.list_all_bookings().await?;
        if !include_fulfilled {
            bookings.retain(|booking| !booking.fulfilled);
        }
        Ok(paginate(&bookings, page, LISTING_PAGE_SIZE))
    }

    /// Record a new advance booking.
    pub async fn record_advance_booking(
        &self,
        booking: NewBooking,
    ) -> Result<AdvanceBooking, AppError> {
        // Validate amounts
        if booking.advance_amount <= 0 {
            return Err(AppError::InvalidAmount(
                "Advance amount must be positive".to_string(),
            ));
        }
        if booking.due_amount < 0 {
            return Err(AppError::InvalidAmount(
                "Due amount cannot be negative".to_string(),
            ));
        }

        let payload = serde_json::to_value(&booking).unwrap();
        let response = self
            .source
            .create_record(ResourceKey::AdvancePayments, payload)
            .await?;
        self.cache.invalidate(ResourceKey::AdvancePayments);

        // The backend's echo carries the assigned id; fall back to our own
        // payload if the echo is unusable.
        let created = serde_json::from_value::<AdvanceBooking>(response)
            .ok()
            .filter(|echo| !echo.id.is_empty())
            .unwrap_or(AdvanceBooking {
                id: String::new(),
                customer_id: booking.customer_id,
                customer_name: Some(booking.customer_name),
                appointment_date: Some(booking.appointment_date),
                advance_amount: Some(booking.advance_amount),
                due_amount: Some(booking.due_amount),
                service: booking.service,
                fulfilled: false,
            });
        Ok(created)
    }

    /// Mark a booking fulfilled. A booking is fulfilled exactly once;
    /// repeating the operation is an error.
    pub async fn fulfill_booking(&self, id: &str) -> Result<AdvanceBooking, AppError> {
        let bookings: Vec<AdvanceBooking> = self.load(ResourceKey::AdvancePayments).await?;
        let booking = bookings
            .into_iter()
            .find(|booking| booking.id == id)
            .ok_or_else(|| AppError::BookingNotFound(id.to_string()))?;

        if booking.fulfilled {
            return Err(AppError::BookingAlreadyFulfilled(id.to_string()));
        }

        let response = self
            .source
            .update_record(ResourceKey::AdvancePayments, id, json!({ "fulfilled": true }))
            .await?;
        self.cache.invalidate(ResourceKey::AdvancePayments);

        let updated = serde_json::from_value::<AdvanceBooking>(response)
            .ok()
            .filter(|echo| echo.id == id)
            .unwrap_or(AdvanceBooking {
                fulfilled: true,
                ..booking
            });
        Ok(updated)
    }

    // ========================
    // Lead operations
    // ========================

    /// All leads, newest first.
    pub async fn list_all_leads(&self) -> Result<Vec<Lead>, AppError> {
        let mut leads: Vec<Lead> = self.load(ResourceKey::Leads).await?;
        leads.sort_by(|a, b| cmp_recent_first(a.created_at, b.created_at));
        Ok(leads)
    }

    /// One page of leads, optionally restricted to one pipeline stage.
    pub async fn list_leads(
        &self,
        status: Option<LeadStatus>,
        page: u32,
    ) -> Result<Paged<Lead>, AppError> {
        let mut leads = self.list_all_leads().await?;
        if let Some(status) = status {
            leads.retain(|lead| lead.stage() == status);
        }
        Ok(paginate(&leads, page, LISTING_PAGE_SIZE))
    }

    // ========================
    // Dashboard & background refresh
    // ========================

    /// The combined dashboard view: financial summary over `range`, pending
    /// bookings and upcoming birthdays.
    pub async fn get_dashboard(
        &self,
        range: DateRange,
        today: NaiveDate,
        lookahead_days: i64,
    ) -> Result<DashboardData, AppError> {
        let payments = self.list_all_payments().await?;
        let expenses = self.list_all_expenses().await?;
        let summary = financial_summary(&payments, &expenses, range);

        let mut pending_bookings = self.list_all_bookings().await?;
        pending_bookings.retain(|booking| !booking.fulfilled);

        let customers = self.list_all_customers().await?;
        let upcoming = upcoming_birthdays(&customers, today, lookahead_days);

        Ok(DashboardData {
            summary,
            pending_bookings,
            upcoming_birthdays: upcoming,
        })
    }

    /// Enable the periodically-refreshed collections and spawn their
    /// refresher tasks.
    pub fn start_watch(&self) -> Vec<JoinHandle<()>> {
        let mut handles = Vec::new();
        for key in ResourceKey::all() {
            if let Some(handle) = self.cache.spawn_refresher(key) {
                self.cache.set_enabled(key, true);
                handles.push(handle);
            }
        }
        handles
    }

    /// Collections whose last fetch failed. Stale data keeps serving while
    /// these are outstanding.
    pub fn fetch_warnings(&self) -> Vec<FetchWarning> {
        ResourceKey::all()
            .into_iter()
            .filter_map(|key| {
                let snapshot = self.cache.peek(key);
                snapshot.error.map(|error| FetchWarning { key, error })
            })
            .collect()
    }
}

fn decode_records<T: DeserializeOwned>(key: ResourceKey, records: &[Value]) -> Vec<T> {
    records
        .iter()
        .filter_map(|record| match serde_json::from_value(record.clone()) {
            Ok(decoded) => Some(decoded),
            Err(err) => {
                warn!(key = %key, error = %err, "dropping record that does not decode");
                None
            }
        })
        .collect()
}
