use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::io::Write;

use crate::application::StudioService;
use crate::domain::{AdvanceBooking, ConsentForm, Customer, DateRange, Expense, Lead, Payment};

/// Full snapshot of every collection for JSON export.
#[derive(Debug, Clone, Serialize)]
pub struct StudioSnapshot {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub customers: Vec<Customer>,
    pub payments: Vec<Payment>,
    pub expenses: Vec<Expense>,
    pub bookings: Vec<AdvanceBooking>,
    pub consents: Vec<ConsentForm>,
    pub leads: Vec<Lead>,
}

/// Exporter for converting studio data to various formats
pub struct Exporter<'a> {
    service: &'a StudioService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a StudioService) -> Self {
        Self { service }
    }

    /// Export customers to CSV format
    pub async fn export_customers_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let customers = self.service.list_all_customers().await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        // Write header
        csv_writer.write_record(&[
            "id",
            "name",
            "phone",
            "email",
            "date_of_birth",
            "created_at",
        ])?;

        let mut count = 0;
        for customer in &customers {
            csv_writer.write_record(&[
                customer.id.clone(),
                customer.name.clone().unwrap_or_default(),
                customer.phone_number.clone().unwrap_or_default(),
                customer.email.clone().unwrap_or_default(),
                day_cell(customer.date_of_birth),
                day_cell(customer.created_at),
            ])?;
            count += 1;
        }

        csv_writer.flush()?;
        Ok(count)
    }

    /// Export payments to CSV format
    pub async fn export_payments_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let payments = self.service.list_all_payments().await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        // Write header
        csv_writer.write_record(&[
            "id",
            "date",
            "customer",
            "service",
            "method",
            "amount_paise",
            "gst_paise",
            "invoice_ref",
        ])?;

        let mut count = 0;
        for payment in &payments {
            csv_writer.write_record(&[
                payment.id.clone(),
                day_cell(payment.payment_date),
                payment.customer_name.clone().unwrap_or_default(),
                payment.category().as_str().to_string(),
                payment.method_label().to_string(),
                payment.amount_paise().to_string(),
                payment.gst_paise().to_string(),
                payment.invoice_ref.clone().unwrap_or_default(),
            ])?;
            count += 1;
        }

        csv_writer.flush()?;
        Ok(count)
    }

    /// Export the merged consent forms to CSV format
    pub async fn export_consents_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let forms = self.service.merged_consents().await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        // Write header
        csv_writer.write_record(&[
            "id",
            "type",
            "date",
            "customer",
            "artist",
            "detail",
            "health_flagged",
        ])?;

        let mut count = 0;
        for form in &forms {
            csv_writer.write_record(&[
                form.id().to_string(),
                form.kind().as_str().to_string(),
                day_cell(form.effective_date()),
                form.customer_name().unwrap_or_default().to_string(),
                form.artist().unwrap_or_default().to_string(),
                form.detail(),
                form.health().any_flagged().to_string(),
            ])?;
            count += 1;
        }

        csv_writer.flush()?;
        Ok(count)
    }

    /// Export advance bookings to CSV format
    pub async fn export_bookings_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let bookings = self.service.list_all_bookings().await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        // Write header
        csv_writer.write_record(&[
            "id",
            "appointment_date",
            "customer",
            "service",
            "advance_paise",
            "due_paise",
            "fulfilled",
        ])?;

        let mut count = 0;
        for booking in &bookings {
            csv_writer.write_record(&[
                booking.id.clone(),
                day_cell(booking.appointment_date),
                booking.customer_name.clone().unwrap_or_default(),
                booking.service.clone().unwrap_or_default(),
                booking.advance_paise().to_string(),
                booking.due_paise().to_string(),
                booking.fulfilled.to_string(),
            ])?;
            count += 1;
        }

        csv_writer.flush()?;
        Ok(count)
    }

    /// Export the revenue report's category breakdowns to CSV format
    pub async fn export_revenue_csv<W: Write>(
        &self,
        range: DateRange,
        writer: W,
    ) -> Result<usize> {
        let report = self.service.get_revenue_report(range).await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        // Write header
        csv_writer.write_record(&["group", "category", "total_paise", "records"])?;

        let mut count = 0;
        for entry in &report.by_service {
            csv_writer.write_record(&[
                "service".to_string(),
                entry.category.clone(),
                entry.total.to_string(),
                entry.count.to_string(),
            ])?;
            count += 1;
        }
        for entry in &report.by_method {
            csv_writer.write_record(&[
                "method".to_string(),
                entry.category.clone(),
                entry.total.to_string(),
                entry.count.to_string(),
            ])?;
            count += 1;
        }

        csv_writer.flush()?;
        Ok(count)
    }

    /// Export every collection as a JSON snapshot
    pub async fn export_full_json<W: Write>(&self, mut writer: W) -> Result<StudioSnapshot> {
        let customers = self.service.list_all_customers().await?;
        let payments = self.service.list_all_payments().await?;
        let expenses = self.service.list_all_expenses().await?;
        let bookings = self.service.list_all_bookings().await?;
        let consents = self.service.merged_consents().await?;
        let leads = self.service.list_all_leads().await?;

        let snapshot = StudioSnapshot {
            version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: Utc::now(),
            customers,
            payments,
            expenses,
            bookings,
            consents,
            leads,
        };

        let json = serde_json::to_string_pretty(&snapshot)?;
        writer.write_all(json.as_bytes())?;
        writer.flush()?;

        Ok(snapshot)
    }
}

fn day_cell(day: Option<NaiveDate>) -> String {
    day.map(|d| d.to_string()).unwrap_or_default()
}
