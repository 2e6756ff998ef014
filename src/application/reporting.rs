use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{DateRange, Expense, Paise, Payment};

/// How many categories a compact breakdown shows individually.
pub const COMPACT_TOP_CATEGORIES: usize = 2;

#[derive(Debug, Clone, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Paise,
    pub count: usize,
}

/// One bucket of a trend chart: the bucket's value in the selected range and
/// in the same window one calendar month earlier.
#[derive(Debug, Clone, Serialize)]
pub struct TrendPoint {
    pub label: String,
    pub current: Paise,
    pub previous: Paise,
}

#[derive(Debug, Clone, Serialize)]
pub struct RevenueReport {
    pub range: DateRange,
    pub total: Paise,
    pub gst_total: Paise,
    /// Tattoo / Piercing / Other, descending by value.
    pub by_service: Vec<CategoryTotal>,
    /// Payment method groups, descending by value.
    pub by_method: Vec<CategoryTotal>,
    pub series: Vec<TrendPoint>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExpenseReport {
    pub range: DateRange,
    pub total: Paise,
    /// Purpose groups, descending by value.
    pub by_purpose: Vec<CategoryTotal>,
    pub series: Vec<TrendPoint>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FinancialSummary {
    pub range: DateRange,
    pub revenue: RevenueReport,
    pub expenses: ExpenseReport,
    pub net_profit: Paise,
}

/// Top categories shown individually, the rest folded into one remainder
/// that keeps their combined value, so totals still reconcile.
#[derive(Debug, Clone, Serialize)]
pub struct CompactBreakdown {
    pub top: Vec<CategoryTotal>,
    pub rest_count: usize,
    pub rest_total: Paise,
}

/// Aggregate payments over a date range.
///
/// Total over the functions here: a record with no parsable date simply
/// falls outside every range, a record with no parsable amount contributes
/// zero, and empty input produces a zero report.
pub fn revenue_report(payments: &[Payment], range: DateRange) -> RevenueReport {
    let in_range: Vec<&Payment> = payments
        .iter()
        .filter(|p| range.contains_opt(p.payment_date))
        .collect();

    let total = in_range.iter().map(|p| p.amount_paise()).sum();
    let gst_total = in_range.iter().map(|p| p.gst_paise()).sum();

    let by_service = group_totals(
        &in_range,
        |p| p.category().as_str().to_string(),
        |p| p.amount_paise(),
    );
    let by_method = group_totals(
        &in_range,
        |p| p.method_label().to_string(),
        |p| p.amount_paise(),
    );
    let series = trend_series(
        payments,
        range,
        |p| p.payment_date,
        |p| p.amount_paise(),
    );

    RevenueReport {
        range,
        total,
        gst_total,
        by_service,
        by_method,
        series,
    }
}

/// The expense-side parallel of [`revenue_report`], grouped by purpose.
pub fn expense_report(expenses: &[Expense], range: DateRange) -> ExpenseReport {
    let in_range: Vec<&Expense> = expenses
        .iter()
        .filter(|e| range.contains_opt(e.expense_date))
        .collect();

    let total = in_range.iter().map(|e| e.amount_paise()).sum();
    let by_purpose = group_totals(
        &in_range,
        |e| e.purpose_label().to_string(),
        |e| e.amount_paise(),
    );
    let series = trend_series(
        expenses,
        range,
        |e| e.expense_date,
        |e| e.amount_paise(),
    );

    ExpenseReport {
        range,
        total,
        by_purpose,
        series,
    }
}

/// Revenue and expenses over the same range, with net profit as their
/// algebraic difference (never re-derived from percentages).
pub fn financial_summary(
    payments: &[Payment],
    expenses: &[Expense],
    range: DateRange,
) -> FinancialSummary {
    let revenue = revenue_report(payments, range);
    let expense = expense_report(expenses, range);
    let net_profit = revenue.total - expense.total;
    FinancialSummary {
        range,
        revenue,
        expenses: expense,
        net_profit,
    }
}

/// Fold a descending category list into its top `keep` entries plus a
/// value-preserving remainder.
pub fn compact_breakdown(categories: &[CategoryTotal], keep: usize) -> CompactBreakdown {
    let top = categories.iter().take(keep).cloned().collect();
    let rest = &categories[categories.len().min(keep)..];
    CompactBreakdown {
        top,
        rest_count: rest.len(),
        rest_total: rest.iter().map(|c| c.total).sum(),
    }
}

/// Group records into labeled totals, descending by value. Labels compare
/// case-insensitively; the first spelling seen becomes the display label.
/// Ties keep first-seen order (the sort is stable).
fn group_totals<T>(
    records: &[&T],
    label_of: impl Fn(&T) -> String,
    amount_of: impl Fn(&T) -> Paise,
) -> Vec<CategoryTotal> {
    let mut groups: Vec<CategoryTotal> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for record in records {
        let label = label_of(record);
        let amount = amount_of(record);
        match index.get(&label.to_lowercase()) {
            Some(&i) => {
                groups[i].total += amount;
                groups[i].count += 1;
            }
            None => {
                index.insert(label.to_lowercase(), groups.len());
                groups.push(CategoryTotal {
                    category: label,
                    total: amount,
                    count: 1,
                });
            }
        }
    }

    groups.sort_by(|a, b| b.total.cmp(&a.total));
    groups
}

/// One trend point per bucket. Each bucket sums over the full record slice,
/// since the previous window reaches outside the selected range.
fn trend_series<T>(
    records: &[T],
    range: DateRange,
    date_of: impl Fn(&T) -> Option<NaiveDate>,
    amount_of: impl Fn(&T) -> Paise,
) -> Vec<TrendPoint> {
    range
        .buckets()
        .into_iter()
        .map(|bucket| TrendPoint {
            current: window_sum(records, bucket.current, &date_of, &amount_of),
            previous: window_sum(records, bucket.previous, &date_of, &amount_of),
            label: bucket.label,
        })
        .collect()
}

fn window_sum<T>(
    records: &[T],
    window: DateRange,
    date_of: &impl Fn(&T) -> Option<NaiveDate>,
    amount_of: &impl Fn(&T) -> Paise,
) -> Paise {
    records
        .iter()
        .filter(|r| window.contains_opt(date_of(r)))
        .map(amount_of)
        .sum()
}
