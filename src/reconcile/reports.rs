//! Read-only projections over the payment record set
//!
//! These never mutate state; the reconciler loads the full record set and
//! hands it to the pure functions here.

use bigdecimal::BigDecimal;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::types::{MatchOrigin, PaymentMethod, PaymentRecord, PaymentStatus};

/// Filters for the payment history listing; all optional, combined with AND
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryFilter {
    pub client_id: Option<String>,
    pub method: Option<PaymentMethod>,
    pub status: Option<PaymentStatus>,
    /// Inclusive lower bound on the receipt date
    pub date_from: Option<NaiveDate>,
    /// Inclusive upper bound on the receipt date
    pub date_to: Option<NaiveDate>,
}

/// Aggregate counts and sums for one calendar month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodStatistics {
    pub year: i32,
    pub month: u32,
    /// Payments received in the period
    pub received_count: usize,
    /// Sum of amounts received in the period
    pub received_total: BigDecimal,
    /// Payments with a client assigned (any origin)
    pub matched_count: usize,
    /// Auto-matches still waiting for confirmation
    pub pending_confirmation_count: usize,
    /// Payments forwarded to the agency
    pub remitted_count: usize,
    /// Sum of amounts forwarded to the agency
    pub remitted_total: BigDecimal,
    pub auto_matched_count: usize,
    pub manual_matched_count: usize,
}

/// Payments still waiting for a client assignment or its confirmation,
/// oldest first
pub fn pending_match(records: &[PaymentRecord]) -> Vec<PaymentRecord> {
    let mut out: Vec<PaymentRecord> = records
        .iter()
        .filter(|p| {
            matches!(
                p.status,
                PaymentStatus::Received | PaymentStatus::MatchedPendingConfirmation
            )
        })
        .cloned()
        .collect();
    out.sort_by(|a, b| a.received_at.cmp(&b.received_at));
    out
}

/// Confirmed payments whose premium has not yet been forwarded, oldest first
pub fn pending_remittance(records: &[PaymentRecord]) -> Vec<PaymentRecord> {
    let mut out: Vec<PaymentRecord> = records
        .iter()
        .filter(|p| p.status == PaymentStatus::Matched)
        .cloned()
        .collect();
    out.sort_by(|a, b| a.received_at.cmp(&b.received_at));
    out
}

/// Full history with optional filters, newest first
pub fn history(records: &[PaymentRecord], filter: &HistoryFilter) -> Vec<PaymentRecord> {
    let mut out: Vec<PaymentRecord> = records
        .iter()
        .filter(|p| {
            if let Some(ref client_id) = filter.client_id {
                if p.client_id.as_deref() != Some(client_id.as_str()) {
                    return false;
                }
            }
            if let Some(method) = filter.method {
                if p.method != method {
                    return false;
                }
            }
            if let Some(status) = filter.status {
                if p.status != status {
                    return false;
                }
            }
            let date = p.received_at.date();
            if let Some(from) = filter.date_from {
                if date < from {
                    return false;
                }
            }
            if let Some(to) = filter.date_to {
                if date > to {
                    return false;
                }
            }
            true
        })
        .cloned()
        .collect();
    out.sort_by(|a, b| b.received_at.cmp(&a.received_at));
    out
}

/// Aggregate statistics for the given calendar month, over receipt dates
pub fn period_statistics(records: &[PaymentRecord], year: i32, month: u32) -> PeriodStatistics {
    let in_period: Vec<&PaymentRecord> = records
        .iter()
        .filter(|p| p.received_at.year() == year && p.received_at.month() == month)
        .collect();

    let received_total: BigDecimal = in_period.iter().map(|p| p.amount.clone()).sum();
    let remitted: Vec<&&PaymentRecord> = in_period
        .iter()
        .filter(|p| p.status == PaymentStatus::Remitted)
        .collect();
    let remitted_total: BigDecimal = remitted.iter().map(|p| p.amount.clone()).sum();

    PeriodStatistics {
        year,
        month,
        received_count: in_period.len(),
        received_total,
        matched_count: in_period.iter().filter(|p| p.matched).count(),
        pending_confirmation_count: in_period
            .iter()
            .filter(|p| p.status == PaymentStatus::MatchedPendingConfirmation)
            .count(),
        remitted_count: remitted.len(),
        remitted_total,
        auto_matched_count: in_period
            .iter()
            .filter(|p| p.matched_by == MatchOrigin::Automatic)
            .count(),
        manual_matched_count: in_period
            .iter()
            .filter(|p| p.matched_by == MatchOrigin::Manual)
            .count(),
    }
}
