//! Core types and data structures for the reconciliation system

use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Payment rails a client can pay through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentMethod {
    Paypal,
    Zelle,
    Venmo,
    Wire,
    /// SPEI / domestic Mexican bank transfer
    BankTransferMx,
}

impl PaymentMethod {
    /// Stable lowercase identifier, matching the wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Paypal => "paypal",
            PaymentMethod::Zelle => "zelle",
            PaymentMethod::Venmo => "venmo",
            PaymentMethod::Wire => "wire",
            PaymentMethod::BankTransferMx => "bank-transfer-mx",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = ReconcileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "paypal" => Ok(PaymentMethod::Paypal),
            "zelle" => Ok(PaymentMethod::Zelle),
            "venmo" => Ok(PaymentMethod::Venmo),
            "wire" => Ok(PaymentMethod::Wire),
            "bank-transfer-mx" => Ok(PaymentMethod::BankTransferMx),
            other => Err(ReconcileError::Validation(format!(
                "Unknown payment method: '{}'",
                other
            ))),
        }
    }
}

/// How a payment got its client assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchOrigin {
    /// No assignment yet
    None,
    /// Matching engine scored the top candidate at or above the auto-match threshold
    Automatic,
    /// Operator assigned the client by hand
    Manual,
}

/// Lifecycle states of a payment record
///
/// Transitions only move forward; a record never returns to an earlier
/// state and `Remitted` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Initial state at receipt; may carry unconfirmed candidates
    Received,
    /// Auto-matched, waiting for operator confirmation
    MatchedPendingConfirmation,
    /// Match confirmed (or manually assigned) and ready to remit
    Matched,
    /// Funds forwarded to the agency; terminal
    Remitted,
}

impl PaymentStatus {
    /// Whether a transition from `self` to `next` is in the allowed table
    ///
    /// `Matched -> Matched` is permitted so that a manually matched payment
    /// can still go through ledger posting via confirmation.
    pub fn can_transition_to(&self, next: PaymentStatus) -> bool {
        use PaymentStatus::*;
        matches!(
            (self, next),
            (Received, MatchedPendingConfirmation)
                | (Received, Matched)
                | (MatchedPendingConfirmation, Matched)
                | (Matched, Matched)
                | (Matched, Remitted)
        )
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PaymentStatus::Received => "received",
            PaymentStatus::MatchedPendingConfirmation => "matched_pending_confirmation",
            PaymentStatus::Matched => "matched",
            PaymentStatus::Remitted => "remitted",
        };
        f.write_str(s)
    }
}

/// One scored candidate produced by the matching engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate {
    /// Candidate client
    pub client_id: String,
    /// Client display name, for operator review
    pub display_name: String,
    /// Client's social-security enrollment number
    pub identifying_number: String,
    /// Client's monthly billed amount
    pub billed_amount: BigDecimal,
    /// Combined score of the matched signals, capped at 100
    pub confidence: u8,
    /// Human-readable names of the signals that fired, in rule order
    pub reasons: Vec<String>,
}

/// One incoming payment, from receipt through remittance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    /// Unique identifier for the payment
    pub id: String,
    /// When the funds actually arrived
    pub received_at: NaiveDateTime,
    /// When the record was registered in the system
    pub registered_at: NaiveDateTime,
    /// Payment rail used
    pub method: PaymentMethod,
    /// Amount received
    pub amount: BigDecimal,
    /// ISO currency code
    pub currency: String,
    /// Free-text reference from the payment channel
    pub reference: Option<String>,
    /// Free-text note from the sender
    pub note: Option<String>,
    /// Attachment proving receipt (path or URL)
    pub proof: Option<String>,
    /// Sender-supplied name as seen on the payment
    pub sender_name: Option<String>,
    /// Sender-supplied email
    pub sender_email: Option<String>,
    /// Sender-supplied phone
    pub sender_phone: Option<String>,
    /// Assigned client, once matched
    pub client_id: Option<String>,
    /// Whether a client has been assigned
    pub matched: bool,
    /// Automatic, manual, or not yet matched
    pub matched_by: MatchOrigin,
    /// When the assignment happened
    pub matched_at: Option<NaiveDateTime>,
    /// Match certainty in [0, 100]
    pub confidence: u8,
    /// Ranked candidates from the last scoring run, at most five
    pub candidates: Vec<MatchCandidate>,
    /// Current lifecycle state
    pub status: PaymentStatus,
    /// Agency voucher or folio reference
    pub agency_reference: Option<String>,
    /// When the premium was forwarded to the agency
    pub remitted_at: Option<NaiveDateTime>,
    /// Attachment proving the remittance
    pub remittance_proof: Option<String>,
    /// Clearing-line code printed on the agency voucher
    pub clearing_line: Option<String>,
    /// Bank the remittance was paid from
    pub bank: Option<String>,
    /// Optimistic-concurrency version, bumped by the store on every update
    pub version: u64,
}

impl PaymentRecord {
    /// Create a record in the initial `Received` state
    pub fn new(
        method: PaymentMethod,
        amount: BigDecimal,
        currency: String,
        received_at: NaiveDateTime,
    ) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            received_at,
            registered_at: now,
            method,
            amount,
            currency,
            reference: None,
            note: None,
            proof: None,
            sender_name: None,
            sender_email: None,
            sender_phone: None,
            client_id: None,
            matched: false,
            matched_by: MatchOrigin::None,
            matched_at: None,
            confidence: 0,
            candidates: Vec::new(),
            status: PaymentStatus::Received,
            agency_reference: None,
            remitted_at: None,
            remittance_proof: None,
            clearing_line: None,
            bank: None,
            version: 0,
        }
    }

    /// Move to `next`, rejecting any transition outside the allowed table
    pub fn transition_to(&mut self, next: PaymentStatus) -> ReconcileResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(ReconcileError::InvalidState(format!(
                "Payment '{}' cannot move from {} to {}",
                self.id, self.status, next
            )));
        }
        self.status = next;
        Ok(())
    }
}

/// A client account as supplied by the client directory
///
/// Consumed, not owned: the directory is the source of truth for these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientAccount {
    /// Unique identifier for the client
    pub id: String,
    /// Whether the client is active (suspended clients are never scored)
    pub active: bool,
    /// Monthly billed amount
    pub billed_amount: BigDecimal,
    /// Display name
    pub display_name: String,
    /// Social-security enrollment number
    pub identifying_number: String,
    /// Contact email
    pub email: Option<String>,
    /// Primary phone
    pub phone: Option<String>,
    /// WhatsApp phone, if different from primary
    pub whatsapp_phone: Option<String>,
    /// Rail the client said they would pay through
    pub preferred_method: Option<PaymentMethod>,
    /// Email registered with PayPal
    pub paypal_email: Option<String>,
    /// Email registered with Zelle
    pub zelle_email: Option<String>,
    /// Phone registered with Zelle
    pub zelle_phone: Option<String>,
}

/// One entry in the agency-remittance ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemittanceEntry {
    /// Payment this remittance settles
    pub payment_id: String,
    /// Client the payment was matched to
    pub client_id: Option<String>,
    /// Agency voucher or folio reference
    pub agency_reference: String,
    /// When the premium was forwarded
    pub remitted_at: NaiveDateTime,
    /// Amount forwarded
    pub amount: BigDecimal,
    /// ISO currency code
    pub currency: String,
    /// Clearing-line code from the agency voucher
    pub clearing_line: Option<String>,
    /// Bank the remittance was paid from
    pub bank: Option<String>,
    /// Attachment proving the remittance
    pub proof: Option<String>,
}

/// Errors that can occur in the reconciliation system
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid state: {0}")]
    InvalidState(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Ledger error: {0}")]
    Ledger(String),
    #[error("Conflict: {0}")]
    Conflict(String),
}

/// Result type for reconciliation operations
pub type ReconcileResult<T> = Result<T, ReconcileError>;

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;

    fn record() -> PaymentRecord {
        PaymentRecord::new(
            PaymentMethod::Zelle,
            BigDecimal::from(35),
            "USD".to_string(),
            chrono::Utc::now().naive_utc(),
        )
    }

    #[test]
    fn new_record_starts_received_and_unmatched() {
        let r = record();
        assert_eq!(r.status, PaymentStatus::Received);
        assert!(!r.matched);
        assert_eq!(r.matched_by, MatchOrigin::None);
        assert_eq!(r.confidence, 0);
        assert!(r.candidates.is_empty());
        assert_eq!(r.version, 0);
    }

    #[test]
    fn transition_table_rejects_backward_moves() {
        let mut r = record();
        r.transition_to(PaymentStatus::MatchedPendingConfirmation)
            .unwrap();
        r.transition_to(PaymentStatus::Matched).unwrap();
        r.transition_to(PaymentStatus::Remitted).unwrap();

        // Terminal: nothing moves out of Remitted
        assert!(r.transition_to(PaymentStatus::Matched).is_err());
        assert!(r.transition_to(PaymentStatus::Received).is_err());
    }

    #[test]
    fn received_cannot_jump_to_remitted() {
        let mut r = record();
        let err = r.transition_to(PaymentStatus::Remitted).unwrap_err();
        assert!(matches!(err, ReconcileError::InvalidState(_)));
        assert_eq!(r.status, PaymentStatus::Received);
    }

    #[test]
    fn method_round_trips_through_str() {
        for m in [
            PaymentMethod::Paypal,
            PaymentMethod::Zelle,
            PaymentMethod::Venmo,
            PaymentMethod::Wire,
            PaymentMethod::BankTransferMx,
        ] {
            assert_eq!(m.as_str().parse::<PaymentMethod>().unwrap(), m);
        }
        assert!("cash-app".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn serde_uses_kebab_case_methods() {
        let json = serde_json::to_string(&PaymentMethod::BankTransferMx).unwrap();
        assert_eq!(json, "\"bank-transfer-mx\"");
    }
}
