//! Traits for storage abstraction and external collaborators

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;

use crate::types::*;

/// Storage abstraction for the reconciliation record set
///
/// This trait allows the reconciliation core to work with any storage
/// backend (PostgreSQL, SQLite, in-memory, etc.) by implementing these
/// methods. Implementations must commit each record atomically
/// (replace-on-write): a crash mid-write leaves the previous consistent
/// snapshot intact.
#[async_trait]
pub trait ReconciliationStore: Send + Sync {
    /// Persist a new payment record
    async fn save_payment(&mut self, payment: &PaymentRecord) -> ReconcileResult<()>;

    /// Get a payment record by ID
    async fn get_payment(&self, payment_id: &str) -> ReconcileResult<Option<PaymentRecord>>;

    /// List all payment records
    async fn list_payments(&self) -> ReconcileResult<Vec<PaymentRecord>>;

    /// Update a payment record
    ///
    /// The update carries the version the caller read. An implementation
    /// must fail with [`ReconcileError::Conflict`] when the stored version
    /// differs, and bump the version on success. Returns the record as
    /// stored, with its new version.
    async fn update_payment(&mut self, payment: &PaymentRecord) -> ReconcileResult<PaymentRecord>;

    /// Append an entry to the agency-remittance ledger
    async fn append_remittance(&mut self, entry: &RemittanceEntry) -> ReconcileResult<()>;

    /// List all agency-remittance entries
    async fn list_remittances(&self) -> ReconcileResult<Vec<RemittanceEntry>>;
}

/// Directory of client accounts, owned by the client-management side
#[async_trait]
pub trait ClientDirectory: Send + Sync {
    /// All active client accounts, with their payment profiles
    async fn list_active_clients(&self) -> ReconcileResult<Vec<ClientAccount>>;

    /// Resolve one client by ID, active or not
    async fn get_client(&self, client_id: &str) -> ReconcileResult<Option<ClientAccount>>;
}

/// Payment to be appended to a client's history
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerPosting {
    pub client_id: String,
    pub amount: BigDecimal,
    pub currency: String,
    pub method: PaymentMethod,
    pub reference: Option<String>,
    pub date: NaiveDateTime,
    pub proof: Option<String>,
}

/// The client ledger, owned by the client-management side
///
/// Posting appends the payment to the client's history and clears the
/// client's current-period due flag. A failed post must leave the ledger
/// unchanged; the caller will not advance the reconciliation state.
#[async_trait]
pub trait ClientLedger: Send + Sync {
    /// Append a confirmed payment to the client's history
    ///
    /// Fails with [`ReconcileError::NotFound`] if the client is unknown.
    async fn post_payment(&mut self, posting: &LedgerPosting) -> ReconcileResult<()>;
}
