//! Main reconciler that drives the payment lifecycle
//!
//! Every mutating operation is a full read-modify-write: load the record,
//! apply exactly one state-machine transition, write it back through the
//! store's versioned update. Ledger posting happens before the status
//! commit, so a failed post leaves the record untouched.

use bigdecimal::BigDecimal;
use chrono::{Datelike, NaiveDateTime};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::matching::engine;
use crate::reconcile::reports::{self, HistoryFilter, PeriodStatistics};
use crate::traits::{ClientDirectory, ClientLedger, LedgerPosting, ReconciliationStore};
use crate::types::*;
use crate::utils::validation;

/// Input for registering an incoming payment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewPayment {
    pub method: Option<PaymentMethod>,
    pub amount: Option<BigDecimal>,
    /// Defaults to "USD" when absent
    pub currency: Option<String>,
    pub reference: Option<String>,
    pub proof: Option<String>,
    pub sender_name: Option<String>,
    pub sender_email: Option<String>,
    pub sender_phone: Option<String>,
    pub note: Option<String>,
    /// When the funds arrived; defaults to now
    pub received_at: Option<NaiveDateTime>,
}

/// Result of registering a payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiveOutcome {
    pub payment: PaymentRecord,
    pub auto_matched: bool,
    /// Ranked candidates from the scoring run, also stored on the record
    pub candidates: Vec<MatchCandidate>,
}

/// Result of a manual assignment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManualMatchOutcome {
    pub payment: PaymentRecord,
    pub client: ClientAccount,
}

/// Remittance metadata attached when the premium is forwarded
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemittanceDetails {
    pub agency_reference: String,
    /// Defaults to now
    pub remitted_at: Option<NaiveDateTime>,
    pub proof: Option<String>,
    pub clearing_line: Option<String>,
    pub bank: Option<String>,
}

/// Reconciliation orchestrator over a store, a client directory, and the
/// client ledger
pub struct Reconciler<S, D, L>
where
    S: ReconciliationStore,
    D: ClientDirectory,
    L: ClientLedger,
{
    store: S,
    directory: D,
    ledger: L,
}

impl<S, D, L> Reconciler<S, D, L>
where
    S: ReconciliationStore,
    D: ClientDirectory,
    L: ClientLedger,
{
    /// Create a new reconciler
    pub fn new(store: S, directory: D, ledger: L) -> Self {
        Self {
            store,
            directory,
            ledger,
        }
    }

    /// Register an incoming payment and score it against the active clients
    ///
    /// Fails with [`ReconcileError::Validation`] when the method or a
    /// positive amount is missing. On an auto-match the record moves to
    /// `MatchedPendingConfirmation`; otherwise it stays `Received` with
    /// the ranked candidates attached for operator review.
    pub async fn receive_payment(&mut self, input: NewPayment) -> ReconcileResult<ReceiveOutcome> {
        let method = input
            .method
            .ok_or_else(|| ReconcileError::Validation("Payment method is required".to_string()))?;
        let amount = input
            .amount
            .ok_or_else(|| ReconcileError::Validation("Payment amount is required".to_string()))?;
        validation::validate_positive_amount(&amount)?;
        let currency = validation::normalize_currency(input.currency.as_deref())?;

        let received_at = input
            .received_at
            .unwrap_or_else(|| chrono::Utc::now().naive_utc());
        let mut payment = PaymentRecord::new(method, amount, currency, received_at);
        payment.reference = input.reference;
        payment.proof = input.proof;
        payment.sender_name = input.sender_name;
        payment.sender_email = input.sender_email;
        payment.sender_phone = input.sender_phone;
        payment.note = input.note;

        let clients = self.directory.list_active_clients().await?;
        let outcome = engine::score(&payment, &clients);
        let auto_matched = outcome.auto_match.is_some();
        debug!(
            "payment {}: {} candidate(s), auto_match={}",
            payment.id,
            outcome.candidates.len(),
            auto_matched
        );

        payment.candidates = outcome.candidates.clone();
        if let Some(auto) = outcome.auto_match {
            payment.client_id = Some(auto.client_id.clone());
            payment.matched = true;
            payment.matched_by = MatchOrigin::Automatic;
            payment.matched_at = Some(chrono::Utc::now().naive_utc());
            payment.confidence = auto.confidence;
            payment.transition_to(PaymentStatus::MatchedPendingConfirmation)?;
            info!(
                "payment {} auto-matched to client {} at confidence {}",
                payment.id, auto.client_id, auto.confidence
            );
        } else {
            info!(
                "payment {} parked for review with {} candidate(s)",
                payment.id,
                payment.candidates.len()
            );
        }

        self.store.save_payment(&payment).await?;

        Ok(ReceiveOutcome {
            auto_matched,
            candidates: outcome.candidates,
            payment,
        })
    }

    /// Assign a client by hand, bypassing the confirmation step
    ///
    /// Fails with [`ReconcileError::NotFound`] when either id is unknown.
    /// Manual assignment always carries confidence 100.
    pub async fn manual_match(
        &mut self,
        payment_id: &str,
        client_id: &str,
    ) -> ReconcileResult<ManualMatchOutcome> {
        let mut payment = self.get_payment_required(payment_id).await?;
        let client = self
            .directory
            .get_client(client_id)
            .await?
            .ok_or_else(|| ReconcileError::NotFound(format!("Client '{}'", client_id)))?;

        payment.transition_to(PaymentStatus::Matched)?;
        payment.client_id = Some(client.id.clone());
        payment.matched = true;
        payment.matched_by = MatchOrigin::Manual;
        payment.matched_at = Some(chrono::Utc::now().naive_utc());
        payment.confidence = 100;

        let payment = self.store.update_payment(&payment).await?;
        info!(
            "payment {} manually matched to client {}",
            payment.id, client.id
        );
        Ok(ManualMatchOutcome { payment, client })
    }

    /// Confirm a pending match and post the payment to the client ledger
    ///
    /// The client is re-resolved at confirmation time; if it was removed
    /// since matching this fails with [`ReconcileError::NotFound`]. The
    /// ledger post must succeed before the status is committed.
    pub async fn confirm_match(&mut self, payment_id: &str) -> ReconcileResult<PaymentRecord> {
        let mut payment = self.get_payment_required(payment_id).await?;

        let client_id = match payment.client_id.clone() {
            Some(id) if payment.matched => id,
            _ => {
                return Err(ReconcileError::InvalidState(format!(
                    "Payment '{}' has no match to confirm",
                    payment_id
                )))
            }
        };
        if !payment.status.can_transition_to(PaymentStatus::Matched) {
            return Err(ReconcileError::InvalidState(format!(
                "Payment '{}' in status {} cannot be confirmed",
                payment_id, payment.status
            )));
        }

        let client = self
            .directory
            .get_client(&client_id)
            .await?
            .ok_or_else(|| {
                warn!(
                    "payment {} references client {} which no longer exists",
                    payment_id, client_id
                );
                ReconcileError::NotFound(format!("Client '{}'", client_id))
            })?;

        let posting = LedgerPosting {
            client_id: client.id.clone(),
            amount: payment.amount.clone(),
            currency: payment.currency.clone(),
            method: payment.method,
            reference: payment.reference.clone(),
            date: payment.received_at,
            proof: payment.proof.clone(),
        };
        self.ledger.post_payment(&posting).await?;

        payment.transition_to(PaymentStatus::Matched)?;
        let payment = self.store.update_payment(&payment).await?;
        info!(
            "payment {} confirmed and posted to client {}",
            payment.id, client.id
        );
        Ok(payment)
    }

    /// Record the forwarding of the premium to the agency
    ///
    /// Requires the payment to be in `Matched` status; remitting an
    /// unconfirmed payment fails with [`ReconcileError::InvalidState`].
    /// Appends an entry to the agency-remittance ledger and moves the
    /// record to the terminal `Remitted` state.
    pub async fn mark_remitted(
        &mut self,
        payment_id: &str,
        details: RemittanceDetails,
    ) -> ReconcileResult<PaymentRecord> {
        let mut payment = self.get_payment_required(payment_id).await?;

        if details.agency_reference.trim().is_empty() {
            return Err(ReconcileError::Validation(
                "Agency reference is required".to_string(),
            ));
        }

        let remitted_at = details
            .remitted_at
            .unwrap_or_else(|| chrono::Utc::now().naive_utc());

        payment.transition_to(PaymentStatus::Remitted)?;
        payment.agency_reference = Some(details.agency_reference.clone());
        payment.remitted_at = Some(remitted_at);
        payment.remittance_proof = details.proof.clone();
        payment.clearing_line = details.clearing_line.clone();
        payment.bank = details.bank.clone();

        // The status change commits before the journal entry; a failed
        // update must not leave an orphaned entry behind.
        let payment = self.store.update_payment(&payment).await?;

        let entry = RemittanceEntry {
            payment_id: payment.id.clone(),
            client_id: payment.client_id.clone(),
            agency_reference: details.agency_reference,
            remitted_at,
            amount: payment.amount.clone(),
            currency: payment.currency.clone(),
            clearing_line: details.clearing_line,
            bank: details.bank,
            proof: details.proof,
        };
        self.store.append_remittance(&entry).await?;
        info!(
            "payment {} remitted to agency under reference {}",
            payment.id,
            payment.agency_reference.as_deref().unwrap_or("")
        );
        Ok(payment)
    }

    /// Payments waiting for a match or its confirmation, oldest first
    pub async fn list_pending_match(&self) -> ReconcileResult<Vec<PaymentRecord>> {
        let records = self.store.list_payments().await?;
        Ok(reports::pending_match(&records))
    }

    /// Confirmed payments not yet forwarded to the agency, oldest first
    pub async fn list_pending_remittance(&self) -> ReconcileResult<Vec<PaymentRecord>> {
        let records = self.store.list_payments().await?;
        Ok(reports::pending_remittance(&records))
    }

    /// Full payment history with optional filters, newest first
    pub async fn list_history(
        &self,
        filter: &HistoryFilter,
    ) -> ReconcileResult<Vec<PaymentRecord>> {
        let records = self.store.list_payments().await?;
        Ok(reports::history(&records, filter))
    }

    /// Aggregate statistics for the current calendar month
    pub async fn statistics(&self) -> ReconcileResult<PeriodStatistics> {
        let now = chrono::Utc::now().naive_utc();
        self.statistics_for(now.year(), now.month()).await
    }

    /// Aggregate statistics for an arbitrary calendar month
    pub async fn statistics_for(
        &self,
        year: i32,
        month: u32,
    ) -> ReconcileResult<PeriodStatistics> {
        let records = self.store.list_payments().await?;
        Ok(reports::period_statistics(&records, year, month))
    }

    /// All agency-remittance ledger entries
    pub async fn list_remittances(&self) -> ReconcileResult<Vec<RemittanceEntry>> {
        self.store.list_remittances().await
    }

    /// Get a payment by ID
    pub async fn get_payment(&self, payment_id: &str) -> ReconcileResult<Option<PaymentRecord>> {
        self.store.get_payment(payment_id).await
    }

    async fn get_payment_required(&self, payment_id: &str) -> ReconcileResult<PaymentRecord> {
        self.store
            .get_payment(payment_id)
            .await?
            .ok_or_else(|| ReconcileError::NotFound(format!("Payment '{}'", payment_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::{MemoryClientDirectory, MemoryClientLedger, MemoryStore};

    #[tokio::test]
    async fn receive_and_manual_match_basic_flow() {
        let directory = MemoryClientDirectory::new();
        directory.upsert(ClientAccount {
            id: "c1".to_string(),
            active: true,
            billed_amount: BigDecimal::from(35),
            display_name: "Rosa Mendez".to_string(),
            identifying_number: "12345678904821".to_string(),
            email: None,
            phone: None,
            whatsapp_phone: None,
            preferred_method: None,
            paypal_email: None,
            zelle_email: None,
            zelle_phone: None,
        });
        let mut reconciler = Reconciler::new(
            MemoryStore::new(),
            directory,
            MemoryClientLedger::new(),
        );

        let outcome = reconciler
            .receive_payment(NewPayment {
                method: Some(PaymentMethod::Venmo),
                amount: Some(BigDecimal::from(500)),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(!outcome.auto_matched);
        assert_eq!(outcome.payment.status, PaymentStatus::Received);

        let matched = reconciler
            .manual_match(&outcome.payment.id, "c1")
            .await
            .unwrap();
        assert_eq!(matched.payment.confidence, 100);
        assert_eq!(matched.payment.matched_by, MatchOrigin::Manual);
        assert_eq!(matched.payment.status, PaymentStatus::Matched);
        // Versioned update committed through the store
        assert_eq!(matched.payment.version, 1);
    }
}
