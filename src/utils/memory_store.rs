//! In-memory store implementation for testing and embedding

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::traits::ReconciliationStore;
use crate::types::*;

/// In-memory reconciliation store
///
/// Each record is replaced wholesale on update and carries an optimistic
/// version; a stale writer gets [`ReconcileError::Conflict`] instead of
/// silently overwriting a newer record.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    payments: Arc<RwLock<HashMap<String, PaymentRecord>>>,
    remittances: Arc<RwLock<Vec<RemittanceEntry>>>,
}

impl MemoryStore {
    /// Create a new memory store instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all data (useful for testing)
    pub fn clear(&self) {
        self.payments.write().unwrap().clear();
        self.remittances.write().unwrap().clear();
    }
}

#[async_trait]
impl ReconciliationStore for MemoryStore {
    async fn save_payment(&mut self, payment: &PaymentRecord) -> ReconcileResult<()> {
        let mut payments = self.payments.write().unwrap();
        if payments.contains_key(&payment.id) {
            return Err(ReconcileError::Conflict(format!(
                "Payment '{}' already exists",
                payment.id
            )));
        }
        payments.insert(payment.id.clone(), payment.clone());
        Ok(())
    }

    async fn get_payment(&self, payment_id: &str) -> ReconcileResult<Option<PaymentRecord>> {
        Ok(self.payments.read().unwrap().get(payment_id).cloned())
    }

    async fn list_payments(&self) -> ReconcileResult<Vec<PaymentRecord>> {
        Ok(self.payments.read().unwrap().values().cloned().collect())
    }

    async fn update_payment(&mut self, payment: &PaymentRecord) -> ReconcileResult<PaymentRecord> {
        let mut payments = self.payments.write().unwrap();
        let stored = payments.get(&payment.id).ok_or_else(|| {
            ReconcileError::NotFound(format!("Payment '{}'", payment.id))
        })?;
        if stored.version != payment.version {
            return Err(ReconcileError::Conflict(format!(
                "Payment '{}' was updated concurrently (stored version {}, caller read {})",
                payment.id, stored.version, payment.version
            )));
        }
        let mut updated = payment.clone();
        updated.version += 1;
        payments.insert(updated.id.clone(), updated.clone());
        Ok(updated)
    }

    async fn append_remittance(&mut self, entry: &RemittanceEntry) -> ReconcileResult<()> {
        self.remittances.write().unwrap().push(entry.clone());
        Ok(())
    }

    async fn list_remittances(&self) -> ReconcileResult<Vec<RemittanceEntry>> {
        Ok(self.remittances.read().unwrap().clone())
    }
}
