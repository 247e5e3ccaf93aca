//! In-memory client directory and client ledger for testing and embedding

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use crate::traits::{ClientDirectory, ClientLedger, LedgerPosting};
use crate::types::*;

/// In-memory client directory
#[derive(Debug, Clone, Default)]
pub struct MemoryClientDirectory {
    clients: Arc<RwLock<HashMap<String, ClientAccount>>>,
}

impl MemoryClientDirectory {
    /// Create a new empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a client account
    pub fn upsert(&self, client: ClientAccount) {
        self.clients
            .write()
            .unwrap()
            .insert(client.id.clone(), client);
    }

    /// Remove a client account; returns whether it existed
    pub fn remove(&self, client_id: &str) -> bool {
        self.clients.write().unwrap().remove(client_id).is_some()
    }
}

#[async_trait]
impl ClientDirectory for MemoryClientDirectory {
    async fn list_active_clients(&self) -> ReconcileResult<Vec<ClientAccount>> {
        Ok(self
            .clients
            .read()
            .unwrap()
            .values()
            .filter(|c| c.active)
            .cloned()
            .collect())
    }

    async fn get_client(&self, client_id: &str) -> ReconcileResult<Option<ClientAccount>> {
        Ok(self.clients.read().unwrap().get(client_id).cloned())
    }
}

/// In-memory client ledger
///
/// Tracks postings per client and each client's current-period due flag;
/// a successful post clears the flag, the way the real client-management
/// side does.
#[derive(Debug, Clone, Default)]
pub struct MemoryClientLedger {
    known_clients: Arc<RwLock<HashSet<String>>>,
    postings: Arc<RwLock<HashMap<String, Vec<LedgerPosting>>>>,
    due: Arc<RwLock<HashSet<String>>>,
}

impl MemoryClientLedger {
    /// Create a new empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a client so postings against it are accepted, with the
    /// current-period due flag set
    pub fn register_client(&self, client_id: &str) {
        self.known_clients
            .write()
            .unwrap()
            .insert(client_id.to_string());
        self.due.write().unwrap().insert(client_id.to_string());
    }

    /// Forget a client; later postings against it fail `NotFound`
    pub fn remove_client(&self, client_id: &str) {
        self.known_clients.write().unwrap().remove(client_id);
        self.due.write().unwrap().remove(client_id);
    }

    /// Payment history posted for one client
    pub fn postings_for(&self, client_id: &str) -> Vec<LedgerPosting> {
        self.postings
            .read()
            .unwrap()
            .get(client_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Whether the client still owes the current period
    pub fn is_due(&self, client_id: &str) -> bool {
        self.due.read().unwrap().contains(client_id)
    }
}

#[async_trait]
impl ClientLedger for MemoryClientLedger {
    async fn post_payment(&mut self, posting: &LedgerPosting) -> ReconcileResult<()> {
        if !self.known_clients.read().unwrap().contains(&posting.client_id) {
            return Err(ReconcileError::NotFound(format!(
                "Client '{}'",
                posting.client_id
            )));
        }
        self.postings
            .write()
            .unwrap()
            .entry(posting.client_id.clone())
            .or_default()
            .push(posting.clone());
        self.due.write().unwrap().remove(&posting.client_id);
        Ok(())
    }
}
