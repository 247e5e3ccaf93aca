//! # Reconciliation Core
//!
//! A payment-reconciliation library for a service business that remits a
//! foreign social-security premium on behalf of overseas clients. Clients
//! pay through informal channels (PayPal, Zelle, Venmo, wire, MX bank
//! transfer) that carry no reliable client identifier; this crate matches
//! each weakly-identified incoming payment to the right client account
//! with a quantified confidence score, then drives the payment through a
//! controlled lifecycle from received to remitted.
//!
//! ## Features
//!
//! - **Matching engine**: pure, deterministic scoring over a declarative
//!   table of weighted signals, with ranked candidates and an auto-match
//!   threshold
//! - **Reconciliation state machine**: closed lifecycle
//!   `received -> matched_pending_confirmation -> matched -> remitted`,
//!   with every transition outside the table rejected
//! - **Confirmation & posting**: ledger posting happens before the status
//!   commit, so a failed post never advances the record
//! - **Projections**: pending-match and pending-remittance queues,
//!   filtered history, calendar-month statistics
//! - **Storage abstraction**: backend-agnostic trait-based store with
//!   per-record optimistic versioning
//!
//! ## Quick Start
//!
//! ```rust
//! use reconciliation_core::{
//!     MemoryClientDirectory, MemoryClientLedger, MemoryStore, Reconciler,
//! };
//!
//! let store = MemoryStore::new();
//! let directory = MemoryClientDirectory::new();
//! let ledger = MemoryClientLedger::new();
//! let _reconciler = Reconciler::new(store, directory, ledger);
//! // _reconciler.receive_payment(...), .confirm_match(...), ...
//! ```

pub mod matching;
pub mod reconcile;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use matching::*;
pub use reconcile::*;
pub use traits::*;
pub use types::*;
pub use utils::{MemoryClientDirectory, MemoryClientLedger, MemoryStore};
