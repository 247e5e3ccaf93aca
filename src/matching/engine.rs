//! Scoring of one payment against the active client list

use serde::{Deserialize, Serialize};

use crate::matching::rules::{
    ClientSignals, PaymentSignals, AUTO_MATCH_THRESHOLD, MAX_CANDIDATES, RULES,
};
use crate::types::{ClientAccount, MatchCandidate, PaymentRecord};

/// Automatic assignment carried by an outcome whose top candidate
/// cleared the threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoMatch {
    /// Client to assign
    pub client_id: String,
    /// Confidence of the winning candidate
    pub confidence: u8,
}

/// Result of one scoring run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchOutcome {
    /// Ranked candidates, non-increasing by confidence, at most five
    pub candidates: Vec<MatchCandidate>,
    /// Present exactly when the top candidate cleared the auto-match
    /// threshold; an automatic assignment always carries its client id
    pub auto_match: Option<AutoMatch>,
}

/// Score `payment` against `clients`
///
/// Pure and deterministic: identical inputs always give identical output.
/// Suspended clients and clients with a zero score are excluded. Clients
/// are evaluated in ascending-id order, so candidates tying on confidence
/// rank by client id rather than by whatever order the directory returned.
pub fn score(payment: &PaymentRecord, clients: &[ClientAccount]) -> MatchOutcome {
    let signals = PaymentSignals::new(
        payment.amount.clone(),
        payment.method,
        payment.note.as_deref(),
        payment.sender_name.as_deref(),
        payment.sender_email.as_deref(),
        payment.sender_phone.as_deref(),
    );

    let mut ordered: Vec<&ClientAccount> = clients.iter().filter(|c| c.active).collect();
    ordered.sort_by(|a, b| a.id.cmp(&b.id));

    let mut candidates: Vec<MatchCandidate> = Vec::new();
    for client in ordered {
        if let Some(candidate) = score_client(&signals, client) {
            candidates.push(candidate);
        }
    }

    // Stable sort keeps the ascending-id order among equal scores
    candidates.sort_by(|a, b| b.confidence.cmp(&a.confidence));
    candidates.truncate(MAX_CANDIDATES);

    let auto_match = match candidates.first() {
        Some(top) if top.confidence >= AUTO_MATCH_THRESHOLD => Some(AutoMatch {
            client_id: top.client_id.clone(),
            confidence: top.confidence,
        }),
        _ => None,
    };

    MatchOutcome {
        candidates,
        auto_match,
    }
}

/// Evaluate the full rule table for one client; `None` when nothing fires
fn score_client(signals: &PaymentSignals, client: &ClientAccount) -> Option<MatchCandidate> {
    let view = ClientSignals::new(client);
    let mut total: u32 = 0;
    let mut reasons: Vec<String> = Vec::new();

    for rule in RULES {
        if (rule.applies)(signals, &view) {
            total += u32::from(rule.weight);
            reasons.push(rule.name.to_string());
        }
    }

    if total == 0 {
        return None;
    }

    Some(MatchCandidate {
        client_id: client.id.clone(),
        display_name: client.display_name.clone(),
        identifying_number: client.identifying_number.clone(),
        billed_amount: client.billed_amount.clone(),
        confidence: total.min(100) as u8,
        reasons,
    })
}
