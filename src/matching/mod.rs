//! Matching engine: scores incoming payments against client accounts
//!
//! The engine is a pure function over one payment and the active client
//! list. Each client is evaluated independently against a declarative
//! table of weighted signals; the summed score, capped at 100, becomes
//! the candidate's confidence. The top candidate auto-matches when its
//! confidence reaches [`rules::AUTO_MATCH_THRESHOLD`].

pub mod engine;
pub mod rules;

pub use engine::*;
pub use rules::{MatchRule, AUTO_MATCH_THRESHOLD, MAX_CANDIDATES, RULES};
