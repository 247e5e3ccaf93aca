//! Validation utilities

use bigdecimal::BigDecimal;

use crate::types::{ReconcileError, ReconcileResult};

/// Validate that an amount is positive
pub fn validate_positive_amount(amount: &BigDecimal) -> ReconcileResult<()> {
    if *amount <= BigDecimal::from(0) {
        Err(ReconcileError::Validation(
            "Amount must be positive".to_string(),
        ))
    } else {
        Ok(())
    }
}

/// Normalize an optional currency code, defaulting to USD
///
/// Codes are uppercased; a present-but-malformed code is rejected rather
/// than silently defaulted.
pub fn normalize_currency(currency: Option<&str>) -> ReconcileResult<String> {
    match currency {
        None => Ok("USD".to_string()),
        Some(raw) => {
            let code = raw.trim().to_uppercase();
            if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(ReconcileError::Validation(format!(
                    "Invalid currency code: '{}'",
                    raw
                )));
            }
            Ok(code)
        }
    }
}
