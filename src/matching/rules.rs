//! Weighted matching signals and their normalization helpers
//!
//! Every signal is a `(name, weight, predicate)` entry in [`RULES`]; the
//! engine sums the weights of the predicates that fire. Keeping the table
//! declarative lets each rule be tested on its own and guarantees that
//! adding a firing signal never lowers a client's score.

use bigdecimal::BigDecimal;

use crate::types::{ClientAccount, PaymentMethod};

/// Minimum top-candidate confidence for an automatic match
pub const AUTO_MATCH_THRESHOLD: u8 = 80;

/// Maximum number of ranked candidates returned per payment
pub const MAX_CANDIDATES: usize = 5;

/// Normalized view of the incoming payment, computed once per scoring run
#[derive(Debug, Clone)]
pub struct PaymentSignals {
    /// Amount as received
    pub amount: BigDecimal,
    /// Payment rail used
    pub method: PaymentMethod,
    /// Note, uppercased with all whitespace removed
    pub note: String,
    /// Sender name, uppercased with whitespace collapsed
    pub name: String,
    /// Whitespace-separated tokens of the normalized sender name
    pub name_tokens: Vec<String>,
    /// Sender email, trimmed and lowercased ("" when absent)
    pub email: String,
    /// Sender phone reduced to digits only
    pub phone_digits: String,
}

impl PaymentSignals {
    pub fn new(
        amount: BigDecimal,
        method: PaymentMethod,
        note: Option<&str>,
        sender_name: Option<&str>,
        sender_email: Option<&str>,
        sender_phone: Option<&str>,
    ) -> Self {
        let name = normalize_name(sender_name.unwrap_or(""));
        let name_tokens = name.split(' ').filter(|t| !t.is_empty()).map(String::from).collect();
        Self {
            amount,
            method,
            note: squash(note.unwrap_or("")),
            name,
            name_tokens,
            email: normalize_email(sender_email.unwrap_or("")),
            phone_digits: digits_only(sender_phone.unwrap_or("")),
        }
    }
}

/// Normalized view of one client account, computed once per client
#[derive(Debug, Clone)]
pub struct ClientSignals<'a> {
    pub account: &'a ClientAccount,
    /// Identifying number, uppercased with whitespace removed
    pub number: String,
    /// Last four characters of the normalized identifying number
    pub number_last4: String,
    /// Display name, uppercased with whitespace collapsed
    pub name: String,
    /// Tokens of the normalized display name
    pub name_tokens: Vec<String>,
    /// Contact email, normalized
    pub email: String,
    /// Primary phone, digits only
    pub phone_digits: String,
    /// WhatsApp phone, digits only
    pub whatsapp_digits: String,
    /// Registered PayPal email, normalized
    pub paypal_email: String,
    /// Registered Zelle email, normalized
    pub zelle_email: String,
    /// Registered Zelle phone, digits only
    pub zelle_phone_digits: String,
}

impl<'a> ClientSignals<'a> {
    pub fn new(account: &'a ClientAccount) -> Self {
        let number = squash(&account.identifying_number);
        let number_last4 = if number.chars().count() >= 4 {
            let skip = number.chars().count() - 4;
            number.chars().skip(skip).collect()
        } else {
            String::new()
        };
        let name = normalize_name(&account.display_name);
        let name_tokens = name.split(' ').filter(|t| !t.is_empty()).map(String::from).collect();
        Self {
            account,
            number,
            number_last4,
            name,
            name_tokens,
            email: normalize_email(account.email.as_deref().unwrap_or("")),
            phone_digits: digits_only(account.phone.as_deref().unwrap_or("")),
            whatsapp_digits: digits_only(account.whatsapp_phone.as_deref().unwrap_or("")),
            paypal_email: normalize_email(account.paypal_email.as_deref().unwrap_or("")),
            zelle_email: normalize_email(account.zelle_email.as_deref().unwrap_or("")),
            zelle_phone_digits: digits_only(account.zelle_phone.as_deref().unwrap_or("")),
        }
    }
}

/// One weighted matching signal
pub struct MatchRule {
    /// Human-readable signal name, recorded as a match reason
    pub name: &'static str,
    /// Points added to the client's score when the predicate fires
    pub weight: u8,
    /// Whether the signal fires for this payment/client pair
    pub applies: fn(&PaymentSignals, &ClientSignals) -> bool,
}

/// The full signal table, in evaluation (and reason-reporting) order
pub const RULES: &[MatchRule] = &[
    MatchRule {
        name: "amount matches billed amount",
        weight: 30,
        applies: amount_matches,
    },
    MatchRule {
        name: "identifying number in note",
        weight: 40,
        applies: number_in_note,
    },
    MatchRule {
        name: "exact name",
        weight: 35,
        applies: exact_name,
    },
    MatchRule {
        name: "partial name",
        weight: 25,
        applies: partial_name,
    },
    MatchRule {
        name: "email",
        weight: 35,
        applies: email_matches,
    },
    MatchRule {
        name: "phone",
        weight: 30,
        applies: phone_matches,
    },
    MatchRule {
        name: "preferred method",
        weight: 10,
        applies: preferred_method,
    },
    MatchRule {
        name: "registered paypal email",
        weight: 40,
        applies: paypal_email_matches,
    },
    MatchRule {
        name: "registered zelle email",
        weight: 40,
        applies: zelle_email_matches,
    },
    MatchRule {
        name: "registered zelle phone",
        weight: 40,
        applies: zelle_phone_matches,
    },
];

fn amount_matches(p: &PaymentSignals, c: &ClientSignals) -> bool {
    (&p.amount - &c.account.billed_amount).abs() < BigDecimal::from(1)
}

fn number_in_note(p: &PaymentSignals, c: &ClientSignals) -> bool {
    if p.note.is_empty() || c.number.is_empty() {
        return false;
    }
    p.note.contains(&c.number)
        || (!c.number_last4.is_empty() && p.note.contains(&c.number_last4))
}

fn exact_name(p: &PaymentSignals, c: &ClientSignals) -> bool {
    !p.name.is_empty() && p.name == c.name
}

/// Only when not an exact match: at least two sender-name tokens appear
/// among the client-name tokens.
fn partial_name(p: &PaymentSignals, c: &ClientSignals) -> bool {
    if exact_name(p, c) {
        return false;
    }
    let shared = p
        .name_tokens
        .iter()
        .filter(|t| c.name_tokens.contains(t))
        .count();
    shared >= 2
}

fn email_matches(p: &PaymentSignals, c: &ClientSignals) -> bool {
    !p.email.is_empty() && p.email == c.email
}

/// Last-10-digit suffix match in either direction, against the client's
/// primary or WhatsApp phone.
fn phone_matches(p: &PaymentSignals, c: &ClientSignals) -> bool {
    phone_suffix_match(&p.phone_digits, &c.phone_digits)
        || phone_suffix_match(&p.phone_digits, &c.whatsapp_digits)
}

fn preferred_method(p: &PaymentSignals, c: &ClientSignals) -> bool {
    c.account.preferred_method == Some(p.method)
}

fn paypal_email_matches(p: &PaymentSignals, c: &ClientSignals) -> bool {
    p.method == PaymentMethod::Paypal && !p.email.is_empty() && p.email == c.paypal_email
}

fn zelle_email_matches(p: &PaymentSignals, c: &ClientSignals) -> bool {
    p.method == PaymentMethod::Zelle && !p.email.is_empty() && p.email == c.zelle_email
}

fn zelle_phone_matches(p: &PaymentSignals, c: &ClientSignals) -> bool {
    p.method == PaymentMethod::Zelle
        && !p.phone_digits.is_empty()
        && !c.zelle_phone_digits.is_empty()
        && last10(&p.phone_digits) == last10(&c.zelle_phone_digits)
}

/// Uppercase and collapse runs of whitespace to single spaces
pub fn normalize_name(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// Trim and lowercase
pub fn normalize_email(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Uppercase and remove all whitespace
pub fn squash(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}

/// Keep only ASCII digits
pub fn digits_only(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}

fn last10(digits: &str) -> &str {
    &digits[digits.len().saturating_sub(10)..]
}

/// Last-10-digit suffix match in either direction. Shorter numbers match
/// when one is a suffix of the other's last ten digits.
pub fn phone_suffix_match(a: &str, b: &str) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a.ends_with(last10(b)) || b.ends_with(last10(a))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_name_collapses_whitespace_and_case() {
        assert_eq!(normalize_name("  maria   de la cruz "), "MARIA DE LA CRUZ");
        assert_eq!(normalize_name(""), "");
    }

    #[test]
    fn squash_removes_all_whitespace() {
        assert_eq!(squash("12 34 5678 4821"), "123456784821");
    }

    #[test]
    fn digits_only_strips_formatting() {
        assert_eq!(digits_only("+52 (55) 1234-5678"), "525512345678");
        assert_eq!(digits_only("no digits"), "");
    }

    #[test]
    fn phone_suffix_matches_with_country_code_on_either_side() {
        // Same line, one side carries a country prefix
        assert!(phone_suffix_match("5512345678", "525512345678"));
        assert!(phone_suffix_match("525512345678", "5512345678"));
        assert!(!phone_suffix_match("5512345678", "5587654321"));
        assert!(!phone_suffix_match("", "5512345678"));
    }

    #[test]
    fn rule_weights_match_the_signal_table() {
        let by_name: std::collections::HashMap<_, _> =
            RULES.iter().map(|r| (r.name, r.weight)).collect();
        assert_eq!(by_name["amount matches billed amount"], 30);
        assert_eq!(by_name["identifying number in note"], 40);
        assert_eq!(by_name["exact name"], 35);
        assert_eq!(by_name["partial name"], 25);
        assert_eq!(by_name["email"], 35);
        assert_eq!(by_name["phone"], 30);
        assert_eq!(by_name["preferred method"], 10);
        assert_eq!(by_name["registered paypal email"], 40);
        assert_eq!(by_name["registered zelle email"], 40);
        assert_eq!(by_name["registered zelle phone"], 40);
        assert_eq!(RULES.len(), 10);
    }
}
