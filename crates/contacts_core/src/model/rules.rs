//! Reusable field predicates shared by the schema and input contracts.
//!
//! # Invariants
//! - Predicates are pure and anchored start-to-end.
//! - No locale or carrier awareness; syntax only.

use once_cell::sync::Lazy;
use regex::Regex;

const MAX_EMAIL_CHARS: usize = 254;

static PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\+?[0-9]{1,4}?[-.\s]?\(?[0-9]{1,3}?\)?[-.\s]?[0-9]{1,4}[-.\s]?[0-9]{1,4}[-.\s]?[0-9]{1,9}$",
    )
    .expect("valid phone regex")
});
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*\.[A-Za-z]{2,}$",
    )
    .expect("valid email regex")
});

/// Returns whether `value` looks like a phone number.
///
/// Accepts an optional leading `+`, a country code, an optional
/// parenthesized area code and digit groups separated by space, dash or dot.
pub fn is_phone_number(value: &str) -> bool {
    PHONE_RE.is_match(value)
}

/// Returns whether `value` is a syntactically valid email address.
pub fn is_email(value: &str) -> bool {
    if value.len() > MAX_EMAIL_CHARS {
        return false;
    }
    let Some((local, _)) = value.split_once('@') else {
        return false;
    };
    if local.starts_with('.') || local.ends_with('.') || local.contains("..") {
        return false;
    }
    EMAIL_RE.is_match(value)
}
