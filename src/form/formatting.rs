//! Field formatting
//!
//! Pure functions that turn raw keystroke text into the display
//! representation stored in [`FormData`](super::types::FormData).
//! Only ASCII digits count as digits; everything else is stripped.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::types::FormField;

/// Character used to hide card digits
pub const MASK_CHAR: char = '•';

/// Maximum digits in a card number
pub const CARD_DIGITS: usize = 16;

/// Maximum display length of a card number (16 digits + 3 spaces)
pub const CARD_DISPLAY_LEN: usize = 19;

/// Maximum CVV digits
pub const CVV_DIGITS: usize = 4;

/// Remove every character that is not an ASCII digit
pub fn strip_non_digits(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Group symbols in blocks of 4 separated by single spaces, at most 16 symbols
fn group_in_fours(symbols: impl Iterator<Item = char>) -> String {
    let mut out = String::with_capacity(CARD_DISPLAY_LEN);
    for (i, c) in symbols.take(CARD_DIGITS).enumerate() {
        if i > 0 && i % 4 == 0 {
            out.push(' ');
        }
        out.push(c);
    }
    out
}

/// `"4242424242424242"` -> `"4242 4242 4242 4242"`
///
/// Idempotent. Digits beyond the 16th are dropped and no trailing space is
/// ever produced.
pub fn format_card_number(value: &str) -> String {
    group_in_fours(value.chars().filter(|c| c.is_ascii_digit()))
}

/// Inverse of [`format_card_number`] for digit strings of up to 16 digits
pub fn unformat_card_number(value: &str) -> String {
    strip_non_digits(value)
}

/// `"0829"` -> `"08/29"`; fewer than two digits are returned as-is.
pub fn format_expiry_date(value: &str) -> String {
    let digits = strip_non_digits(value);
    if digits.len() >= 2 {
        let year_end = digits.len().min(4);
        format!("{}/{}", &digits[..2], &digits[2..year_end])
    } else {
        digits
    }
}

pub fn format_cvv(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii_digit())
        .take(CVV_DIGITS)
        .collect()
}

/// Hide all but the last 4 digits, keeping the 4-4-4-4 grouping.
///
/// Numbers with 4 digits or fewer are returned unmasked.
pub fn mask_card_number(value: &str) -> String {
    let digits = strip_non_digits(value);
    if digits.len() <= 4 {
        return format_card_number(&digits);
    }

    let visible_from = digits.len() - 4;
    let masked = digits
        .chars()
        .enumerate()
        .map(|(i, c)| if i < visible_from { MASK_CHAR } else { c });
    group_in_fours(masked)
}

pub fn mask_cvv(value: &str) -> String {
    value
        .chars()
        .map(|c| if c.is_ascii_digit() { MASK_CHAR } else { c })
        .collect()
}

/// Card brand guessed from the leading digit.
///
/// Approximate: no IIN range table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardType {
    Visa,
    Mastercard,
    Amex,
    Discover,
    Unknown,
}

impl CardType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardType::Visa => "visa",
            CardType::Mastercard => "mastercard",
            CardType::Amex => "amex",
            CardType::Discover => "discover",
            CardType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for CardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub fn card_type(card_number: &str) -> CardType {
    match card_number.chars().find(|c| c.is_ascii_digit()) {
        Some('4') => CardType::Visa,
        Some('5') | Some('2') => CardType::Mastercard,
        Some('3') => CardType::Amex,
        Some('6') => CardType::Discover,
        _ => CardType::Unknown,
    }
}

/// Apply the formatter for `field`; email and name pass through untouched.
pub fn format_field(field: FormField, value: &str) -> String {
    match field {
        FormField::CardNumber => format_card_number(value),
        FormField::ExpiryDate => format_expiry_date(value),
        FormField::Cvv => format_cvv(value),
        FormField::Email | FormField::FullName => value.to_string(),
    }
}

/// Display-safe rendering of a field value; only sensitive fields are masked
pub fn mask_field(field: FormField, value: &str) -> String {
    if !field.is_sensitive() {
        return value.to_string();
    }
    match field {
        FormField::CardNumber => mask_card_number(value),
        _ => mask_cvv(value),
    }
}

/// Canonical value for a field (card number without spaces)
pub fn clean_value(field: FormField, value: &str) -> String {
    match field {
        FormField::CardNumber => unformat_card_number(value),
        _ => value.to_string(),
    }
}

/// HTML-ish input kind of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Text,
    Email,
    Tel,
}

/// Static input hints for rendering a field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldConfig {
    pub label: &'static str,
    pub kind: InputKind,
    pub placeholder: &'static str,
    pub auto_complete: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<&'static str>,
    pub numeric: bool,
}

pub fn field_config(field: FormField) -> FieldConfig {
    match field {
        FormField::Email => FieldConfig {
            label: "Email Address",
            kind: InputKind::Email,
            placeholder: "Enter your email",
            auto_complete: "email",
            max_length: None,
            pattern: None,
            numeric: false,
        },
        FormField::FullName => FieldConfig {
            label: "Full Name",
            kind: InputKind::Text,
            placeholder: "Enter your full name",
            auto_complete: "name",
            max_length: None,
            pattern: None,
            numeric: false,
        },
        FormField::CardNumber => FieldConfig {
            label: "Card Number",
            kind: InputKind::Tel,
            placeholder: "1234 5678 9012 3456",
            auto_complete: "cc-number",
            max_length: Some(CARD_DISPLAY_LEN),
            pattern: Some("[0-9 ]*"),
            numeric: true,
        },
        FormField::ExpiryDate => FieldConfig {
            label: "Expiry Date",
            kind: InputKind::Tel,
            placeholder: "MM/YY",
            auto_complete: "cc-exp",
            max_length: Some(5),
            pattern: Some("[0-9/]*"),
            numeric: true,
        },
        FormField::Cvv => FieldConfig {
            label: "CVV",
            kind: InputKind::Tel,
            placeholder: "123",
            auto_complete: "cc-csc",
            max_length: Some(CVV_DIGITS),
            pattern: Some("[0-9]*"),
            numeric: true,
        },
    }
}
