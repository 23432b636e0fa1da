//! Field validation
//!
//! Two layers:
//! - boolean validators (`validate_*`) used while typing
//! - the checkout schema ([`check_field`], [`validate_form`]) producing the
//!   user-facing reason strings shown next to each input

use chrono::{DateTime, Datelike, Utc};
use validator::ValidateEmail;

use super::formatting::{CARD_DIGITS, unformat_card_number};
use super::types::{FieldErrors, FormData, FormField};

pub const MSG_EMAIL_REQUIRED: &str = "Email is required";
pub const MSG_EMAIL_INVALID: &str = "Please enter a valid email address";
pub const MSG_NAME_REQUIRED: &str = "Full name is required";
pub const MSG_NAME_TOO_SHORT: &str = "Name must be at least 2 characters";
pub const MSG_NAME_TOO_LONG: &str = "Name must be less than 50 characters";
pub const MSG_CARD_REQUIRED: &str = "Card number is required";
pub const MSG_CARD_LENGTH: &str = "Card number must be 16 digits";
pub const MSG_EXPIRY_REQUIRED: &str = "Expiry date is required";
pub const MSG_EXPIRY_FORMAT: &str = "Invalid expiry date format (MM/YY)";
pub const MSG_EXPIRY_PAST: &str = "Expiry date must be in the future";
pub const MSG_CVV_REQUIRED: &str = "CVV is required";
pub const MSG_CVV_FORMAT: &str = "CVV must be 3-4 digits";

const NAME_MIN_CHARS: usize = 2;
const NAME_MAX_CHARS: usize = 50;

/// Exactly 16 digits after stripping non-digits. No Luhn checksum.
pub fn validate_card_number(value: &str) -> bool {
    unformat_card_number(value).len() == CARD_DIGITS
}

/// Parse strict `MM/YY` (month 01-12) into `(month, 2000 + YY)`
fn parse_expiry(value: &str) -> Option<(u32, i32)> {
    let (month, year) = value.split_once('/')?;
    let is_two_digits = |s: &str| s.len() == 2 && s.bytes().all(|b| b.is_ascii_digit());
    if !is_two_digits(month) || !is_two_digits(year) {
        return None;
    }

    let month: u32 = month.parse().ok()?;
    if !(1..=12).contains(&month) {
        return None;
    }
    let year: i32 = year.parse().ok()?;
    Some((month, 2000 + year))
}

/// `MM/YY` whose calendar month lies strictly after the month of `now`.
///
/// A card expiring in the current month is already rejected.
pub fn validate_expiry_date(value: &str, now: DateTime<Utc>) -> bool {
    match parse_expiry(value) {
        Some((month, year)) => (year, month) > (now.year(), now.month()),
        None => false,
    }
}

pub fn validate_cvv(value: &str) -> bool {
    (3..=4).contains(&value.len()) && value.bytes().all(|b| b.is_ascii_digit())
}

/// Boolean check used while typing; fields without a card rule always pass.
pub fn validate_field(field: FormField, value: &str, now: DateTime<Utc>) -> bool {
    match field {
        FormField::CardNumber => validate_card_number(value),
        FormField::ExpiryDate => validate_expiry_date(value, now),
        FormField::Cvv => validate_cvv(value),
        FormField::Email | FormField::FullName => true,
    }
}

/// Checkout schema rule for one field
pub fn check_field(field: FormField, value: &str, now: DateTime<Utc>) -> Result<(), &'static str> {
    match field {
        FormField::Email => {
            if value.is_empty() {
                Err(MSG_EMAIL_REQUIRED)
            } else if !value.to_string().validate_email() {
                Err(MSG_EMAIL_INVALID)
            } else {
                Ok(())
            }
        }
        FormField::FullName => {
            let chars = value.chars().count();
            if chars == 0 {
                Err(MSG_NAME_REQUIRED)
            } else if chars < NAME_MIN_CHARS {
                Err(MSG_NAME_TOO_SHORT)
            } else if chars > NAME_MAX_CHARS {
                Err(MSG_NAME_TOO_LONG)
            } else {
                Ok(())
            }
        }
        FormField::CardNumber => {
            if value.is_empty() {
                return Err(MSG_CARD_REQUIRED);
            }
            // Only whitespace is tolerated between digits here
            let compact: String = value.chars().filter(|c| !c.is_whitespace()).collect();
            if compact.len() == CARD_DIGITS && compact.bytes().all(|b| b.is_ascii_digit()) {
                Ok(())
            } else {
                Err(MSG_CARD_LENGTH)
            }
        }
        FormField::ExpiryDate => {
            if value.is_empty() {
                Err(MSG_EXPIRY_REQUIRED)
            } else if parse_expiry(value).is_none() {
                Err(MSG_EXPIRY_FORMAT)
            } else if !validate_expiry_date(value, now) {
                Err(MSG_EXPIRY_PAST)
            } else {
                Ok(())
            }
        }
        FormField::Cvv => {
            if value.is_empty() {
                Err(MSG_CVV_REQUIRED)
            } else if !validate_cvv(value) {
                Err(MSG_CVV_FORMAT)
            } else {
                Ok(())
            }
        }
    }
}

/// Run the whole checkout schema; an empty map means the form may be submitted.
pub fn validate_form(data: &FormData, now: DateTime<Utc>) -> FieldErrors {
    FormField::ALL
        .into_iter()
        .filter_map(|field| {
            check_field(field, data.get(field), now)
                .err()
                .map(|msg| (field, msg.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
    }

    fn valid_form() -> FormData {
        FormData {
            email: "ada@example.com".into(),
            full_name: "Ada Lovelace".into(),
            card_number: "4242 4242 4242 4242".into(),
            expiry_date: "08/29".into(),
            cvv: "123".into(),
        }
    }

    #[test]
    fn test_card_number_boundary() {
        assert!(validate_card_number("4242 4242 4242 4242"));
        assert!(validate_card_number("4242424242424242"));
        assert!(!validate_card_number("424242424242424"));
        assert!(!validate_card_number("42424242424242421"));
        assert!(!validate_card_number(""));
    }

    #[test]
    fn test_expiry_in_the_past_is_invalid() {
        assert!(!validate_expiry_date("01/20", at(2020, 2, 1)));
        assert!(!validate_expiry_date("01/20", at(2026, 10, 18)));
    }

    #[test]
    fn test_expiry_current_month_is_invalid() {
        assert!(!validate_expiry_date("10/26", at(2026, 10, 18)));
        assert!(validate_expiry_date("11/26", at(2026, 10, 18)));
        assert!(validate_expiry_date("01/27", at(2026, 12, 31)));
    }

    #[test]
    fn test_expiry_format_rules() {
        let now = at(2026, 1, 1);
        assert!(!validate_expiry_date("13/30", now));
        assert!(!validate_expiry_date("00/30", now));
        assert!(!validate_expiry_date("1/30", now));
        assert!(!validate_expiry_date("01/3", now));
        assert!(!validate_expiry_date("0130", now));
        assert!(validate_expiry_date("12/99", now));
    }

    #[test]
    fn test_cvv() {
        assert!(validate_cvv("123"));
        assert!(validate_cvv("1234"));
        assert!(!validate_cvv("12"));
        assert!(!validate_cvv("12345"));
        assert!(!validate_cvv("12a"));
    }

    #[test]
    fn test_validate_form_accepts_valid_data() {
        assert!(validate_form(&valid_form(), at(2026, 10, 18)).is_empty());
    }

    #[test]
    fn test_validate_form_reports_required_fields() {
        let errors = validate_form(&FormData::default(), at(2026, 10, 18));
        assert_eq!(errors.len(), 5);
        assert_eq!(errors[&FormField::Email], MSG_EMAIL_REQUIRED);
        assert_eq!(errors[&FormField::Cvv], MSG_CVV_REQUIRED);
    }

    #[test]
    fn test_validate_form_messages() {
        let now = at(2026, 10, 18);
        let mut form = valid_form();
        form.email = "not-an-email".into();
        form.full_name = "A".into();
        form.card_number = "4242-4242-4242-4242".into();
        form.expiry_date = "08/24".into();
        form.cvv = "12".into();

        let errors = validate_form(&form, now);
        assert_eq!(errors[&FormField::Email], MSG_EMAIL_INVALID);
        assert_eq!(errors[&FormField::FullName], MSG_NAME_TOO_SHORT);
        assert_eq!(errors[&FormField::CardNumber], MSG_CARD_LENGTH);
        assert_eq!(errors[&FormField::ExpiryDate], MSG_EXPIRY_PAST);
        assert_eq!(errors[&FormField::Cvv], MSG_CVV_FORMAT);
    }

    #[test]
    fn test_name_length_limit() {
        let now = at(2026, 10, 18);
        assert!(check_field(FormField::FullName, &"x".repeat(50), now).is_ok());
        assert_eq!(
            check_field(FormField::FullName, &"x".repeat(51), now),
            Err(MSG_NAME_TOO_LONG)
        );
    }
}
