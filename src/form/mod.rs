//! Checkout form model: field values, formatting and validation.

pub mod formatting;
pub mod types;
pub mod validation;

pub use formatting::{
    CardType, FieldConfig, card_type, clean_value, field_config, format_card_number,
    format_cvv, format_expiry_date, format_field, mask_card_number, mask_cvv, mask_field,
    unformat_card_number,
};
pub use types::{FieldErrors, FormData, FormDataPatch, FormField};
pub use validation::{
    check_field, validate_card_number, validate_cvv, validate_expiry_date, validate_field,
    validate_form,
};
