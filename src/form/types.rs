//! Checkout form data types.
//!
//! All field values hold the *display* representation (e.g. `4242 4242 4242 4242`,
//! `08/29`), never a canonical one. Use [`crate::form::formatting::clean_value`]
//! to obtain canonical text.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Identity of a checkout form field
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FormField {
    Email,
    FullName,
    CardNumber,
    ExpiryDate,
    Cvv,
}

impl FormField {
    /// All fields in display order
    pub const ALL: [FormField; 5] = [
        FormField::Email,
        FormField::FullName,
        FormField::CardNumber,
        FormField::ExpiryDate,
        FormField::Cvv,
    ];

    /// Wire name of the field (matches the persisted JSON keys)
    pub fn as_str(&self) -> &'static str {
        match self {
            FormField::Email => "email",
            FormField::FullName => "fullName",
            FormField::CardNumber => "cardNumber",
            FormField::ExpiryDate => "expiryDate",
            FormField::Cvv => "cvv",
        }
    }

    /// Whether the field carries payment card data (never logged in clear)
    #[inline]
    pub fn is_sensitive(&self) -> bool {
        matches!(self, FormField::CardNumber | FormField::Cvv)
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FormField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FormField::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| format!("unknown form field: {}", s))
    }
}

/// Field-scoped error messages, keyed by field
pub type FieldErrors = BTreeMap<FormField, String>;

/// Checkout form values (display representation)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormData {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub card_number: String,
    #[serde(default)]
    pub expiry_date: String,
    #[serde(default)]
    pub cvv: String,
}

impl FormData {
    /// Read a field by identity
    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::Email => &self.email,
            FormField::FullName => &self.full_name,
            FormField::CardNumber => &self.card_number,
            FormField::ExpiryDate => &self.expiry_date,
            FormField::Cvv => &self.cvv,
        }
    }

    /// Overwrite a field by identity
    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        let slot = match field {
            FormField::Email => &mut self.email,
            FormField::FullName => &mut self.full_name,
            FormField::CardNumber => &mut self.card_number,
            FormField::ExpiryDate => &mut self.expiry_date,
            FormField::Cvv => &mut self.cvv,
        };
        *slot = value.into();
    }

    /// True if at least one field holds text
    pub fn has_any_value(&self) -> bool {
        FormField::ALL.iter().any(|f| !self.get(*f).is_empty())
    }

    /// Shallow merge: fields present in `patch` replace current values
    pub fn merge(&mut self, patch: &FormDataPatch) {
        for (field, value) in patch.iter() {
            self.set(field, value);
        }
    }
}

/// Partial update of [`FormData`]; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormDataPatch {
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub card_number: Option<String>,
    pub expiry_date: Option<String>,
    pub cvv: Option<String>,
}

impl FormDataPatch {
    /// Patch touching a single field
    pub fn single(field: FormField, value: impl Into<String>) -> Self {
        let mut patch = Self::default();
        let value = Some(value.into());
        match field {
            FormField::Email => patch.email = value,
            FormField::FullName => patch.full_name = value,
            FormField::CardNumber => patch.card_number = value,
            FormField::ExpiryDate => patch.expiry_date = value,
            FormField::Cvv => patch.cvv = value,
        }
        patch
    }

    /// Iterate over the fields this patch sets
    pub fn iter(&self) -> impl Iterator<Item = (FormField, &str)> {
        [
            (FormField::Email, &self.email),
            (FormField::FullName, &self.full_name),
            (FormField::CardNumber, &self.card_number),
            (FormField::ExpiryDate, &self.expiry_date),
            (FormField::Cvv, &self.cvv),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.as_deref().map(|v| (field, v)))
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

impl From<FormData> for FormDataPatch {
    fn from(data: FormData) -> Self {
        Self {
            email: Some(data.email),
            full_name: Some(data.full_name),
            card_number: Some(data.card_number),
            expiry_date: Some(data.expiry_date),
            cvv: Some(data.cvv),
        }
    }
}
