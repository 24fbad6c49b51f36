// 🧾 TaxPayer Entity - title + tax number
//
// The tax number is the identity: two taxpayers are the same taxpayer when
// their tax numbers match, whatever their titles say.

use crate::error::ValidationError;
use crate::validation::{self, TaxNumberKind};
use serde::Serialize;
use std::hash::{Hash, Hasher};

/// A taxpayer on the roster.
///
/// Fields are private so that a constructed value always carries a non-empty
/// title and a valid tax number. The only exception is `TaxPayer::default()`,
/// an empty placeholder that `is_valid()` reports as invalid and the store
/// refuses to persist.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TaxPayer {
    title: String,
    tax_number: String,
}

impl TaxPayer {
    /// Create a validated taxpayer.
    ///
    /// The tax number is trimmed before validation; the title is kept as is.
    pub fn new(title: impl Into<String>, tax_number: &str) -> Result<Self, ValidationError> {
        let mut taxpayer = TaxPayer::default();
        taxpayer.set_title(title)?;
        taxpayer.set_tax_number(tax_number)?;
        Ok(taxpayer)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn tax_number(&self) -> &str {
        &self.tax_number
    }

    /// Replace the title. Empty titles are rejected and leave the value untouched.
    pub fn set_title(&mut self, title: impl Into<String>) -> Result<(), ValidationError> {
        let title = title.into();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        self.title = title;
        Ok(())
    }

    /// Replace the tax number. Invalid numbers leave the value untouched.
    pub fn set_tax_number(&mut self, tax_number: &str) -> Result<(), ValidationError> {
        let trimmed = tax_number.trim();
        if !validation::is_valid_tax_number(trimmed) {
            return Err(ValidationError::InvalidTaxNumber(tax_number.to_string()));
        }
        self.tax_number = trimmed.to_string();
        Ok(())
    }

    /// Whether this value may be persisted.
    pub fn is_valid(&self) -> bool {
        self.check().is_ok()
    }

    /// Same rules as the setters, applied to the current state.
    pub fn check(&self) -> Result<(), ValidationError> {
        if self.title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if !validation::is_valid_tax_number(&self.tax_number) {
            return Err(ValidationError::InvalidTaxNumber(self.tax_number.clone()));
        }
        Ok(())
    }

    /// VKN or TCKN; `None` for the default placeholder.
    pub fn kind(&self) -> Option<TaxNumberKind> {
        validation::classify(&self.tax_number)
    }

    /// True if `tax_number` is valid and identifies this taxpayer.
    pub fn has_tax_number(&self, tax_number: &str) -> bool {
        validation::is_same_tax_number(tax_number, &self.tax_number)
    }
}

impl PartialEq for TaxPayer {
    fn eq(&self, other: &Self) -> bool {
        self.tax_number == other.tax_number
    }
}

impl Eq for TaxPayer {}

impl Hash for TaxPayer {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.tax_number.hash(state);
    }
}

impl std::fmt::Display for TaxPayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.title, self.tax_number)
    }
}
