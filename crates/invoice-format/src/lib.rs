//! Invoice Format - locale formatting for invoice documents
//!
//! This crate provides:
//! - Currency formatting (`€ 1.234,56` by default)
//! - Date formatting (`dd-MM-yyyy`) and PDF timestamps
//! - VAT split arithmetic (total including VAT into base and VAT amount)
//!
//! # Example
//!
//! ```
//! use invoice_format::{split_vat, CurrencyFormat};
//!
//! let split = split_vat(121.0, 21.0).unwrap();
//! let euro = CurrencyFormat::default();
//! assert_eq!(euro.format(split.base), "€ 100,00");
//! assert_eq!(euro.format(split.vat), "€ 21,00");
//! ```

mod currency;
mod date;
mod vat;

pub use currency::{round_cents, CurrencyFormat, MAX_PRECISION};
pub use date::{due_date, format_date, format_pdf_timestamp, DATE_PATTERN};
pub use vat::{split_vat, VatSplit};

use thiserror::Error;

/// Errors that can occur during invoice formatting
#[derive(Debug, Error, PartialEq)]
pub enum FormatError {
    #[error("Invalid VAT rate: {0}")]
    InvalidVatRate(f64),

    #[error("Invalid amount: {0}")]
    InvalidAmount(f64),
}

/// Result type for formatting operations
pub type Result<T> = std::result::Result<T, FormatError>;
