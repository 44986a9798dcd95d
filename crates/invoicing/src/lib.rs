//! Invoicing - rendering invoices onto a template and the operations around it
//!
//! This crate provides:
//! - Domain records ([`Student`], [`Invoice`])
//! - [`DocumentRenderer`], which overlays the ten layout fields on a PDF or
//!   image template
//! - System settings, the invoice PDF archive and batch generation
//! - [`Backoffice`], the facade used by the command line
//!
//! # Example
//!
//! ```ignore
//! use invoicing::{Backoffice, FsTemplateSource, InvoiceArchive, RendererConfig, SystemClock};
//! use docstore::JsonFileStore;
//! use std::sync::Arc;
//!
//! let store = Arc::new(JsonFileStore::open("data")?);
//! let archive = InvoiceArchive::open("Invoices")?;
//! let office = Backoffice::new(
//!     store,
//!     Arc::new(FsTemplateSource::new()),
//!     archive,
//!     RendererConfig::default(),
//!     Arc::new(SystemClock),
//! );
//! let pdf = office.preview(None)?;
//! ```

mod archive;
mod backoffice;
mod batch;
mod config;
mod fields;
mod models;
mod renderer;
mod system;
mod template;

pub use archive::InvoiceArchive;
pub use backoffice::{Backoffice, INVOICES_COLLECTION, STUDENTS_COLLECTION};
pub use batch::{BatchGenerationResult, BatchInvoiceRequest};
pub use config::{FontChoice, RendererConfig};
pub use fields::FieldValues;
pub use models::{Invoice, Student};
pub use renderer::DocumentRenderer;
pub use system::{SystemSettings, SystemSettingsStore, SYSTEM_SETTINGS_COLLECTION, SYSTEM_SETTINGS_ID};
pub use template::{FsTemplateSource, TemplateKind, TemplateSource};

pub use layout::{Clock, FixedClock, SystemClock};

use docstore::StoreError;
use invoice_format::FormatError;
use layout::{LayoutError, ValidationError};
use pdf_core::PdfError;
use thiserror::Error;

/// Errors that can occur while producing or managing invoices
#[derive(Debug, Error)]
pub enum InvoiceError {
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error("Storage failure: {0}")]
    Storage(StoreError),

    #[error("Amount error: {0}")]
    Format(#[from] FormatError),

    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Student not found: {0}")]
    StudentNotFound(String),

    #[error("Invoice not found: {0}")]
    InvoiceNotFound(String),

    #[error("Operation cancelled")]
    Cancelled,
}

impl From<StoreError> for InvoiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Cancelled => InvoiceError::Cancelled,
            other => InvoiceError::Storage(other),
        }
    }
}

/// Coarse category of an [`InvoiceError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Input rejected, nothing was written
    Validation,
    /// Layout field name outside the known set
    UnknownField,
    TemplateNotFound,
    /// Student or invoice record missing
    NotFound,
    /// Persistence or file system failure
    Storage,
    /// Document could not be produced
    Render,
    Cancelled,
}

impl InvoiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            InvoiceError::TemplateNotFound(_) => ErrorKind::TemplateNotFound,
            InvoiceError::Validation(_) => ErrorKind::Validation,
            InvoiceError::Layout(LayoutError::Validation(_) | LayoutError::Parse(_)) => {
                ErrorKind::Validation
            }
            InvoiceError::Layout(LayoutError::UnknownField(_)) => ErrorKind::UnknownField,
            InvoiceError::Layout(LayoutError::Storage(StoreError::Cancelled)) => ErrorKind::Cancelled,
            InvoiceError::Layout(LayoutError::Storage(_)) => ErrorKind::Storage,
            InvoiceError::Storage(_) | InvoiceError::Io(_) => ErrorKind::Storage,
            InvoiceError::Format(_) | InvoiceError::Pdf(_) => ErrorKind::Render,
            InvoiceError::StudentNotFound(_) | InvoiceError::InvoiceNotFound(_) => {
                ErrorKind::NotFound
            }
            InvoiceError::Cancelled => ErrorKind::Cancelled,
        }
    }
}

/// Result type for invoicing operations
pub type Result<T> = std::result::Result<T, InvoiceError>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            InvoiceError::TemplateNotFound("/x".to_string()).kind(),
            ErrorKind::TemplateNotFound
        );
        assert_eq!(
            InvoiceError::from(LayoutError::UnknownField("x".to_string())).kind(),
            ErrorKind::UnknownField
        );
        assert_eq!(
            InvoiceError::from(StoreError::InvalidId("..".to_string())).kind(),
            ErrorKind::Storage
        );
        assert_eq!(InvoiceError::from(StoreError::Cancelled).kind(), ErrorKind::Cancelled);
        assert_eq!(
            InvoiceError::from(LayoutError::Storage(StoreError::Cancelled)).kind(),
            ErrorKind::Cancelled
        );
        assert_eq!(
            InvoiceError::StudentNotFound("s".to_string()).kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            InvoiceError::TemplateNotFound("/no/such/file".to_string()).to_string(),
            "Template not found: /no/such/file"
        );
    }
}
