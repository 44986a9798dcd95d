//! Layout - where each invoice field is drawn
//!
//! This crate provides:
//! - [`LayoutPosition`] and [`LayoutSettings`], the persisted layout model
//! - [`FieldName`], the closed set of ten field slots
//! - Aggregated validation ([`ValidationError`])
//! - [`LayoutStore`], get-or-create / replace / reset / single-field update
//!
//! # Example
//!
//! ```ignore
//! use layout::{LayoutPosition, LayoutStore, SystemClock};
//! use std::sync::Arc;
//!
//! let layouts = LayoutStore::new(store, Arc::new(SystemClock));
//! let current = layouts.get()?;
//! layouts.update_field("BaseAmount", LayoutPosition::at(400, 480, 11).bold())?;
//! ```

mod clock;
mod field;
mod position;
mod settings;
mod store;
mod validation;

pub use clock::{Clock, FixedClock, SystemClock};
pub use field::FieldName;
pub use position::{
    LayoutPosition, PositionInput, TextAlign, UnknownAlign, FONT_SIZE_RANGE, LEFT_RANGE,
    MAX_HEIGHT_RANGE, TOP_RANGE,
};
pub use settings::{LayoutSettings, SettingsInput, LAYOUT_SETTINGS_ID, SYSTEM_USER};
pub use store::{LayoutStore, LAYOUT_COLLECTION};
pub use validation::{ValidationError, Violation, Violations};

use docstore::StoreError;
use thiserror::Error;

/// Errors that can occur while reading or changing the layout
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Unknown layout field: {0:?}")]
    UnknownField(String),

    #[error("Invalid layout JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Storage failure: {0}")]
    Storage(#[from] StoreError),
}

/// Result type for layout operations
pub type Result<T> = std::result::Result<T, LayoutError>;
