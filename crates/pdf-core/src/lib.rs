//! PDF Core - Low-level PDF composition for invoice rendering
//!
//! This crate provides functionality for:
//! - Opening a PDF template or building a page from a background image
//! - Built-in Helvetica fonts and embedded TrueType font families
//! - Inserting aligned text at specific coordinates, optionally clipped
//! - Inserting images (JPEG, PNG)
//!
//! # Example
//!
//! ```ignore
//! use pdf_core::{Align, FontFamily, PdfDocument};
//!
//! let mut doc = PdfDocument::open("template.pdf")?;
//! doc.register_font_family("body", FontFamily::helvetica())?;
//! doc.set_font("body", 10.0)?;
//! doc.insert_text("Factuur", 1, 400.0, 150.0, Align::Left)?;
//! let bytes = doc.into_bytes()?;
//! ```

mod document;
mod font;
mod image;
mod metrics;
mod text;

pub use document::{Color, PdfDocument, A4_HEIGHT, A4_WIDTH};
pub use font::{BuiltinFont, FontFace, FontFamily, FontWeight, TrueTypeFont};
pub use image::{detect_format, ImageFormat, ImageScaleMode};
pub use text::{
    generate_clip_operators, generate_text_operators, wrap_text, ClipRect, TextRenderContext,
};

use thiserror::Error;

/// Errors that can occur during PDF operations
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Failed to open PDF: {0}")]
    OpenError(String),

    #[error("Failed to save PDF: {0}")]
    SaveError(String),

    #[error("Font not found: {0}")]
    FontNotFound(String),

    #[error("Font already exists: {0}")]
    FontAlreadyExists(String),

    #[error("Failed to parse font: {0}")]
    FontParseError(String),

    #[error("Invalid page number: {0} (document has {1} pages)")]
    InvalidPage(usize, usize),

    #[error("Image error: {0}")]
    ImageError(String),

    #[error("PDF parsing error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Lopdf error: {0}")]
    LopdfError(#[from] lopdf::Error),
}

/// Result type for PDF operations
pub type Result<T> = std::result::Result<T, PdfError>;

/// Text alignment relative to the anchor x coordinate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}
