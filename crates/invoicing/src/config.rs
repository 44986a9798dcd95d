//! Renderer configuration

use invoice_format::CurrencyFormat;
use pdf_core::{Color, FontFamily};

/// Typeface used for every field
#[derive(Debug, Clone, Default)]
pub enum FontChoice {
    /// Standard Helvetica, no font file needed
    #[default]
    Helvetica,
    /// Embedded TrueType family; bold falls back to regular
    TrueType {
        regular: Vec<u8>,
        bold: Option<Vec<u8>>,
    },
}

impl FontChoice {
    pub(crate) fn family(&self) -> pdf_core::Result<FontFamily> {
        match self {
            FontChoice::Helvetica => Ok(FontFamily::helvetica()),
            FontChoice::TrueType { regular, bold } => {
                FontFamily::from_ttf("InvoiceFont", regular.clone(), bold.clone())
            }
        }
    }
}

/// Settings fixed when a [`DocumentRenderer`](crate::DocumentRenderer) is built
#[derive(Debug, Clone)]
pub struct RendererConfig {
    pub font: FontChoice,
    pub currency: CurrencyFormat,
    /// Days between invoice date and due date in the payment note
    pub payment_term_days: u32,
    pub text_color: Color,
    /// Baseline distance as a multiple of the font size
    pub line_height: f64,
    /// Distance kept from the page edge when wrapping
    pub page_margin: f64,
    /// Written to the PDF Producer entry
    pub producer: String,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            font: FontChoice::default(),
            currency: CurrencyFormat::default(),
            payment_term_days: 14,
            text_color: Color::black(),
            line_height: 1.2,
            page_margin: 20.0,
            producer: "scheve".to_string(),
        }
    }
}
