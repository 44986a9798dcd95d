//! Compositing invoice fields onto a template

use crate::config::RendererConfig;
use crate::fields::FieldValues;
use crate::models::{Invoice, Student};
use crate::template::{TemplateKind, TemplateSource};
use crate::{Clock, InvoiceError, Result};
use invoice_format::format_pdf_timestamp;
use layout::{LayoutPosition, LayoutSettings, TextAlign};
use pdf_core::{
    wrap_text, Align, FontFamily, FontWeight, ImageScaleMode, PdfDocument, A4_HEIGHT, A4_WIDTH,
};
use std::sync::Arc;
use tracing::{debug, warn};

const FONT_FAMILY: &str = "invoice";

/// Page the fields are drawn on
const OVERLAY_PAGE: usize = 1;

/// Produces finished invoice PDFs
///
/// Configuration is fixed at construction. Each call works on its own
/// document, so renders may run concurrently.
pub struct DocumentRenderer {
    config: RendererConfig,
    templates: Arc<dyn TemplateSource>,
    clock: Arc<dyn Clock>,
}

impl DocumentRenderer {
    pub fn new(
        config: RendererConfig,
        templates: Arc<dyn TemplateSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            templates,
            clock,
        }
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn templates(&self) -> &Arc<dyn TemplateSource> {
        &self.templates
    }

    /// Render one invoice
    ///
    /// Fails with `TemplateNotFound` when `template_path` does not name a
    /// readable file. A template that exists but cannot be decoded is
    /// replaced by a blank A4 page.
    pub fn render(
        &self,
        template_path: &str,
        student: &Student,
        invoice: &Invoice,
        layout: &LayoutSettings,
    ) -> Result<Vec<u8>> {
        layout.validate()?;
        let values = FieldValues::derive(student, invoice, &self.config)?;

        if !self.templates.exists(template_path) {
            return Err(InvoiceError::TemplateNotFound(template_path.to_string()));
        }
        let template = self.templates.read_bytes(template_path)?;

        let mut doc = background(template_path, &template);
        self.compose(&mut doc, layout, &values)?;

        let title = format!("Factuur {}", values.get(layout::FieldName::InvoiceId));
        doc.set_info("Title", &title);
        doc.set_info("Producer", &self.config.producer);
        doc.set_info("CreationDate", &format_pdf_timestamp(self.clock.now()));

        let bytes = doc.into_bytes()?;
        debug!(invoice = %invoice.id, bytes = bytes.len(), "rendered invoice");
        Ok(bytes)
    }

    /// Draw every non-empty field on the first page
    fn compose(
        &self,
        doc: &mut PdfDocument,
        layout: &LayoutSettings,
        values: &FieldValues,
    ) -> Result<()> {
        let family: FontFamily = self.config.font.family()?;
        doc.register_font_family(FONT_FAMILY, family)?;
        doc.set_text_color(self.config.text_color);

        let (page_width, _) = doc.page_size(OVERLAY_PAGE)?;

        for (field, position) in layout.positions() {
            let text = values.get(field);
            if text.trim().is_empty() {
                continue;
            }
            self.draw_field(doc, text, position, page_width)?;
        }
        Ok(())
    }

    fn draw_field(
        &self,
        doc: &mut PdfDocument,
        text: &str,
        position: &LayoutPosition,
        page_width: f64,
    ) -> Result<()> {
        let font_size = position.font_size as f32;
        doc.set_font(FONT_FAMILY, font_size)?;
        doc.set_font_weight(if position.bold {
            FontWeight::Bold
        } else {
            FontWeight::Regular
        })?;

        let left = f64::from(position.left);
        let top = f64::from(position.top);
        let max_height = f64::from(position.max_height);

        let max_width = available_width(position.text_align, left, page_width, self.config.page_margin);
        let lines = wrap_text(text, max_width, |line| doc.text_width(line).unwrap_or(0.0));

        let ascent = doc.ascent()?;
        let line_step = f64::from(font_size) * self.config.line_height;
        let align = pdf_align(position.text_align);

        doc.begin_clip(OVERLAY_PAGE, 0.0, top, page_width, max_height)?;
        for (i, line) in lines.iter().enumerate() {
            let line_top = top + i as f64 * line_step;
            // entirely below the clip box
            if line_top >= top + max_height {
                break;
            }
            doc.insert_text(line, OVERLAY_PAGE, left, line_top + ascent, align)?;
        }
        doc.end_clip(OVERLAY_PAGE)?;

        Ok(())
    }
}

/// Open the template as the page to draw on
fn background(path: &str, data: &[u8]) -> PdfDocument {
    match TemplateKind::detect(data) {
        TemplateKind::Pdf => match PdfDocument::open_from_bytes(data) {
            Ok(doc) => doc,
            Err(e) => {
                warn!(template = path, error = %e, "unreadable PDF template, using a blank page");
                PdfDocument::blank(A4_WIDTH, A4_HEIGHT)
            }
        },
        TemplateKind::Image(_) => {
            let mut doc = PdfDocument::blank(A4_WIDTH, A4_HEIGHT);
            match doc.insert_image_scaled(
                data,
                OVERLAY_PAGE,
                0.0,
                0.0,
                A4_WIDTH,
                A4_HEIGHT,
                ImageScaleMode::Stretch,
            ) {
                Ok(()) => doc,
                Err(e) => {
                    warn!(template = path, error = %e, "unreadable image template, using a blank page");
                    PdfDocument::blank(A4_WIDTH, A4_HEIGHT)
                }
            }
        }
        TemplateKind::Unknown => {
            warn!(template = path, "unrecognised template format, using a blank page");
            PdfDocument::blank(A4_WIDTH, A4_HEIGHT)
        }
    }
}

/// Width text may occupy before wrapping, measured from the anchor
fn available_width(align: TextAlign, left: f64, page_width: f64, margin: f64) -> f64 {
    let to_right = page_width - margin - left;
    let to_left = left - margin;
    let width = match align {
        TextAlign::Left => to_right,
        TextAlign::Right => to_left,
        TextAlign::Center => 2.0 * to_left.min(to_right),
    };
    width.max(0.0)
}

fn pdf_align(align: TextAlign) -> Align {
    match align {
        TextAlign::Left => Align::Left,
        TextAlign::Center => Align::Center,
        TextAlign::Right => Align::Right,
    }
}
