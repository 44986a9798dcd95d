//! Integration tests for pdf-core
//!
//! These tests verify end-to-end overlay composition on real PDF structures.

use lopdf::{dictionary, Document, Object, Stream};
use pdf_core::{Align, Color, FontFamily, FontWeight, ImageScaleMode, PdfDocument, PdfError};
use pretty_assertions::assert_eq;

/// Create a one-page template with existing content and a font resource
///
/// The Resources dictionary is stored as an indirect object and the
/// MediaBox is inherited from the Pages node, as many generated templates do.
fn create_template_pdf(page_count: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.4");
    let pages_id = doc.new_object_id();

    let template_font = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Times-Roman",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => template_font },
    });

    let mut kids = Vec::new();
    for i in 0..page_count {
        let content = format!("BT /F1 18 Tf 50 780 Td (Template page {}) Tj ET\n1 0 0 RG", i + 1);
        let contents_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Resources" => resources_id,
            "Contents" => contents_id,
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count as i64,
            "MediaBox" => vec![0.into(), 0.into(), Object::Real(595.28), Object::Real(841.89)],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

fn create_test_png() -> Vec<u8> {
    use image::{ImageBuffer, Luma};

    let img: ImageBuffer<Luma<u8>, Vec<u8>> = ImageBuffer::from_pixel(16, 16, Luma([200]));
    let mut buffer = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut buffer), image::ImageFormat::Png)
        .unwrap();
    buffer
}

fn page_content(bytes: &[u8], page: u32) -> String {
    let doc = Document::load_mem(bytes).unwrap();
    let page_id = *doc.get_pages().get(&page).unwrap();
    String::from_utf8_lossy(&doc.get_page_content(page_id).unwrap()).into_owned()
}

fn page_resources(bytes: &[u8], page: u32) -> lopdf::Dictionary {
    let doc = Document::load_mem(bytes).unwrap();
    let page_id = *doc.get_pages().get(&page).unwrap();
    let page_dict = doc.get_object(page_id).unwrap().as_dict().unwrap();
    page_dict.get(b"Resources").unwrap().as_dict().unwrap().clone()
}

fn helvetica_doc(pdf: &[u8]) -> PdfDocument {
    let mut doc = PdfDocument::open_from_bytes(pdf).unwrap();
    doc.register_font_family("body", FontFamily::helvetica()).unwrap();
    doc.set_font("body", 10.0).unwrap();
    doc
}

#[test]
fn test_open_save_roundtrip() {
    let doc = PdfDocument::open_from_bytes(&create_template_pdf(1)).unwrap();
    assert_eq!(doc.page_count(), 1);

    let saved = doc.into_bytes().unwrap();
    let reopened = PdfDocument::open_from_bytes(&saved).unwrap();
    assert_eq!(reopened.page_count(), 1);
}

#[test]
fn test_inherited_media_box() {
    let doc = PdfDocument::open_from_bytes(&create_template_pdf(1)).unwrap();
    let (width, height) = doc.page_size(1).unwrap();
    assert!((width - 595.28).abs() < 0.01);
    assert!((height - 841.89).abs() < 0.01);
}

#[test]
fn test_open_rejects_garbage() {
    let err = PdfDocument::open_from_bytes(b"not a pdf").err().unwrap();
    assert!(matches!(err, PdfError::OpenError(_)));
}

#[test]
fn test_overlay_keeps_template_content_and_resources() {
    let pdf = create_template_pdf(1);
    let mut doc = helvetica_doc(&pdf);
    doc.insert_text("Voorbeeld Student", 1, 400.0, 150.0, Align::Left).unwrap();

    let saved = doc.into_bytes().unwrap();
    let content = page_content(&saved, 1);

    // template content is isolated in its own graphics state
    assert!(content.starts_with("q\n"));
    assert!(content.contains("(Template page 1) Tj"));
    assert!(content.contains("\nQ\n"));
    assert!(content.contains("/OF1 10 Tf"));

    let resources = page_resources(&saved, 1);
    let fonts = resources.get(b"Font").unwrap().as_dict().unwrap();
    assert!(fonts.has(b"F1"));
    assert!(fonts.has(b"OF1"));
}

#[test]
fn test_alignment_offsets_use_measured_width() {
    let pdf = create_template_pdf(1);
    let mut doc = helvetica_doc(&pdf);
    let width = doc.text_width("Totaal").unwrap();
    doc.insert_text("Totaal", 1, 500.0, 100.0, Align::Right).unwrap();

    let content = page_content(&doc.into_bytes().unwrap(), 1);
    let expected_x = 500.0 - width;
    assert!(content.contains(&format!("{expected_x} ")));
}

#[test]
fn test_text_on_multiple_pages() {
    let pdf = create_template_pdf(2);
    let mut doc = helvetica_doc(&pdf);
    doc.insert_text("Pagina 1", 1, 50.0, 50.0, Align::Left).unwrap();
    doc.set_font_weight(FontWeight::Bold).unwrap();
    doc.insert_text("Pagina 2", 2, 50.0, 50.0, Align::Left).unwrap();

    let saved = doc.into_bytes().unwrap();
    assert!(page_content(&saved, 1).contains("/OF1 10 Tf"));
    assert!(page_content(&saved, 2).contains("/OF2 10 Tf"));

    let page2_fonts = page_resources(&saved, 2);
    let fonts = page2_fonts.get(b"Font").unwrap().as_dict().unwrap();
    assert!(fonts.has(b"OF2"));
    assert!(!fonts.has(b"OF1"));
}

#[test]
fn test_empty_text_is_noop() {
    let pdf = create_template_pdf(1);
    let mut doc = helvetica_doc(&pdf);
    doc.insert_text("", 1, 50.0, 50.0, Align::Left).unwrap();

    let saved = doc.into_bytes().unwrap();
    assert!(!page_content(&saved, 1).contains("Tf\n"));
}

#[test]
fn test_text_color() {
    let pdf = create_template_pdf(1);
    let mut doc = helvetica_doc(&pdf);
    doc.set_text_color(Color::from_rgb(0, 0, 255));
    doc.insert_text("Blauw", 1, 50.0, 50.0, Align::Left).unwrap();

    let content = page_content(&doc.into_bytes().unwrap(), 1);
    assert!(content.contains("0 0 1 rg"));
}

#[test]
fn test_background_image_on_blank_page() {
    let mut doc = PdfDocument::blank(pdf_core::A4_WIDTH, pdf_core::A4_HEIGHT);
    doc.insert_image_scaled(
        &create_test_png(),
        1,
        0.0,
        0.0,
        pdf_core::A4_WIDTH,
        pdf_core::A4_HEIGHT,
        ImageScaleMode::Stretch,
    )
    .unwrap();

    let saved = doc.into_bytes().unwrap();
    assert!(page_content(&saved, 1).contains("/OIm1 Do"));

    let resources = page_resources(&saved, 1);
    let xobjects = resources.get(b"XObject").unwrap().as_dict().unwrap();
    assert!(xobjects.has(b"OIm1"));
}

#[test]
fn test_insert_image_rejects_unknown_data() {
    let mut doc = PdfDocument::blank(pdf_core::A4_WIDTH, pdf_core::A4_HEIGHT);
    let err = doc
        .insert_image_scaled(b"GIF89a....", 1, 0.0, 0.0, 10.0, 10.0, ImageScaleMode::Stretch)
        .unwrap_err();
    assert!(matches!(err, PdfError::ImageError(_)));
}

#[test]
fn test_save_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.pdf");

    let pdf = create_template_pdf(1);
    let mut doc = helvetica_doc(&pdf);
    doc.insert_text("Factuur", 1, 400.0, 195.0, Align::Left).unwrap();
    doc.save(&path).unwrap();

    let reopened = PdfDocument::open(&path).unwrap();
    assert_eq!(reopened.page_count(), 1);
}

#[test]
fn test_template_overlay_is_deterministic() {
    let pdf = create_template_pdf(1);
    let render = || {
        let mut doc = helvetica_doc(&pdf);
        doc.begin_clip(1, 100.0, 300.0, 400.0, 15.0).unwrap();
        doc.insert_text("Schilderles", 1, 100.0, 310.0, Align::Left).unwrap();
        doc.end_clip(1).unwrap();
        doc.into_bytes().unwrap()
    };
    assert_eq!(render(), render());
}
