//! Fixtures shared by the invoicing tests

#![allow(dead_code)]

use chrono::{NaiveDate, TimeZone, Utc};
use invoicing::{FixedClock, Invoice, Student};
use lopdf::{dictionary, Document, Object, Stream};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub fn clock() -> Arc<FixedClock> {
    Arc::new(FixedClock(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()))
}

pub fn student() -> Student {
    Student {
        id: "s1".to_string(),
        name: Some("A".to_string()),
        address: Some("B".to_string()),
        email: Some("c@d.nl".to_string()),
        ..Student::default()
    }
}

pub fn invoice() -> Invoice {
    Invoice {
        id: "X".to_string(),
        student_id: "s1".to_string(),
        date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        amount_total: 121.0,
        vat: 21.0,
        description: Some("Y".to_string()),
        invoice_pdf_path: None,
    }
}

/// One-page A4 letterhead with its own content and font
pub fn template_pdf() -> Vec<u8> {
    let mut doc = Document::with_version("1.4");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Times-Roman",
    });
    let content = b"BT /F1 20 Tf 50 790 Td (Schilderschool) Tj ET".to_vec();
    let contents_id = doc.add_object(Stream::new(dictionary! {}, content));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
        "Contents" => contents_id,
    });

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
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

pub fn template_png() -> Vec<u8> {
    use image::{ImageBuffer, Rgb};

    let img: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::from_pixel(20, 28, Rgb([250, 245, 235]));
    let mut buffer = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut buffer), image::ImageFormat::Png)
        .unwrap();
    buffer
}

pub fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

/// Decoded content of page 1
pub fn page_content(pdf: &[u8]) -> String {
    let doc = Document::load_mem(pdf).unwrap();
    let page_id = *doc.get_pages().get(&1).unwrap();
    String::from_utf8_lossy(&doc.get_page_content(page_id).unwrap()).into_owned()
}

/// Hex string operand for `text` in the built-in fonts' encoding
pub fn winansi_hex(text: &str) -> String {
    let bytes: String = text
        .chars()
        .map(|c| match c {
            '€' => "80".to_string(),
            c => format!("{:02X}", c as u32),
        })
        .collect();
    format!("<{bytes}>")
}
