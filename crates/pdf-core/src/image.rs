//! Image handling for PDF documents
//!
//! Background images are embedded as XObjects: JPEG data passes through
//! with DCTDecode, PNG data is decoded, flattened onto white and re-encoded
//! with FlateDecode.

use crate::{PdfError, Result};
use image::{DynamicImage, ImageDecoder, ImageReader};
use lopdf::{Dictionary, Object, Stream};
use std::io::{Cursor, Write};

impl From<image::ImageError> for PdfError {
    fn from(err: image::ImageError) -> Self {
        PdfError::ImageError(err.to_string())
    }
}

/// Detected image format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

/// How an image is fitted into its target box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageScaleMode {
    /// Fill the box exactly, ignoring aspect ratio
    #[default]
    Stretch,
    /// Scale to the box width, height follows the aspect ratio
    FitWidth,
    /// Fit within the box, preserving aspect ratio
    FitBox,
}

/// Calculate display dimensions in points for an image of
/// `original_width` x `original_height` pixels
pub fn calculate_scaled_dimensions(
    original_width: u32,
    original_height: u32,
    target_width: f64,
    target_height: f64,
    mode: ImageScaleMode,
) -> (f64, f64) {
    if original_width == 0 || original_height == 0 {
        return (target_width, target_height);
    }

    match mode {
        ImageScaleMode::Stretch => (target_width, target_height),
        ImageScaleMode::FitWidth => {
            let aspect = original_height as f64 / original_width as f64;
            (target_width, target_width * aspect)
        }
        ImageScaleMode::FitBox => {
            let scale =
                (target_width / original_width as f64).min(target_height / original_height as f64);
            (original_width as f64 * scale, original_height as f64 * scale)
        }
    }
}

/// Detect image format from magic bytes
pub fn detect_format(data: &[u8]) -> Result<ImageFormat> {
    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Ok(ImageFormat::Jpeg);
    }

    if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
        return Ok(ImageFormat::Png);
    }

    Err(PdfError::ImageError("Unknown image format".to_string()))
}

/// Number of colour components declared in a JPEG frame header
fn jpeg_components(data: &[u8]) -> Option<u8> {
    // SOFn segment: marker(2) length(2) precision(1) height(2) width(2) components(1)
    let mut i = 2;
    while i + 9 < data.len() {
        if data[i] != 0xFF {
            i += 1;
            continue;
        }

        let marker = data[i + 1];
        if (0xC0..=0xCF).contains(&marker) && ![0xC4, 0xC8, 0xCC].contains(&marker) {
            return Some(data[i + 9]);
        }

        let length = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
        if length < 2 {
            return None;
        }
        i += 2 + length;
    }
    None
}

/// Image XObject for PDF embedding
#[derive(Debug, Clone)]
pub struct ImageXObject {
    pub width: u32,
    pub height: u32,
    /// "DeviceRGB", "DeviceGray" or "DeviceCMYK"
    pub color_space: &'static str,
    pub bits_per_component: u8,
    /// "DCTDecode" for JPEG, "FlateDecode" for PNG
    pub filter: &'static str,
    /// Encoded image data
    pub data: Vec<u8>,
}

impl ImageXObject {
    /// Build an XObject from JPEG or PNG bytes
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        match detect_format(data)? {
            ImageFormat::Jpeg => Self::from_jpeg(data),
            ImageFormat::Png => Self::from_png(data),
        }
    }

    /// Create XObject from JPEG data
    ///
    /// The header is decoded to validate the file; the data itself is
    /// embedded unchanged.
    pub fn from_jpeg(data: &[u8]) -> Result<Self> {
        let decoder = ImageReader::with_format(Cursor::new(data), image::ImageFormat::Jpeg)
            .into_decoder()?;
        let (width, height) = decoder.dimensions();

        let color_space = match jpeg_components(data) {
            Some(1) => "DeviceGray",
            Some(4) => "DeviceCMYK",
            Some(3) => "DeviceRGB",
            _ => {
                return Err(PdfError::ImageError(
                    "Could not parse JPEG frame header".to_string(),
                ))
            }
        };

        Ok(Self {
            width,
            height,
            color_space,
            bits_per_component: 8,
            filter: "DCTDecode",
            data: data.to_vec(),
        })
    }

    /// Create XObject from PNG data
    ///
    /// Alpha is blended against a white background.
    pub fn from_png(data: &[u8]) -> Result<Self> {
        let decoder = ImageReader::with_format(Cursor::new(data), image::ImageFormat::Png)
            .into_decoder()?;
        let (width, height) = decoder.dimensions();
        let color_type = decoder.color_type();
        let image = DynamicImage::from_decoder(decoder)?;

        let blend = |c: u8, alpha: u8| {
            let a = alpha as f32 / 255.0;
            (c as f32 * a + 255.0 * (1.0 - a)) as u8
        };

        let (raw, color_space) = match color_type {
            image::ColorType::L8 | image::ColorType::L16 => {
                (image.to_luma8().into_raw(), "DeviceGray")
            }
            image::ColorType::La8 | image::ColorType::La16 => {
                let gray = image
                    .to_luma_alpha8()
                    .pixels()
                    .map(|p| blend(p[0], p[1]))
                    .collect();
                (gray, "DeviceGray")
            }
            image::ColorType::Rgba8 | image::ColorType::Rgba16 => {
                let rgba = image.to_rgba8();
                let mut rgb = Vec::with_capacity((width * height * 3) as usize);
                for p in rgba.pixels() {
                    rgb.extend_from_slice(&[blend(p[0], p[3]), blend(p[1], p[3]), blend(p[2], p[3])]);
                }
                (rgb, "DeviceRGB")
            }
            _ => (image.to_rgb8().into_raw(), "DeviceRGB"),
        };

        let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(&raw)?;
        let data = encoder.finish()?;

        Ok(Self {
            width,
            height,
            color_space,
            bits_per_component: 8,
            filter: "FlateDecode",
            data,
        })
    }

    /// Convert to lopdf Stream object
    pub fn to_pdf_stream(&self) -> Stream {
        let dict = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"XObject".to_vec())),
            ("Subtype", Object::Name(b"Image".to_vec())),
            ("Width", (self.width as i64).into()),
            ("Height", (self.height as i64).into()),
            ("ColorSpace", Object::Name(self.color_space.as_bytes().to_vec())),
            ("BitsPerComponent", (self.bits_per_component as i64).into()),
            ("Filter", Object::Name(self.filter.as_bytes().to_vec())),
        ]);

        Stream::new(dict, self.data.clone())
    }
}

/// Generate operators to draw an image resource
///
/// `x`/`y` is the lower-left corner in PDF coordinates.
pub fn generate_image_operators(
    image_name: &str,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
) -> Vec<u8> {
    format!("q\n{width} 0 0 {height} {x} {y} cm\n/{image_name} Do\nQ\n").into_bytes()
}
