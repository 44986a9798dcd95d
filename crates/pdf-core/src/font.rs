//! Font handling for PDF documents
//!
//! Two kinds of faces are supported: the standard Type1 Helvetica pair, which
//! needs no font program and encodes text as WinAnsi, and embedded TrueType
//! fonts, which are written as Type0/CIDFontType2 with Identity-H encoding.

use crate::metrics::{winansi_byte, WidthTable, HELVETICA_BOLD_TABLE, HELVETICA_TABLE};
use crate::{PdfError, Result};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Font weight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontWeight {
    #[default]
    Regular,
    Bold,
}

/// The standard 14 fonts this crate knows metrics for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinFont {
    Helvetica,
    HelveticaBold,
}

impl BuiltinFont {
    /// PostScript name written as /BaseFont
    pub fn base_font_name(&self) -> &'static str {
        match self {
            BuiltinFont::Helvetica => "Helvetica",
            BuiltinFont::HelveticaBold => "Helvetica-Bold",
        }
    }

    fn widths(&self) -> &'static WidthTable {
        match self {
            BuiltinFont::Helvetica => &HELVETICA_TABLE,
            BuiltinFont::HelveticaBold => &HELVETICA_BOLD_TABLE,
        }
    }

    fn text_width_points(&self, text: &str, font_size: f32) -> f64 {
        let table = self.widths();
        let units: u32 = text.chars().map(|c| table.char_width(c) as u32).sum();
        units as f64 / 1000.0 * font_size as f64
    }

    fn encode_text_hex(&self, text: &str) -> String {
        let mut result = String::with_capacity(text.len() * 2 + 2);
        result.push('<');
        for c in text.chars() {
            result.push_str(&format!("{:02X}", winansi_byte(c)));
        }
        result.push('>');
        result
    }

    fn to_pdf_dictionary(&self) -> Dictionary {
        Dictionary::from_iter(vec![
            ("Type", "Font".into()),
            ("Subtype", "Type1".into()),
            ("BaseFont", Object::Name(self.base_font_name().into())),
            ("Encoding", "WinAnsiEncoding".into()),
        ])
    }
}

/// An embedded TrueType font
#[derive(Debug, Clone)]
pub struct TrueTypeFont {
    /// Font name/identifier (also used as /BaseFont)
    pub name: String,
    /// Raw TTF data
    ttf_data: Arc<Vec<u8>>,
    /// Characters used so far (drives /W and ToUnicode)
    pub used_chars: BTreeSet<char>,
    units_per_em: u16,
    ascender: i16,
    descender: i16,
}

impl TrueTypeFont {
    /// Create font data from TTF bytes
    ///
    /// # Arguments
    /// * `name` - Font identifier
    /// * `ttf_data` - TrueType font file bytes
    pub fn from_ttf(name: &str, ttf_data: Vec<u8>) -> Result<Self> {
        let (units_per_em, ascender, descender) = {
            let face = ttf_parser::Face::parse(&ttf_data, 0)
                .map_err(|e| PdfError::FontParseError(format!("{e:?}")))?;
            (face.units_per_em(), face.ascender(), face.descender())
        };

        Ok(Self {
            name: name.to_string(),
            ttf_data: Arc::new(ttf_data),
            used_chars: BTreeSet::new(),
            units_per_em,
            ascender,
            descender,
        })
    }

    fn face(&self) -> Option<ttf_parser::Face<'_>> {
        ttf_parser::Face::parse(&self.ttf_data, 0).ok()
    }

    /// Get glyph ID for a character
    pub fn glyph_id(&self, c: char) -> Option<u16> {
        self.face()
            .and_then(|face| face.glyph_index(c).map(|id| id.0))
    }

    /// Check if font has a glyph for the given character
    pub fn has_glyph(&self, c: char) -> bool {
        self.glyph_id(c).map(|id| id != 0).unwrap_or(false)
    }

    /// Font units per em
    pub fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    /// Calculate text width in points for a given font size
    pub fn text_width_points(&self, text: &str, font_size: f32) -> f64 {
        let Some(face) = self.face() else {
            return 0.0;
        };
        let width: u32 = text
            .chars()
            .filter_map(|c| face.glyph_index(c))
            .filter_map(|gid| face.glyph_hor_advance(gid))
            .map(|w| w as u32)
            .sum();
        width as f64 / self.units_per_em as f64 * font_size as f64
    }

    /// Encode text as glyph-id hex string for the Tj operator
    pub fn encode_text_hex(&self, text: &str) -> String {
        let face = self.face();
        let mut result = String::from("<");
        for c in text.chars() {
            let gid = face
                .as_ref()
                .and_then(|f| f.glyph_index(c))
                .map(|g| g.0)
                .unwrap_or(0);
            result.push_str(&format!("{gid:04X}"));
        }
        result.push('>');
        result
    }

    /// Add the font program and its dictionaries to the document
    fn embed(&self, doc: &mut Document) -> ObjectId {
        let font_name = Object::Name(self.name.clone().into());

        let tounicode_content = self.generate_tounicode_cmap();
        let tounicode_id = doc.add_object(Stream::new(
            Dictionary::from_iter(vec![("Type", "CMap".into())]),
            tounicode_content.into_bytes(),
        ));

        let font_file_id = doc.add_object(Stream::new(
            Dictionary::from_iter(vec![(
                "Length1",
                (self.ttf_data.len() as i64).into(),
            )]),
            self.ttf_data.as_ref().clone(),
        ));

        let scale = |v: i16| (v as i64 * 1000) / self.units_per_em.max(1) as i64;
        let ascent = scale(self.ascender);
        let descent = scale(self.descender);

        let font_descriptor_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", "FontDescriptor".into()),
            ("FontName", font_name.clone()),
            ("Flags", 32.into()),
            (
                "FontBBox",
                vec![0.into(), descent.into(), 1000.into(), ascent.into()].into(),
            ),
            ("ItalicAngle", 0.into()),
            ("Ascent", ascent.into()),
            ("Descent", descent.into()),
            ("CapHeight", ascent.into()),
            ("StemV", 80.into()),
            ("FontFile2", Object::Reference(font_file_id)),
        ]));

        let cid_system_info = Dictionary::from_iter(vec![
            ("Registry", Object::string_literal("Adobe")),
            ("Ordering", Object::string_literal("Identity")),
            ("Supplement", 0.into()),
        ]);

        let cid_font_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", "Font".into()),
            ("Subtype", "CIDFontType2".into()),
            ("BaseFont", font_name.clone()),
            ("CIDSystemInfo", cid_system_info.into()),
            ("FontDescriptor", Object::Reference(font_descriptor_id)),
            ("W", self.generate_widths_array().into()),
            ("DW", 1000.into()),
            ("CIDToGIDMap", "Identity".into()),
        ]));

        doc.add_object(Dictionary::from_iter(vec![
            ("Type", "Font".into()),
            ("Subtype", "Type0".into()),
            ("BaseFont", font_name),
            ("Encoding", "Identity-H".into()),
            (
                "DescendantFonts",
                vec![Object::Reference(cid_font_id)].into(),
            ),
            ("ToUnicode", Object::Reference(tounicode_id)),
        ]))
    }

    /// Generate /W array (widths scaled to 1000 units per em)
    fn generate_widths_array(&self) -> Vec<Object> {
        let mut widths = Vec::new();
        let Some(face) = self.face() else {
            return widths;
        };

        let mut gids: Vec<u16> = self
            .used_chars
            .iter()
            .filter_map(|&c| face.glyph_index(c).map(|g| g.0))
            .collect();
        gids.sort_unstable();
        gids.dedup();

        for gid in gids {
            let advance = face
                .glyph_hor_advance(ttf_parser::GlyphId(gid))
                .unwrap_or(self.units_per_em);
            let scaled = advance as i64 * 1000 / self.units_per_em.max(1) as i64;
            widths.push((gid as i64).into());
            widths.push(vec![scaled.into()].into());
        }

        widths
    }

    /// Generate ToUnicode CMap stream content
    fn generate_tounicode_cmap(&self) -> String {
        let mut cmap = String::new();

        cmap.push_str("/CIDInit /ProcSet findresource begin\n");
        cmap.push_str("12 dict begin\n");
        cmap.push_str("begincmap\n");
        cmap.push_str("/CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n");
        cmap.push_str("/CMapName /Adobe-Identity-UCS def\n");
        cmap.push_str("/CMapType 2 def\n");
        cmap.push_str("1 begincodespacerange\n");
        cmap.push_str("<0000> <FFFF>\n");
        cmap.push_str("endcodespacerange\n");

        let chars: Vec<char> = self.used_chars.iter().copied().collect();
        // bfchar sections are limited to 100 entries each
        for chunk in chars.chunks(100) {
            cmap.push_str(&format!("{} beginbfchar\n", chunk.len()));
            for c in chunk {
                let gid = self.glyph_id(*c).unwrap_or(0);
                let mut utf16 = [0u16; 2];
                let units: String = c
                    .encode_utf16(&mut utf16)
                    .iter()
                    .map(|u| format!("{u:04X}"))
                    .collect();
                cmap.push_str(&format!("<{gid:04X}> <{units}>\n"));
            }
            cmap.push_str("endbfchar\n");
        }

        cmap.push_str("endcmap\n");
        cmap.push_str("CMapName currentdict /CMap defineresource pop\n");
        cmap.push_str("end\n");
        cmap.push_str("end\n");

        cmap
    }
}

/// A single font variant usable for text insertion
#[derive(Debug, Clone)]
pub enum FontFace {
    Builtin(BuiltinFont),
    TrueType(TrueTypeFont),
}

impl FontFace {
    /// Unique key for resource bookkeeping
    pub fn key(&self) -> &str {
        match self {
            FontFace::Builtin(font) => font.base_font_name(),
            FontFace::TrueType(font) => &font.name,
        }
    }

    /// Text width in points at the given size
    pub fn text_width_points(&self, text: &str, font_size: f32) -> f64 {
        match self {
            FontFace::Builtin(font) => font.text_width_points(text, font_size),
            FontFace::TrueType(font) => font.text_width_points(text, font_size),
        }
    }

    /// Ascent above the baseline in points
    pub fn ascent_points(&self, font_size: f32) -> f64 {
        let per_mille = match self {
            FontFace::Builtin(_) => 718.0,
            FontFace::TrueType(font) => {
                font.ascender as f64 * 1000.0 / font.units_per_em.max(1) as f64
            }
        };
        per_mille / 1000.0 * font_size as f64
    }

    /// Encode text for a Tj operator
    pub fn encode_text_hex(&self, text: &str) -> String {
        match self {
            FontFace::Builtin(font) => font.encode_text_hex(text),
            FontFace::TrueType(font) => font.encode_text_hex(text),
        }
    }

    /// Track characters so the embedded font describes them
    pub fn record_usage(&mut self, text: &str) {
        if let FontFace::TrueType(font) = self {
            font.used_chars.extend(text.chars());
        }
    }

    /// Write the font objects into `doc` and return the font dictionary id
    pub fn embed(&self, doc: &mut Document) -> ObjectId {
        match self {
            FontFace::Builtin(font) => doc.add_object(font.to_pdf_dictionary()),
            FontFace::TrueType(font) => font.embed(doc),
        }
    }
}

/// Font family with a regular and an optional bold variant
#[derive(Debug, Clone)]
pub struct FontFamily {
    pub regular: FontFace,
    pub bold: Option<FontFace>,
}

impl FontFamily {
    /// The built-in Helvetica / Helvetica-Bold pair
    pub fn helvetica() -> Self {
        Self {
            regular: FontFace::Builtin(BuiltinFont::Helvetica),
            bold: Some(FontFace::Builtin(BuiltinFont::HelveticaBold)),
        }
    }

    /// Build a family from TrueType data
    ///
    /// # Arguments
    /// * `family_name` - Family identifier, used to derive variant names
    /// * `regular` - Regular variant TTF bytes
    /// * `bold` - Optional bold variant TTF bytes
    pub fn from_ttf(family_name: &str, regular: Vec<u8>, bold: Option<Vec<u8>>) -> Result<Self> {
        let regular = TrueTypeFont::from_ttf(&format!("{family_name}-regular"), regular)?;
        let bold = bold
            .map(|data| TrueTypeFont::from_ttf(&format!("{family_name}-bold"), data))
            .transpose()?;

        Ok(Self {
            regular: FontFace::TrueType(regular),
            bold: bold.map(FontFace::TrueType),
        })
    }

    /// Get the face for a weight, falling back to regular
    pub fn variant(&self, weight: FontWeight) -> &FontFace {
        match weight {
            FontWeight::Bold => self.bold.as_ref().unwrap_or(&self.regular),
            FontWeight::Regular => &self.regular,
        }
    }

    /// Mutable variant lookup with the same fallback rules
    pub fn variant_mut(&mut self, weight: FontWeight) -> &mut FontFace {
        match weight {
            FontWeight::Bold => self.bold.as_mut().unwrap_or(&mut self.regular),
            FontWeight::Regular => &mut self.regular,
        }
    }

    /// All faces in the family
    pub fn faces(&self) -> impl Iterator<Item = &FontFace> {
        std::iter::once(&self.regular).chain(self.bold.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helvetica_family_variants() {
        let family = FontFamily::helvetica();
        assert_eq!(family.variant(FontWeight::Regular).key(), "Helvetica");
        assert_eq!(family.variant(FontWeight::Bold).key(), "Helvetica-Bold");
        assert_eq!(family.faces().count(), 2);
    }

    #[test]
    fn test_builtin_text_width() {
        let face = FontFace::Builtin(BuiltinFont::Helvetica);
        // H=722 e=556 l=222 l=222 o=556 -> 2278 units
        let width = face.text_width_points("Hello", 10.0);
        assert!((width - 22.78).abs() < 1e-9);
    }

    #[test]
    fn test_bold_is_wider() {
        let regular = FontFace::Builtin(BuiltinFont::Helvetica);
        let bold = FontFace::Builtin(BuiltinFont::HelveticaBold);
        assert!(bold.text_width_points("Totaal", 10.0) > regular.text_width_points("Totaal", 10.0));
    }

    #[test]
    fn test_builtin_encoding_hex() {
        let face = FontFace::Builtin(BuiltinFont::Helvetica);
        assert_eq!(face.encode_text_hex("A€"), "<4180>");
        assert_eq!(face.encode_text_hex(""), "<>");
    }

    #[test]
    fn test_builtin_ascent() {
        let face = FontFace::Builtin(BuiltinFont::Helvetica);
        assert!((face.ascent_points(10.0) - 7.18).abs() < 1e-9);
    }

    #[test]
    fn test_from_ttf_rejects_garbage() {
        let result = FontFamily::from_ttf("broken", vec![0, 1, 2, 3], None);
        assert!(matches!(result, Err(PdfError::FontParseError(_))));
    }

    #[test]
    fn test_builtin_embed_dictionary() {
        let mut doc = Document::with_version("1.5");
        let id = FontFace::Builtin(BuiltinFont::HelveticaBold).embed(&mut doc);
        let dict = doc.get_object(id).unwrap().as_dict().unwrap();
        assert_eq!(
            dict.get(b"BaseFont").unwrap().as_name().unwrap(),
            b"Helvetica-Bold"
        );
        assert_eq!(
            dict.get(b"Encoding").unwrap().as_name().unwrap(),
            b"WinAnsiEncoding"
        );
    }
}
