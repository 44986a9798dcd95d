//! PDF Document wrapper

use crate::font::{FontFace, FontFamily, FontWeight};
use crate::image::{
    calculate_scaled_dimensions, generate_image_operators, ImageScaleMode, ImageXObject,
};
use crate::text::{generate_clip_operators, generate_text_operators, ClipRect, TextRenderContext};
use crate::{Align, PdfError, Result};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

/// A4 page width in points
pub const A4_WIDTH: f64 = 595.28;
/// A4 page height in points
pub const A4_HEIGHT: f64 = 841.89;

/// RGB Color (values 0.0 - 1.0)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    /// Create a new RGB color (values 0.0 - 1.0)
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Create color from RGB values (0-255)
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }

    pub fn black() -> Self {
        Self::rgb(0.0, 0.0, 0.0)
    }

    pub fn red() -> Self {
        Self::rgb(1.0, 0.0, 0.0)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

/// Face keys of a registered family
#[derive(Debug, Clone)]
struct RegisteredFamily {
    regular: String,
    bold: Option<String>,
}

/// PDF Document wrapper providing high-level overlay operations
///
/// Coordinates passed to the public API are measured from the top-left
/// corner of the page; they are converted to PDF's bottom-left origin
/// internally. Drawing operations are buffered per page and written to the
/// document when it is serialised.
pub struct PdfDocument {
    inner: Document,
    /// Font faces by key (e.g. "Helvetica-Bold")
    faces: BTreeMap<String, FontFace>,
    /// Registered families by name
    families: BTreeMap<String, RegisteredFamily>,
    current_family: Option<String>,
    current_weight: FontWeight,
    current_font_size: f32,
    current_text_color: Color,
    /// Face key -> resource name, assigned in first-use order
    font_resources: BTreeMap<String, String>,
    /// Page number -> face keys used on that page
    page_fonts: BTreeMap<usize, Vec<String>>,
    next_font_resource: u32,
    next_image_resource: u32,
    /// Buffered content operators per page
    page_content_buffer: BTreeMap<usize, Vec<u8>>,
    /// Unbalanced clip regions per page
    open_clips: BTreeMap<usize, usize>,
    /// Entries for the document information dictionary
    info: BTreeMap<String, String>,
}

impl PdfDocument {
    fn from_document(inner: Document) -> Self {
        Self {
            inner,
            faces: BTreeMap::new(),
            families: BTreeMap::new(),
            current_family: None,
            current_weight: FontWeight::default(),
            current_font_size: 12.0,
            current_text_color: Color::default(),
            font_resources: BTreeMap::new(),
            page_fonts: BTreeMap::new(),
            next_font_resource: 1,
            next_image_resource: 1,
            page_content_buffer: BTreeMap::new(),
            open_clips: BTreeMap::new(),
            info: BTreeMap::new(),
        }
    }

    /// Open a PDF document from a file path
    ///
    /// # Example
    /// ```ignore
    /// let doc = PdfDocument::open("template.pdf")?;
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let inner = Document::load(path).map_err(|e| PdfError::OpenError(e.to_string()))?;
        Ok(Self::from_document(inner))
    }

    /// Open a PDF document from bytes
    pub fn open_from_bytes(data: &[u8]) -> Result<Self> {
        let inner = Document::load_mem(data).map_err(|e| PdfError::OpenError(e.to_string()))?;
        if inner.get_pages().is_empty() {
            return Err(PdfError::OpenError("Document has no pages".to_string()));
        }
        Ok(Self::from_document(inner))
    }

    /// Create a document with a single empty page
    ///
    /// # Arguments
    /// * `width` - Page width in points
    /// * `height` - Page height in points
    pub fn blank(width: f64, height: f64) -> Self {
        let mut inner = Document::with_version("1.5");
        let pages_id = inner.new_object_id();

        let contents_id = inner.add_object(Stream::new(Dictionary::new(), Vec::new()));
        let page_id = inner.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![
                0.into(),
                0.into(),
                Object::Real(width as f32),
                Object::Real(height as f32),
            ],
            "Resources" => dictionary! {},
            "Contents" => contents_id,
        });

        inner.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );

        let catalog_id = inner.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        inner.trailer.set("Root", catalog_id);

        Self::from_document(inner)
    }

    /// Get the number of pages in the document
    pub fn page_count(&self) -> usize {
        self.inner.get_pages().len()
    }

    /// Register a font family under `name`
    ///
    /// Families may share built-in faces; two different TrueType faces with
    /// the same key are rejected.
    pub fn register_font_family(&mut self, name: &str, family: FontFamily) -> Result<()> {
        if self.families.contains_key(name) {
            return Err(PdfError::FontAlreadyExists(name.to_string()));
        }

        for face in family.faces() {
            if let Some(FontFace::TrueType(_)) = self.faces.get(face.key()) {
                return Err(PdfError::FontAlreadyExists(face.key().to_string()));
            }
        }

        let registered = RegisteredFamily {
            regular: family.regular.key().to_string(),
            bold: family.bold.as_ref().map(|f| f.key().to_string()),
        };

        let FontFamily { regular, bold } = family;
        for face in std::iter::once(regular).chain(bold) {
            self.faces.entry(face.key().to_string()).or_insert(face);
        }
        self.families.insert(name.to_string(), registered);

        Ok(())
    }

    /// Set the current font family and size
    pub fn set_font(&mut self, family: &str, size: f32) -> Result<()> {
        if !self.families.contains_key(family) {
            return Err(PdfError::FontNotFound(family.to_string()));
        }

        self.current_family = Some(family.to_string());
        self.current_font_size = size;
        Ok(())
    }

    /// Set only the font size (keeps current family/weight)
    pub fn set_font_size(&mut self, size: f32) -> Result<()> {
        if self.current_family.is_none() {
            return Err(PdfError::FontNotFound("No font family set".to_string()));
        }

        self.current_font_size = size;
        Ok(())
    }

    /// Set the font weight (keeps current family/size)
    pub fn set_font_weight(&mut self, weight: FontWeight) -> Result<()> {
        if self.current_family.is_none() {
            return Err(PdfError::FontNotFound("No font family set".to_string()));
        }

        self.current_weight = weight;
        Ok(())
    }

    /// Set the text color
    pub fn set_text_color(&mut self, color: Color) {
        self.current_text_color = color;
    }

    /// Set an entry of the document information dictionary
    ///
    /// `CreationDate` values should use the PDF date form `D:YYYYMMDDHHmmSSZ`.
    pub fn set_info(&mut self, key: &str, value: &str) {
        self.info.insert(key.to_string(), value.to_string());
    }

    /// Key of the face selected by the current family and weight
    fn current_face_key(&self) -> Result<String> {
        let family_name = self
            .current_family
            .as_ref()
            .ok_or_else(|| PdfError::FontNotFound("No font family set".to_string()))?;
        let family = self
            .families
            .get(family_name)
            .ok_or_else(|| PdfError::FontNotFound(family_name.clone()))?;

        let key = match self.current_weight {
            FontWeight::Bold => family.bold.as_ref().unwrap_or(&family.regular),
            FontWeight::Regular => &family.regular,
        };
        Ok(key.clone())
    }

    fn face(&self, key: &str) -> Result<&FontFace> {
        self.faces
            .get(key)
            .ok_or_else(|| PdfError::FontNotFound(key.to_string()))
    }

    /// Width of `text` in points with the current font
    pub fn text_width(&self, text: &str) -> Result<f64> {
        let key = self.current_face_key()?;
        Ok(self.face(&key)?.text_width_points(text, self.current_font_size))
    }

    /// Ascent of the current font in points
    pub fn ascent(&self) -> Result<f64> {
        let key = self.current_face_key()?;
        Ok(self.face(&key)?.ascent_points(self.current_font_size))
    }

    fn check_page(&self, page: usize) -> Result<()> {
        let page_count = self.page_count();
        if page == 0 || page > page_count {
            return Err(PdfError::InvalidPage(page, page_count));
        }
        Ok(())
    }

    /// Insert text at a specific position
    ///
    /// # Arguments
    /// * `text` - Text to insert (empty text is a no-op)
    /// * `page` - Page number (1-indexed)
    /// * `x` - Anchor X coordinate in points
    /// * `y` - Baseline Y coordinate in points, measured from the top
    /// * `align` - Alignment of the text relative to `x`
    pub fn insert_text(
        &mut self,
        text: &str,
        page: usize,
        x: f64,
        y: f64,
        align: Align,
    ) -> Result<()> {
        self.check_page(page)?;

        if text.is_empty() {
            return Ok(());
        }

        let key = self.current_face_key()?;
        let (text_hex, text_width) = {
            let face = self
                .faces
                .get_mut(&key)
                .ok_or_else(|| PdfError::FontNotFound(key.clone()))?;
            face.record_usage(text);
            (
                face.encode_text_hex(text),
                face.text_width_points(text, self.current_font_size),
            )
        };

        let font_resource_name = self.font_resource_for(&key, page);
        let pdf_y = self.page_size(page)?.1 - y;

        let ctx = TextRenderContext {
            font_name: font_resource_name,
            font_size: self.current_font_size,
            text_width,
            color: self.current_text_color,
        };
        let operators = generate_text_operators(&text_hex, x, pdf_y, align, &ctx);
        self.buffer_content(page, &operators);

        Ok(())
    }

    /// Start clipping subsequent content on `page` to a rectangle
    ///
    /// `y` is the top edge measured from the top of the page. Every call must
    /// be paired with [`end_clip`](Self::end_clip); unbalanced regions are
    /// closed when the document is serialised.
    pub fn begin_clip(&mut self, page: usize, x: f64, y: f64, width: f64, height: f64) -> Result<()> {
        self.check_page(page)?;

        let page_height = self.page_size(page)?.1;
        let rect = ClipRect {
            x,
            y: page_height - y - height,
            width,
            height,
        };
        let operators = generate_clip_operators(&rect);
        self.buffer_content(page, &operators);
        *self.open_clips.entry(page).or_default() += 1;

        Ok(())
    }

    /// Close the innermost clip region on `page`
    pub fn end_clip(&mut self, page: usize) -> Result<()> {
        self.check_page(page)?;

        if let Some(open) = self.open_clips.get_mut(&page) {
            if *open > 0 {
                *open -= 1;
                self.buffer_content(page, b"Q\n");
            }
        }
        Ok(())
    }

    /// Insert an image with scaling mode
    ///
    /// # Arguments
    /// * `data` - Image file bytes (JPEG or PNG)
    /// * `page` - Page number (1-indexed)
    /// * `x` - X coordinate in points
    /// * `y` - Y coordinate of the top edge in points (from top)
    /// * `width` - Target width in points
    /// * `height` - Target height in points
    /// * `mode` - Scaling mode
    #[allow(clippy::too_many_arguments)]
    pub fn insert_image_scaled(
        &mut self,
        data: &[u8],
        page: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        mode: ImageScaleMode,
    ) -> Result<()> {
        self.check_page(page)?;

        let xobject = ImageXObject::from_bytes(data)?;
        let (actual_width, actual_height) =
            calculate_scaled_dimensions(xobject.width, xobject.height, width, height, mode);

        let object_id = self.inner.add_object(xobject.to_pdf_stream());
        // Prefixed to stay clear of resource names used by the template
        let resource_name = format!("OIm{}", self.next_image_resource);
        self.next_image_resource += 1;
        self.add_page_resource(page, b"XObject", &resource_name, object_id)?;

        let pdf_y = self.page_size(page)?.1 - y - actual_height;
        let operators =
            generate_image_operators(&resource_name, x, pdf_y, actual_width, actual_height);
        self.buffer_content(page, &operators);

        Ok(())
    }

    /// Save the document to a file
    pub fn save<P: AsRef<Path>>(self, path: P) -> Result<()> {
        let bytes = self.into_bytes()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Serialise the document with all buffered content applied
    pub fn into_bytes(mut self) -> Result<Vec<u8>> {
        self.embed_fonts()?;
        self.flush_content_buffers()?;
        self.write_info();

        let mut buffer = Vec::new();
        self.inner
            .save_to(&mut buffer)
            .map_err(|e| PdfError::SaveError(e.to_string()))?;
        Ok(buffer)
    }

    /// Get a reference to the underlying lopdf document
    pub fn inner(&self) -> &Document {
        &self.inner
    }

    /// Page width and height in points
    ///
    /// Taken from the MediaBox (or CropBox), following the parent chain for
    /// inherited boxes. Falls back to A4 when no box is present.
    pub fn page_size(&self, page: usize) -> Result<(f64, f64)> {
        let page_id = self.page_id(page)?;

        let media_box = match self.inherited_attribute(page_id, b"MediaBox")? {
            Some(obj) => Some(obj),
            None => self.inherited_attribute(page_id, b"CropBox")?,
        };
        let Some(media_box) = media_box else {
            return Ok((A4_WIDTH, A4_HEIGHT));
        };

        let array = media_box
            .as_array()
            .map_err(|_| PdfError::ParseError("MediaBox is not an array".to_string()))?;
        if array.len() < 4 {
            return Err(PdfError::ParseError("Invalid MediaBox format".to_string()));
        }

        let number = |obj: &Object| -> Result<f64> {
            obj.as_f32()
                .map(|v| v as f64)
                .ok()
                .or_else(|| obj.as_i64().ok().map(|v| v as f64))
                .ok_or_else(|| PdfError::ParseError("Invalid MediaBox value".to_string()))
        };

        let width = number(&array[2])? - number(&array[0])?;
        let height = number(&array[3])? - number(&array[1])?;
        Ok((width, height))
    }

    fn page_id(&self, page: usize) -> Result<ObjectId> {
        let pages = self.inner.get_pages();
        pages
            .get(&(page as u32))
            .copied()
            .ok_or(PdfError::InvalidPage(page, pages.len()))
    }

    /// Look up a page attribute, following Parent links and references
    fn inherited_attribute(&self, page_id: ObjectId, key: &[u8]) -> Result<Option<Object>> {
        let mut current_id = page_id;

        // Follow parent chain up to 10 levels
        for _ in 0..10 {
            let dict = self
                .inner
                .get_object(current_id)?
                .as_dict()
                .map_err(|_| PdfError::ParseError("Object is not a dictionary".to_string()))?;

            if let Ok(value) = dict.get(key) {
                return Ok(Some(self.resolve(value)?.clone()));
            }

            match dict.get(b"Parent") {
                Ok(Object::Reference(parent_id)) => current_id = *parent_id,
                _ => break,
            }
        }

        Ok(None)
    }

    fn resolve<'a>(&'a self, obj: &'a Object) -> Result<&'a Object> {
        match obj {
            Object::Reference(id) => Ok(self.inner.get_object(*id)?),
            other => Ok(other),
        }
    }

    /// Resource name for a face on a page, registering it on first use
    fn font_resource_for(&mut self, key: &str, page: usize) -> String {
        let used = self.page_fonts.entry(page).or_default();
        if !used.iter().any(|k| k == key) {
            used.push(key.to_string());
        }

        if let Some(name) = self.font_resources.get(key) {
            return name.clone();
        }

        let name = format!("OF{}", self.next_font_resource);
        self.next_font_resource += 1;
        self.font_resources.insert(key.to_string(), name.clone());
        name
    }

    /// Embed used fonts and reference them from page resources
    fn embed_fonts(&mut self) -> Result<()> {
        let mut embedded: BTreeMap<String, ObjectId> = BTreeMap::new();

        // resource names are assigned in first-use order; embed in that order
        let mut by_resource: Vec<(&String, &String)> = self.font_resources.iter().collect();
        by_resource.sort_by_key(|(_, name)| name[2..].parse::<u32>().unwrap_or(u32::MAX));

        for (key, _) in by_resource {
            let face = self
                .faces
                .get(key)
                .ok_or_else(|| PdfError::FontNotFound(key.clone()))?;
            let id = face.embed(&mut self.inner);
            embedded.insert(key.clone(), id);
        }

        let page_fonts = std::mem::take(&mut self.page_fonts);
        for (page, keys) in page_fonts {
            for key in keys {
                let resource_name = self
                    .font_resources
                    .get(&key)
                    .cloned()
                    .ok_or_else(|| PdfError::FontNotFound(key.clone()))?;
                let font_id = *embedded
                    .get(&key)
                    .ok_or_else(|| PdfError::FontNotFound(key.clone()))?;
                self.add_page_resource(page, b"Font", &resource_name, font_id)?;
            }
        }

        Ok(())
    }

    /// Add `name -> object_id` to a category of the page's Resources
    fn add_page_resource(
        &mut self,
        page: usize,
        category: &[u8],
        name: &str,
        object_id: ObjectId,
    ) -> Result<()> {
        let page_id = self.page_id(page)?;

        let mut resources = match self.inherited_attribute(page_id, b"Resources")? {
            Some(Object::Dictionary(dict)) => dict,
            _ => Dictionary::new(),
        };

        let mut entries = match resources.get(category) {
            Ok(obj) => match self.resolve(obj)? {
                Object::Dictionary(dict) => dict.clone(),
                _ => Dictionary::new(),
            },
            Err(_) => Dictionary::new(),
        };
        entries.set(name.as_bytes(), Object::Reference(object_id));
        resources.set(category, Object::Dictionary(entries));

        let mut page_dict = self
            .inner
            .get_object(page_id)?
            .as_dict()
            .map_err(|_| PdfError::ParseError("Page object is not a dictionary".to_string()))?
            .clone();
        page_dict.set("Resources", Object::Dictionary(resources));
        self.inner.objects.insert(page_id, page_dict.into());

        Ok(())
    }

    fn buffer_content(&mut self, page: usize, content: &[u8]) {
        self.page_content_buffer
            .entry(page)
            .or_default()
            .extend_from_slice(content);
    }

    /// Write buffered operators to the page content streams
    fn flush_content_buffers(&mut self) -> Result<()> {
        let buffers = std::mem::take(&mut self.page_content_buffer);
        let open_clips = std::mem::take(&mut self.open_clips);

        for (page, mut content) in buffers {
            for _ in 0..open_clips.get(&page).copied().unwrap_or(0) {
                content.extend_from_slice(b"Q\n");
            }
            if !content.is_empty() {
                self.append_to_content_stream(page, &content)?;
            }
        }
        Ok(())
    }

    /// Decoded bytes of the page's existing content streams
    fn existing_content(&self, page_id: ObjectId) -> Result<Vec<u8>> {
        let page_dict = self
            .inner
            .get_object(page_id)?
            .as_dict()
            .map_err(|_| PdfError::ParseError("Page object is not a dictionary".to_string()))?;

        let decoded = |stream: &Stream| {
            stream
                .decompressed_content()
                .unwrap_or_else(|_| stream.content.clone())
        };

        let contents = match page_dict.get(b"Contents") {
            Ok(obj) => self.resolve(obj)?,
            Err(_) => return Ok(Vec::new()),
        };

        let content = match contents {
            Object::Stream(stream) => decoded(stream),
            Object::Array(parts) => {
                let mut combined = Vec::new();
                for part in parts {
                    if let Ok(Object::Stream(stream)) = self.resolve(part) {
                        combined.extend_from_slice(&decoded(stream));
                        combined.push(b'\n');
                    }
                }
                combined
            }
            _ => Vec::new(),
        };
        Ok(content)
    }

    /// Replace the page content with `q <existing> Q <overlay>`
    ///
    /// Wrapping the existing content isolates the overlay from any graphics
    /// state the template leaves behind.
    fn append_to_content_stream(&mut self, page: usize, overlay: &[u8]) -> Result<()> {
        let page_id = self.page_id(page)?;
        let existing = self.existing_content(page_id)?;

        let mut content = Vec::with_capacity(existing.len() + overlay.len() + 8);
        if !existing.is_empty() {
            content.extend_from_slice(b"q\n");
            content.extend_from_slice(&existing);
            content.extend_from_slice(b"\nQ\n");
        }
        content.extend_from_slice(overlay);

        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(&content)?;
        let compressed = encoder.finish()?;

        let stream = Stream::new(dictionary! { "Filter" => "FlateDecode" }, compressed);
        let stream_id = self.inner.add_object(stream);

        let mut page_dict = self
            .inner
            .get_object(page_id)?
            .as_dict()
            .map_err(|_| PdfError::ParseError("Page object is not a dictionary".to_string()))?
            .clone();
        page_dict.set("Contents", Object::Reference(stream_id));
        self.inner.objects.insert(page_id, page_dict.into());

        Ok(())
    }

    fn write_info(&mut self) {
        if self.info.is_empty() {
            return;
        }

        let mut dict = Dictionary::new();
        for (key, value) in &self.info {
            dict.set(key.as_bytes(), Object::string_literal(value.as_str()));
        }
        let info_id = self.inner.add_object(dict);
        self.inner.trailer.set("Info", info_id);
    }
}
