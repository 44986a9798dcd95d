//! Access to template files

use crate::{InvoiceError, Result};
use docstore::CancelToken;
use pdf_core::{detect_format, ImageFormat};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Read-only access to template backgrounds
pub trait TemplateSource: Send + Sync {
    fn exists(&self, path: &str) -> bool;

    /// Bytes of the template at `path`, `TemplateNotFound` if absent
    fn read_bytes(&self, path: &str) -> Result<Vec<u8>>;
}

/// Templates on the local file system
#[derive(Debug, Clone, Default)]
pub struct FsTemplateSource {
    cancel: CancelToken,
}

impl FsTemplateSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }
}

impl TemplateSource for FsTemplateSource {
    fn exists(&self, path: &str) -> bool {
        !path.is_empty() && Path::new(path).is_file()
    }

    fn read_bytes(&self, path: &str) -> Result<Vec<u8>> {
        if self.cancel.is_cancelled() {
            return Err(InvoiceError::Cancelled);
        }
        if path.is_empty() {
            return Err(InvoiceError::TemplateNotFound(path.to_string()));
        }

        match fs::read(path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(InvoiceError::TemplateNotFound(path.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// What a template file contains
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    Pdf,
    Image(ImageFormat),
    Unknown,
}

impl TemplateKind {
    /// Sniff the kind from the leading bytes
    pub fn detect(data: &[u8]) -> Self {
        if data.starts_with(b"%PDF") {
            return TemplateKind::Pdf;
        }
        match detect_format(data) {
            Ok(format) => TemplateKind::Image(format),
            Err(_) => TemplateKind::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_detect_kind() {
        assert_eq!(TemplateKind::detect(b"%PDF-1.5\n"), TemplateKind::Pdf);
        assert_eq!(
            TemplateKind::detect(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]),
            TemplateKind::Image(ImageFormat::Png)
        );
        assert_eq!(
            TemplateKind::detect(&[0xFF, 0xD8, 0xFF, 0xE0]),
            TemplateKind::Image(ImageFormat::Jpeg)
        );
        assert_eq!(TemplateKind::detect(b"hello"), TemplateKind::Unknown);
    }

    #[test]
    fn test_missing_file_is_template_not_found() {
        let source = FsTemplateSource::new();
        assert!(!source.exists("/no/such/file"));
        assert!(matches!(
            source.read_bytes("/no/such/file"),
            Err(InvoiceError::TemplateNotFound(p)) if p == "/no/such/file"
        ));
        assert!(matches!(
            source.read_bytes(""),
            Err(InvoiceError::TemplateNotFound(_))
        ));
    }

    #[test]
    fn test_reads_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("factuur.pdf");
        fs::write(&path, b"%PDF-1.5").unwrap();
        let path = path.to_str().unwrap();

        let source = FsTemplateSource::new();
        assert!(source.exists(path));
        assert_eq!(source.read_bytes(path).unwrap(), b"%PDF-1.5");
    }

    #[test]
    fn test_cancelled_read() {
        let cancel = CancelToken::new();
        let source = FsTemplateSource::new().with_cancel(cancel.clone());
        cancel.cancel();
        assert!(matches!(
            source.read_bytes("/anything"),
            Err(InvoiceError::Cancelled)
        ));
    }
}
