//! Storage of generated invoice PDFs

use crate::{InvoiceError, Result};
use docstore::CancelToken;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Directory of generated invoices, one `Factuur_<id>.pdf` per invoice
#[derive(Debug, Clone)]
pub struct InvoiceArchive {
    dir: PathBuf,
    cancel: CancelToken,
}

impl InvoiceArchive {
    /// Open (and create if needed) the archive directory
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            cancel: CancelToken::default(),
        })
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File name used for the invoice with `invoice_id`
    pub fn file_name(invoice_id: &str) -> String {
        format!("Factuur_{invoice_id}.pdf")
    }

    fn check_cancel(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            Err(InvoiceError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Write the PDF for `invoice_id`, returning its path
    ///
    /// The file appears complete or not at all.
    pub fn store(&self, invoice_id: &str, pdf: &[u8]) -> Result<PathBuf> {
        self.check_cancel()?;
        docstore::validate_key(invoice_id)?;
        let path = self.dir.join(Self::file_name(invoice_id));

        let mut staged = NamedTempFile::new_in(&self.dir)?;
        staged.write_all(pdf)?;
        staged.as_file().sync_all()?;

        self.check_cancel()?;
        staged.persist(&path).map_err(|e| InvoiceError::Io(e.error))?;

        debug!(path = %path.display(), bytes = pdf.len(), "archived invoice");
        Ok(path)
    }

    /// Read an archived PDF
    ///
    /// Only the file name of `stored_path` is used, so records cannot point
    /// outside the archive.
    pub fn read(&self, stored_path: &str) -> Result<Option<Vec<u8>>> {
        self.check_cancel()?;
        let Some(path) = self.resolve(stored_path) else {
            return Ok(None);
        };
        match fs::read(path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Remove an archived PDF, returning whether a file was deleted
    pub fn delete(&self, stored_path: &str) -> Result<bool> {
        self.check_cancel()?;
        let Some(path) = self.resolve(stored_path) else {
            return Ok(false);
        };
        match fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn resolve(&self, stored_path: &str) -> Option<PathBuf> {
        Path::new(stored_path)
            .file_name()
            .map(|name| self.dir.join(name))
    }
}
