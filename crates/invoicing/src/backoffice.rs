//! Operations exposed to the command line

use crate::archive::InvoiceArchive;
use crate::batch::{BatchGenerationResult, BatchInvoiceRequest};
use crate::config::RendererConfig;
use crate::models::{Invoice, Student};
use crate::renderer::DocumentRenderer;
use crate::system::{SystemSettings, SystemSettingsStore};
use crate::template::TemplateSource;
use crate::{Clock, ErrorKind, InvoiceError, Result};
use docstore::{CancelToken, Collection, DocumentStore, StoreError};
use layout::{FieldName, LayoutPosition, LayoutSettings, LayoutStore};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

pub const STUDENTS_COLLECTION: &str = "Students";
pub const INVOICES_COLLECTION: &str = "Invoices";

/// Facade over layout, settings, rendering and invoice records
pub struct Backoffice {
    students: Collection<Student>,
    invoices: Collection<Invoice>,
    layouts: LayoutStore,
    system: SystemSettingsStore,
    renderer: DocumentRenderer,
    archive: InvoiceArchive,
    clock: Arc<dyn Clock>,
}

impl Backoffice {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        templates: Arc<dyn TemplateSource>,
        archive: InvoiceArchive,
        config: RendererConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            students: Collection::new(Arc::clone(&store), STUDENTS_COLLECTION),
            invoices: Collection::new(Arc::clone(&store), INVOICES_COLLECTION),
            layouts: LayoutStore::new(Arc::clone(&store), Arc::clone(&clock)),
            system: SystemSettingsStore::new(store, Arc::clone(&clock)),
            renderer: DocumentRenderer::new(config, templates, Arc::clone(&clock)),
            archive,
            clock,
        }
    }

    pub fn layouts(&self) -> &LayoutStore {
        &self.layouts
    }

    pub fn renderer(&self) -> &DocumentRenderer {
        &self.renderer
    }

    // Layout

    pub fn layout_settings(&self) -> Result<LayoutSettings> {
        Ok(self.layouts.get()?)
    }

    pub fn update_layout_settings(&self, settings: LayoutSettings) -> Result<LayoutSettings> {
        Ok(self.layouts.replace(settings)?)
    }

    pub fn update_element_position(
        &self,
        field: &str,
        position: LayoutPosition,
    ) -> Result<LayoutSettings> {
        Ok(self.layouts.update_field(field, position)?)
    }

    pub fn reset_layout_to_default(&self) -> Result<LayoutSettings> {
        Ok(self.layouts.reset_to_default()?)
    }

    /// The default layout, not persisted
    pub fn default_layout(&self) -> LayoutSettings {
        self.layouts.default_layout()
    }

    /// `(name, label)` of every layout field
    pub fn available_elements(&self) -> Vec<(&'static str, &'static str)> {
        FieldName::ALL
            .iter()
            .map(|field| (field.as_str(), field.label()))
            .collect()
    }

    // Rendering

    /// Render an invoice, using the stored layout unless one is given
    pub fn render_document(
        &self,
        template_path: &str,
        student: &Student,
        invoice: &Invoice,
        layout: Option<&LayoutSettings>,
    ) -> Result<Vec<u8>> {
        match layout {
            Some(layout) => self.renderer.render(template_path, student, invoice, layout),
            None => {
                let current = self.layouts.get()?;
                self.renderer.render(template_path, student, invoice, &current)
            }
        }
    }

    /// Render sample data on the default template
    ///
    /// A supplied layout is validated and used without being stored.
    pub fn preview(&self, layout: Option<LayoutSettings>) -> Result<Vec<u8>> {
        if let Some(layout) = &layout {
            layout.validate()?;
        }
        let template = self.default_template()?;

        let today = self.clock.now().date_naive();
        let student = Student::sample(today);
        let invoice = Invoice::sample(today);

        let bytes = self.render_document(&template, &student, &invoice, layout.as_ref())?;
        info!(template = %template, "rendered layout preview");
        Ok(bytes)
    }

    /// Configured default template, which must exist
    fn default_template(&self) -> Result<String> {
        let path = self.system.get()?.default_invoice_template_path;
        if path.trim().is_empty() || !self.renderer.templates().exists(&path) {
            warn!(template = %path, "default invoice template is not configured or missing");
            return Err(InvoiceError::TemplateNotFound(path));
        }
        Ok(path)
    }

    // System settings

    pub fn system_settings(&self) -> Result<SystemSettings> {
        self.system.get()
    }

    pub fn set_template_path(&self, path: &str) -> Result<SystemSettings> {
        self.system.set_template_path(path)
    }

    // Students

    /// Store a new student, assigning an id when it has none
    pub fn add_student(&self, mut student: Student) -> Result<String> {
        if student.id.trim().is_empty() {
            student.id = Uuid::new_v4().to_string();
        }
        let id = self.students.insert_one(&student)?;
        info!(student = %id, "student added");
        Ok(id)
    }

    pub fn student(&self, id: &str) -> Result<Student> {
        self.students
            .find_one(id)?
            .ok_or_else(|| InvoiceError::StudentNotFound(id.to_string()))
    }

    pub fn students(&self) -> Result<Vec<Student>> {
        Ok(self.students.find_all()?)
    }

    /// Overwrite an existing student, keeping its stored id
    pub fn update_student(&self, id: &str, mut student: Student) -> Result<Student> {
        student.id = id.to_string();
        if !self.students.replace_one(id, &student, false)? {
            return Err(InvoiceError::StudentNotFound(id.to_string()));
        }
        info!(student = %id, "student updated");
        Ok(student)
    }

    /// Remove a student record
    ///
    /// Invoices issued to the student are kept.
    pub fn delete_student(&self, id: &str) -> Result<()> {
        if !self.students.delete_one(id)? {
            return Err(InvoiceError::StudentNotFound(id.to_string()));
        }
        info!(student = %id, "student deleted");
        Ok(())
    }

    // Invoices

    pub fn invoice(&self, id: &str) -> Result<Invoice> {
        self.invoices
            .find_one(id)?
            .ok_or_else(|| InvoiceError::InvoiceNotFound(id.to_string()))
    }

    pub fn invoices(&self) -> Result<Vec<Invoice>> {
        Ok(self.invoices.find_all()?)
    }

    /// Bytes of the archived PDF of an invoice
    pub fn invoice_pdf(&self, id: &str) -> Result<Vec<u8>> {
        let invoice = self.invoice(id)?;
        let stored = invoice
            .invoice_pdf_path
            .filter(|p| !p.is_empty())
            .ok_or_else(|| InvoiceError::InvoiceNotFound(id.to_string()))?;
        self.archive
            .read(&stored)?
            .ok_or_else(|| InvoiceError::InvoiceNotFound(id.to_string()))
    }

    /// Remove an invoice record and its archived PDF
    pub fn delete_invoice(&self, id: &str) -> Result<()> {
        let invoice = self.invoice(id)?;
        if let Some(stored) = invoice.invoice_pdf_path.as_deref().filter(|p| !p.is_empty()) {
            self.archive.delete(stored)?;
        }
        self.invoices.delete_one(id)?;
        info!(invoice = %id, "invoice deleted");
        Ok(())
    }

    /// Create, render and archive one invoice per requested student
    ///
    /// Unknown students and per-invoice render failures are reported in the
    /// result and skipped. Storage failures and cancellation stop the run;
    /// invoices completed before that stay stored.
    pub fn generate_batch(
        &self,
        request: &BatchInvoiceRequest,
        cancel: &CancelToken,
    ) -> Result<BatchGenerationResult> {
        request.validate()?;
        let template = self.default_template()?;
        let layout = self.layouts.get()?;
        let today = self.clock.now().date_naive();

        let mut result = BatchGenerationResult::new(self.clock.now());

        for student_id in request.student_ids.iter().filter(|id| !id.trim().is_empty()) {
            if cancel.is_cancelled() {
                info!(
                    generated = result.success_count(),
                    "batch generation cancelled"
                );
                return Err(InvoiceError::Cancelled);
            }

            let student = match self.students.find_one(student_id) {
                Ok(Some(student)) => student,
                Ok(None) | Err(StoreError::InvalidId(_)) => {
                    warn!(student = %student_id, "student not found, skipped");
                    result.errors.push(format!("Student {student_id} not found"));
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let invoice = Invoice {
                id: Uuid::new_v4().to_string(),
                student_id: student.id.clone(),
                date: today,
                amount_total: request.amount_total,
                vat: request.vat,
                description: request.description.clone(),
                invoice_pdf_path: None,
            };

            match self.issue_invoice(&template, &student, invoice, &layout) {
                Ok(invoice) => result.successful_invoices.push(invoice),
                Err(e) if matches!(e.kind(), ErrorKind::Storage | ErrorKind::Cancelled) => {
                    error!(student = %student_id, error = %e, "batch generation aborted");
                    return Err(e);
                }
                Err(e) => {
                    warn!(student = %student_id, error = %e, "invoice not generated");
                    result
                        .errors
                        .push(format!("Student {student_id}: {e}"));
                }
            }
        }

        info!(
            generated = result.success_count(),
            errors = result.error_count(),
            total = result.total_amount(),
            "batch generation finished"
        );
        Ok(result)
    }

    /// Render, archive and record one invoice
    fn issue_invoice(
        &self,
        template: &str,
        student: &Student,
        mut invoice: Invoice,
        layout: &LayoutSettings,
    ) -> Result<Invoice> {
        let pdf = self.renderer.render(template, student, &invoice, layout)?;
        let path = self.archive.store(&invoice.id, &pdf)?;
        invoice.invoice_pdf_path = Some(path.to_string_lossy().into_owned());

        if let Err(e) = self.invoices.insert_one(&invoice) {
            // no record, no file
            if let Some(stored) = invoice.invoice_pdf_path.as_deref() {
                if let Err(cleanup) = self.archive.delete(stored) {
                    warn!(path = stored, error = %cleanup, "archived PDF left without a record");
                }
            }
            return Err(e.into());
        }

        info!(invoice = %invoice.id, student = %student.id, "invoice generated");
        Ok(invoice)
    }
}
