//! Batch invoice requests and their outcome

use crate::models::Invoice;
use chrono::{DateTime, Utc};
use layout::{ValidationError, Violations};
use serde::{Deserialize, Serialize};

/// Longest accepted invoice description, in characters
pub const MAX_DESCRIPTION_CHARS: usize = 500;

/// Invoice the same amount to several students
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BatchInvoiceRequest {
    #[serde(default)]
    pub student_ids: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Amount including VAT
    pub amount_total: f64,
    /// VAT rate in percent
    #[serde(rename = "VAT")]
    pub vat: f64,
}

impl BatchInvoiceRequest {
    /// Check the whole request, reporting every problem at once
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut violations = Violations::new();

        if self.student_ids.iter().all(|id| id.trim().is_empty()) {
            violations.push("StudentIds", "at least one student id is required");
        }
        if let Some(description) = &self.description {
            let chars = description.chars().count();
            if chars > MAX_DESCRIPTION_CHARS {
                violations.push(
                    "Description",
                    format!("cannot exceed {MAX_DESCRIPTION_CHARS} characters (got {chars})"),
                );
            }
        }
        if !(self.amount_total.is_finite() && self.amount_total >= 0.01) {
            violations.push(
                "AmountTotal",
                format!("must be at least 0.01 (got {})", self.amount_total),
            );
        }
        if !self.vat.is_finite() {
            violations.push("VAT", "must be a number");
        } else {
            violations.check_range("VAT", self.vat, 0.0, 100.0);
        }

        violations.into_result()
    }
}

/// Outcome of a batch run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BatchGenerationResult {
    pub successful_invoices: Vec<Invoice>,
    pub errors: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

impl BatchGenerationResult {
    pub fn new(generated_at: DateTime<Utc>) -> Self {
        Self {
            successful_invoices: Vec::new(),
            errors: Vec::new(),
            generated_at,
        }
    }

    pub fn success_count(&self) -> usize {
        self.successful_invoices.len()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Sum of the invoiced totals
    pub fn total_amount(&self) -> f64 {
        let total: f64 = self.successful_invoices.iter().map(|i| i.amount_total).sum();
        invoice_format::round_cents(total)
    }
}
