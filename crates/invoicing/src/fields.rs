//! Literal text drawn for each layout field

use crate::config::RendererConfig;
use crate::models::{Invoice, Student};
use crate::Result;
use invoice_format::{due_date, format_date, split_vat};
use layout::FieldName;
use std::collections::BTreeMap;

/// Shown when an invoice has no id yet
pub const MISSING_INVOICE_ID: &str = "N/A";

/// Shown in the contact line when the student has no email address
pub const MISSING_EMAIL: &str = "geen e-mailadres bekend";

/// Text for every field, derived from one student and one invoice
///
/// Empty values are kept in the map but never drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValues {
    values: BTreeMap<FieldName, String>,
}

impl FieldValues {
    /// Derive the ten literals
    ///
    /// The total is split into base and VAT with the invoice's rate; the
    /// payment note's due date is `payment_term_days` after the invoice date.
    pub fn derive(student: &Student, invoice: &Invoice, config: &RendererConfig) -> Result<Self> {
        let split = split_vat(invoice.amount_total, invoice.vat)?;
        let currency = &config.currency;
        let due = due_date(invoice.date, config.payment_term_days);

        let invoice_id = if invoice.id.trim().is_empty() {
            MISSING_INVOICE_ID.to_string()
        } else {
            invoice.id.clone()
        };
        let email = student
            .email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .unwrap_or(MISSING_EMAIL);

        let values = BTreeMap::from([
            (FieldName::StudentName, student.name.clone().unwrap_or_default()),
            (FieldName::StudentAddress, student.address.clone().unwrap_or_default()),
            (FieldName::InvoiceId, invoice_id),
            (FieldName::InvoiceDate, format_date(invoice.date)),
            (
                FieldName::InvoiceDescription,
                invoice.description.clone().unwrap_or_default(),
            ),
            (FieldName::BaseAmount, currency.format(split.base)),
            (FieldName::VatAmount, currency.format(split.vat)),
            (FieldName::TotalAmount, currency.format(split.total)),
            (
                FieldName::PaymentNote,
                format!(
                    "Gelieve het totaalbedrag binnen {} dagen over te maken, uiterlijk op {}.",
                    config.payment_term_days,
                    format_date(due)
                ),
            ),
            (
                FieldName::ContactInfo,
                format!("Vragen over deze factuur? Neem contact op via {email}"),
            ),
        ]);

        Ok(Self { values })
    }

    /// Text for `field`, empty when nothing should be drawn
    pub fn get(&self, field: FieldName) -> &str {
        self.values.get(&field).map(String::as_str).unwrap_or("")
    }

    /// Override one literal
    pub fn set(&mut self, field: FieldName, value: impl Into<String>) {
        self.values.insert(field, value.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use invoice_format::FormatError;
    use pretty_assertions::assert_eq;

    fn student() -> Student {
        Student {
            id: "s1".to_string(),
            name: Some("A".to_string()),
            address: Some("B".to_string()),
            email: Some("c@d.nl".to_string()),
            ..Student::default()
        }
    }

    fn invoice() -> Invoice {
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

    #[test]
    fn test_derived_literals() {
        let values = FieldValues::derive(&student(), &invoice(), &RendererConfig::default()).unwrap();

        assert_eq!(values.get(FieldName::StudentName), "A");
        assert_eq!(values.get(FieldName::StudentAddress), "B");
        assert_eq!(values.get(FieldName::InvoiceId), "X");
        assert_eq!(values.get(FieldName::InvoiceDate), "01-01-2024");
        assert_eq!(values.get(FieldName::InvoiceDescription), "Y");
        assert_eq!(values.get(FieldName::BaseAmount), "€ 100,00");
        assert_eq!(values.get(FieldName::VatAmount), "€ 21,00");
        assert_eq!(values.get(FieldName::TotalAmount), "€ 121,00");
        assert_eq!(
            values.get(FieldName::PaymentNote),
            "Gelieve het totaalbedrag binnen 14 dagen over te maken, uiterlijk op 15-01-2024."
        );
        assert_eq!(
            values.get(FieldName::ContactInfo),
            "Vragen over deze factuur? Neem contact op via c@d.nl"
        );
    }

    #[test]
    fn test_placeholders() {
        let mut student = student();
        student.email = Some("  ".to_string());
        student.address = None;
        let mut invoice = invoice();
        invoice.id = String::new();

        let values = FieldValues::derive(&student, &invoice, &RendererConfig::default()).unwrap();
        assert_eq!(values.get(FieldName::InvoiceId), "N/A");
        assert_eq!(values.get(FieldName::StudentAddress), "");
        assert!(values.get(FieldName::ContactInfo).ends_with(MISSING_EMAIL));
    }

    #[test]
    fn test_custom_currency_and_term() {
        let config = RendererConfig {
            currency: invoice_format::CurrencyFormat::default().with_symbol("EUR"),
            payment_term_days: 30,
            ..RendererConfig::default()
        };
        let values = FieldValues::derive(&student(), &invoice(), &config).unwrap();
        assert_eq!(values.get(FieldName::TotalAmount), "EUR 121,00");
        assert!(values.get(FieldName::PaymentNote).contains("uiterlijk op 31-01-2024"));
    }

    #[test]
    fn test_invalid_vat_rate() {
        let mut invoice = invoice();
        invoice.vat = -100.0;
        let err = FieldValues::derive(&student(), &invoice, &RendererConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            crate::InvoiceError::Format(FormatError::InvalidVatRate(_))
        ));
    }
}
