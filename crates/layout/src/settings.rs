//! The persisted layout record

use crate::clock::Clock;
use crate::field::FieldName;
use crate::position::{LayoutPosition, PositionInput};
use crate::validation::{ValidationError, Violations};
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Well-known id of the single layout record
pub const LAYOUT_SETTINGS_ID: &str = "default_pdf_layout";

/// Author recorded on synthesized defaults
pub const SYSTEM_USER: &str = "System";

fn layout_id() -> String {
    LAYOUT_SETTINGS_ID.to_string()
}

fn system_user() -> String {
    SYSTEM_USER.to_string()
}

/// Positions of every invoice field plus update metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LayoutSettings {
    #[serde(rename = "_id", default = "layout_id")]
    pub id: String,

    #[serde(default)]
    pub student_name: LayoutPosition,
    #[serde(default)]
    pub student_address: LayoutPosition,
    #[serde(default)]
    pub invoice_id: LayoutPosition,
    #[serde(default)]
    pub invoice_date: LayoutPosition,
    #[serde(default)]
    pub invoice_description: LayoutPosition,
    #[serde(default)]
    pub base_amount: LayoutPosition,
    #[serde(default)]
    pub vat_amount: LayoutPosition,
    #[serde(default)]
    pub total_amount: LayoutPosition,
    #[serde(default)]
    pub payment_note: LayoutPosition,
    #[serde(default)]
    pub contact_info: LayoutPosition,

    #[serde(default)]
    pub last_updated: DateTime<Utc>,

    #[serde(default = "system_user")]
    pub updated_by: String,
}

impl LayoutSettings {
    /// The canonical default layout, stamped with `clock`
    pub fn default_layout(clock: &dyn Clock) -> Self {
        Self {
            id: layout_id(),
            student_name: LayoutPosition::at(150, 400, 10),
            student_address: LayoutPosition::at(165, 400, 10),
            invoice_id: LayoutPosition::at(195, 400, 10),
            invoice_date: LayoutPosition::at(210, 400, 10),
            invoice_description: LayoutPosition::at(315, 100, 10),
            base_amount: LayoutPosition::at(400, 500, 10).bold(),
            vat_amount: LayoutPosition::at(415, 500, 10).bold(),
            total_amount: LayoutPosition::at(430, 500, 10).bold(),
            payment_note: LayoutPosition::at(500, 100, 10),
            contact_info: LayoutPosition::at(600, 100, 10),
            last_updated: clock.now(),
            updated_by: system_user(),
        }
    }

    pub fn slot(&self, field: FieldName) -> &LayoutPosition {
        match field {
            FieldName::StudentName => &self.student_name,
            FieldName::StudentAddress => &self.student_address,
            FieldName::InvoiceId => &self.invoice_id,
            FieldName::InvoiceDate => &self.invoice_date,
            FieldName::InvoiceDescription => &self.invoice_description,
            FieldName::BaseAmount => &self.base_amount,
            FieldName::VatAmount => &self.vat_amount,
            FieldName::TotalAmount => &self.total_amount,
            FieldName::PaymentNote => &self.payment_note,
            FieldName::ContactInfo => &self.contact_info,
        }
    }

    pub fn slot_mut(&mut self, field: FieldName) -> &mut LayoutPosition {
        match field {
            FieldName::StudentName => &mut self.student_name,
            FieldName::StudentAddress => &mut self.student_address,
            FieldName::InvoiceId => &mut self.invoice_id,
            FieldName::InvoiceDate => &mut self.invoice_date,
            FieldName::InvoiceDescription => &mut self.invoice_description,
            FieldName::BaseAmount => &mut self.base_amount,
            FieldName::VatAmount => &mut self.vat_amount,
            FieldName::TotalAmount => &mut self.total_amount,
            FieldName::PaymentNote => &mut self.payment_note,
            FieldName::ContactInfo => &mut self.contact_info,
        }
    }

    /// `(field, position)` pairs in drawing order
    pub fn positions(&self) -> impl Iterator<Item = (FieldName, &LayoutPosition)> + '_ {
        FieldName::ALL.into_iter().map(move |field| (field, self.slot(field)))
    }

    /// Check every slot, reporting all violations at once
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        let mut violations = Violations::new();
        for (field, position) in self.positions() {
            let mut scoped = Violations::scoped(field.as_str());
            position.collect_violations(&mut scoped);
            violations.extend(scoped);
        }
        violations.into_result()
    }

    /// Parse caller-supplied JSON, validating every slot
    ///
    /// Missing slots take the per-position defaults; alignment names are
    /// matched case-insensitively.
    pub fn from_json(json: &str) -> Result<Self> {
        let input: SettingsInput = serde_json::from_str(json)?;
        Ok(input.into_settings()?)
    }
}

/// Unvalidated layout as submitted by a caller
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SettingsInput {
    #[serde(default)]
    pub student_name: PositionInput,
    #[serde(default)]
    pub student_address: PositionInput,
    #[serde(default)]
    pub invoice_id: PositionInput,
    #[serde(default)]
    pub invoice_date: PositionInput,
    #[serde(default)]
    pub invoice_description: PositionInput,
    #[serde(default)]
    pub base_amount: PositionInput,
    #[serde(default)]
    pub vat_amount: PositionInput,
    #[serde(default)]
    pub total_amount: PositionInput,
    #[serde(default)]
    pub payment_note: PositionInput,
    #[serde(default)]
    pub contact_info: PositionInput,

    #[serde(default)]
    pub updated_by: Option<String>,
}

impl SettingsInput {
    fn slot(&self, field: FieldName) -> &PositionInput {
        match field {
            FieldName::StudentName => &self.student_name,
            FieldName::StudentAddress => &self.student_address,
            FieldName::InvoiceId => &self.invoice_id,
            FieldName::InvoiceDate => &self.invoice_date,
            FieldName::InvoiceDescription => &self.invoice_description,
            FieldName::BaseAmount => &self.base_amount,
            FieldName::VatAmount => &self.vat_amount,
            FieldName::TotalAmount => &self.total_amount,
            FieldName::PaymentNote => &self.payment_note,
            FieldName::ContactInfo => &self.contact_info,
        }
    }

    pub fn into_settings(self) -> std::result::Result<LayoutSettings, ValidationError> {
        let mut violations = Violations::new();
        let mut settings = LayoutSettings {
            id: layout_id(),
            student_name: LayoutPosition::default(),
            student_address: LayoutPosition::default(),
            invoice_id: LayoutPosition::default(),
            invoice_date: LayoutPosition::default(),
            invoice_description: LayoutPosition::default(),
            base_amount: LayoutPosition::default(),
            vat_amount: LayoutPosition::default(),
            total_amount: LayoutPosition::default(),
            payment_note: LayoutPosition::default(),
            contact_info: LayoutPosition::default(),
            last_updated: DateTime::<Utc>::default(),
            updated_by: self
                .updated_by
                .clone()
                .filter(|who| !who.trim().is_empty())
                .unwrap_or_else(system_user),
        };

        for field in FieldName::ALL {
            let mut scoped = Violations::scoped(field.as_str());
            if let Some(position) = self.slot(field).check(&mut scoped) {
                *settings.slot_mut(field) = position;
            }
            violations.extend(scoped);
        }

        violations.into_result()?;
        Ok(settings)
    }
}
