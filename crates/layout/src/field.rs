//! Closed set of layout slots

use crate::LayoutError;
use std::fmt;
use std::str::FromStr;

/// One of the ten fields drawn on an invoice
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldName {
    StudentName,
    StudentAddress,
    InvoiceId,
    InvoiceDate,
    InvoiceDescription,
    BaseAmount,
    VatAmount,
    TotalAmount,
    PaymentNote,
    ContactInfo,
}

impl FieldName {
    /// All fields in drawing order
    pub const ALL: [FieldName; 10] = [
        FieldName::StudentName,
        FieldName::StudentAddress,
        FieldName::InvoiceId,
        FieldName::InvoiceDate,
        FieldName::InvoiceDescription,
        FieldName::BaseAmount,
        FieldName::VatAmount,
        FieldName::TotalAmount,
        FieldName::PaymentNote,
        FieldName::ContactInfo,
    ];

    /// Stored key, also accepted by [`FromStr`]
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldName::StudentName => "StudentName",
            FieldName::StudentAddress => "StudentAddress",
            FieldName::InvoiceId => "InvoiceId",
            FieldName::InvoiceDate => "InvoiceDate",
            FieldName::InvoiceDescription => "InvoiceDescription",
            FieldName::BaseAmount => "BaseAmount",
            FieldName::VatAmount => "VatAmount",
            FieldName::TotalAmount => "TotalAmount",
            FieldName::PaymentNote => "PaymentNote",
            FieldName::ContactInfo => "ContactInfo",
        }
    }

    /// Human readable label
    pub fn label(&self) -> &'static str {
        match self {
            FieldName::StudentName => "Student Name",
            FieldName::StudentAddress => "Student Address",
            FieldName::InvoiceId => "Invoice ID",
            FieldName::InvoiceDate => "Invoice Date",
            FieldName::InvoiceDescription => "Invoice Description",
            FieldName::BaseAmount => "Base Amount (excluding VAT)",
            FieldName::VatAmount => "VAT Amount",
            FieldName::TotalAmount => "Total Amount",
            FieldName::PaymentNote => "Payment Note",
            FieldName::ContactInfo => "Contact Information",
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldName {
    type Err = LayoutError;

    /// Case-insensitive match against the ten stored keys
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        FieldName::ALL
            .into_iter()
            .find(|field| field.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| LayoutError::UnknownField(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_ignores_case() {
        assert_eq!("BaseAmount".parse::<FieldName>().unwrap(), FieldName::BaseAmount);
        assert_eq!("baseamount".parse::<FieldName>().unwrap(), FieldName::BaseAmount);
        assert_eq!("CONTACTINFO".parse::<FieldName>().unwrap(), FieldName::ContactInfo);
    }

    #[test]
    fn test_parse_rejects_other_names() {
        for name in ["NotARealField", "", "LastUpdated", "UpdatedBy", "Id", "_id"] {
            let err = name.parse::<FieldName>().unwrap_err();
            assert!(matches!(err, LayoutError::UnknownField(ref n) if n == name));
        }
    }

    #[test]
    fn test_names_roundtrip_and_unique() {
        for field in FieldName::ALL {
            assert_eq!(field.as_str().parse::<FieldName>().unwrap(), field);
        }
        let mut names: Vec<_> = FieldName::ALL.iter().map(|f| f.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 10);
        assert_eq!(FieldName::BaseAmount.label(), "Base Amount (excluding VAT)");
    }
}
