//! Student and invoice records

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A student of the school
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Student {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub student_number: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub emergency_contact: Option<String>,
    #[serde(default)]
    pub bank_name: Option<String>,
    #[serde(default)]
    pub account_number: Option<String>,
    #[serde(default)]
    pub date_of_registration: Option<NaiveDate>,
    /// Path of the signed registration form, if uploaded
    #[serde(default)]
    pub registration_document_path: Option<String>,
}

impl Student {
    /// Student used for layout previews
    pub fn sample(registered: NaiveDate) -> Self {
        Self {
            id: "507f1f77bcf86cd799439011".to_string(),
            name: Some("Voorbeeld Student".to_string()),
            student_number: Some("STU001".to_string()),
            address: Some("Voorbeeldstraat 123, 1234 AB Voorbeeldstad".to_string()),
            email: Some("voorbeeld@student.nl".to_string()),
            phone_number: Some("+31 6 12345678".to_string()),
            emergency_contact: Some("Ouders: +31 6 87654321".to_string()),
            bank_name: Some("Voorbeeld Bank".to_string()),
            account_number: Some("NL12VOOR0123456789".to_string()),
            date_of_registration: Some(registered),
            registration_document_path: None,
        }
    }
}

/// An invoice sent to one student
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Invoice {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub student_id: String,
    pub date: NaiveDate,
    /// Amount including VAT
    pub amount_total: f64,
    /// VAT rate in percent
    #[serde(rename = "VAT")]
    pub vat: f64,
    #[serde(default)]
    pub description: Option<String>,
    /// Archived PDF, once generated
    #[serde(default)]
    pub invoice_pdf_path: Option<String>,
}

impl Invoice {
    /// Invoice used for layout previews
    pub fn sample(date: NaiveDate) -> Self {
        Self {
            id: "507f1f77bcf86cd799439012".to_string(),
            student_id: String::new(),
            date,
            amount_total: 125.50,
            vat: 21.0,
            description: Some(
                "Voorbeeld factuur beschrijving - Dit is een voorbeeldtekst die toont hoe de \
                 factuur eruit ziet met de huidige layout instellingen"
                    .to_string(),
            ),
            invoice_pdf_path: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_invoice_document_shape() {
        let invoice = Invoice {
            id: "i1".to_string(),
            student_id: "s1".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            amount_total: 121.0,
            vat: 21.0,
            description: Some("Les".to_string()),
            invoice_pdf_path: None,
        };
        assert_eq!(
            serde_json::to_value(&invoice).unwrap(),
            json!({
                "_id": "i1",
                "StudentId": "s1",
                "Date": "2024-01-01",
                "AmountTotal": 121.0,
                "VAT": 21.0,
                "Description": "Les",
                "InvoicePdfPath": null
            })
        );
    }

    #[test]
    fn test_student_sparse_document() {
        let student: Student =
            serde_json::from_value(json!({ "_id": "s1", "Name": "Anna", "Unknown": 1 })).unwrap();
        assert_eq!(student.name.as_deref(), Some("Anna"));
        assert_eq!(student.email, None);
    }
}
