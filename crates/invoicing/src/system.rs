//! Back-office wide settings

use crate::{Clock, Result};
use chrono::{DateTime, Utc};
use docstore::{DocumentStore, SingletonRecord};
use layout::SYSTEM_USER;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

pub const SYSTEM_SETTINGS_COLLECTION: &str = "SystemSettings";
pub const SYSTEM_SETTINGS_ID: &str = "default_settings";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SystemSettings {
    #[serde(rename = "_id", default)]
    pub id: String,

    /// Template used for batch invoices and previews, empty when unset
    #[serde(default)]
    pub default_invoice_template_path: String,

    #[serde(default)]
    pub last_updated: DateTime<Utc>,

    #[serde(default)]
    pub updated_by: String,
}

/// Reads and writes the single [`SystemSettings`] record
#[derive(Clone)]
pub struct SystemSettingsStore {
    record: SingletonRecord<SystemSettings>,
    clock: Arc<dyn Clock>,
}

impl SystemSettingsStore {
    pub fn new(store: Arc<dyn DocumentStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            record: SingletonRecord::new(store, SYSTEM_SETTINGS_COLLECTION, SYSTEM_SETTINGS_ID),
            clock,
        }
    }

    /// Current settings, created with an empty template path on first use
    pub fn get(&self) -> Result<SystemSettings> {
        let settings = self
            .record
            .get_or_insert_with(|| SystemSettings {
                id: SYSTEM_SETTINGS_ID.to_string(),
                default_invoice_template_path: String::new(),
                last_updated: self.clock.now(),
                updated_by: SYSTEM_USER.to_string(),
            })
            .map_err(|e| {
                error!(error = %e, "failed to read system settings");
                e
            })?;
        Ok(settings)
    }

    /// Point the default template at `path`
    pub fn set_template_path(&self, path: &str) -> Result<SystemSettings> {
        let mut settings = self.get()?;
        settings.default_invoice_template_path = path.to_string();
        settings.last_updated = self.clock.now();
        settings.updated_by = SYSTEM_USER.to_string();

        self.record.replace(&settings).map_err(|e| {
            error!(error = %e, "failed to update template path");
            e
        })?;

        info!(template = path, "default invoice template updated");
        Ok(settings)
    }
}
