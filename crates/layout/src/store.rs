//! Persistence of the single layout record

use crate::clock::Clock;
use crate::field::FieldName;
use crate::position::LayoutPosition;
use crate::settings::{LayoutSettings, LAYOUT_SETTINGS_ID, SYSTEM_USER};
use crate::{LayoutError, Result};
use docstore::{DocumentStore, SingletonRecord};
use std::sync::Arc;
use tracing::{error, info};

/// Collection holding the layout record
pub const LAYOUT_COLLECTION: &str = "PdfLayoutSettings";

/// Reads and writes the current [`LayoutSettings`]
///
/// Every call goes back to storage; nothing is cached. Single-field updates
/// are read-modify-write over the whole record, so two concurrent updates
/// to different fields can lose one of them (last write wins).
#[derive(Clone)]
pub struct LayoutStore {
    record: SingletonRecord<LayoutSettings>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for LayoutStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutStore")
            .field("id", &self.record.id())
            .finish()
    }
}

impl LayoutStore {
    pub fn new(store: Arc<dyn DocumentStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            record: SingletonRecord::new(store, LAYOUT_COLLECTION, LAYOUT_SETTINGS_ID),
            clock,
        }
    }

    /// Defaults without touching storage
    pub fn default_layout(&self) -> LayoutSettings {
        LayoutSettings::default_layout(self.clock.as_ref())
    }

    /// Current layout, creating and persisting the defaults on first use
    pub fn get(&self) -> Result<LayoutSettings> {
        self.record
            .get_or_insert_with(|| self.default_layout())
            .map_err(|e| {
                error!(error = %e, "failed to read layout settings");
                LayoutError::Storage(e)
            })
    }

    /// Validate and store `settings` as the current layout
    ///
    /// The identity is forced to the well-known id and `last_updated` is
    /// stamped with the store's clock. Nothing is written when validation
    /// fails.
    pub fn replace(&self, mut settings: LayoutSettings) -> Result<LayoutSettings> {
        settings.validate()?;

        settings.id = LAYOUT_SETTINGS_ID.to_string();
        settings.last_updated = self.clock.now();
        if settings.updated_by.trim().is_empty() {
            settings.updated_by = SYSTEM_USER.to_string();
        }

        self.record.replace(&settings).map_err(|e| {
            error!(error = %e, "failed to store layout settings");
            LayoutError::Storage(e)
        })?;

        info!(updated_by = %settings.updated_by, "layout settings updated");
        Ok(settings)
    }

    /// Overwrite the current layout with the defaults
    pub fn reset_to_default(&self) -> Result<LayoutSettings> {
        let settings = self.replace(self.default_layout())?;
        info!("layout settings reset to default");
        Ok(settings)
    }

    /// Replace the position of the field called `name`
    ///
    /// `name` is matched case-insensitively against the ten field names.
    /// Unknown names and invalid positions are rejected before anything is
    /// read or written.
    pub fn update_field(&self, name: &str, position: LayoutPosition) -> Result<LayoutSettings> {
        let field: FieldName = name.parse()?;
        let mut violations = crate::Violations::scoped(field.as_str());
        position.collect_violations(&mut violations);
        violations.into_result()?;

        let mut settings = self.get()?;
        *settings.slot_mut(field) = position;
        let settings = self.replace(settings)?;

        info!(field = %field, "layout position updated");
        Ok(settings)
    }
}
