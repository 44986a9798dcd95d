//! Application configuration

use anyhow::{Context, Result};
use invoice_format::CurrencyFormat;
use invoicing::{FontChoice, RendererConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Settings read from the JSON config file
///
/// Every key is optional; a missing file means all defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Root of the document store
    pub data_dir: PathBuf,
    /// Where generated invoice PDFs are kept
    pub invoices_dir: PathBuf,
    /// TrueType font for field text, Helvetica when unset
    pub font_regular: Option<PathBuf>,
    pub font_bold: Option<PathBuf>,
    pub currency_symbol: String,
    pub payment_term_days: u32,
    /// Tracing filter used when `RUST_LOG` is not set
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            invoices_dir: PathBuf::from("Invoices"),
            font_regular: None,
            font_bold: None,
            currency_symbol: CurrencyFormat::default().symbol,
            payment_term_days: RendererConfig::default().payment_term_days,
            log_filter: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load from `path`, or defaults when there is no file
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(e).with_context(|| format!("reading config {}", path.display()))
            }
        };

        let mut config: Self = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        if let Some(base) = path.parent() {
            config.resolve_relative(base);
        }
        Ok(config)
    }

    /// Make relative paths relative to the config file's directory
    fn resolve_relative(&mut self, base: &Path) {
        let rebase = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        rebase(&mut self.data_dir);
        rebase(&mut self.invoices_dir);
        if let Some(p) = self.font_regular.as_mut() {
            rebase(p);
        }
        if let Some(p) = self.font_bold.as_mut() {
            rebase(p);
        }
    }

    /// Renderer settings, reading font files if configured
    pub fn renderer_config(&self) -> Result<RendererConfig> {
        let font = match &self.font_regular {
            None => FontChoice::Helvetica,
            Some(regular) => {
                let regular = fs::read(regular)
                    .with_context(|| format!("reading font {}", regular.display()))?;
                let bold = match &self.font_bold {
                    Some(bold) => Some(
                        fs::read(bold)
                            .with_context(|| format!("reading font {}", bold.display()))?,
                    ),
                    None => None,
                };
                FontChoice::TrueType { regular, bold }
            }
        };

        Ok(RendererConfig {
            font,
            currency: CurrencyFormat::default().with_symbol(&self.currency_symbol),
            payment_term_days: self.payment_term_days,
            ..RendererConfig::default()
        })
    }
}
