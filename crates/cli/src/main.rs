use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use docstore::{CancelToken, JsonFileStore};
use invoicing::{
    Backoffice, BatchInvoiceRequest, FsTemplateSource, Invoice, InvoiceArchive, Student,
    SystemClock,
};
use layout::{FieldName, LayoutSettings, PositionInput};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod config;

use config::AppConfig;

#[derive(Parser)]
#[command(
    name = "scheve",
    about = "Back office for the scheve painting school",
    version
)]
struct Cli {
    /// JSON configuration file
    #[arg(short, long, global = true, env = "SCHEVE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect or change where invoice fields are printed
    #[command(subcommand)]
    Layout(LayoutCommand),

    /// Inspect or change the default invoice template
    #[command(subcommand)]
    Template(TemplateCommand),

    /// Manage student records
    #[command(subcommand)]
    Student(StudentCommand),

    /// Render one invoice from JSON files
    Render {
        /// Student record (JSON)
        #[arg(long)]
        student: PathBuf,

        /// Invoice record (JSON)
        #[arg(long)]
        invoice: PathBuf,

        /// Template PDF or image, defaults to the configured template
        #[arg(short, long)]
        template: Option<String>,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Render sample data on the default template
    Preview {
        /// Output file path
        #[arg(short, long, default_value = "preview.pdf")]
        output: PathBuf,

        /// Layout to try instead of the stored one (JSON)
        #[arg(short, long)]
        layout: Option<PathBuf>,
    },

    /// Create and archive invoices for several students
    Batch {
        /// Student ids, comma separated
        #[arg(short, long, value_delimiter = ',', required = true)]
        students: Vec<String>,

        /// Amount including VAT
        #[arg(short, long)]
        amount: f64,

        /// VAT rate in percent
        #[arg(long, default_value = "21")]
        vat: f64,

        #[arg(short, long)]
        description: Option<String>,
    },
}

#[derive(Subcommand)]
enum LayoutCommand {
    /// Print the stored layout
    Show,
    /// Print the default layout without storing it
    Defaults,
    /// List field names and labels
    Elements,
    /// Move a single field; omitted options keep their current value
    Set(SetField),
    /// Replace the whole layout from a JSON file
    Replace { file: PathBuf },
    /// Restore the default layout
    Reset,
}

#[derive(Args)]
struct SetField {
    /// Field name, e.g. StudentName
    field: String,

    #[arg(long, allow_negative_numbers = true)]
    top: Option<i64>,

    #[arg(long, allow_negative_numbers = true)]
    left: Option<i64>,

    #[arg(long)]
    font_size: Option<i64>,

    #[arg(long)]
    max_height: Option<i64>,

    /// Left, Center or Right
    #[arg(long)]
    align: Option<String>,

    /// `--bold` alone means true
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    bold: Option<bool>,
}

#[derive(Subcommand)]
enum TemplateCommand {
    /// Print the system settings
    Show,
    /// Set the default invoice template path
    Set { path: String },
}

#[derive(Subcommand)]
enum StudentCommand {
    /// Add a student from a JSON file, printing its id
    Add { file: PathBuf },
    /// Print a student
    Show { id: String },
    /// Print every student
    List,
    /// Replace a student from a JSON file, keeping its id
    Update { id: String, file: PathBuf },
    /// Remove a student
    Delete { id: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let backoffice = open_backoffice(&config)?;

    match cli.command {
        Commands::Layout(command) => run_layout(&backoffice, command)?,

        Commands::Template(TemplateCommand::Show) => print_json(&backoffice.system_settings()?)?,

        Commands::Template(TemplateCommand::Set { path }) => {
            print_json(&backoffice.set_template_path(&path)?)?
        }

        Commands::Student(StudentCommand::Add { file }) => {
            let student: Student = read_json(&file)?;
            println!("{}", backoffice.add_student(student)?);
        }

        Commands::Student(StudentCommand::Show { id }) => print_json(&backoffice.student(&id)?)?,

        Commands::Student(StudentCommand::List) => print_json(&backoffice.students()?)?,

        Commands::Student(StudentCommand::Update { id, file }) => {
            let student: Student = read_json(&file)?;
            print_json(&backoffice.update_student(&id, student)?)?
        }

        Commands::Student(StudentCommand::Delete { id }) => {
            backoffice.delete_student(&id)?;
            println!("{id}");
        }

        Commands::Render {
            student,
            invoice,
            template,
            output,
        } => {
            let student: Student = read_json(&student)?;
            let invoice: Invoice = read_json(&invoice)?;
            let template = match template {
                Some(template) => template,
                None => backoffice.system_settings()?.default_invoice_template_path,
            };
            if template.trim().is_empty() {
                bail!("no template given and no default template configured");
            }

            let pdf = backoffice.render_document(&template, &student, &invoice, None)?;
            write_output(&output, &pdf)?;
        }

        Commands::Preview { output, layout } => {
            let layout = match layout {
                Some(path) => Some(read_layout(&path)?),
                None => None,
            };
            let pdf = backoffice.preview(layout)?;
            write_output(&output, &pdf)?;
        }

        Commands::Batch {
            students,
            amount,
            vat,
            description,
        } => {
            let request = BatchInvoiceRequest {
                student_ids: students,
                description,
                amount_total: amount,
                vat,
            };
            let result = backoffice.generate_batch(&request, &CancelToken::new())?;

            for invoice in &result.successful_invoices {
                println!(
                    "{}\t{}",
                    invoice.id,
                    invoice.invoice_pdf_path.as_deref().unwrap_or_default()
                );
            }
            for error in &result.errors {
                eprintln!("skipped: {error}");
            }
            println!(
                "{} generated, {} failed, total {:.2}",
                result.success_count(),
                result.error_count(),
                result.total_amount()
            );
        }
    }

    Ok(())
}

fn run_layout(backoffice: &Backoffice, command: LayoutCommand) -> Result<()> {
    match command {
        LayoutCommand::Show => print_json(&backoffice.layout_settings()?),
        LayoutCommand::Defaults => print_json(&backoffice.default_layout()),
        LayoutCommand::Elements => {
            for (name, label) in backoffice.available_elements() {
                println!("{name}\t{label}");
            }
            Ok(())
        }
        LayoutCommand::Set(set) => {
            // unknown names fall through to the store, which reports them
            let mut input = match set.field.parse::<FieldName>() {
                Ok(field) => PositionInput::from(backoffice.layout_settings()?.slot(field).clone()),
                Err(_) => PositionInput::default(),
            };
            if let Some(top) = set.top {
                input.top = top;
            }
            if let Some(left) = set.left {
                input.left = left;
            }
            if let Some(font_size) = set.font_size {
                input.font_size = font_size;
            }
            if let Some(max_height) = set.max_height {
                input.max_height = max_height;
            }
            if let Some(align) = set.align {
                input.text_align = align;
            }
            if let Some(bold) = set.bold {
                input.bold = bold;
            }

            let position = input.into_position()?;
            print_json(&backoffice.update_element_position(&set.field, position)?)
        }
        LayoutCommand::Replace { file } => {
            let settings = read_layout(&file)?;
            print_json(&backoffice.update_layout_settings(settings)?)
        }
        LayoutCommand::Reset => print_json(&backoffice.reset_layout_to_default()?),
    }
}

fn open_backoffice(config: &AppConfig) -> Result<Backoffice> {
    let store = JsonFileStore::open(&config.data_dir)
        .with_context(|| format!("opening data directory {}", config.data_dir.display()))?;
    let archive = InvoiceArchive::open(&config.invoices_dir)
        .with_context(|| format!("opening invoice directory {}", config.invoices_dir.display()))?;

    Ok(Backoffice::new(
        Arc::new(store),
        Arc::new(FsTemplateSource::new()),
        archive,
        config.renderer_config()?,
        Arc::new(SystemClock),
    ))
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn read_layout(path: &Path) -> Result<LayoutSettings> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(LayoutSettings::from_json(&text)?)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn write_output(path: &Path, pdf: &[u8]) -> Result<()> {
    fs::write(path, pdf).with_context(|| format!("writing {}", path.display()))?;
    info!(output = %path.display(), bytes = pdf.len(), "wrote PDF");
    println!("{}", path.display());
    Ok(())
}
