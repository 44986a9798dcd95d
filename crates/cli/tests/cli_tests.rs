//! End-to-end tests driving the `scheve` binary

use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

struct Workspace {
    dir: TempDir,
    config: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let config = dir.path().join("scheve.json");
        fs::write(
            &config,
            r#"{ "data_dir": "data", "invoices_dir": "Invoices", "log_filter": "warn" }"#,
        )
        .unwrap();
        Self { dir, config }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_scheve"))
            .arg("--config")
            .arg(&self.config)
            .args(args)
            .env_remove("RUST_LOG")
            .env_remove("SCHEVE_CONFIG")
            .output()
            .expect("Failed to run scheve")
    }

    fn run_ok(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            output.status.success(),
            "scheve {args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8(output.stdout).unwrap()
    }

    fn run_err(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(!output.status.success(), "scheve {args:?} should fail");
        String::from_utf8(output.stderr).unwrap()
    }
}

fn layout_json(stdout: &str) -> serde_json::Value {
    serde_json::from_str(stdout).expect("layout output should be JSON")
}

fn assert_pdf(path: &Path) {
    let content = fs::read(path).expect("Failed to read PDF file");
    assert!(content.starts_with(b"%PDF-"), "{} is not a PDF", path.display());
}

#[test]
fn test_help_lists_commands() {
    let output = Command::new(env!("CARGO_BIN_EXE_scheve"))
        .arg("--help")
        .output()
        .unwrap();
    let stdout = String::from_utf8(output.stdout).unwrap();
    for command in ["layout", "template", "student", "render", "preview", "batch"] {
        assert!(stdout.contains(command), "help is missing {command}");
    }
}

#[test]
fn test_layout_show_persists_defaults() {
    let ws = Workspace::new();
    let shown = layout_json(&ws.run_ok(&["layout", "show"]));

    assert_eq!(shown["_id"], "default_pdf_layout");
    assert_eq!(shown["StudentName"]["Top"], 150);
    assert_eq!(shown["BaseAmount"]["IsBold"], true);
    assert!(ws
        .path("data")
        .join("PdfLayoutSettings")
        .join("default_pdf_layout.json")
        .exists());
}

#[test]
fn test_layout_elements() {
    let ws = Workspace::new();
    let stdout = ws.run_ok(&["layout", "elements"]);
    let lines: Vec<_> = stdout.lines().collect();

    assert_eq!(lines.len(), 10);
    assert_eq!(lines[0], "StudentName\tStudent Name");
    assert_eq!(lines[9], "ContactInfo\tContact Information");
}

#[test]
fn test_layout_set_keeps_other_fields() {
    let ws = Workspace::new();
    let updated = layout_json(&ws.run_ok(&[
        "layout",
        "set",
        "studentname",
        "--top",
        "200",
        "--align",
        "right",
        "--bold",
    ]));

    assert_eq!(updated["StudentName"]["Top"], 200);
    assert_eq!(updated["StudentName"]["Left"], 400);
    assert_eq!(updated["StudentName"]["TextAlign"], "Right");
    assert_eq!(updated["StudentName"]["IsBold"], true);
    assert_eq!(updated["StudentAddress"]["Top"], 165);

    let shown = layout_json(&ws.run_ok(&["layout", "show"]));
    assert_eq!(shown["StudentName"], updated["StudentName"]);
}

#[test]
fn test_layout_set_rejects_out_of_range() {
    let ws = Workspace::new();
    let stderr = ws.run_err(&["layout", "set", "StudentName", "--top", "5000"]);
    assert!(stderr.contains("Top"), "unexpected error: {stderr}");

    let shown = layout_json(&ws.run_ok(&["layout", "show"]));
    assert_eq!(shown["StudentName"]["Top"], 150);
}

#[test]
fn test_layout_set_unknown_field() {
    let ws = Workspace::new();
    let stderr = ws.run_err(&["layout", "set", "Signature", "--top", "10"]);
    assert!(stderr.contains("Unknown layout field"), "unexpected error: {stderr}");
}

#[test]
fn test_layout_replace_and_reset() {
    let ws = Workspace::new();
    let file = ws.path("layout.json");
    fs::write(
        &file,
        r#"{ "InvoiceId": { "Top": 10, "Left": 20, "FontSize": 12, "TextAlign": "center" } }"#,
    )
    .unwrap();

    let replaced = layout_json(&ws.run_ok(&["layout", "replace", file.to_str().unwrap()]));
    assert_eq!(replaced["InvoiceId"]["Top"], 10);
    assert_eq!(replaced["InvoiceId"]["TextAlign"], "Center");

    let reset = layout_json(&ws.run_ok(&["layout", "reset"]));
    let defaults = layout_json(&ws.run_ok(&["layout", "defaults"]));
    assert_eq!(reset["InvoiceId"], defaults["InvoiceId"]);
    assert_eq!(reset["UpdatedBy"], "System");
}

#[test]
fn test_preview_needs_template() {
    let ws = Workspace::new();
    let output = ws.path("preview.pdf");
    let stderr = ws.run_err(&["preview", "-o", output.to_str().unwrap()]);

    assert!(stderr.contains("Template not found"), "unexpected error: {stderr}");
    assert!(!output.exists());
}

#[test]
fn test_preview_with_template() {
    let ws = Workspace::new();
    // not a PDF or image, rendered on a blank page
    let template = ws.path("briefpapier.bin");
    fs::write(&template, b"letterhead").unwrap();
    ws.run_ok(&["template", "set", template.to_str().unwrap()]);

    let settings: serde_json::Value =
        serde_json::from_str(&ws.run_ok(&["template", "show"])).unwrap();
    assert_eq!(
        settings["DefaultInvoiceTemplatePath"],
        template.to_str().unwrap()
    );

    let output = ws.path("preview.pdf");
    ws.run_ok(&["preview", "-o", output.to_str().unwrap()]);
    assert_pdf(&output);
}

#[test]
fn test_render_from_json_files() {
    let ws = Workspace::new();
    let template = ws.path("briefpapier.bin");
    fs::write(&template, b"letterhead").unwrap();
    let student = ws.path("student.json");
    fs::write(&student, r#"{ "_id": "s1", "Name": "Anna", "Email": "anna@example.nl" }"#)
        .unwrap();
    let invoice = ws.path("invoice.json");
    fs::write(
        &invoice,
        r#"{ "_id": "F1", "StudentId": "s1", "Date": "2024-01-01", "AmountTotal": 121.0, "VAT": 21.0 }"#,
    )
    .unwrap();

    let output = ws.path("factuur.pdf");
    ws.run_ok(&[
        "render",
        "--student",
        student.to_str().unwrap(),
        "--invoice",
        invoice.to_str().unwrap(),
        "--template",
        template.to_str().unwrap(),
        "-o",
        output.to_str().unwrap(),
    ]);
    assert_pdf(&output);
}

#[test]
fn test_student_add_and_batch() {
    let ws = Workspace::new();
    let template = ws.path("briefpapier.bin");
    fs::write(&template, b"letterhead").unwrap();
    ws.run_ok(&["template", "set", template.to_str().unwrap()]);

    let student = ws.path("student.json");
    fs::write(&student, r#"{ "Name": "Anna", "Email": "anna@example.nl" }"#).unwrap();
    let id = ws.run_ok(&["student", "add", student.to_str().unwrap()]);
    let id = id.trim();
    assert!(!id.is_empty());

    let shown: serde_json::Value =
        serde_json::from_str(&ws.run_ok(&["student", "show", id])).unwrap();
    assert_eq!(shown["Name"], "Anna");

    let students = format!("{id},missing");
    let stdout = ws.run_ok(&[
        "batch",
        "--students",
        &students,
        "--amount",
        "121",
        "--vat",
        "21",
        "--description",
        "Lesgeld",
    ]);
    assert!(
        stdout.contains("1 generated, 1 failed, total 121.00"),
        "unexpected output: {stdout}"
    );

    let archived: Vec<_> = fs::read_dir(ws.path("Invoices"))
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(archived.len(), 1);
    assert!(archived[0].starts_with("Factuur_") && archived[0].ends_with(".pdf"));
}

#[test]
fn test_batch_rejects_invalid_amount() {
    let ws = Workspace::new();
    let stderr = ws.run_err(&["batch", "--students", "s1", "--amount", "0"]);
    assert!(stderr.contains("AmountTotal"), "unexpected error: {stderr}");
}

#[test]
fn test_student_list_update_delete() {
    let ws = Workspace::new();
    let student = ws.path("student.json");
    fs::write(&student, r#"{ "_id": "s1", "Name": "Anna" }"#).unwrap();
    ws.run_ok(&["student", "add", student.to_str().unwrap()]);

    let changed = ws.path("changed.json");
    fs::write(&changed, r#"{ "_id": "s9", "Name": "Anna de Vries" }"#).unwrap();
    let updated: serde_json::Value =
        serde_json::from_str(&ws.run_ok(&["student", "update", "s1", changed.to_str().unwrap()]))
            .unwrap();
    assert_eq!(updated["_id"], "s1");
    assert_eq!(updated["Name"], "Anna de Vries");

    let listed: serde_json::Value =
        serde_json::from_str(&ws.run_ok(&["student", "list"])).unwrap();
    assert_eq!(listed.as_array().unwrap().len(), 1);

    ws.run_ok(&["student", "delete", "s1"]);
    let stderr = ws.run_err(&["student", "delete", "s1"]);
    assert!(stderr.contains("Student not found"), "unexpected error: {stderr}");
    assert_eq!(ws.run_ok(&["student", "list"]).trim(), "[]");
}
