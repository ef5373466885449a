use std::path::Path;

use nah_model::{validate_app_declaration, validate_install_record, Warning};
use serde::Serialize;

use crate::cli::Cli;
use crate::config::{load_app_declaration, load_install_record};
use crate::error::{EXIT_FATAL, EXIT_SUCCESS, EXIT_WARNINGS};
use crate::output::{render, CommandOutput};

/// Structural validators, run standalone and collecting every issue rather
/// than stopping at the first.
#[derive(Serialize, Default)]
struct ValidateOutput {
    warnings: Vec<Warning>,
    critical_error: Option<String>,
}

impl CommandOutput for ValidateOutput {
    fn render_text(&self) -> String {
        if let Some(err) = &self.critical_error {
            return format!("Error: {err}\n");
        }
        if self.warnings.is_empty() {
            return "ok: no issues found\n".to_string();
        }
        let mut out = format!("{} issue(s) found:\n", self.warnings.len());
        for w in &self.warnings {
            out.push_str(&format!("  - {}", w.key));
            for (k, v) in &w.fields {
                out.push_str(&format!(" {k}={v}"));
            }
            out.push('\n');
        }
        out
    }
}

pub fn run(cli: &Cli, app: Option<&Path>, install_record: Option<&Path>) -> anyhow::Result<i32> {
    let mut output = ValidateOutput::default();

    if let Some(app_path) = app {
        let decl = load_app_declaration(app_path)?;
        match validate_app_declaration(&decl) {
            Ok(w) => output.warnings.extend(w),
            Err(e) => output.critical_error = Some(e.to_string()),
        }
    }

    if output.critical_error.is_none() {
        if let Some(record_path) = install_record {
            let record = load_install_record(record_path)?;
            match validate_install_record(&record) {
                Ok(w) => output.warnings.extend(w),
                Err(e) => output.critical_error = Some(e.to_string()),
            }
        }
    }

    let exit = if output.critical_error.is_some() {
        EXIT_FATAL
    } else if !output.warnings.is_empty() {
        EXIT_WARNINGS
    } else {
        EXIT_SUCCESS
    };

    println!("{}", render(&output, cli.json));
    Ok(exit)
}
