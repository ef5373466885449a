use std::path::Path;

use nah_selector::select;
use serde::Serialize;

use crate::cli::Cli;
use crate::config::load_runtime_inventory;
use crate::error::{EXIT_FATAL, EXIT_SUCCESS};
use crate::output::{render, CommandOutput};

#[derive(Serialize)]
struct PinOutput {
    nak_id: String,
    record_ref: Option<String>,
    version: Option<String>,
    error: Option<String>,
}

impl CommandOutput for PinOutput {
    fn render_text(&self) -> String {
        match (&self.record_ref, &self.error) {
            (Some(record_ref), _) => format!(
                "record_ref: {record_ref}\nversion: {}\n",
                self.version.clone().unwrap_or_default()
            ),
            (None, Some(err)) => format!("Error: {err}\n"),
            (None, None) => "no selection\n".to_string(),
        }
    }
}

pub fn run(cli: &Cli, root: &Path, nak_id: &str, version_req: &str) -> anyhow::Result<i32> {
    let inventory = load_runtime_inventory(root)?;

    let output = match select(&inventory, nak_id, version_req) {
        Ok(selection) => PinOutput {
            nak_id: selection.nak_id,
            record_ref: Some(selection.record_ref),
            version: Some(selection.version.to_string()),
            error: None,
        },
        Err(e) => PinOutput {
            nak_id: nak_id.to_string(),
            record_ref: None,
            version: None,
            error: Some(e.to_string()),
        },
    };

    let exit = if output.error.is_some() {
        EXIT_FATAL
    } else {
        EXIT_SUCCESS
    };

    println!("{}", render(&output, cli.json));
    Ok(exit)
}
