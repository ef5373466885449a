use std::fs;
use std::path::Path;

use nah_archive::{extract_archive, verify_sha256};
use serde::Serialize;

use crate::cli::Cli;
use crate::error::{EXIT_FATAL, EXIT_SUCCESS};
use crate::output::{render, CommandOutput};

#[derive(Serialize)]
struct UnpackOutput {
    dest: String,
    extracted: usize,
    error: Option<String>,
}

impl CommandOutput for UnpackOutput {
    fn render_text(&self) -> String {
        if let Some(err) = &self.error {
            return format!("Error: {err}\n");
        }
        format!("extracted {} file(s) into {}\n", self.extracted, self.dest)
    }
}

pub fn run(
    cli: &Cli,
    archive: &Path,
    dest: &Path,
    verify_hash: Option<&str>,
) -> anyhow::Result<i32> {
    let bytes = fs::read(archive)?;

    if let Some(expected) = verify_hash {
        if let Err(e) = verify_sha256(&bytes, expected) {
            let output = UnpackOutput {
                dest: dest.display().to_string(),
                extracted: 0,
                error: Some(e.to_string()),
            };
            println!("{}", render(&output, cli.json));
            return Ok(EXIT_FATAL);
        }
    }

    match extract_archive(&bytes, dest) {
        Ok(extracted) => {
            let output = UnpackOutput {
                dest: dest.display().to_string(),
                extracted: extracted.len(),
                error: None,
            };
            println!("{}", render(&output, cli.json));
            Ok(EXIT_SUCCESS)
        }
        Err(e) => {
            let output = UnpackOutput {
                dest: dest.display().to_string(),
                extracted: 0,
                error: Some(e.to_string()),
            };
            println!("{}", render(&output, cli.json));
            Ok(EXIT_FATAL)
        }
    }
}
