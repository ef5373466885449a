use std::fs;
use std::path::Path;

use nah_archive::pack_dir;
use serde::Serialize;

use crate::cli::Cli;
use crate::error::{EXIT_FATAL, EXIT_SUCCESS};
use crate::output::{render, CommandOutput};

#[derive(Serialize)]
struct PackOutput {
    out: String,
    bytes: usize,
    sha256: String,
    error: Option<String>,
}

impl CommandOutput for PackOutput {
    fn render_text(&self) -> String {
        if let Some(err) = &self.error {
            return format!("Error: {err}\n");
        }
        format!(
            "packed {} ({} bytes)\nsha256: {}\n",
            self.out, self.bytes, self.sha256
        )
    }
}

pub fn run(cli: &Cli, source: &Path, out: &Path) -> anyhow::Result<i32> {
    match pack_dir(source) {
        Ok(packed) => {
            fs::write(out, &packed.bytes)?;
            let output = PackOutput {
                out: out.display().to_string(),
                bytes: packed.bytes.len(),
                sha256: packed.sha256,
                error: None,
            };
            println!("{}", render(&output, cli.json));
            Ok(EXIT_SUCCESS)
        }
        Err(e) => {
            let output = PackOutput {
                out: out.display().to_string(),
                bytes: 0,
                sha256: String::new(),
                error: Some(e.to_string()),
            };
            println!("{}", render(&output, cli.json));
            Ok(EXIT_FATAL)
        }
    }
}
