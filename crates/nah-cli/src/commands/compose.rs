use std::collections::HashMap;
use std::path::Path;

use nah_compose::{apply_overrides, compose, CompositionOptions};
use nah_model::{LaunchContract, TraceStep, Warning};
use serde::Serialize;

use crate::cli::Cli;
use crate::config::{
    load_app_declaration, load_host_environment, load_install_record, load_runtime_inventory,
};
use crate::error::{render_critical, EXIT_FATAL, EXIT_SUCCESS, EXIT_WARNINGS};
use crate::output::{render, CommandOutput};

/// Mirrors `nah_compose::CompositionResult` field-for-field: the full
/// result is always emitted, critical error and warnings first-class,
/// exactly as §7 requires for `--json` mode.
#[derive(Serialize)]
struct ComposeOutput {
    contract: Option<LaunchContract>,
    warnings: Vec<Warning>,
    critical_error: Option<String>,
    trace: Option<Vec<TraceStep>>,
}

impl CommandOutput for ComposeOutput {
    fn render_text(&self) -> String {
        let mut out = match &self.contract {
            Some(contract) => format!(
                "binary: {}\narguments: {:?}\ncwd: {}\nlibrary_path_env_key: {}\n",
                contract.execution.binary,
                contract.execution.arguments,
                contract.execution.cwd,
                contract.execution.library_path_env_key,
            ),
            None => String::new(),
        };
        if let Some(err) = &self.critical_error {
            out.push_str(err);
            out.push('\n');
        }
        if !self.warnings.is_empty() {
            out.push_str(&format!("{} warning(s):\n", self.warnings.len()));
            for w in &self.warnings {
                out.push_str(&format!("  - {}\n", w.key));
            }
        }
        if let Some(trace) = &self.trace {
            out.push_str("trace:\n");
            for step in trace {
                out.push_str(&format!("  [{}] {}\n", step.stage, step.detail));
            }
        }
        if out.is_empty() {
            out.push_str("no contract produced\n");
        }
        out
    }
}

pub fn run(
    cli: &Cli,
    root: &Path,
    install_record: &Path,
    app: &Path,
    loader: Option<&str>,
) -> anyhow::Result<i32> {
    let app_decl = load_app_declaration(app)?;
    let install = load_install_record(install_record)?;
    let host = load_host_environment(root)?;
    let inventory = load_runtime_inventory(root)?;

    let options = CompositionOptions {
        loader_override: loader.map(str::to_string),
        now: None,
        enable_trace: cli.trace,
    };

    tracing::debug!(app_id = %app_decl.id, "composing launch contract");
    let mut result = compose(&app_decl, &install, &host, &inventory, &options);

    if let Some(contract) = result.contract.as_mut() {
        let mut process_env = HashMap::new();
        if let Ok(raw) = std::env::var("NAH_OVERRIDE_ENVIRONMENT") {
            process_env.insert("NAH_OVERRIDE_ENVIRONMENT".to_string(), raw);
        }
        let override_warnings = apply_overrides(contract, &process_env, &host.override_policy);
        result.warnings.extend(override_warnings);
    }

    let exit = match &result.critical_error {
        Some(_) => EXIT_FATAL,
        None if !result.warnings.is_empty() => EXIT_WARNINGS,
        None => EXIT_SUCCESS,
    };

    let output = ComposeOutput {
        contract: result.contract,
        warnings: result.warnings,
        critical_error: result.critical_error.as_ref().map(render_critical),
        trace: result.trace,
    };

    println!("{}", render(&output, cli.json));
    Ok(exit)
}
