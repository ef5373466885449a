//! Loader selection (the `SELECT_LOADER` state), argument assembly, and
//! `cwd` resolution — the three steps that turn a resolved runtime plus an
//! app's declared entrypoint into something directly exec-able.

use std::collections::HashMap;

use nah_env::expand;
use nah_model::{CriticalError, InstallRecord, Loader, RuntimeDescriptor, Warning, WarningKey};

pub enum LoaderSelection<'a> {
    /// No runtime, or a runtime with no usable loader: the app's own
    /// entrypoint is the binary, unwrapped.
    None,
    Selected { loader: &'a Loader },
}

/// §4.8's `SELECT_LOADER` rules, in order: explicit override, the install
/// record's pinned loader, `default` by name, the lone loader if there's
/// exactly one, or a warning and no loader at all.
pub fn select_loader<'a>(
    runtime: Option<&'a RuntimeDescriptor>,
    install: &InstallRecord,
    loader_override: Option<&str>,
    warnings: &mut Vec<Warning>,
) -> Result<LoaderSelection<'a>, CriticalError> {
    let Some(rt) = runtime else {
        return Ok(LoaderSelection::None);
    };

    if let Some(name) = loader_override {
        return match rt.loaders.get(name) {
            Some(loader) => Ok(LoaderSelection::Selected { loader }),
            None => Err(CriticalError::NakLoaderInvalid(format!(
                "requested loader {name:?} not present for nak {}",
                rt.nak_id
            ))),
        };
    }

    let install_loader = install.nak.as_ref().and_then(|n| n.loader.as_deref());
    if let Some(name) = install_loader {
        return match rt.loaders.get(name) {
            Some(loader) => Ok(LoaderSelection::Selected { loader }),
            None => Err(CriticalError::NakLoaderInvalid(format!(
                "install-pinned loader {name:?} not present for nak {}",
                rt.nak_id
            ))),
        };
    }

    if let Some(loader) = rt.loaders.get("default") {
        return Ok(LoaderSelection::Selected { loader });
    }

    if rt.loaders.len() == 1 {
        let loader = rt.loaders.values().next().expect("len checked above");
        return Ok(LoaderSelection::Selected { loader });
    }

    warnings.push(
        Warning::new(WarningKey::NakLoaderRequired)
            .with("nak_id", rt.nak_id.clone())
            .with("loader_count", rt.loaders.len().to_string()),
    );
    Ok(LoaderSelection::None)
}

fn expand_once(s: &str, env: &HashMap<String, String>) -> String {
    expand(s, env).map(|e| e.output).unwrap_or_else(|_| s.to_string())
}

/// Assemble the final argument vector: install-override prepend, the
/// loader's template (if any), the app's own entrypoint args, then
/// install-override append. Every string is placeholder-expanded once.
pub fn assemble_arguments(
    selection: &LoaderSelection<'_>,
    install: &InstallRecord,
    entrypoint_args: &[String],
    env: &HashMap<String, String>,
) -> Vec<String> {
    let mut args = Vec::new();
    args.extend(
        install
            .overrides
            .arguments_prepend
            .iter()
            .map(|a| expand_once(a, env)),
    );
    if let LoaderSelection::Selected { loader } = selection {
        args.extend(loader.args_template.iter().map(|a| expand_once(a, env)));
    }
    args.extend(entrypoint_args.iter().map(|a| expand_once(a, env)));
    args.extend(
        install
            .overrides
            .arguments_append
            .iter()
            .map(|a| expand_once(a, env)),
    );
    args
}

/// `cwd` resolution: expand the runtime's `execution.cwd` template if
/// present; an absolute result is used as-is, a relative one is joined
/// under the runtime root. With no runtime `cwd`, fall back to the app root.
pub fn resolve_cwd(
    runtime: Option<&RuntimeDescriptor>,
    app_root: &str,
    env: &HashMap<String, String>,
) -> String {
    let Some(rt) = runtime else {
        return app_root.to_string();
    };
    let Some(template) = &rt.cwd else {
        return app_root.to_string();
    };
    let expanded = expand_once(template, env);
    if nah_path::is_absolute(&expanded) {
        expanded
    } else {
        nah_path::join(&rt.root, &expanded)
    }
}
