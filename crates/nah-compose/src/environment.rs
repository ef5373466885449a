//! Environment layering (§4.8): five precedence-ranked layers applied in
//! order over one accumulating map, followed by a single placeholder
//! expansion pass over the result.

use std::collections::HashMap;

use nah_env::{apply, apply_fill_only, expand, ExpandError};
use nah_model::{AppDeclaration, HostEnvironment, InstallRecord, RuntimeDescriptor, TraceStep, Warning, WarningKey};

/// The NAH-standard variables (rank 1, always wins): always set, plus the
/// `NAH_NAK_*` trio when a runtime is attached.
pub struct StandardVars {
    pub app_id: String,
    pub app_version: String,
    pub app_root: String,
    pub app_entry: String,
    pub nak: Option<(String, String, String)>,
}

/// Layer host → runtime → app-manifest (fill-only) → install-overrides →
/// standard vars, then expand every value once. Returns the final plain
/// `name → string` map plus any warnings raised along the way.
pub fn compose_environment(
    host: &HostEnvironment,
    runtime: Option<&RuntimeDescriptor>,
    app: &AppDeclaration,
    install: &InstallRecord,
    standard: &StandardVars,
    mut trace: Option<&mut Vec<TraceStep>>,
) -> (HashMap<String, String>, Vec<Warning>) {
    let mut env: HashMap<String, String> = HashMap::new();
    let mut warnings = Vec::new();

    for (key, entry) in &host.vars {
        apply(&mut env, key, &entry.clone().into_operation());
    }
    if let Some(t) = trace.as_deref_mut() {
        t.push(TraceStep {
            stage: "COMPOSE_ENV".to_string(),
            detail: format!("applied {} host environment entries", host.vars.len()),
        });
    }

    if let Some(rt) = runtime {
        for (key, entry) in &rt.environment {
            apply(&mut env, key, &entry.clone().into_operation());
        }
        if let Some(t) = trace.as_deref_mut() {
            t.push(TraceStep {
                stage: "COMPOSE_ENV".to_string(),
                detail: format!("applied {} runtime environment entries", rt.environment.len()),
            });
        }
    }

    for (key, entry) in &app.env_vars {
        apply_fill_only(&mut env, key, &entry.clone().into_operation());
    }
    if let Some(t) = trace.as_deref_mut() {
        t.push(TraceStep {
            stage: "COMPOSE_ENV".to_string(),
            detail: format!("applied {} app manifest defaults (fill-only)", app.env_vars.len()),
        });
    }

    for (key, entry) in &install.overrides.environment {
        apply(&mut env, key, &entry.clone().into_operation());
    }
    if let Some(t) = trace.as_deref_mut() {
        t.push(TraceStep {
            stage: "COMPOSE_ENV".to_string(),
            detail: format!("applied {} install-record overrides", install.overrides.environment.len()),
        });
    }

    env.insert("NAH_APP_ID".to_string(), standard.app_id.clone());
    env.insert("NAH_APP_VERSION".to_string(), standard.app_version.clone());
    env.insert("NAH_APP_ROOT".to_string(), standard.app_root.clone());
    env.insert("NAH_APP_ENTRY".to_string(), standard.app_entry.clone());
    if let Some((id, version, root)) = &standard.nak {
        env.insert("NAH_NAK_ID".to_string(), id.clone());
        env.insert("NAH_NAK_VERSION".to_string(), version.clone());
        env.insert("NAH_NAK_ROOT".to_string(), root.clone());
    }

    let snapshot = env.clone();
    let mut expanded = HashMap::with_capacity(env.len());
    let mut keys: Vec<&String> = env.keys().collect();
    keys.sort();
    for key in keys {
        let value = &env[key];
        match expand(value, &snapshot) {
            Ok(result) => {
                for missing in result.missing {
                    warnings.push(
                        Warning::new(WarningKey::MissingEnvVar)
                            .with("target", key.clone())
                            .with("placeholder", missing),
                    );
                }
                expanded.insert(key.clone(), result.output);
            }
            Err(ExpandError::PlaceholderLimit) => {
                warnings.push(
                    Warning::new(WarningKey::PlaceholderLimitExceeded).with("target", key.clone()),
                );
                expanded.insert(key.clone(), value.clone());
            }
            Err(ExpandError::ExpansionOverflow) => {
                warnings
                    .push(Warning::new(WarningKey::ExpansionOverflow).with("target", key.clone()));
                expanded.insert(key.clone(), value.clone());
            }
        }
    }

    (expanded, warnings)
}
