//! C8 — the composer: the top-level state machine that threads an app,
//! host, install, and inventory through validation, resolution, binding,
//! environment layering, loader selection, and trust evaluation, producing
//! a [`LaunchContract`] or a [`CriticalError`].

use nah_model::{
    validate_app_declaration, validate_install_record, validate_runtime_descriptor,
    AppDeclaration, ContractApp, ContractEnforcement, ContractExecution, ContractNak,
    HostEnvironment, InstallRecord, LaunchContract, RuntimeInventory, TraceStep,
};

use crate::binder::bind_paths;
use crate::capabilities::derive_capability_usage;
use crate::environment::{compose_environment, StandardVars};
use crate::loader::{assemble_arguments, resolve_cwd, select_loader, LoaderSelection};
use crate::options::{CompositionOptions, CompositionResult};
use crate::platform::{library_path_env_key, library_path_separator};
use crate::resolver::{resolve_runtime, RuntimeResolution};
use crate::trust::evaluate_trust;

/// Run the full composition pipeline described in §4.8.
pub fn compose(
    app: &AppDeclaration,
    install: &InstallRecord,
    host: &HostEnvironment,
    inventory: &RuntimeInventory,
    options: &CompositionOptions,
) -> CompositionResult {
    let mut warnings = Vec::new();
    let mut trace = options.enable_trace.then(Vec::new);

    macro_rules! push_trace {
        ($stage:expr, $detail:expr) => {
            if let Some(t) = trace.as_mut() {
                t.push(TraceStep {
                    stage: $stage.to_string(),
                    detail: $detail,
                });
            }
        };
    }

    // VALIDATE_DECL
    match validate_app_declaration(app) {
        Ok(w) => {
            warnings.extend(w);
            push_trace!("VALIDATE_DECL", format!("app {} validated", app.id));
        }
        Err(critical) => {
            return CompositionResult {
                contract: None,
                warnings,
                critical_error: Some(critical),
                trace,
            }
        }
    }

    // VALIDATE_INSTALL
    match validate_install_record(install) {
        Ok(w) => {
            warnings.extend(w);
            push_trace!(
                "VALIDATE_INSTALL",
                format!("install {} validated", install.instance_id)
            );
        }
        Err(critical) => {
            return CompositionResult {
                contract: None,
                warnings,
                critical_error: Some(critical),
                trace,
            }
        }
    }

    // RESOLVE_RUNTIME
    let (resolution, resolve_warnings) = resolve_runtime(app, install, inventory);
    warnings.extend(resolve_warnings);
    push_trace!(
        "RESOLVE_RUNTIME",
        match &resolution {
            RuntimeResolution::Standalone => "standalone app, no runtime".to_string(),
            RuntimeResolution::Resolved { record_ref, .. } => {
                format!("resolved runtime {record_ref}")
            }
            RuntimeResolution::NotFound => "runtime not found, continuing unattached".to_string(),
        }
    );

    let runtime = match &resolution {
        RuntimeResolution::Resolved { descriptor, .. } => Some(*descriptor),
        _ => None,
    };

    // VALIDATE_RUNTIME
    if let Some(rt) = runtime {
        match validate_runtime_descriptor(rt) {
            Ok(w) => {
                warnings.extend(w);
                push_trace!("VALIDATE_RUNTIME", format!("runtime {} validated", rt.nak_id));
            }
            Err(critical) => {
                return CompositionResult {
                    contract: None,
                    warnings,
                    critical_error: Some(critical),
                    trace,
                }
            }
        }
    }

    // BIND_PATHS
    let bound = match bind_paths(app, install, host, runtime, &mut warnings) {
        Ok(bound) => bound,
        Err(critical) => {
            return CompositionResult {
                contract: None,
                warnings,
                critical_error: Some(critical),
                trace,
            }
        }
    };
    push_trace!(
        "BIND_PATHS",
        format!(
            "entrypoint {}, {} library paths, {} exports",
            bound.entrypoint_abs,
            bound.library_paths.len(),
            bound.exports.len()
        )
    );

    // COMPOSE_ENV (+ EXPAND_ENV, performed in the same pass — see environment.rs)
    let standard = StandardVars {
        app_id: app.id.clone(),
        app_version: app.version.clone(),
        app_root: install.install_root.clone(),
        app_entry: bound.entrypoint_abs.clone(),
        nak: match &resolution {
            RuntimeResolution::Resolved { descriptor, .. } => Some((
                descriptor.nak_id.clone(),
                descriptor.nak_version.clone(),
                descriptor.root.clone(),
            )),
            _ => None,
        },
    };
    let (environment, env_warnings) =
        compose_environment(host, runtime, app, install, &standard, trace.as_mut());
    warnings.extend(env_warnings);

    // SELECT_LOADER
    let selection = match select_loader(runtime, install, options.loader_override.as_deref(), &mut warnings) {
        Ok(selection) => selection,
        Err(critical) => {
            return CompositionResult {
                contract: None,
                warnings,
                critical_error: Some(critical),
                trace,
            }
        }
    };
    push_trace!(
        "SELECT_LOADER",
        match &selection {
            LoaderSelection::Selected { loader } => {
                format!("loader selected: {:?}", loader.exec_path)
            }
            LoaderSelection::None => "no loader, entrypoint runs directly".to_string(),
        }
    );

    let binary = match &selection {
        LoaderSelection::Selected { loader } if loader.exec_path.is_some() => {
            loader.exec_path.clone().expect("checked above")
        }
        _ => bound.entrypoint_abs.clone(),
    };

    // ASSEMBLE_ARGS
    let arguments = assemble_arguments(&selection, install, &app.entrypoint_args, &environment);
    push_trace!("ASSEMBLE_ARGS", format!("{} arguments assembled", arguments.len()));

    // RESOLVE_CWD
    let cwd = resolve_cwd(runtime, &install.install_root, &environment);
    push_trace!("RESOLVE_CWD", cwd.clone());

    // TRUST_EVAL
    let trust_warnings = evaluate_trust(&install.trust, options.now.as_deref());
    warnings.extend(trust_warnings);
    push_trace!("TRUST_EVAL", format!("trust state {:?}", install.trust.state));

    let (capability_usage, capability_warnings) = derive_capability_usage(&app.permissions);
    warnings.extend(capability_warnings);

    push_trace!("DONE", "contract produced".to_string());

    let nak_contract = match &resolution {
        RuntimeResolution::Resolved {
            record_ref,
            descriptor,
        } => Some(ContractNak {
            id: descriptor.nak_id.clone(),
            version: descriptor.nak_version.clone(),
            root: descriptor.root.clone(),
            resource_root: descriptor
                .resource_root
                .clone()
                .unwrap_or_else(|| descriptor.root.clone()),
            record_ref: record_ref.clone(),
        }),
        _ => None,
    };

    let contract = LaunchContract {
        schema: "nah.launch_contract/v1".to_string(),
        app: ContractApp {
            id: app.id.clone(),
            version: app.version.clone(),
            root: install.install_root.clone(),
            entrypoint: bound.entrypoint_abs.clone(),
        },
        nak: nak_contract,
        execution: ContractExecution {
            binary,
            arguments,
            cwd,
            library_path_env_key: library_path_env_key().to_string(),
            library_paths: bound.library_paths,
        },
        environment: environment.into_iter().collect(),
        enforcement: ContractEnforcement {
            filesystem: app.permissions.filesystem.clone(),
            network: app.permissions.network.clone(),
        },
        trust: install.trust.clone(),
        exports: bound.exports,
        capability_usage,
    };

    CompositionResult {
        contract: Some(contract),
        warnings,
        critical_error: None,
        trace,
    }
}

/// The separator the dynamic linker expects between `library_paths` entries
/// on this target, matched to [`library_path_env_key`].
pub fn library_separator() -> &'static str {
    library_path_separator()
}
