//! C7 — path binder: resolves the absolute entrypoint, assembles the
//! ordered library search-path vector, and resolves asset exports, all
//! subject to containment against the declared roots.

use std::collections::BTreeMap;

use nah_model::{
    AppDeclaration, CriticalError, HostEnvironment, InstallRecord, ResolvedExport,
    RuntimeDescriptor, Warning, WarningKey,
};
use nah_path::{escapes_root, is_absolute, join};

pub struct BoundPaths {
    pub entrypoint_abs: String,
    pub library_paths: Vec<String>,
    pub exports: BTreeMap<String, ResolvedExport>,
}

/// Bind every path an app declares against its install root, in the order
/// fixed by §4.7. Returns a fatal [`CriticalError::PathTraversal`] the
/// moment any containment-checked join escapes its root.
pub fn bind_paths(
    app: &AppDeclaration,
    install: &InstallRecord,
    host: &HostEnvironment,
    runtime: Option<&RuntimeDescriptor>,
    warnings: &mut Vec<Warning>,
) -> Result<BoundPaths, CriticalError> {
    let app_root = &install.install_root;

    let entrypoint_abs = join(app_root, &app.entrypoint_path);
    if escapes_root(app_root, &entrypoint_abs) {
        return Err(CriticalError::PathTraversal(format!(
            "entrypoint_path {:?} escapes install root {app_root:?}",
            app.entrypoint_path
        )));
    }

    let mut library_paths = Vec::new();

    // 1. host-declared prepend paths, absolute-only, warn-and-drop otherwise.
    for p in &host.library_prepend {
        if is_absolute(p) {
            library_paths.push(p.clone());
        } else {
            warnings.push(
                Warning::new(WarningKey::InvalidLibraryPath)
                    .with("path", p.clone())
                    .with("source", "host.paths.library_prepend"),
            );
        }
    }

    // 2. install-record override prepend paths, absolute-only.
    for p in &install.overrides.library_prepend {
        if is_absolute(p) {
            library_paths.push(p.clone());
        }
    }

    // 3. runtime lib_dirs, already absolute by C5 validation.
    if let Some(rt) = runtime {
        library_paths.extend(rt.lib_dirs.iter().cloned());
    }

    // 4. app lib_dirs, joined under the install root, containment-checked.
    for rel in &app.lib_dirs {
        let joined = join(app_root, rel);
        if escapes_root(app_root, &joined) {
            return Err(CriticalError::PathTraversal(format!(
                "lib_dirs entry {rel:?} escapes install root {app_root:?}"
            )));
        }
        library_paths.push(joined);
    }

    // 5. host-declared append paths.
    library_paths.extend(host.library_append.iter().cloned());

    let mut exports = BTreeMap::new();
    for export in &app.asset_exports {
        let joined = join(app_root, &export.path);
        if escapes_root(app_root, &joined) {
            return Err(CriticalError::PathTraversal(format!(
                "asset_exports[{}].path {:?} escapes install root {app_root:?}",
                export.id, export.path
            )));
        }
        exports.insert(
            export.id.clone(),
            ResolvedExport {
                absolute_path: joined,
                r#type: export.r#type.clone(),
            },
        );
    }

    Ok(BoundPaths {
        entrypoint_abs,
        library_paths,
        exports,
    })
}
