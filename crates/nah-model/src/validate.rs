//! C5 — structural validation of each record type, run before composition
//! touches any of its fields. A validator either returns the warnings it
//! collected along the way or a [`CriticalError`] that aborts composition
//! outright; it never does both; unlike composition itself, a validator
//! keeps checking after the first problem so the caller sees every issue in
//! one pass (mirrors the "collect every issue instead of bailing on the
//! first" loader convention).

use nah_path::{check_nul, is_absolute};

use crate::diagnostics::{CriticalError, Warning, WarningKey};
use crate::types::{AppDeclaration, InstallRecord, RuntimeDescriptor};

pub fn validate_app_declaration(app: &AppDeclaration) -> Result<Vec<Warning>, CriticalError> {
    if app.id.trim().is_empty() {
        return Err(CriticalError::ManifestMissing(
            "id must not be empty".to_string(),
        ));
    }
    if app.version.trim().is_empty() {
        return Err(CriticalError::ManifestMissing(
            "version must not be empty".to_string(),
        ));
    }
    if app.entrypoint_path.trim().is_empty() {
        return Err(CriticalError::ManifestMissing(
            "entrypoint_path must not be empty".to_string(),
        ));
    }
    if is_absolute(&app.entrypoint_path) {
        return Err(CriticalError::ManifestMissing(format!(
            "entrypoint_path must be relative to the install root, got {}",
            app.entrypoint_path
        )));
    }
    check_nul(&app.entrypoint_path).map_err(|e| CriticalError::PathTraversal(e.to_string()))?;
    for dir in &app.lib_dirs {
        if is_absolute(dir) {
            return Err(CriticalError::ManifestMissing(format!(
                "lib_dirs entries must be relative, got {dir}"
            )));
        }
        check_nul(dir).map_err(|e| CriticalError::PathTraversal(e.to_string()))?;
    }
    for export in &app.asset_exports {
        if is_absolute(&export.path) {
            return Err(CriticalError::ManifestMissing(format!(
                "asset_exports[{}].path must be relative, got {}",
                export.id, export.path
            )));
        }
        check_nul(&export.path).map_err(|e| CriticalError::PathTraversal(e.to_string()))?;
    }

    let mut warnings = Vec::new();
    if !app.is_standalone() && app.nak_version_req.trim().is_empty() {
        warnings.push(
            Warning::new(WarningKey::NakPinInvalid)
                .with("nak_id", app.nak_id.clone())
                .with("reason", "nak_version_req is empty, any version will satisfy it"),
        );
    }
    Ok(warnings)
}

pub fn validate_install_record(install: &InstallRecord) -> Result<Vec<Warning>, CriticalError> {
    if install.instance_id.trim().is_empty() {
        return Err(CriticalError::InstallRecordInvalid(
            "instance_id must not be empty".to_string(),
        ));
    }
    if install.install_root.trim().is_empty() {
        return Err(CriticalError::InstallRecordInvalid(
            "install_root must not be empty".to_string(),
        ));
    }
    if !is_absolute(&install.install_root) {
        return Err(CriticalError::InstallRecordInvalid(format!(
            "install_root must be absolute, got {}",
            install.install_root
        )));
    }

    let mut warnings = Vec::new();
    if let Some(nak) = &install.nak {
        if nak.id.trim().is_empty() || nak.version.trim().is_empty() {
            return Err(CriticalError::InstallRecordInvalid(
                "nak.id and nak.version must not be empty when nak is present".to_string(),
            ));
        }
        if nak.record_ref.trim().is_empty() {
            return Err(CriticalError::InstallRecordInvalid(
                "nak.record_ref must not be empty when nak is present".to_string(),
            ));
        }
    }
    for dir in &install.overrides.library_prepend {
        if !is_absolute(dir) {
            warnings.push(
                Warning::new(WarningKey::InvalidLibraryPath)
                    .with("path", dir.clone())
                    .with("reason", "override library path must be absolute"),
            );
        }
    }
    Ok(warnings)
}

pub fn validate_runtime_descriptor(
    runtime: &RuntimeDescriptor,
) -> Result<Vec<Warning>, CriticalError> {
    if runtime.nak_id.trim().is_empty() {
        return Err(CriticalError::PathTraversal(
            "nak_id must not be empty".to_string(),
        ));
    }
    if runtime.nak_version.trim().is_empty() {
        return Err(CriticalError::PathTraversal(
            "nak_version must not be empty".to_string(),
        ));
    }
    if runtime.root.trim().is_empty() {
        return Err(CriticalError::PathTraversal(
            "root must not be empty".to_string(),
        ));
    }
    if !is_absolute(&runtime.root) {
        return Err(CriticalError::PathTraversal(format!(
            "root must be absolute, got {}",
            runtime.root
        )));
    }
    check_nul(&runtime.root).map_err(|e| CriticalError::PathTraversal(e.to_string()))?;

    for dir in &runtime.lib_dirs {
        if !is_absolute(dir) {
            return Err(CriticalError::PathTraversal(format!(
                "runtime lib_dirs entry must be absolute, got {dir}"
            )));
        }
        check_nul(dir).map_err(|e| CriticalError::PathTraversal(e.to_string()))?;
    }
    for (name, loader) in &runtime.loaders {
        if let Some(exec_path) = &loader.exec_path {
            if !is_absolute(exec_path) {
                return Err(CriticalError::PathTraversal(format!(
                    "loader {name} exec_path must be absolute, got {exec_path}"
                )));
            }
            check_nul(exec_path).map_err(|e| CriticalError::PathTraversal(e.to_string()))?;
        }
    }
    Ok(Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{InstallNak, InstallRecord, Loader};
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    fn minimal_app() -> AppDeclaration {
        AppDeclaration {
            schema: "nah.app_declaration/v1".to_string(),
            id: "com.example.game".to_string(),
            version: "1.0.0".to_string(),
            entrypoint_path: "bin/game".to_string(),
            entrypoint_args: Vec::new(),
            nak_id: String::new(),
            nak_version_req: String::new(),
            nak_loader: None,
            env_vars: BTreeMap::new(),
            lib_dirs: Vec::new(),
            asset_dirs: Vec::new(),
            asset_exports: Vec::new(),
            permissions: Default::default(),
            metadata: None,
            components: Vec::new(),
        }
    }

    #[test]
    fn minimal_standalone_app_is_valid_with_no_warnings() {
        let warnings = validate_app_declaration(&minimal_app()).unwrap();
        assert!(warnings.is_empty());
    }

    #[test]
    fn absolute_entrypoint_path_is_rejected() {
        let mut app = minimal_app();
        app.entrypoint_path = "/bin/game".to_string();
        assert!(validate_app_declaration(&app).is_err());
    }

    #[test]
    fn nak_without_version_req_warns() {
        let mut app = minimal_app();
        app.nak_id = "lua5.4".to_string();
        let warnings = validate_app_declaration(&app).unwrap();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].key, WarningKey::NakPinInvalid);
    }

    #[test]
    fn absolute_lib_dir_is_rejected() {
        let mut app = minimal_app();
        app.lib_dirs.push("/usr/lib/evil".to_string());
        assert!(validate_app_declaration(&app).is_err());
    }

    fn minimal_install() -> InstallRecord {
        InstallRecord {
            schema: "nah.install_record/v1".to_string(),
            instance_id: "inst-1".to_string(),
            install_root: "/var/nah/installs/inst-1".to_string(),
            nak: None,
            overrides: Default::default(),
            trust: Default::default(),
            provenance: Default::default(),
        }
    }

    #[test]
    fn minimal_install_record_is_valid() {
        assert!(validate_install_record(&minimal_install()).unwrap().is_empty());
    }

    #[test]
    fn relative_install_root_is_rejected() {
        let mut install = minimal_install();
        install.install_root = "relative/path".to_string();
        assert!(validate_install_record(&install).is_err());
    }

    #[test]
    fn nak_with_empty_record_ref_is_rejected() {
        let mut install = minimal_install();
        install.nak = Some(InstallNak {
            id: "lua5.4".to_string(),
            version: "5.4.6".to_string(),
            record_ref: String::new(),
            loader: None,
            selection_reason: String::new(),
        });
        assert!(validate_install_record(&install).is_err());
    }

    #[test]
    fn relative_override_library_path_warns_but_does_not_fail() {
        let mut install = minimal_install();
        install.overrides.library_prepend.push("lib".to_string());
        let warnings = validate_install_record(&install).unwrap();
        assert_eq!(warnings[0].key, WarningKey::InvalidLibraryPath);
    }

    fn minimal_runtime() -> RuntimeDescriptor {
        RuntimeDescriptor {
            schema: "nah.runtime_descriptor/v1".to_string(),
            nak_id: "lua5.4".to_string(),
            nak_version: "5.4.6".to_string(),
            root: "/opt/nah/runtimes/lua5.4-5.4.6".to_string(),
            resource_root: None,
            lib_dirs: Vec::new(),
            environment: BTreeMap::new(),
            loaders: BTreeMap::new(),
            cwd: None,
        }
    }

    #[test]
    fn minimal_runtime_descriptor_is_valid() {
        assert!(validate_runtime_descriptor(&minimal_runtime()).unwrap().is_empty());
    }

    #[test]
    fn relative_runtime_root_is_rejected() {
        let mut runtime = minimal_runtime();
        runtime.root = "relative".to_string();
        assert!(validate_runtime_descriptor(&runtime).is_err());
    }

    #[test]
    fn relative_loader_exec_path_is_rejected() {
        let mut runtime = minimal_runtime();
        runtime.loaders.insert(
            "default".to_string(),
            Loader {
                exec_path: Some("lua".to_string()),
                args_template: vec!["{entrypoint}".to_string()],
            },
        );
        assert!(matches!(
            validate_runtime_descriptor(&runtime),
            Err(CriticalError::PathTraversal(_))
        ));
    }

    #[test]
    fn relative_runtime_lib_dir_is_rejected() {
        let mut runtime = minimal_runtime();
        runtime.lib_dirs.push("lib".to_string());
        assert!(matches!(
            validate_runtime_descriptor(&runtime),
            Err(CriticalError::PathTraversal(_))
        ));
    }

    #[test]
    fn nul_byte_in_entrypoint_is_rejected() {
        let mut app = minimal_app();
        app.entrypoint_path = "bin/ga\0me".to_string();
        assert!(matches!(
            validate_app_declaration(&app),
            Err(CriticalError::PathTraversal(_))
        ));
    }
}
