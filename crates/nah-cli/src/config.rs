//! On-disk record loading: `<root>/host/host.json`, `<root>/registry/naks/*.json`
//! for the runtime inventory, plus whatever app declaration / install
//! record path the caller names directly. JSON is the reference record
//! format; app declarations may also be authored as `nap.toml`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use nah_model::{AppDeclaration, HostEnvironment, InstallRecord, RuntimeDescriptor, RuntimeInventory};
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Read { path: String, source: std::io::Error },
    #[error("failed to parse {path} as JSON: {source}")]
    Json { path: String, source: serde_json::Error },
    #[error("failed to parse {path} as TOML: {source}")]
    Toml { path: String, source: toml::de::Error },
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let text = fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| LoadError::Json {
        path: path.display().to_string(),
        source,
    })
}

fn read_toml<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let text = fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.display().to_string(),
        source,
    })?;
    toml::from_str(&text).map_err(|source| LoadError::Toml {
        path: path.display().to_string(),
        source,
    })
}

/// Load an App Declaration, dispatching on file extension: `.toml` parses
/// as TOML, anything else as JSON.
pub fn load_app_declaration(path: &Path) -> Result<AppDeclaration, LoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => read_toml(path),
        _ => read_json(path),
    }
}

/// Load the Host Environment from `<root>/host/host.json`. Missing is not
/// an error — a host with nothing to contribute is the default.
pub fn load_host_environment(root: &Path) -> Result<HostEnvironment, LoadError> {
    let path = root.join("host").join("host.json");
    if !path.exists() {
        return Ok(HostEnvironment::default());
    }
    read_json(&path)
}

pub fn load_install_record(path: &Path) -> Result<InstallRecord, LoadError> {
    read_json(path)
}

/// Build the Runtime Inventory from every file under
/// `<root>/registry/naks/`, keyed by file name — the same `record_ref` an
/// Install Record's `nak.record_ref` pins against.
pub fn load_runtime_inventory(root: &Path) -> Result<RuntimeInventory, LoadError> {
    let dir = root.join("registry").join("naks");
    let mut inventory = BTreeMap::new();
    if !dir.exists() {
        return Ok(inventory);
    }

    let mut entries: Vec<PathBuf> = fs::read_dir(&dir)
        .map_err(|source| LoadError::Read {
            path: dir.display().to_string(),
            source,
        })?
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.extension().and_then(|e| e.to_str()) == Some("json"))
        .collect();
    entries.sort();

    for path in entries {
        let record_ref = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        let descriptor: RuntimeDescriptor = read_json(&path)?;
        inventory.insert(record_ref, descriptor);
    }
    Ok(inventory)
}
