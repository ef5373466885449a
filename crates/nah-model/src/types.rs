//! The on-disk record shapes described in §3: the App Declaration, the Host
//! Environment, the Install Record, and the Runtime Descriptor / Inventory,
//! plus the [`LaunchContract`] that composition produces from them.
//!
//! Every record tolerates unknown keys (`#[serde(default)]` throughout, no
//! `deny_unknown_fields`) so that a newer installer or a newer runtime can
//! add fields without breaking an older composer.

use std::collections::BTreeMap;

use nah_env::EnvEntry;
use serde::{Deserialize, Serialize};

fn schema_app_declaration() -> String {
    "nah.app_declaration/v1".to_string()
}

fn schema_install_record() -> String {
    "nah.install_record/v1".to_string()
}

fn schema_runtime_descriptor() -> String {
    "nah.runtime_descriptor/v1".to_string()
}

fn schema_launch_contract() -> String {
    "nah.launch_contract/v1".to_string()
}

/// §3.1 — declares what an app needs in order to launch, independent of any
/// particular host or install.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppDeclaration {
    #[serde(rename = "$schema", default = "schema_app_declaration")]
    pub schema: String,
    pub id: String,
    pub version: String,
    pub entrypoint_path: String,
    #[serde(default)]
    pub entrypoint_args: Vec<String>,
    #[serde(default)]
    pub nak_id: String,
    #[serde(default)]
    pub nak_version_req: String,
    #[serde(default)]
    pub nak_loader: Option<String>,
    #[serde(default)]
    pub env_vars: BTreeMap<String, EnvEntry>,
    #[serde(default)]
    pub lib_dirs: Vec<String>,
    #[serde(default)]
    pub asset_dirs: Vec<String>,
    #[serde(default)]
    pub asset_exports: Vec<AssetExport>,
    #[serde(default)]
    pub permissions: Permissions,
    #[serde(default)]
    pub metadata: Option<AppMetadata>,
    /// Opaque, ordered extension points (§4.8); composition does not
    /// interpret these, it only carries them through for a future stage.
    #[serde(default)]
    pub components: Vec<serde_json::Value>,
}

impl AppDeclaration {
    /// An app with no `nak_id` runs standalone (§4.6): no runtime is
    /// resolved, and the entrypoint is executed directly.
    pub fn is_standalone(&self) -> bool {
        self.nak_id.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetExport {
    pub id: String,
    pub path: String,
    #[serde(default)]
    pub r#type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
    #[serde(default)]
    pub filesystem: Vec<String>,
    #[serde(default)]
    pub network: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppMetadata {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub license: Option<String>,
    #[serde(default)]
    pub homepage: Option<String>,
}

/// §3.2 — what the host contributes regardless of which app is launching:
/// ambient environment, extra library search paths, and the policy that
/// governs which of those an install may override.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostEnvironment {
    #[serde(default)]
    pub vars: BTreeMap<String, EnvEntry>,
    #[serde(default)]
    pub library_prepend: Vec<String>,
    #[serde(default)]
    pub library_append: Vec<String>,
    #[serde(default)]
    pub override_policy: OverridePolicy,
}

/// Governs `NAH_OVERRIDE_ENVIRONMENT` (§4.9). An empty `allowed_keys` with
/// `allow_overrides: true` means "any key"; the policy is deny-by-default
/// once the list is non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverridePolicy {
    #[serde(default = "default_true")]
    pub allow_overrides: bool,
    #[serde(default)]
    pub allowed_keys: Vec<String>,
}

impl Default for OverridePolicy {
    fn default() -> Self {
        Self {
            allow_overrides: true,
            allowed_keys: Vec::new(),
        }
    }
}

impl OverridePolicy {
    pub fn permits(&self, key: &str) -> bool {
        if !self.allow_overrides {
            return false;
        }
        self.allowed_keys.is_empty() || self.allowed_keys.iter().any(|k| k == key)
    }
}

fn default_true() -> bool {
    true
}

/// §3.3 — what was actually installed: the pinned runtime reference, any
/// per-install overrides, trust evaluation results, and provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallRecord {
    #[serde(rename = "$schema", default = "schema_install_record")]
    pub schema: String,
    pub instance_id: String,
    pub install_root: String,
    #[serde(default)]
    pub nak: Option<InstallNak>,
    #[serde(default)]
    pub overrides: InstallOverrides,
    #[serde(default)]
    pub trust: TrustInfo,
    #[serde(default)]
    pub provenance: Provenance,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallNak {
    pub id: String,
    pub version: String,
    pub record_ref: String,
    #[serde(default)]
    pub loader: Option<String>,
    #[serde(default)]
    pub selection_reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallOverrides {
    #[serde(default)]
    pub environment: BTreeMap<String, EnvEntry>,
    #[serde(default)]
    pub arguments_prepend: Vec<String>,
    #[serde(default)]
    pub arguments_append: Vec<String>,
    #[serde(default)]
    pub library_prepend: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    #[serde(default)]
    pub package_hash: Option<String>,
    #[serde(default)]
    pub installed_at: Option<String>,
    #[serde(default)]
    pub installed_by: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

/// §3.3 / §4.10 — the outcome of evaluating an installed NAK's trustworthiness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustInfo {
    #[serde(default)]
    pub state: TrustState,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub evaluated_at: Option<String>,
    #[serde(default)]
    pub expires_at: Option<String>,
    #[serde(default)]
    pub inputs_hash: Option<String>,
    #[serde(default)]
    pub details: BTreeMap<String, String>,
}

impl Default for TrustInfo {
    fn default() -> Self {
        Self {
            state: TrustState::Unknown,
            source: None,
            evaluated_at: None,
            expires_at: None,
            inputs_hash: None,
            details: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustState {
    Verified,
    #[default]
    Unknown,
    Unverified,
    Failed,
}

/// §3.4 — a single installed runtime, keyed in the inventory by its
/// `record_ref` (§4.10's pin target).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeDescriptor {
    #[serde(rename = "$schema", default = "schema_runtime_descriptor")]
    pub schema: String,
    pub nak_id: String,
    pub nak_version: String,
    pub root: String,
    #[serde(default)]
    pub resource_root: Option<String>,
    #[serde(default)]
    pub lib_dirs: Vec<String>,
    #[serde(default)]
    pub environment: BTreeMap<String, EnvEntry>,
    #[serde(default)]
    pub loaders: BTreeMap<String, Loader>,
    #[serde(default)]
    pub cwd: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loader {
    #[serde(default)]
    pub exec_path: Option<String>,
    #[serde(default)]
    pub args_template: Vec<String>,
}

/// §3.4 — the full set of runtimes an install-time selector (C10) can pick
/// from, keyed by `record_ref`.
pub type RuntimeInventory = BTreeMap<String, RuntimeDescriptor>;

/// §3.5 — the deterministic output of composition: everything a launcher
/// needs to start the process and nothing it needs to derive further. The
/// trace and the warnings collected along the way are not part of this —
/// they ride alongside it in [`crate::LaunchContract`]'s caller-facing
/// result type, never inside the contract itself (§4.8).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchContract {
    #[serde(rename = "$schema", default = "schema_launch_contract")]
    pub schema: String,
    pub app: ContractApp,
    pub nak: Option<ContractNak>,
    pub execution: ContractExecution,
    pub environment: BTreeMap<String, String>,
    pub enforcement: ContractEnforcement,
    pub trust: TrustInfo,
    pub exports: BTreeMap<String, ResolvedExport>,
    pub capability_usage: CapabilityUsage,
}

/// The app identity and its resolved absolute paths, carried through to the
/// contract so a consumer never has to re-derive them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractApp {
    pub id: String,
    pub version: String,
    pub root: String,
    pub entrypoint: String,
}

/// What the resolved process should actually be launched with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractExecution {
    pub binary: String,
    pub arguments: Vec<String>,
    pub cwd: String,
    pub library_path_env_key: String,
    pub library_paths: Vec<String>,
}

/// Raw carry-through of the app's declared permissions; see
/// `capability_usage` for the deduplicated, policy-facing summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractEnforcement {
    #[serde(default)]
    pub filesystem: Vec<String>,
    #[serde(default)]
    pub network: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractNak {
    pub id: String,
    pub version: String,
    pub root: String,
    pub resource_root: String,
    pub record_ref: String,
}

/// A deduplicated summary of the capability operations an app's declared
/// permissions exercise, distinct from `enforcement`'s raw carry-through —
/// this is what a host's policy engine would actually index on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityUsage {
    #[serde(default)]
    pub filesystem_ops: Vec<String>,
    #[serde(default)]
    pub network_ops: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedExport {
    pub absolute_path: String,
    #[serde(default)]
    pub r#type: Option<String>,
}

/// One named stage of the C8 state machine, recorded when tracing is on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceStep {
    pub stage: String,
    pub detail: String,
}
