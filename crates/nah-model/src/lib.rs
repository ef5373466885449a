//! The data model from §3 — App Declaration, Host Environment, Install
//! Record, Runtime Descriptor / Inventory, and the Launch Contract
//! composition produces — plus the C5 structural validators shared by every
//! later stage.

mod diagnostics;
mod types;
mod validate;

pub use diagnostics::{CriticalError, Warning, WarningKey};
pub use types::{
    AppDeclaration, AppMetadata, AssetExport, CapabilityUsage, ContractApp, ContractEnforcement,
    ContractExecution, ContractNak, HostEnvironment, InstallNak, InstallOverrides, InstallRecord,
    LaunchContract, Loader, OverridePolicy, Permissions, Provenance, ResolvedExport,
    RuntimeDescriptor, RuntimeInventory, TraceStep, TrustInfo, TrustState,
};
pub use validate::{validate_app_declaration, validate_install_record, validate_runtime_descriptor};
