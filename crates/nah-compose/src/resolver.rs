//! C6 — runtime resolver: look up the pin an install record carries in the
//! inventory. The install-time selector (C10, in `nah-selector`) is the only
//! place a version requirement is ever evaluated; by the time composition
//! runs, the choice has already been frozen into `record_ref`.

use nah_model::{AppDeclaration, InstallRecord, RuntimeDescriptor, RuntimeInventory, Warning, WarningKey};

/// The outcome of resolving an app's declared runtime against an install's
/// pin and the current inventory.
pub enum RuntimeResolution<'a> {
    /// `AppDeclaration.nak_id` was empty: nothing to resolve.
    Standalone,
    /// The pin resolved to a descriptor present in the inventory.
    Resolved {
        record_ref: String,
        descriptor: &'a RuntimeDescriptor,
    },
    /// A nak was declared but the pin is missing or not in the inventory;
    /// composition continues without a runtime attached.
    NotFound,
}

pub fn resolve_runtime<'a>(
    app: &AppDeclaration,
    install: &InstallRecord,
    inventory: &'a RuntimeInventory,
) -> (RuntimeResolution<'a>, Vec<Warning>) {
    if app.is_standalone() {
        return (RuntimeResolution::Standalone, Vec::new());
    }

    let record_ref = install
        .nak
        .as_ref()
        .map(|nak| nak.record_ref.clone())
        .unwrap_or_default();

    if record_ref.is_empty() {
        return (
            RuntimeResolution::NotFound,
            vec![Warning::new(WarningKey::NakNotFound)
                .with("nak_id", app.nak_id.clone())
                .with("reason", "install record has no pinned record_ref")],
        );
    }

    match inventory.get(&record_ref) {
        Some(descriptor) => (
            RuntimeResolution::Resolved {
                record_ref,
                descriptor,
            },
            Vec::new(),
        ),
        None => (
            RuntimeResolution::NotFound,
            vec![Warning::new(WarningKey::NakNotFound)
                .with("nak_id", app.nak_id.clone())
                .with("record_ref", record_ref)
                .with("reason", "record_ref not present in inventory")],
        ),
    }
}
