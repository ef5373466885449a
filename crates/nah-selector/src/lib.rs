//! C10 — install-time NAK selection. Given a runtime inventory and a
//! declared `(nak_id, version_req)`, pick the highest available version
//! satisfying the range and pin its `record_ref`. Runs once, at install
//! time; composition (C6) never re-runs this, it only reads the pin an
//! install record already carries.

use nah_model::RuntimeInventory;
use nah_semver::{Range, Version};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SelectError {
    #[error("no runtime in the inventory provides nak {0:?}")]
    NoSuchNak(String),
    #[error("no version of nak {nak_id:?} in the inventory satisfies {requirement:?}")]
    NoSatisfyingVersion { nak_id: String, requirement: String },
}

/// The outcome of a successful selection: what an install record's `nak`
/// section should be populated with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub record_ref: String,
    pub nak_id: String,
    pub version: Version,
}

/// Select the highest version of `nak_id` in `inventory` satisfying
/// `version_req`. Inventory entries whose `nak_version` fails to parse as a
/// SemVer version are excluded from consideration rather than causing an
/// error — a malformed sibling entry should not block selection among the
/// rest.
pub fn select(
    inventory: &RuntimeInventory,
    nak_id: &str,
    version_req: &str,
) -> Result<Selection, SelectError> {
    let candidates: Vec<(&String, Version)> = inventory
        .iter()
        .filter(|(_, descriptor)| descriptor.nak_id == nak_id)
        .filter_map(|(record_ref, descriptor)| {
            Version::parse(&descriptor.nak_version).map(|v| (record_ref, v))
        })
        .collect();

    if candidates.is_empty() {
        return Err(SelectError::NoSuchNak(nak_id.to_string()));
    }

    let range = Range::parse(version_req);
    let versions: Vec<Version> = candidates.iter().map(|(_, v)| v.clone()).collect();
    let picked = range
        .select_highest(&versions)
        .ok_or_else(|| SelectError::NoSatisfyingVersion {
            nak_id: nak_id.to_string(),
            requirement: version_req.to_string(),
        })?;

    let record_ref = candidates
        .iter()
        .find(|(_, v)| v == picked)
        .map(|(r, _)| (*r).clone())
        .expect("picked version came from candidates");

    Ok(Selection {
        record_ref,
        nak_id: nak_id.to_string(),
        version: picked.clone(),
    })
}
