//! The non-fatal warning and fatal error taxonomy shared by every stage of
//! composition (validation, resolution, binding, trust evaluation).

use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// What a warning is about. Serializes to the lower-snake-case key a caller
/// would grep a `--json` trace for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKey {
    InvalidManifest,
    NakPinInvalid,
    NakNotFound,
    NakVersionUnsupported,
    NakLoaderRequired,
    NakLoaderMissing,
    CapabilityMissing,
    CapabilityMalformed,
    CapabilityUnknown,
    MissingEnvVar,
    InvalidTrustState,
    OverrideDenied,
    OverrideInvalid,
    InvalidLibraryPath,
    TrustStateUnverified,
    TrustStateFailed,
    TrustStateUnknown,
    TrustStateStale,
    /// Not part of the §7 closed set verbatim; §4.3 describes the same
    /// "warn and keep the template" behaviour without naming a key, so these
    /// two extend the taxonomy rather than overload `missing_env_var`.
    PlaceholderLimitExceeded,
    ExpansionOverflow,
}

impl fmt::Display for WarningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = serde_json::to_value(self)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_else(|| "unknown".to_string());
        write!(f, "{s}")
    }
}

/// A non-fatal diagnostic raised while composing a contract. Warnings never
/// abort composition; they ride along in the decision trace and, for
/// [`WarningKey::InvalidLibraryPath`] entries, cause the offending directory
/// to be silently dropped from the resulting library path list.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Warning {
    pub key: WarningKey,
    /// Free-form context: `target`, `nak_id`, `key`, `path`, whatever the
    /// emitting stage found useful. Kept as a map rather than a fixed struct
    /// so each stage can attach what it has without a new variant per case.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, String>,
}

impl Warning {
    pub fn new(key: WarningKey) -> Self {
        Self {
            key,
            fields: BTreeMap::new(),
        }
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }
}

/// A fatal error: composition stops and no [`crate::LaunchContract`] is
/// produced. The five variants are exactly the named classes in §6/§7; a
/// Runtime Descriptor validation failure escalates to [`PathTraversal`]
/// rather than getting its own class, per §4.5's "source convention".
///
/// [`PathTraversal`]: CriticalError::PathTraversal
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CriticalError {
    #[error("app declaration invalid or absent: {0}")]
    ManifestMissing(String),
    #[error("install record invalid: {0}")]
    InstallRecordInvalid(String),
    #[error("path escapes its containing root: {0}")]
    PathTraversal(String),
    #[error("entrypoint not found: {0}")]
    EntrypointNotFound(String),
    #[error("nak loader invalid: {0}")]
    NakLoaderInvalid(String),
}
