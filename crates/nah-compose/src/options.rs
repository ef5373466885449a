use nah_model::{CriticalError, LaunchContract, TraceStep, Warning};

/// Knobs a host may set for a single [`crate::compose`] call. Every field is
/// optional; the zero value reproduces the default pipeline behaviour.
#[derive(Debug, Clone, Default)]
pub struct CompositionOptions {
    /// Force a specific loader name, bypassing the install record's pinned
    /// loader and the `default`/only-one-loader fallbacks.
    pub loader_override: Option<String>,
    /// RFC3339 "current time" used to evaluate `trust.expires_at`. Left
    /// unset, staleness is never checked — composition has no clock of its
    /// own (§5: purely computational, no ambient state).
    pub now: Option<String>,
    /// Record a decision trace alongside the contract.
    pub enable_trace: bool,
}

/// What [`crate::compose`] returns: either a contract plus whatever warnings
/// accumulated along the way, or a critical error (and the warnings
/// collected before it was hit). Composition never panics and never throws;
/// this is the union §9 calls for translated into a plain Rust type.
#[derive(Debug, Clone, Default)]
pub struct CompositionResult {
    pub contract: Option<LaunchContract>,
    pub warnings: Vec<Warning>,
    pub critical_error: Option<CriticalError>,
    pub trace: Option<Vec<TraceStep>>,
}

impl CompositionResult {
    pub fn is_ok(&self) -> bool {
        self.critical_error.is_none()
    }
}
