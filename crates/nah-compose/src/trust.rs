//! Trust evaluation: carry `InstallRecord.trust` into the contract verbatim
//! and raise informational warnings about its state and freshness. Never
//! fatal — trust is surfaced for a host to act on, not enforced here.

use nah_model::{TrustInfo, TrustState, Warning, WarningKey};

/// Normalise an RFC3339 UTC offset suffix to `Z` so two equivalent
/// timestamps compare equal lexicographically (§4.8).
fn normalize_utc_suffix(ts: &str) -> String {
    if let Some(stripped) = ts.strip_suffix("+00:00") {
        format!("{stripped}Z")
    } else if let Some(stripped) = ts.strip_suffix("-00:00") {
        format!("{stripped}Z")
    } else {
        ts.to_string()
    }
}

pub fn evaluate_trust(trust: &TrustInfo, now: Option<&str>) -> Vec<Warning> {
    let mut warnings = Vec::new();

    let key = match trust.state {
        TrustState::Verified => None,
        TrustState::Unverified => Some(WarningKey::TrustStateUnverified),
        TrustState::Failed => Some(WarningKey::TrustStateFailed),
        TrustState::Unknown => Some(WarningKey::TrustStateUnknown),
    };
    if let Some(key) = key {
        warnings.push(Warning::new(key));
    }

    if let (Some(expires_at), Some(now)) = (&trust.expires_at, now) {
        let expires_norm = normalize_utc_suffix(expires_at);
        let now_norm = normalize_utc_suffix(now);
        if now_norm > expires_norm {
            warnings.push(Warning::new(WarningKey::TrustStateStale));
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verified_trust_raises_no_warning() {
        let trust = TrustInfo {
            state: TrustState::Verified,
            ..Default::default()
        };
        assert!(evaluate_trust(&trust, None).is_empty());
    }

    #[test]
    fn unverified_trust_raises_its_matching_warning() {
        let trust = TrustInfo {
            state: TrustState::Unverified,
            ..Default::default()
        };
        let warnings = evaluate_trust(&trust, None);
        assert_eq!(warnings[0].key, WarningKey::TrustStateUnverified);
    }

    #[test]
    fn expired_trust_raises_stale_even_when_state_is_verified() {
        let trust = TrustInfo {
            state: TrustState::Verified,
            expires_at: Some("2025-01-01T00:00:00Z".to_string()),
            ..Default::default()
        };
        let warnings = evaluate_trust(&trust, Some("2026-01-01T00:00:00Z"));
        assert_eq!(warnings[0].key, WarningKey::TrustStateStale);
    }

    #[test]
    fn utc_offset_suffix_normalises_before_comparison() {
        let trust = TrustInfo {
            state: TrustState::Verified,
            expires_at: Some("2026-01-01T00:00:00+00:00".to_string()),
            ..Default::default()
        };
        assert!(evaluate_trust(&trust, Some("2026-01-01T00:00:00Z")).is_empty());
    }

    #[test]
    fn not_yet_expired_raises_no_staleness_warning() {
        let trust = TrustInfo {
            state: TrustState::Verified,
            expires_at: Some("2027-01-01T00:00:00Z".to_string()),
            ..Default::default()
        };
        assert!(evaluate_trust(&trust, Some("2026-01-01T00:00:00Z")).is_empty());
    }
}
