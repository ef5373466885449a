//! Derives `capability_usage` from an app's declared `op:selector`
//! permission strings, flagging shapes the composer can't make sense of.
//! `enforcement.{filesystem,network}` in the contract is the raw
//! carry-through of these same strings (§6); this module produces the
//! deduplicated op-name summary a host's policy engine indexes on.

use nah_model::{CapabilityUsage, Permissions, Warning, WarningKey};

const KNOWN_FILESYSTEM_OPS: &[&str] = &["read", "write", "execute", "delete"];
const KNOWN_NETWORK_OPS: &[&str] = &["connect", "listen", "resolve"];

pub fn derive_capability_usage(permissions: &Permissions) -> (CapabilityUsage, Vec<Warning>) {
    let mut warnings = Vec::new();
    let filesystem_ops = collect_ops(
        &permissions.filesystem,
        KNOWN_FILESYSTEM_OPS,
        "filesystem",
        &mut warnings,
    );
    let network_ops = collect_ops(
        &permissions.network,
        KNOWN_NETWORK_OPS,
        "network",
        &mut warnings,
    );
    (
        CapabilityUsage {
            filesystem_ops,
            network_ops,
        },
        warnings,
    )
}

fn collect_ops(
    declared: &[String],
    known: &[&str],
    domain: &str,
    warnings: &mut Vec<Warning>,
) -> Vec<String> {
    let mut ops = Vec::new();
    for entry in declared {
        match entry.split_once(':') {
            None => {
                warnings.push(
                    Warning::new(WarningKey::CapabilityMalformed)
                        .with("domain", domain)
                        .with("value", entry.clone()),
                );
            }
            Some((op, _selector)) => {
                if !known.contains(&op) {
                    warnings.push(
                        Warning::new(WarningKey::CapabilityUnknown)
                            .with("domain", domain)
                            .with("op", op.to_string()),
                    );
                }
                if !ops.contains(&op.to_string()) {
                    ops.push(op.to_string());
                }
            }
        }
    }
    ops
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_formed_permissions_produce_no_warnings() {
        let permissions = Permissions {
            filesystem: vec!["read:/apps/game/**".to_string(), "write:/apps/game/save".to_string()],
            network: vec!["connect:*.example.com".to_string()],
        };
        let (usage, warnings) = derive_capability_usage(&permissions);
        assert!(warnings.is_empty());
        assert_eq!(usage.filesystem_ops, vec!["read".to_string(), "write".to_string()]);
        assert_eq!(usage.network_ops, vec!["connect".to_string()]);
    }

    #[test]
    fn missing_colon_is_malformed() {
        let permissions = Permissions {
            filesystem: vec!["readeverything".to_string()],
            network: Vec::new(),
        };
        let (_, warnings) = derive_capability_usage(&permissions);
        assert_eq!(warnings[0].key, WarningKey::CapabilityMalformed);
    }

    #[test]
    fn unrecognised_op_is_flagged_unknown() {
        let permissions = Permissions {
            filesystem: vec!["teleport:/anywhere".to_string()],
            network: Vec::new(),
        };
        let (_, warnings) = derive_capability_usage(&permissions);
        assert_eq!(warnings[0].key, WarningKey::CapabilityUnknown);
    }

    #[test]
    fn repeated_ops_deduplicate() {
        let permissions = Permissions {
            filesystem: vec!["read:/a".to_string(), "read:/b".to_string()],
            network: Vec::new(),
        };
        let (usage, _) = derive_capability_usage(&permissions);
        assert_eq!(usage.filesystem_ops, vec!["read".to_string()]);
    }
}
