//! C9 — override applicator: runs after a successful composition, merging
//! `NAH_OVERRIDE_ENVIRONMENT` into an already-produced contract under the
//! host's override policy. The core stays pure by taking the process
//! environment as an explicit parameter rather than reading it itself (§9).

use std::collections::HashMap;

use nah_model::{LaunchContract, OverridePolicy, Warning, WarningKey};

const OVERRIDE_VAR: &str = "NAH_OVERRIDE_ENVIRONMENT";

/// Apply `process_env[NAH_OVERRIDE_ENVIRONMENT]`, if present, to
/// `contract.environment` in place, subject to `policy`. Returns the
/// warnings raised; never touches library paths or arguments.
pub fn apply_overrides(
    contract: &mut LaunchContract,
    process_env: &HashMap<String, String>,
    policy: &OverridePolicy,
) -> Vec<Warning> {
    let mut warnings = Vec::new();

    let Some(raw) = process_env.get(OVERRIDE_VAR) else {
        return warnings;
    };

    let parsed: Result<HashMap<String, String>, _> = serde_json::from_str(raw);
    let overrides = match parsed {
        Ok(map) => map,
        Err(_) => {
            warnings.push(
                Warning::new(WarningKey::OverrideInvalid)
                    .with("target", OVERRIDE_VAR)
                    .with("reason", "parse_failure"),
            );
            return warnings;
        }
    };

    if !policy.allow_overrides {
        warnings.push(Warning::new(WarningKey::OverrideDenied).with("reason", "overrides_disabled"));
        return warnings;
    }

    for (key, value) in overrides {
        if policy.permits(&key) {
            contract.environment.insert(key, value);
        } else {
            warnings.push(
                Warning::new(WarningKey::OverrideDenied)
                    .with("reason", "key_not_allowed")
                    .with("target", key),
            );
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use nah_model::{
        CapabilityUsage, ContractApp, ContractEnforcement, ContractExecution, ContractNak,
        ResolvedExport, TrustInfo,
    };
    use std::collections::BTreeMap;

    fn contract() -> LaunchContract {
        LaunchContract {
            schema: "nah.launch_contract/v1".to_string(),
            app: ContractApp {
                id: "com.example.game".to_string(),
                version: "1.0.0".to_string(),
                root: "/apps/game".to_string(),
                entrypoint: "/apps/game/main.lua".to_string(),
            },
            nak: None::<ContractNak>,
            execution: ContractExecution {
                binary: "/apps/game/main.lua".to_string(),
                arguments: Vec::new(),
                cwd: "/apps/game".to_string(),
                library_path_env_key: "LD_LIBRARY_PATH".to_string(),
                library_paths: Vec::new(),
            },
            environment: {
                let mut e = BTreeMap::new();
                e.insert("LOG".to_string(), "info".to_string());
                e
            },
            enforcement: ContractEnforcement::default(),
            trust: TrustInfo::default(),
            exports: BTreeMap::<String, ResolvedExport>::new(),
            capability_usage: CapabilityUsage::default(),
        }
    }

    #[test]
    fn no_override_env_var_is_a_no_op() {
        let mut c = contract();
        let warnings = apply_overrides(&mut c, &HashMap::new(), &OverridePolicy::default());
        assert!(warnings.is_empty());
        assert_eq!(c.environment.get("LOG"), Some(&"info".to_string()));
    }

    #[test]
    fn invalid_json_is_reported_and_not_applied() {
        let mut process_env = HashMap::new();
        process_env.insert("NAH_OVERRIDE_ENVIRONMENT".to_string(), "not json".to_string());
        let mut c = contract();
        let warnings = apply_overrides(&mut c, &process_env, &OverridePolicy::default());
        assert_eq!(warnings[0].key, WarningKey::OverrideInvalid);
        assert_eq!(c.environment.get("LOG"), Some(&"info".to_string()));
    }

    #[test]
    fn disabled_policy_denies_everything() {
        let mut process_env = HashMap::new();
        process_env.insert(
            "NAH_OVERRIDE_ENVIRONMENT".to_string(),
            r#"{"LOG":"trace"}"#.to_string(),
        );
        let policy = OverridePolicy {
            allow_overrides: false,
            allowed_keys: Vec::new(),
        };
        let mut c = contract();
        let warnings = apply_overrides(&mut c, &process_env, &policy);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].key, WarningKey::OverrideDenied);
        assert_eq!(c.environment.get("LOG"), Some(&"info".to_string()));
    }

    #[test]
    fn scenario_s6_allowed_key_applies_disallowed_key_is_denied() {
        let mut process_env = HashMap::new();
        process_env.insert(
            "NAH_OVERRIDE_ENVIRONMENT".to_string(),
            r#"{"DEBUG":"1","LOG":"trace"}"#.to_string(),
        );
        let policy = OverridePolicy {
            allow_overrides: true,
            allowed_keys: vec!["DEBUG".to_string()],
        };
        let mut c = contract();
        let warnings = apply_overrides(&mut c, &process_env, &policy);
        assert_eq!(c.environment.get("DEBUG"), Some(&"1".to_string()));
        assert_eq!(c.environment.get("LOG"), Some(&"info".to_string()));
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].key, WarningKey::OverrideDenied);
        assert_eq!(warnings[0].fields.get("target"), Some(&"LOG".to_string()));
    }
}
