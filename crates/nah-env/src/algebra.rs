//! The `set`/`prepend`/`append`/`unset` environment algebra applied against
//! an accumulating environment map, Rez-style but with an explicit
//! per-value separator instead of a single global one.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

fn default_separator() -> String {
    ":".to_string()
}

/// The operation an environment entry performs when applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Op {
    Set,
    Prepend,
    Append,
    Unset,
}

/// One environment write: an operation, its value, and the separator used
/// for `prepend`/`append`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvOperation {
    pub op: Op,
    #[serde(default)]
    pub value: String,
    #[serde(default = "default_separator")]
    pub separator: String,
}

impl EnvOperation {
    pub fn set(value: impl Into<String>) -> Self {
        Self {
            op: Op::Set,
            value: value.into(),
            separator: default_separator(),
        }
    }

    pub fn prepend(value: impl Into<String>, separator: impl Into<String>) -> Self {
        Self {
            op: Op::Prepend,
            value: value.into(),
            separator: separator.into(),
        }
    }

    pub fn append(value: impl Into<String>, separator: impl Into<String>) -> Self {
        Self {
            op: Op::Append,
            value: value.into(),
            separator: separator.into(),
        }
    }

    pub fn unset() -> Self {
        Self {
            op: Op::Unset,
            value: String::new(),
            separator: default_separator(),
        }
    }
}

/// An environment entry as it appears in source data: either a bare string
/// literal (implying `{op: set, value: s}`) or a fully-specified operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnvEntry {
    Literal(String),
    Operation(EnvOperation),
}

impl EnvEntry {
    pub fn into_operation(self) -> EnvOperation {
        match self {
            EnvEntry::Literal(s) => EnvOperation::set(s),
            EnvEntry::Operation(op) => op,
        }
    }
}

/// Apply one operation to `key` in the accumulating map `env`.
pub fn apply(env: &mut HashMap<String, String>, key: &str, entry: &EnvOperation) {
    match entry.op {
        Op::Set => {
            env.insert(key.to_string(), entry.value.clone());
        }
        Op::Prepend => {
            let current = env.get(key).cloned().unwrap_or_default();
            if current.is_empty() {
                env.insert(key.to_string(), entry.value.clone());
            } else {
                env.insert(
                    key.to_string(),
                    format!("{}{}{}", entry.value, entry.separator, current),
                );
            }
        }
        Op::Append => {
            let current = env.get(key).cloned().unwrap_or_default();
            if current.is_empty() {
                env.insert(key.to_string(), entry.value.clone());
            } else {
                env.insert(
                    key.to_string(),
                    format!("{}{}{}", current, entry.separator, entry.value),
                );
            }
        }
        Op::Unset => {
            env.remove(key);
        }
    }
}

/// Apply an operation only if `key` is not already present — the manifest
/// layer's fill-only semantics.
pub fn apply_fill_only(env: &mut HashMap<String, String>, key: &str, entry: &EnvOperation) {
    if !env.contains_key(key) {
        apply(env, key, entry);
    }
}
