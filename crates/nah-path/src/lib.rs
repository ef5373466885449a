//! Path kernel: pure string operations over forward-slash-normalised paths.
//!
//! Nothing here touches the filesystem. All stored and serialised paths in
//! the rest of the workspace use the canonical forward-slash form produced
//! by [`normalize_separators`].

use thiserror::Error;

/// Errors raised by the path kernel.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    /// A path contained a NUL byte — a hard rejection, never recoverable.
    #[error("path contains a NUL byte: {0:?}")]
    NulByte(String),
}

/// Reject any path containing a NUL byte.
pub fn check_nul(path: &str) -> Result<(), PathError> {
    if path.contains('\0') {
        Err(PathError::NulByte(path.to_string()))
    } else {
        Ok(())
    }
}

/// Is `p` absolute on the current target's path convention.
///
/// Non-Windows: starts with `/`. Windows: a drive letter (`C:\` / `C:/`) or
/// a UNC prefix (`\\` / `//`).
pub fn is_absolute(p: &str) -> bool {
    if cfg!(windows) {
        is_windows_absolute(p)
    } else {
        p.starts_with('/')
    }
}

fn is_windows_absolute(p: &str) -> bool {
    let bytes = p.as_bytes();
    if bytes.len() >= 2 && bytes[1] == b':' && bytes[0].is_ascii_alphabetic() {
        return matches!(bytes.get(2), Some(b'\\') | Some(b'/')) || bytes.len() == 2;
    }
    p.starts_with("\\\\") || p.starts_with("//")
}

/// Replace backslashes with forward slashes, producing the canonical stored form.
pub fn normalize_separators(p: &str) -> String {
    p.replace('\\', "/")
}

/// Join `base` and `rel` with a single separator, preserving forward-slash form.
pub fn join(base: &str, rel: &str) -> String {
    let base = normalize_separators(base);
    let rel = normalize_separators(rel);
    let base_trimmed = base.trim_end_matches('/');
    let rel_trimmed = rel.trim_start_matches('/');
    if base_trimmed.is_empty() {
        format!("/{}", rel_trimmed)
    } else if rel_trimmed.is_empty() {
        base_trimmed.to_string()
    } else {
        format!("{}/{}", base_trimmed, rel_trimmed)
    }
}

/// Resolve `.`/`..` components of a normalised, slash-separated path into a
/// component stack. A leading `/` is preserved conceptually by the caller;
/// this only resolves the component list.
fn resolve_components(p: &str) -> Vec<&str> {
    let mut stack: Vec<&str> = Vec::new();
    for component in p.split('/') {
        match component {
            "" | "." => {}
            ".." => {
                stack.pop();
            }
            other => stack.push(other),
        }
    }
    stack
}

/// Does `candidate` escape `root` after normalisation and `.`/`..` resolution?
///
/// Rejects both explicit traversal (`..`) and prefix-spoofing (`/app` vs
/// `/application`): after matching the root's components, `candidate` must
/// either end there or continue with a further path component — never a
/// same-length prefix of a longer sibling name.
pub fn escapes_root(root: &str, candidate: &str) -> bool {
    let root_norm = normalize_separators(root);
    let candidate_norm = normalize_separators(candidate);

    let root_components = resolve_components(&root_norm);
    let candidate_components = resolve_components(&candidate_norm);

    if candidate_components.len() < root_components.len() {
        return true;
    }

    for (r, c) in root_components.iter().zip(candidate_components.iter()) {
        if r != c {
            return true;
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn nul_byte_is_rejected() {
        assert_eq!(
            check_nul("/app/main\0.lua"),
            Err(PathError::NulByte("/app/main\0.lua".to_string()))
        );
        assert!(check_nul("/app/main.lua").is_ok());
    }

    #[rstest]
    #[case("/usr/bin", true)]
    #[case("relative/bin", false)]
    #[case("", false)]
    fn absolute_detection_unix(#[case] input: &str, #[case] expected: bool) {
        if !cfg!(windows) {
            assert_eq!(is_absolute(input), expected);
        }
    }

    #[test]
    fn backslashes_normalise_to_forward_slashes() {
        assert_eq!(normalize_separators(r"C:\apps\game"), "C:/apps/game");
        assert_eq!(normalize_separators("already/fine"), "already/fine");
    }

    #[test]
    fn join_preserves_forward_slash_form() {
        assert_eq!(join("/apps/game", "main.lua"), "/apps/game/main.lua");
        assert_eq!(join("/apps/game/", "/main.lua"), "/apps/game/main.lua");
        assert_eq!(join("/apps/game", r"lib\x.so"), "/apps/game/lib/x.so");
    }

    #[test]
    fn containment_rejects_traversal() {
        assert!(escapes_root("/apps/game", "/apps/game/../../etc/passwd"));
        assert!(!escapes_root(
            "/apps/game",
            "/apps/game/sub/../main.lua"
        ));
    }

    #[test]
    fn containment_rejects_prefix_spoofing() {
        // "/app" must not be treated as containing "/application/x"
        assert!(escapes_root("/app", "/application/x"));
        assert!(!escapes_root("/app", "/app/x"));
        assert!(!escapes_root("/app", "/app"));
    }

    #[test]
    fn containment_accepts_exact_root() {
        assert!(!escapes_root("/apps/game", "/apps/game"));
    }

    #[test]
    fn containment_handles_dotdot_prefix_spoof() {
        // root "/apps/game", candidate that walks up and back into a sibling
        assert!(escapes_root("/apps/game", "/apps/game/../game2/x"));
    }
}
