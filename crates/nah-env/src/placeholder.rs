//! Single-pass `{NAME}` placeholder expansion with hard size/count ceilings.
//!
//! No recursion, no repeated expansion over substituted output — a cycle or
//! an unbounded expansion chain is structurally impossible here, by design
//! (see the "single-pass vs recursive" design note): callers MUST NOT
//! iterate this to a fixpoint.

use std::collections::HashMap;
use thiserror::Error;

const MAX_PLACEHOLDERS: usize = 128;
const MAX_OUTPUT_BYTES: usize = 65_536;

/// Why expansion was refused.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ExpandError {
    #[error("more than {MAX_PLACEHOLDERS} placeholders in one template")]
    PlaceholderLimit,
    #[error("expansion exceeded {MAX_OUTPUT_BYTES} bytes")]
    ExpansionOverflow,
}

/// The result of a successful expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    pub output: String,
    /// `{NAME}` tokens that had no entry in the environment map (substituted
    /// with the empty string); the composer turns each into a
    /// `missing_env_var` warning.
    pub missing: Vec<String>,
}

/// Expand every `{NAME}` token in `template` against `env` in one linear
/// scan. Unknown names expand to the empty string and are reported in
/// [`Expansion::missing`]. A `{` with no matching `}` (or containing a
/// nested `{`) is copied through literally rather than treated as a token.
pub fn expand(template: &str, env: &HashMap<String, String>) -> Result<Expansion, ExpandError> {
    let chars: Vec<char> = template.chars().collect();
    let mut output = String::new();
    let mut missing = Vec::new();
    let mut placeholder_count = 0usize;

    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '{' {
            if let Some(rel) = chars[i + 1..].iter().position(|&c| c == '}') {
                let name: String = chars[i + 1..i + 1 + rel].iter().collect();
                if !name.contains('{') {
                    placeholder_count += 1;
                    if placeholder_count > MAX_PLACEHOLDERS {
                        return Err(ExpandError::PlaceholderLimit);
                    }
                    match env.get(name.as_str()) {
                        Some(value) => output.push_str(value),
                        None => missing.push(name),
                    }
                    if output.len() > MAX_OUTPUT_BYTES {
                        return Err(ExpandError::ExpansionOverflow);
                    }
                    i += rel + 2;
                    continue;
                }
            }
            output.push('{');
            i += 1;
        } else {
            output.push(chars[i]);
            i += 1;
        }
        if output.len() > MAX_OUTPUT_BYTES {
            return Err(ExpandError::ExpansionOverflow);
        }
    }

    Ok(Expansion { output, missing })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn literal_without_tokens_is_unchanged() {
        let e = env(&[]);
        let result = expand("no placeholders here", &e).unwrap();
        assert_eq!(result.output, "no placeholders here");
        assert!(result.missing.is_empty());
    }

    #[test]
    fn substitutes_known_names() {
        let e = env(&[("NAH_APP_ID", "com.example.game")]);
        let result = expand("id={NAH_APP_ID}!", &e).unwrap();
        assert_eq!(result.output, "id=com.example.game!");
        assert!(result.missing.is_empty());
    }

    #[test]
    fn unknown_name_expands_empty_and_is_reported_missing() {
        let e = env(&[]);
        let result = expand("x={MISSING}y", &e).unwrap();
        assert_eq!(result.output, "x=y");
        assert_eq!(result.missing, vec!["MISSING".to_string()]);
    }

    #[test]
    fn does_not_recurse_into_substituted_output() {
        // the substituted value itself contains a brace token; it must not
        // be expanded again.
        let e = env(&[("A", "{B}"), ("B", "oops")]);
        let result = expand("{A}", &e).unwrap();
        assert_eq!(result.output, "{B}");
    }

    #[test]
    fn unmatched_brace_is_copied_through() {
        let e = env(&[]);
        let result = expand("foo { bar", &e).unwrap();
        assert_eq!(result.output, "foo { bar");
    }

    #[test]
    fn placeholder_count_limit() {
        let mut pairs = Vec::new();
        for i in 0..200 {
            pairs.push((format!("V{i}"), "x".to_string()));
        }
        let e: HashMap<String, String> = pairs.into_iter().collect();
        let template: String = (0..200).map(|i| format!("{{V{i}}}")).collect();
        assert_eq!(expand(&template, &e), Err(ExpandError::PlaceholderLimit));
    }

    #[test]
    fn within_placeholder_limit_succeeds() {
        let mut pairs = Vec::new();
        for i in 0..128 {
            pairs.push((format!("V{i}"), "x".to_string()));
        }
        let e: HashMap<String, String> = pairs.into_iter().collect();
        let template: String = (0..128).map(|i| format!("{{V{i}}}")).collect();
        assert!(expand(&template, &e).is_ok());
    }

    #[test]
    fn output_size_limit() {
        let mut e = HashMap::new();
        e.insert("BIG".to_string(), "x".repeat(70_000));
        assert_eq!(expand("{BIG}", &e), Err(ExpandError::ExpansionOverflow));
    }
}
