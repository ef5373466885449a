//! Shell word parsing/quoting and wrapper script rendering for a composed
//! Launch Contract's `execution.*` fields. A host that wants a shell script
//! instead of driving `std::process::Command` itself can render one from
//! an already-composed binary path, argv, cwd, and environment map.

use std::collections::BTreeMap;

use thiserror::Error;

/// A shell command string could not be parsed into argv form.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("failed to parse shell command: {0}")]
pub struct CommandParseError(String);

/// Parse a shell command string into individual arguments.
pub fn parse_command(cmd: &str) -> Result<Vec<String>, CommandParseError> {
    shell_words::split(cmd).map_err(|e| CommandParseError(e.to_string()))
}

/// Quote a single argument for safe shell usage.
pub fn quote_arg(arg: &str) -> String {
    shell_words::quote(arg).into_owned()
}

/// Render a POSIX `sh` wrapper script that `cd`s into `cwd`, exports every
/// entry of `env` (sorted for determinism), and execs `binary` with `args`.
pub fn render_wrapper_script(
    binary: &str,
    args: &[String],
    cwd: &str,
    env: &BTreeMap<String, String>,
) -> String {
    let mut script = String::from("#!/bin/sh\nset -e\n");
    for (key, value) in env {
        script.push_str("export ");
        script.push_str(key);
        script.push('=');
        script.push_str(&quote_arg(value));
        script.push('\n');
    }
    script.push_str("cd ");
    script.push_str(&quote_arg(cwd));
    script.push('\n');
    script.push_str("exec ");
    script.push_str(&quote_arg(binary));
    for arg in args {
        script.push(' ');
        script.push_str(&quote_arg(arg));
    }
    script.push('\n');
    script
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_splits_on_whitespace_and_honors_quotes() {
        let words = parse_command("echo 'hello world' --flag").unwrap();
        assert_eq!(words, vec!["echo", "hello world", "--flag"]);
    }

    #[test]
    fn quote_wraps_arguments_containing_spaces() {
        assert_eq!(quote_arg("hello"), "hello");
        assert_eq!(quote_arg("hello world"), "'hello world'");
    }

    #[test]
    fn wrapper_script_exports_env_in_sorted_order_then_execs() {
        let mut env = BTreeMap::new();
        env.insert("B".to_string(), "2".to_string());
        env.insert("A".to_string(), "1".to_string());
        let script = render_wrapper_script(
            "/apps/game/bin/run",
            &["--headless".to_string()],
            "/apps/game",
            &env,
        );
        let a_pos = script.find("export A=1").unwrap();
        let b_pos = script.find("export B=2").unwrap();
        assert!(a_pos < b_pos);
        assert!(script.ends_with("exec /apps/game/bin/run --headless\n"));
    }

    #[test]
    fn wrapper_script_quotes_values_containing_spaces() {
        let mut env = BTreeMap::new();
        env.insert("GREETING".to_string(), "hello world".to_string());
        let script = render_wrapper_script("/bin/run", &[], "/apps/game", &env);
        assert!(script.contains("export GREETING='hello world'"));
    }
}
