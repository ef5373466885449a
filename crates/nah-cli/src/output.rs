//! Output rendering: text for humans, JSON for scripts.

use serde::Serialize;

pub trait CommandOutput: Serialize {
    fn render_text(&self) -> String;
}

pub fn render<T: CommandOutput>(value: &T, json: bool) -> String {
    if json {
        serde_json::to_string_pretty(value)
            .unwrap_or_else(|e| format!("{{\"render_error\":\"{e}\"}}"))
    } else {
        value.render_text()
    }
}
