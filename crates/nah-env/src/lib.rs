//! Placeholder expansion (C3) and the environment algebra (C4).

mod algebra;
mod placeholder;
mod wrapper;

pub use algebra::{apply, apply_fill_only, EnvEntry, EnvOperation, Op};
pub use placeholder::{expand, ExpandError, Expansion};
pub use wrapper::{parse_command, quote_arg, render_wrapper_script, CommandParseError};
