//! The composition engine: C6 through C9 plus the top-level C8 state
//! machine that drives them. [`compose`] is the crate's single entry
//! point — everything else here is a stage it calls in order.

mod binder;
mod capabilities;
mod composer;
mod environment;
mod loader;
mod options;
mod overrides;
mod platform;
mod resolver;
mod trust;

pub use binder::{bind_paths, BoundPaths};
pub use capabilities::derive_capability_usage;
pub use composer::{compose, library_separator};
pub use environment::{compose_environment, StandardVars};
pub use loader::{assemble_arguments, resolve_cwd, select_loader, LoaderSelection};
pub use options::{CompositionOptions, CompositionResult};
pub use overrides::apply_overrides;
pub use platform::{library_path_env_key, library_path_separator};
pub use resolver::{resolve_runtime, RuntimeResolution};
pub use trust::evaluate_trust;
