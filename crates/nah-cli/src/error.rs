//! Human-mode failure rendering: `Error: <message>` plus a one-line hint,
//! and the three normative exit codes.

use nah_model::CriticalError;

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FATAL: i32 = 1;
pub const EXIT_WARNINGS: i32 = 2;

pub fn render_critical(err: &CriticalError) -> String {
    let hint = match err {
        CriticalError::ManifestMissing(_) => {
            "check that --app points at a valid nap.json or nap.toml"
        }
        CriticalError::InstallRecordInvalid(_) => {
            "check that the install record has instance_id and install_root set"
        }
        CriticalError::PathTraversal(_) => {
            "an entrypoint, library path, or asset export escaped its declared root"
        }
        CriticalError::EntrypointNotFound(_) => {
            "the app's entrypoint_path did not resolve under its install root"
        }
        CriticalError::NakLoaderInvalid(_) => {
            "run `nah validate` against the runtime descriptor to inspect its loaders"
        }
    };
    format!("Error: {err}\nhint: {hint}")
}
