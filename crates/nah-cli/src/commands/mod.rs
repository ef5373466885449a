mod compose;
mod pack;
mod pin;
mod unpack;
mod validate;

use crate::cli::{Cli, Commands};

/// Route a parsed [`Cli`] to its command handler, returning the process
/// exit code (§6): `0` success, `1` fatal, `2` success with warnings.
pub fn dispatch(cli: &Cli) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::Compose {
            root,
            install_record,
            app,
            loader,
        } => compose::run(cli, root, install_record, app, loader.as_deref()),
        Commands::Validate { app, install_record } => {
            validate::run(cli, app.as_deref(), install_record.as_deref())
        }
        Commands::Pin {
            root,
            nak_id,
            version_req,
        } => pin::run(cli, root, nak_id, version_req),
        Commands::Pack { source, out } => pack::run(cli, source, out),
        Commands::Unpack {
            archive,
            dest,
            verify_hash,
        } => unpack::run(cli, archive, dest, verify_hash.as_deref()),
    }
}
