//! Argument parsing. One subcommand per external operation NAH exposes:
//! composing a contract, validating records on their own, pinning a NAK
//! version at install time, and packing/unpacking archives.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "nah")]
#[command(about = "Launch contract composition engine for native applications")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging.
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Enable debug logging (implies target/level output).
    #[arg(long, global = true)]
    pub debug: bool,

    /// Emit machine-readable JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Record a decision trace alongside the result (compose only).
    #[arg(long, global = true)]
    pub trace: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compose a Launch Contract from an app declaration, install record,
    /// host environment, and runtime inventory.
    Compose {
        /// NAH root directory (holds `host/`, `registry/`, `naks/`).
        #[arg(long, default_value = ".")]
        root: PathBuf,
        /// Path to the app's install record.
        #[arg(long)]
        install_record: PathBuf,
        /// Path to the app declaration (`nap.json` or `nap.toml`).
        #[arg(long)]
        app: PathBuf,
        /// Force a specific loader by name, bypassing the install pin and
        /// the `default`/lone-loader fallbacks.
        #[arg(long)]
        loader: Option<String>,
    },

    /// Run the structural validators (C5) over an app declaration and/or
    /// install record, reporting every issue at once rather than the first.
    Validate {
        #[arg(long)]
        app: Option<PathBuf>,
        #[arg(long)]
        install_record: Option<PathBuf>,
    },

    /// Select the highest version of a nak satisfying a range against the
    /// runtime inventory (C10), the way an installer would pin one.
    Pin {
        /// NAH root directory (holds `registry/naks/`).
        #[arg(long, default_value = ".")]
        root: PathBuf,
        /// The nak id to select a version of.
        nak_id: String,
        /// A SemVer range string, e.g. `^5.4.0`.
        version_req: String,
    },

    /// Pack a directory into a deterministic gzip-compressed tar archive.
    Pack {
        /// Directory to pack.
        source: PathBuf,
        /// Where to write the archive.
        #[arg(long)]
        out: PathBuf,
    },

    /// Extract a packed archive, optionally verifying its hash first.
    Unpack {
        /// Archive to extract.
        archive: PathBuf,
        /// Destination directory.
        #[arg(long)]
        dest: PathBuf,
        /// Expected lowercase hex SHA-256 to verify before extracting.
        #[arg(long)]
        verify_hash: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compose_requires_app_and_install_record() {
        let cli = Cli::try_parse_from(["nah", "compose"]);
        assert!(cli.is_err());
    }

    #[test]
    fn compose_parses_with_defaulted_root() {
        let cli = Cli::try_parse_from([
            "nah",
            "compose",
            "--app",
            "nap.json",
            "--install-record",
            "install.json",
        ])
        .unwrap();
        match cli.command {
            Commands::Compose { root, app, install_record, loader } => {
                assert_eq!(root, PathBuf::from("."));
                assert_eq!(app, PathBuf::from("nap.json"));
                assert_eq!(install_record, PathBuf::from("install.json"));
                assert!(loader.is_none());
            }
            _ => panic!("expected Compose command"),
        }
    }

    #[test]
    fn pin_parses_positional_nak_id_and_version_req() {
        let cli = Cli::try_parse_from(["nah", "pin", "lua", "^5.4.0"]).unwrap();
        match cli.command {
            Commands::Pin { nak_id, version_req, .. } => {
                assert_eq!(nak_id, "lua");
                assert_eq!(version_req, "^5.4.0");
            }
            _ => panic!("expected Pin command"),
        }
    }

    #[test]
    fn global_flags_are_accepted_before_the_subcommand() {
        let cli = Cli::try_parse_from(["nah", "--json", "--trace", "pack", "src", "--out", "a.tar.gz"]).unwrap();
        assert!(cli.json);
        assert!(cli.trace);
    }
}
