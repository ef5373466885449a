//! C11 — deterministic tar+gzip packaging and path-traversal-safe
//! extraction, built for byte-for-byte determinism and defense against a
//! hostile archive rather than installer convenience.
//!
//! Packing fixes every per-entry metadata field the POSIX ustar format
//! allows to vary (`mtime`, `uid`, `gid`, `uname`, `gname`) so that two
//! packs of identical file content produce identical bytes regardless of
//! when or on what host they ran. Symlinks and hardlinks are refused at
//! pack time; extraction refuses them too, plus any entry whose path would
//! land outside the destination root.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use flate2::{read::GzDecoder, write::GzEncoder, Compression, GzBuilder};
use sha2::{Digest, Sha256};
use tar::{Builder, EntryType, Header};
use thiserror::Error;

const FILE_MODE: u32 = 0o644;
const DIR_MODE: u32 = 0o755;
const EXEC_MODE: u32 = 0o755;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("symlinks are not permitted in a packed archive: {0}")]
    SymlinkNotAllowed(String),
    #[error("hardlinks are not permitted in a packed archive: {0}")]
    HardlinkNotAllowed(String),
    #[error("archive entry has an unsupported type: {0}")]
    UnsupportedEntryType(String),
    #[error("archive entry path escapes the extraction root: {0}")]
    PathTraversal(String),
    #[error("archive entry path must not be absolute: {0}")]
    AbsolutePath(String),
    #[error("archive hash mismatch: expected {expected}, got {actual}")]
    HashMismatch { expected: String, actual: String },
    #[error("tar header error: {0}")]
    Header(String),
}

/// The result of a successful pack: the gzip-compressed tar bytes plus the
/// SHA-256 recorded over them (§4.11's `provenance.package_hash`).
pub struct PackedArchive {
    pub bytes: Vec<u8>,
    pub sha256: String,
}

enum EntryKind {
    Dir,
    File { executable: bool, size: u64 },
}

struct PackEntry {
    archive_path: String,
    fs_path: PathBuf,
    kind: EntryKind,
}

/// Pack every file and directory under `source_dir` into a deterministic
/// gzip-compressed ustar archive. Entries are sorted lexicographically by
/// path so a directory always precedes anything nested under it.
pub fn pack_dir(source_dir: &Path) -> Result<PackedArchive, ArchiveError> {
    let mut entries = collect_entries(source_dir)?;
    entries.sort_by(|a, b| a.archive_path.cmp(&b.archive_path));

    let mut tar_bytes = Vec::new();
    {
        let mut builder = Builder::new(&mut tar_bytes);
        for entry in &entries {
            match &entry.kind {
                EntryKind::Dir => append_dir(&mut builder, &entry.archive_path)?,
                EntryKind::File { executable, size } => {
                    append_file(&mut builder, &entry.archive_path, &entry.fs_path, *executable, *size)?
                }
            }
        }
        builder.finish()?;
    }

    let mut gz_bytes = Vec::new();
    {
        let mut encoder: GzEncoder<&mut Vec<u8>> = GzBuilder::new()
            .mtime(0)
            .operating_system(255)
            .write(&mut gz_bytes, Compression::default());
        encoder.write_all(&tar_bytes)?;
        encoder.finish()?;
    }

    let sha256 = sha256_hex(&gz_bytes);
    Ok(PackedArchive { bytes: gz_bytes, sha256 })
}

fn collect_entries(source_dir: &Path) -> Result<Vec<PackEntry>, ArchiveError> {
    let mut entries = Vec::new();
    for walk_entry in walkdir::WalkDir::new(source_dir).min_depth(1).follow_links(false) {
        let walk_entry =
            walk_entry.map_err(|e| ArchiveError::Io(io::Error::new(io::ErrorKind::Other, e)))?;
        let path = walk_entry.path();
        let rel = path
            .strip_prefix(source_dir)
            .expect("walkdir yields children of source_dir");
        let archive_path = nah_path::normalize_separators(&rel.to_string_lossy());

        let meta = fs::symlink_metadata(path)?;
        if meta.file_type().is_symlink() {
            return Err(ArchiveError::SymlinkNotAllowed(archive_path));
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::MetadataExt;
            if meta.is_file() && meta.nlink() > 1 {
                return Err(ArchiveError::HardlinkNotAllowed(archive_path));
            }
        }

        if meta.is_dir() {
            entries.push(PackEntry {
                archive_path,
                fs_path: path.to_path_buf(),
                kind: EntryKind::Dir,
            });
        } else if meta.is_file() {
            entries.push(PackEntry {
                archive_path,
                fs_path: path.to_path_buf(),
                kind: EntryKind::File {
                    executable: is_executable(&meta),
                    size: meta.len(),
                },
            });
        } else {
            return Err(ArchiveError::UnsupportedEntryType(archive_path));
        }
    }
    Ok(entries)
}

#[cfg(unix)]
fn is_executable(meta: &fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_meta: &fs::Metadata) -> bool {
    false
}

fn bare_header(entry_type: EntryType, mode: u32, size: u64) -> Result<Header, ArchiveError> {
    let mut header = Header::new_ustar();
    header.set_entry_type(entry_type);
    header.set_mode(mode);
    header.set_size(size);
    header.set_uid(0);
    header.set_gid(0);
    header.set_mtime(0);
    header
        .set_username("")
        .map_err(|e| ArchiveError::Header(e.to_string()))?;
    header
        .set_groupname("")
        .map_err(|e| ArchiveError::Header(e.to_string()))?;
    Ok(header)
}

fn append_dir<W: Write>(builder: &mut Builder<W>, archive_path: &str) -> Result<(), ArchiveError> {
    let mut header = bare_header(EntryType::Directory, DIR_MODE, 0)?;
    header
        .set_path(format!("{archive_path}/"))
        .map_err(|e| ArchiveError::Header(e.to_string()))?;
    header.set_cksum();
    builder.append(&header, io::empty())?;
    Ok(())
}

fn append_file<W: Write>(
    builder: &mut Builder<W>,
    archive_path: &str,
    fs_path: &Path,
    executable: bool,
    size: u64,
) -> Result<(), ArchiveError> {
    let mode = if executable { EXEC_MODE } else { FILE_MODE };
    let mut header = bare_header(EntryType::Regular, mode, size)?;
    header
        .set_path(archive_path)
        .map_err(|e| ArchiveError::Header(e.to_string()))?;
    header.set_cksum();
    let file = fs::File::open(fs_path)?;
    builder.append(&header, file)?;
    Ok(())
}

/// Extract a gzip-compressed tar archive into `dest_root`, refusing any
/// entry that is absolute, contains a `..` component, resolves outside the
/// destination, or is not a regular file or directory. Extraction happens
/// into a staging directory first; on any violation the staging directory
/// is dropped (and with it, removed from disk) and `dest_root` is left
/// untouched. On success the staging directory is renamed into place.
pub fn extract_archive(archive_bytes: &[u8], dest_root: &Path) -> Result<Vec<PathBuf>, ArchiveError> {
    let staging_parent = dest_root.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(staging_parent)?;
    let staging = tempfile::Builder::new()
        .prefix(".nah-archive-staging-")
        .tempdir_in(staging_parent)?;

    let mut extracted = Vec::new();
    {
        let decoder = GzDecoder::new(archive_bytes);
        let mut archive = tar::Archive::new(decoder);
        for raw_entry in archive.entries()? {
            let mut entry = raw_entry?;
            let entry_type = entry.header().entry_type();
            let raw_path = entry.path()?.into_owned();
            let archive_path = nah_path::normalize_separators(&raw_path.to_string_lossy());

            if nah_path::is_absolute(&archive_path) {
                return Err(ArchiveError::AbsolutePath(archive_path));
            }
            if archive_path.split('/').any(|component| component == "..") {
                return Err(ArchiveError::PathTraversal(archive_path));
            }

            match entry_type {
                EntryType::Directory | EntryType::Regular => {}
                EntryType::Symlink => return Err(ArchiveError::SymlinkNotAllowed(archive_path)),
                EntryType::Link => return Err(ArchiveError::HardlinkNotAllowed(archive_path)),
                other => {
                    return Err(ArchiveError::UnsupportedEntryType(format!(
                        "{other:?} at {archive_path}"
                    )))
                }
            }

            let target = staging.path().join(&archive_path);
            if nah_path::escapes_root(
                &staging.path().to_string_lossy(),
                &target.to_string_lossy(),
            ) {
                return Err(ArchiveError::PathTraversal(archive_path));
            }

            if entry_type == EntryType::Directory {
                fs::create_dir_all(&target)?;
            } else {
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent)?;
                }
                entry.unpack(&target)?;
                extracted.push(target);
            }
        }
    }

    if dest_root.exists() {
        fs::remove_dir_all(dest_root)?;
    }
    fs::rename(staging.path(), dest_root)?;
    // `staging` has been moved from; let it drop without trying to clean up
    // a path that no longer belongs to it.
    std::mem::forget(staging);

    Ok(extracted)
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// Verify `archive_bytes` hash against an expected lowercase hex SHA-256,
/// as carried in a source URL's `#sha256=<64hex>` fragment (§4.11).
pub fn verify_sha256(archive_bytes: &[u8], expected_hex: &str) -> Result<(), ArchiveError> {
    let actual = sha256_hex(archive_bytes);
    if actual.eq_ignore_ascii_case(expected_hex) {
        Ok(())
    } else {
        Err(ArchiveError::HashMismatch {
            expected: expected_hex.to_string(),
            actual,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn write_tree(root: &Path) {
        fs::create_dir_all(root.join("bin")).unwrap();
        fs::write(root.join("bin/lua"), b"#!/fake/interpreter\n").unwrap();
        fs::create_dir_all(root.join("lib")).unwrap();
        fs::write(root.join("lib/liblua.so"), b"binary-content").unwrap();
        fs::write(root.join("nak.json"), b"{}").unwrap();

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(root.join("bin/lua"), fs::Permissions::from_mode(0o755)).unwrap();
        }
    }

    #[test]
    fn pack_then_extract_round_trips_file_contents() {
        let src = tempdir().unwrap();
        write_tree(src.path());

        let packed = pack_dir(src.path()).unwrap();
        assert!(!packed.bytes.is_empty());

        let dest = tempdir().unwrap();
        let dest_root = dest.path().join("out");
        let extracted = extract_archive(&packed.bytes, &dest_root).unwrap();
        assert_eq!(extracted.len(), 3);

        let mut content = String::new();
        fs::File::open(dest_root.join("nak.json"))
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "{}");
        assert_eq!(
            fs::read(dest_root.join("lib/liblua.so")).unwrap(),
            b"binary-content"
        );
    }

    #[cfg(unix)]
    #[test]
    fn executable_bit_survives_round_trip() {
        use std::os::unix::fs::PermissionsExt;

        let src = tempdir().unwrap();
        write_tree(src.path());
        let packed = pack_dir(src.path()).unwrap();

        let dest = tempdir().unwrap();
        let dest_root = dest.path().join("out");
        extract_archive(&packed.bytes, &dest_root).unwrap();

        let mode = fs::metadata(dest_root.join("bin/lua")).unwrap().permissions().mode();
        assert_eq!(mode & 0o111, 0o111);
    }

    #[test]
    fn packing_is_byte_identical_across_runs() {
        let src = tempdir().unwrap();
        write_tree(src.path());

        let first = pack_dir(src.path()).unwrap();
        let second = pack_dir(src.path()).unwrap();
        assert_eq!(first.bytes, second.bytes);
        assert_eq!(first.sha256, second.sha256);
    }

    #[cfg(unix)]
    #[test]
    fn packing_rejects_symlinks() {
        let src = tempdir().unwrap();
        write_tree(src.path());
        std::os::unix::fs::symlink(src.path().join("nak.json"), src.path().join("link")).unwrap();

        let err = pack_dir(src.path()).unwrap_err();
        assert!(matches!(err, ArchiveError::SymlinkNotAllowed(_)));
    }

    #[test]
    fn hash_verification_detects_tampering() {
        let src = tempdir().unwrap();
        write_tree(src.path());
        let packed = pack_dir(src.path()).unwrap();

        assert!(verify_sha256(&packed.bytes, &packed.sha256).is_ok());
        assert!(matches!(
            verify_sha256(&packed.bytes, "0000000000000000000000000000000000000000000000000000000000000000"),
            Err(ArchiveError::HashMismatch { .. })
        ));
    }

    fn build_malicious_archive(path_in_archive: &str) -> Vec<u8> {
        let mut tar_bytes = Vec::new();
        {
            let mut builder = Builder::new(&mut tar_bytes);
            let mut header = Header::new_ustar();
            header.set_entry_type(EntryType::Regular);
            header.set_size(4);
            header.set_mode(0o644);
            header.set_cksum();
            // bypass path validation `Header::set_path` would apply, by
            // writing the raw header bytes directly.
            let path_bytes = path_in_archive.as_bytes();
            header.as_mut_bytes()[0..path_bytes.len()].copy_from_slice(path_bytes);
            header.set_cksum();
            builder.append(&header, &b"evil"[..]).unwrap();
            builder.finish().unwrap();
        }
        let mut gz_bytes = Vec::new();
        {
            let mut encoder = GzBuilder::new().write(&mut gz_bytes, Compression::default());
            encoder.write_all(&tar_bytes).unwrap();
            encoder.finish().unwrap();
        }
        gz_bytes
    }

    #[test]
    fn extraction_rejects_absolute_paths() {
        let archive = build_malicious_archive("/etc/passwd");
        let dest = tempdir().unwrap();
        let err = extract_archive(&archive, &dest.path().join("out")).unwrap_err();
        assert!(matches!(err, ArchiveError::AbsolutePath(_)));
    }

    #[test]
    fn extraction_rejects_dotdot_traversal() {
        let archive = build_malicious_archive("../../outside.txt");
        let dest = tempdir().unwrap();
        let err = extract_archive(&archive, &dest.path().join("out")).unwrap_err();
        assert!(matches!(err, ArchiveError::PathTraversal(_)));
    }

    #[test]
    fn failed_extraction_leaves_no_staging_directory_behind() {
        let archive = build_malicious_archive("/etc/passwd");
        let dest = tempdir().unwrap();
        let dest_root = dest.path().join("out");
        let _ = extract_archive(&archive, &dest_root);

        let leftovers: Vec<_> = fs::read_dir(dest.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .collect();
        assert!(leftovers.is_empty());
    }
}
