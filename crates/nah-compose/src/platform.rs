//! Platform-specific selections the contract embeds (§6): which
//! environment variable the dynamic linker searches, and what separator
//! joins its entries. Derived purely from `cfg!(target_os = ..)` — no other
//! compile-time state leaks into a contract, per invariant 4.

pub fn library_path_env_key() -> &'static str {
    if cfg!(target_os = "macos") {
        "DYLD_LIBRARY_PATH"
    } else if cfg!(windows) {
        "PATH"
    } else {
        "LD_LIBRARY_PATH"
    }
}

pub fn library_path_separator() -> &'static str {
    if cfg!(windows) {
        ";"
    } else {
        ":"
    }
}
