//! SemVer 2.0.0 version parsing and range satisfaction.
//!
//! Used by the install-time NAK selector ([`Range::select_highest`]) and by
//! the app declaration's `nak_version_req` to pick and pin a runtime.

mod range;
mod version;

pub use range::{satisfies, Range};
pub use version::{Identifier, Version};
