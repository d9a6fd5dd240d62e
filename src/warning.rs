//! Recoverable discovery problems.
//!
//! A bad definition file or a package with unreadable metadata must not hide
//! every other contributor, so these failures are logged and collected
//! rather than returned. The registry keeps the warnings from its latest
//! rebuild for callers (and tests) to inspect.

use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
/// One recovered failure and the file or directory it concerns.
pub struct ScanWarning {
    pub source: PathBuf,
    pub message: String,
}

impl fmt::Display for ScanWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Log a warning through `tracing` and append it to `acc`.
pub(crate) fn record_warning(acc: &mut Vec<ScanWarning>, source: &Path, message: String) {
    tracing::warn!(source = %source.display(), "{message}");
    acc.push(ScanWarning {
        source: source.to_path_buf(),
        message,
    });
}
