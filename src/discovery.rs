//! Turning search-path roots into distributions.
//!
//! Every root is probed for a definition file (which makes the root itself a
//! [`FileDistribution`]) and scanned for installed package metadata. The
//! registry reaches the filesystem only through [`RootScanner`], so a
//! different scanner can stand in for it.

use crate::distribution::package::is_metadata_dir;
use crate::distribution::{Distribution, FileDistribution, PackageDistribution};
use crate::modelfile;
use crate::warning::{ScanWarning, record_warning};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Source of distributions for one search-path root.
pub trait RootScanner: Send {
    /// Distributions contributed by `root`, highest priority first.
    ///
    /// Must not fail: problems are reported through `warnings` and the
    /// offending contributor is left out.
    fn scan(&self, root: &str, warnings: &mut Vec<ScanWarning>) -> Vec<Arc<Distribution>>;
}

#[derive(Debug, Clone)]
/// Filesystem scanner resolving relative roots against `base_dir`.
pub struct FsScanner {
    base_dir: PathBuf,
}

impl FsScanner {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    fn resolve(&self, root: &str) -> PathBuf {
        let root = Path::new(root);
        if root.is_absolute() {
            root.to_path_buf()
        } else {
            self.base_dir.join(root)
        }
    }
}

impl RootScanner for FsScanner {
    fn scan(&self, root: &str, warnings: &mut Vec<ScanWarning>) -> Vec<Arc<Distribution>> {
        let dir = self.resolve(root);
        let mut dists = Vec::new();
        if let Some(dist) = probe(&dir, &self.base_dir, warnings) {
            dists.push(Arc::new(Distribution::File(dist)));
        }
        dists.extend(
            find_packages(&dir, warnings)
                .into_iter()
                .map(|dist| Arc::new(Distribution::Package(dist))),
        );
        tracing::debug!(root, dir = %dir.display(), distributions = dists.len(), "scanned root");
        dists
    }
}

/// Build a file distribution for `directory` when it holds a definition file.
///
/// Directories without one are not contributors and yield `None` silently.
/// A definition file that cannot be read or parsed also yields `None`, with
/// a warning.
pub fn probe(
    directory: &Path,
    base_dir: &Path,
    warnings: &mut Vec<ScanWarning>,
) -> Option<FileDistribution> {
    if !directory.is_dir() {
        return None;
    }
    let src = match modelfile::find_in_dir(directory) {
        Ok(Some(src)) => src,
        Ok(None) => return None,
        Err(err) => {
            record_warning(
                warnings,
                directory,
                format!("unable to list '{}': {err}", directory.display()),
            );
            return None;
        }
    };
    match modelfile::load_file(&src) {
        Ok(loaded) => Some(FileDistribution::new(loaded, base_dir)),
        Err(err) => {
            record_warning(
                warnings,
                &src,
                format!("unable to load model from '{}': {err}", directory.display()),
            );
            None
        }
    }
}

/// Installed packages directly under `root`, sorted by metadata directory.
///
/// A missing root contributes nothing and is not worth a warning.
pub fn find_packages(root: &Path, warnings: &mut Vec<ScanWarning>) -> Vec<PackageDistribution> {
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(err) if err.kind() == ErrorKind::NotFound => return Vec::new(),
        Err(err) => {
            if root.is_dir() {
                record_warning(
                    warnings,
                    root,
                    format!("unable to scan '{}' for packages: {err}", root.display()),
                );
            }
            return Vec::new();
        }
    };

    let mut metadata_dirs: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| is_metadata_dir(path))
        .collect();
    metadata_dirs.sort();

    metadata_dirs
        .iter()
        .filter_map(|meta| PackageDistribution::from_metadata_dir(root, meta))
        .collect()
}
