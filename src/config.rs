//! Environment-driven configuration for the process-wide registry.
//!
//! `MODELREG_PATH` seeds the search path using the platform's path-list
//! syntax (`:`-separated on Unix). `MODELREG_BASE_DIR` overrides the
//! directory relative roots and file project names are resolved against;
//! it defaults to the current working directory.

use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

pub const PATH_ENV: &str = "MODELREG_PATH";
pub const BASE_DIR_ENV: &str = "MODELREG_BASE_DIR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Initial search path, highest priority first.
    pub path: Vec<String>,
    pub base_dir: PathBuf,
}

impl RegistryConfig {
    pub fn from_env() -> Self {
        let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::from_vars(env::var_os(PATH_ENV), env::var_os(BASE_DIR_ENV), cwd)
    }

    /// Build a config from raw variable values; empty values count as unset.
    pub fn from_vars(path: Option<OsString>, base_dir: Option<OsString>, cwd: PathBuf) -> Self {
        let path = path
            .map(|raw| {
                env::split_paths(&raw)
                    .map(|entry| entry.to_string_lossy().into_owned())
                    .filter(|entry| !entry.trim().is_empty())
                    .collect()
            })
            .unwrap_or_default();
        let base_dir = base_dir
            .filter(|raw| !raw.is_empty())
            .map(PathBuf::from)
            .map(|dir| if dir.is_absolute() { dir } else { cwd.join(dir) })
            .unwrap_or(cwd);
        Self { path, base_dir }
    }
}
