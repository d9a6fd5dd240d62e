//! Installed-package distributions.
//!
//! A package is a `<name>-<version>.dist-info/` directory directly under a
//! search root. Its `RECORD` manifest lists installed files, one per line,
//! with the path relative to the search root as the first comma-separated
//! field. Models come from manifest entries whose basename is a recognized
//! definition file name.

use crate::error::{RegistryError, Result};
use crate::modelfile::{self, ModelDef, is_modelfile_name};
use crate::namespace::Namespace;
use crate::warning::{ScanWarning, record_warning};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

const METADATA_SUFFIX: &str = ".dist-info";
const RECORD: &str = "RECORD";
const METADATA: &str = "METADATA";

#[derive(Debug)]
/// Package metadata plus the model definitions found through its manifest.
pub struct PackageDistribution {
    project_name: String,
    version: String,
    location: PathBuf,
    metadata_dir: PathBuf,
    modeldefs: OnceLock<Vec<ModelDef>>,
}

impl PackageDistribution {
    /// Build a distribution from a `.dist-info` directory under `location`.
    ///
    /// Returns `None` when the directory name does not carry the metadata
    /// suffix. The project name comes from the `Name:` header in `METADATA`
    /// when readable, falling back to the directory name.
    pub fn from_metadata_dir(location: &Path, metadata_dir: &Path) -> Option<Self> {
        let dir_name = metadata_dir.file_name()?.to_str()?;
        let stem = dir_name.strip_suffix(METADATA_SUFFIX)?;
        let (dir_project, version) = match stem.split_once('-') {
            Some((name, version)) => (name, version),
            None => (stem, ""),
        };
        if dir_project.is_empty() {
            return None;
        }
        let project_name =
            metadata_project_name(metadata_dir).unwrap_or_else(|| dir_project.to_string());
        Some(Self {
            project_name,
            version: version.to_string(),
            location: location.to_path_buf(),
            metadata_dir: metadata_dir.to_path_buf(),
            modeldefs: OnceLock::new(),
        })
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Search root the manifest paths are relative to.
    pub fn location(&self) -> &Path {
        &self.location
    }

    /// Lines of the `RECORD` manifest.
    pub fn record_lines(&self) -> Result<Vec<String>> {
        let path = self.metadata_dir.join(RECORD);
        let data = fs::read_to_string(&path).map_err(|err| RegistryError::io(&path, err))?;
        Ok(data.lines().map(str::to_string).collect())
    }

    /// Model definitions contributed by this package, loaded on first use.
    ///
    /// Problems found while loading go to `warnings`; later calls reuse the
    /// cached result and report nothing.
    pub fn modeldefs(&self, warnings: &mut Vec<ScanWarning>) -> &[ModelDef] {
        if let Some(defs) = self.modeldefs.get() {
            return defs;
        }
        let loaded = self.load_modeldefs(warnings);
        self.modeldefs.get_or_init(|| loaded)
    }

    /// Definition for `name`, first match in manifest order.
    pub fn get_model(&self, name: &str) -> Result<&ModelDef> {
        let mut warnings = Vec::new();
        self.modeldefs(&mut warnings)
            .iter()
            .find(|def| def.name == name)
            .ok_or_else(|| RegistryError::ModelNotInDistribution {
                name: name.to_string(),
                dist: self.to_string(),
            })
    }

    /// Requirement string pinning this package's version.
    pub fn install_requirement(&self) -> Result<String> {
        let requirement = Namespace::Pypi.install_requirement(&self.project_name)?;
        if self.version.is_empty() {
            Ok(requirement)
        } else {
            Ok(format!("{requirement}=={}", self.version))
        }
    }

    fn load_modeldefs(&self, warnings: &mut Vec<ScanWarning>) -> Vec<ModelDef> {
        let lines = match self.record_lines() {
            Ok(lines) => lines,
            Err(err) => {
                record_warning(
                    warnings,
                    &self.metadata_dir,
                    format!("distribution {self} missing RECORD metadata - unable to find models: {err}"),
                );
                return Vec::new();
            }
        };

        let mut defs = Vec::new();
        for line in lines {
            let rel = line.split(',').next().unwrap_or_default().trim();
            if rel.is_empty() {
                continue;
            }
            let is_modelfile = Path::new(rel)
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(is_modelfile_name);
            if !is_modelfile {
                continue;
            }
            let path = self.location.join(rel);
            match modelfile::load_file(&path) {
                Ok(loaded) => defs.extend(loaded.into_models()),
                Err(err) => record_warning(
                    warnings,
                    &path,
                    format!("unable to load models from {}: {err}", path.display()),
                ),
            }
        }
        defs
    }
}

impl fmt::Display for PackageDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.version.is_empty() {
            write!(f, "{}", self.project_name)
        } else {
            write!(f, "{} {}", self.project_name, self.version)
        }
    }
}

/// Returns true when `path` looks like package metadata.
pub(crate) fn is_metadata_dir(path: &Path) -> bool {
    path.is_dir()
        && path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.ends_with(METADATA_SUFFIX))
}

fn metadata_project_name(metadata_dir: &Path) -> Option<String> {
    let data = fs::read_to_string(metadata_dir.join(METADATA)).ok()?;
    data.lines()
        .take_while(|line| !line.is_empty())
        .find_map(|line| line.strip_prefix("Name:"))
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
}
