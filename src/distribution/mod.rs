//! Provenance sources for model and resource contributions.
//!
//! Installed packages and definition files found on the search path are
//! structurally different, but the registry only needs a project name, a
//! location, and the named models/resources each one contributes. Both live
//! behind [`Distribution`].

pub mod file;
pub mod package;

pub use file::FileDistribution;
pub use package::PackageDistribution;

use crate::error::{RegistryError, Result};
use crate::modelfile::{ModelDef, ResourceDef};
use crate::warning::{ScanWarning, record_warning};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug)]
pub enum Distribution {
    Package(PackageDistribution),
    File(FileDistribution),
}

#[derive(Debug, Clone)]
/// A model name contributed by a distribution.
pub struct ModelEntry {
    pub name: String,
    pub dist: Arc<Distribution>,
}

#[derive(Debug, Clone)]
/// A resource name contributed by a distribution.
pub struct ResourceEntry {
    pub name: String,
    pub dist: Arc<Distribution>,
}

impl Distribution {
    pub fn project_name(&self) -> &str {
        match self {
            Distribution::Package(dist) => dist.project_name(),
            Distribution::File(dist) => dist.project_name(),
        }
    }

    /// Search root for packages, definition file path for file distributions.
    pub fn location(&self) -> &Path {
        match self {
            Distribution::Package(dist) => dist.location(),
            Distribution::File(dist) => dist.location(),
        }
    }

    /// Every model definition this distribution contributes, in declaration
    /// order. Loading problems are appended to `warnings`.
    pub fn modeldefs(&self, warnings: &mut Vec<ScanWarning>) -> &[ModelDef] {
        match self {
            Distribution::Package(dist) => dist.modeldefs(warnings),
            Distribution::File(dist) => dist.modelfile().models(),
        }
    }

    /// Contributed models keyed by bare name.
    ///
    /// When one distribution declares a name twice the first declaration is
    /// kept and the duplicate is reported as a warning.
    pub fn model_entries(self: &Arc<Self>, warnings: &mut Vec<ScanWarning>) -> BTreeMap<String, ModelEntry> {
        let mut duplicates = Vec::new();
        let mut entries = BTreeMap::new();
        for def in self.modeldefs(warnings) {
            match entries.entry(def.name.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(ModelEntry {
                        name: def.name.clone(),
                        dist: Arc::clone(self),
                    });
                }
                Entry::Occupied(_) => duplicates.push(def.name.clone()),
            }
        }
        for name in duplicates {
            record_warning(
                warnings,
                self.location(),
                format!("model '{name}' defined more than once in {self}; using the first definition"),
            );
        }
        entries
    }

    /// Resources declared across all contributed models, keyed by name.
    ///
    /// Resources shared by several models (typically through `extends`) map
    /// to a single entry.
    pub fn resource_entries(self: &Arc<Self>, warnings: &mut Vec<ScanWarning>) -> BTreeMap<String, ResourceEntry> {
        let mut entries = BTreeMap::new();
        for def in self.modeldefs(warnings) {
            for res in &def.resources {
                entries
                    .entry(res.name.clone())
                    .or_insert_with(|| ResourceEntry {
                        name: res.name.clone(),
                        dist: Arc::clone(self),
                    });
            }
        }
        entries
    }

    /// Definition of the model called `name`.
    pub fn get_model(&self, name: &str) -> Result<&ModelDef> {
        match self {
            Distribution::Package(dist) => dist.get_model(name),
            Distribution::File(dist) => dist.get_model(name),
        }
    }

    /// First declaration of the resource called `name`.
    pub fn get_resource(&self, name: &str) -> Result<&ResourceDef> {
        let mut warnings = Vec::new();
        self.modeldefs(&mut warnings)
            .iter()
            .flat_map(|def| def.resources.iter())
            .find(|res| res.name == name)
            .ok_or_else(|| RegistryError::NotFound(format!("resource '{name}' in {self}")))
    }

    /// Requirement string for installing this distribution as a package.
    ///
    /// File distributions always fail with `Unsupported`.
    pub fn install_requirement(&self) -> Result<String> {
        match self {
            Distribution::Package(dist) => dist.install_requirement(),
            Distribution::File(dist) => dist.install_requirement(),
        }
    }

    /// The definition file backing a file distribution.
    pub fn modelfile_src(&self) -> Option<&Path> {
        match self {
            Distribution::Package(_) => None,
            Distribution::File(dist) => Some(dist.location()),
        }
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Distribution::Package(dist) => fmt::Display::fmt(dist, f),
            Distribution::File(dist) => fmt::Display::fmt(dist, f),
        }
    }
}
