//! Path-ordered model registry.
//!
//! The registry owns the search path and an index from fully-qualified name
//! to model, built lazily from the distributions each root contributes. Any
//! change to the path drops the index; the next lookup rebuilds it with a
//! full sequential scan. Roots earlier in the path take priority: when two
//! roots contribute the same fullname, the first one scanned keeps it.

use crate::config::RegistryConfig;
use crate::discovery::{FsScanner, RootScanner};
use crate::distribution::{Distribution, ModelEntry, ResourceEntry};
use crate::error::{RegistryError, Result};
use crate::model::{Model, Resource, fullname_for};
use crate::warning::{ScanWarning, record_warning};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

/// Search path plus the cached index built from it.
pub struct Registry {
    path: Vec<String>,
    scanner: Box<dyn RootScanner>,
    index: Option<Index>,
}

#[derive(Default)]
struct Index {
    models: BTreeMap<String, Slot<ModelEntry, Model>>,
    resources: BTreeMap<String, Slot<ResourceEntry, Resource>>,
    warnings: Vec<ScanWarning>,
}

struct Slot<E, T> {
    entry: E,
    value: Option<Arc<T>>,
    /// Set once a failure to materialize has been recorded as a warning.
    reported: bool,
}

impl<E, T> Slot<E, T> {
    fn new(entry: E) -> Self {
        Self {
            entry,
            value: None,
            reported: false,
        }
    }

    fn materialize(&mut self, build: impl FnOnce(&E) -> Result<T>) -> Result<Arc<T>> {
        if let Some(value) = &self.value {
            return Ok(Arc::clone(value));
        }
        let value = Arc::new(build(&self.entry)?);
        self.value = Some(Arc::clone(&value));
        Ok(value)
    }
}

impl Registry {
    /// Empty search path scanned through `scanner`.
    pub fn new(scanner: impl RootScanner + 'static) -> Self {
        Self {
            path: Vec::new(),
            scanner: Box::new(scanner),
            index: None,
        }
    }

    /// Filesystem-backed registry seeded from configuration.
    pub fn from_config(config: &RegistryConfig) -> Self {
        let mut registry = Self::new(FsScanner::new(config.base_dir.clone()));
        registry.set_path(config.path.clone());
        registry
    }

    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Replace the search path and drop the cached index.
    pub fn set_path(&mut self, roots: Vec<String>) {
        self.path = roots;
        self.index = None;
    }

    /// Move or insert `root` at the front of the search path.
    pub fn add_model_path(&mut self, root: impl Into<String>) {
        let root = root.into();
        let mut path = std::mem::take(&mut self.path);
        path.retain(|existing| *existing != root);
        path.insert(0, root);
        self.set_path(path);
    }

    /// Distributions contributed by one root, in priority order.
    pub fn resolve_root(&self, root: &str, warnings: &mut Vec<ScanWarning>) -> Vec<Arc<Distribution>> {
        self.scanner.scan(root, warnings)
    }

    /// Model registered under `fullname`.
    ///
    /// Private models resolve here even though listings hide them.
    pub fn for_name(&mut self, fullname: &str) -> Result<Arc<Model>> {
        let index = self.ensure_index();
        let slot = index
            .models
            .get_mut(fullname)
            .ok_or_else(|| RegistryError::NotFound(fullname.to_string()))?;
        slot.materialize(Model::from_entry)
    }

    /// Every indexed model in name order, private ones included.
    ///
    /// An entry that no longer resolves is skipped and recorded as a warning
    /// the first time it is seen.
    pub fn entries(&mut self) -> Vec<(String, Arc<Model>)> {
        let index = self.ensure_index();
        let mut out = Vec::with_capacity(index.models.len());
        for (fullname, slot) in index.models.iter_mut() {
            match slot.materialize(Model::from_entry) {
                Ok(model) => out.push((fullname.clone(), model)),
                Err(err) if !slot.reported => {
                    slot.reported = true;
                    record_warning(
                        &mut index.warnings,
                        slot.entry.dist.location(),
                        format!("unable to resolve model '{fullname}': {err}"),
                    );
                }
                Err(_) => {}
            }
        }
        out
    }

    /// Public models in name order.
    pub fn iterate(&mut self) -> Vec<(String, Arc<Model>)> {
        self.entries()
            .into_iter()
            .filter(|(_, model)| !model.is_private())
            .collect()
    }

    /// Resource registered under `fullname`.
    pub fn resource_for_name(&mut self, fullname: &str) -> Result<Arc<Resource>> {
        let index = self.ensure_index();
        let slot = index
            .resources
            .get_mut(fullname)
            .ok_or_else(|| RegistryError::NotFound(fullname.to_string()))?;
        slot.materialize(Resource::from_entry)
    }

    /// Every indexed resource in name order.
    pub fn iter_resources(&mut self) -> Vec<(String, Arc<Resource>)> {
        let index = self.ensure_index();
        let mut out = Vec::with_capacity(index.resources.len());
        for (fullname, slot) in index.resources.iter_mut() {
            match slot.materialize(Resource::from_entry) {
                Ok(resource) => out.push((fullname.clone(), resource)),
                Err(err) if !slot.reported => {
                    slot.reported = true;
                    record_warning(
                        &mut index.warnings,
                        slot.entry.dist.location(),
                        format!("unable to resolve resource '{fullname}': {err}"),
                    );
                }
                Err(_) => {}
            }
        }
        out
    }

    /// Warnings recorded since the index was last built.
    ///
    /// Empty until the first lookup after a path change.
    pub fn warnings(&self) -> &[ScanWarning] {
        self.index
            .as_ref()
            .map(|index| index.warnings.as_slice())
            .unwrap_or_default()
    }

    fn ensure_index(&mut self) -> &mut Index {
        if self.index.is_none() {
            let index = self.build_index();
            self.index = Some(index);
        }
        self.index.get_or_insert_with(Index::default)
    }

    fn build_index(&self) -> Index {
        let mut index = Index::default();
        for root in &self.path {
            for dist in self.resolve_root(root, &mut index.warnings) {
                let qualified = |name: &str| fullname_for(dist.project_name(), name);
                for (name, entry) in dist.model_entries(&mut index.warnings) {
                    index
                        .models
                        .entry(qualified(&name))
                        .or_insert_with(|| Slot::new(entry));
                }
                for (name, entry) in dist.resource_entries(&mut index.warnings) {
                    index
                        .resources
                        .entry(qualified(&name))
                        .or_insert_with(|| Slot::new(entry));
                }
            }
        }
        tracing::debug!(
            roots = self.path.len(),
            models = index.models.len(),
            resources = index.resources.len(),
            warnings = index.warnings.len(),
            "rebuilt model index"
        );
        index
    }
}

static GLOBAL: OnceLock<Mutex<Registry>> = OnceLock::new();

fn global() -> MutexGuard<'static, Registry> {
    GLOBAL
        .get_or_init(|| Mutex::new(Registry::from_config(&RegistryConfig::from_env())))
        .lock()
        .unwrap_or_else(|err| err.into_inner())
}

/// Search path of the process-wide registry.
pub fn get_path() -> Vec<String> {
    global().path().to_vec()
}

/// Replace the process-wide search path.
pub fn set_path(roots: Vec<String>) {
    global().set_path(roots);
}

/// Give `root` top priority in the process-wide search path.
pub fn add_model_path(root: impl Into<String>) {
    global().add_model_path(root);
}

/// Look up a model in the process-wide registry.
pub fn for_name(fullname: &str) -> Result<Arc<Model>> {
    global().for_name(fullname)
}

/// Public models of the process-wide registry, in name order.
pub fn iter_models() -> Vec<Arc<Model>> {
    global()
        .iterate()
        .into_iter()
        .map(|(_, model)| model)
        .collect()
}

/// Warnings from the process-wide registry's latest rebuild.
pub fn warnings() -> Vec<ScanWarning> {
    global().warnings().to_vec()
}
