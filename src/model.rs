//! Resolved models and resources.
//!
//! A [`Model`] binds a contributed name to its definition and distribution.
//! The fully-qualified name and the provenance reference are computed on
//! first access and never change afterwards.

use crate::distribution::{Distribution, ModelEntry, ResourceEntry};
use crate::error::Result;
use crate::modelfile::{ModelDef, ResourceDef};
use crate::namespace::{Namespace, qualify};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::{Arc, OnceLock};

/// Placeholder hash for definition files that cannot be read.
pub const UNKNOWN_HASH: &str = "-";

pub struct Model {
    name: String,
    dist: Arc<Distribution>,
    modeldef: ModelDef,
    fullname: OnceLock<String>,
    reference: OnceLock<String>,
}

impl Model {
    /// Resolve `name` against `dist`.
    ///
    /// Fails when the distribution no longer defines the name, e.g. when its
    /// files changed after the registry index was built.
    pub fn new(name: &str, dist: Arc<Distribution>) -> Result<Self> {
        let modeldef = dist.get_model(name)?.clone();
        Ok(Self {
            name: name.to_string(),
            dist,
            modeldef,
            fullname: OnceLock::new(),
            reference: OnceLock::new(),
        })
    }

    pub fn from_entry(entry: &ModelEntry) -> Result<Self> {
        Self::new(&entry.name, Arc::clone(&entry.dist))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn distribution(&self) -> &Arc<Distribution> {
        &self.dist
    }

    pub fn modeldef(&self) -> &ModelDef {
        &self.modeldef
    }

    pub fn is_private(&self) -> bool {
        self.modeldef.private
    }

    /// `<namespace>/<name>`, e.g. `mnist-models/cnn`.
    pub fn fullname(&self) -> &str {
        self.fullname
            .get_or_init(|| fullname_for(self.dist.project_name(), &self.name))
    }

    /// Where this model came from.
    ///
    /// `dist:<project> <version> <name>` for packages and
    /// `file:<absolute path> <sha256> <name>` for definition files.
    pub fn reference(&self) -> &str {
        self.reference.get_or_init(|| provenance(&self.dist, &self.name))
    }

    /// Hash field of a file-backed reference; `None` for packages.
    ///
    /// [`UNKNOWN_HASH`] here means the definition file could not be read
    /// when the reference was computed. That failure is only logged through
    /// `tracing`, so callers presenting references should check this.
    pub fn definition_hash(&self) -> Option<&str> {
        let rest = self.reference().strip_prefix("file:")?;
        let mut fields = rest.rsplitn(3, ' ');
        fields.next()?;
        fields.next()
    }

    /// Namespace owning the project name, when the name decodes.
    pub fn namespace(&self) -> Option<Namespace> {
        Namespace::for_project_name(self.dist.project_name())
            .ok()
            .map(|(ns, _)| ns)
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("name", &self.name)
            .field("dist", &self.dist.to_string())
            .finish()
    }
}

/// A resource declared by a contributed model.
pub struct Resource {
    name: String,
    dist: Arc<Distribution>,
    resourcedef: ResourceDef,
    fullname: OnceLock<String>,
}

impl Resource {
    pub fn new(name: &str, dist: Arc<Distribution>) -> Result<Self> {
        let resourcedef = dist.get_resource(name)?.clone();
        Ok(Self {
            name: name.to_string(),
            dist,
            resourcedef,
            fullname: OnceLock::new(),
        })
    }

    pub fn from_entry(entry: &ResourceEntry) -> Result<Self> {
        Self::new(&entry.name, Arc::clone(&entry.dist))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn distribution(&self) -> &Arc<Distribution> {
        &self.dist
    }

    pub fn resourcedef(&self) -> &ResourceDef {
        &self.resourcedef
    }

    pub fn fullname(&self) -> &str {
        self.fullname
            .get_or_init(|| fullname_for(self.dist.project_name(), &self.name))
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("name", &self.name)
            .field("dist", &self.dist.to_string())
            .finish()
    }
}

/// Fully-qualified name for `name` contributed by `project_name`.
pub fn fullname_for(project_name: &str, name: &str) -> String {
    format!("{}/{}", qualify(project_name), name)
}

/// Hex SHA-256 of the file at `path`, or [`UNKNOWN_HASH`] if unreadable.
///
/// The read failure is reported through `tracing` only; it happens after the
/// index is built, so it never reaches the registry's warnings.
pub fn content_hash(path: &Path) -> String {
    match fs::read(path) {
        Ok(bytes) => hex::encode(Sha256::digest(&bytes)),
        Err(err) => {
            tracing::warn!(
                path = %path.display(),
                "unable to read {} to calculate definition file hash: {err}",
                path.display()
            );
            UNKNOWN_HASH.to_string()
        }
    }
}

fn provenance(dist: &Distribution, name: &str) -> String {
    match dist.modelfile_src() {
        Some(src) => {
            let path = std::path::absolute(src).unwrap_or_else(|_| src.to_path_buf());
            format!("file:{} {} {}", path.display(), content_hash(&path), name)
        }
        None => format!("dist:{dist} {name}"),
    }
}
