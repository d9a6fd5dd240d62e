//! Deserializable representation of a model definition file.
//!
//! The types mirror `schema/modelfile.schema.json`. Files are validated
//! against the schema before they reach serde, so the structs only need
//! defaults for the optional fields.

use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, PartialEq, Deserialize)]
/// One model declared in a definition file.
pub struct ModelDef {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Private models are hidden from listings but still resolvable by name.
    #[serde(default)]
    pub private: bool,
    /// Models in the same file this one inherits resources from.
    #[serde(default)]
    pub extends: Vec<String>,
    #[serde(default)]
    pub resources: Vec<ResourceDef>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
/// A named resource a model depends on.
pub struct ResourceDef {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub sources: Vec<String>,
}

#[derive(Clone, Debug)]
/// Models loaded from one definition file, in declaration order.
pub struct Modelfile {
    src: PathBuf,
    models: Vec<ModelDef>,
}

impl Modelfile {
    pub(crate) fn new(src: PathBuf, models: Vec<ModelDef>) -> Self {
        Self { src, models }
    }

    /// Path the definitions were loaded from.
    pub fn src(&self) -> &Path {
        &self.src
    }

    pub fn models(&self) -> &[ModelDef] {
        &self.models
    }

    /// First model declared with `name`.
    pub fn get(&self, name: &str) -> Option<&ModelDef> {
        self.models.iter().find(|model| model.name == name)
    }

    pub fn into_models(self) -> Vec<ModelDef> {
        self.models
    }
}
