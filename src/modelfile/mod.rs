//! Definition file loading.
//!
//! A directory contributes models when it directly contains a file named
//! `MODELS` or `MODEL`. The file is JSON: either one model object or an array
//! of them, checked against the embedded schema before deserialization.
//! Models may `extend` other models declared in the same file; extension
//! copies the parent's description (when the child has none) and resources
//! (child resources of the same name take precedence).

pub mod model;
mod schema;

pub use model::{ModelDef, Modelfile, ResourceDef};

use crate::error::{RegistryError, Result};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

/// Recognized definition file names, in lookup order.
pub const NAMES: &[&str] = &["MODELS", "MODEL"];

/// Returns true when `file_name` is a recognized definition file name.
pub fn is_modelfile_name(file_name: &str) -> bool {
    NAMES.contains(&file_name)
}

/// Find the definition file directly under `dir`, honoring [`NAMES`] order.
///
/// Returns `Ok(None)` when the directory has no recognized entry.
pub fn find_in_dir(dir: &Path) -> Result<Option<PathBuf>> {
    let mut present = BTreeSet::new();
    for entry in fs::read_dir(dir).map_err(|err| RegistryError::io(dir, err))? {
        let entry = entry.map_err(|err| RegistryError::io(dir, err))?;
        if let Some(name) = entry.file_name().to_str() {
            if is_modelfile_name(name) && entry.path().is_file() {
                present.insert(name.to_string());
            }
        }
    }
    Ok(NAMES
        .iter()
        .find(|name| present.contains(**name))
        .map(|name| dir.join(name)))
}

/// Load the definition file found directly under `dir`.
pub fn from_dir(dir: &Path) -> Result<Modelfile> {
    match find_in_dir(dir)? {
        Some(path) => load_file(&path),
        None => Err(RegistryError::io(
            dir,
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no {} file", NAMES.join(" or ")),
            ),
        )),
    }
}

/// Read, validate and parse one definition file.
pub fn load_file(path: &Path) -> Result<Modelfile> {
    let data = fs::read_to_string(path).map_err(|err| RegistryError::io(path, err))?;
    let models = parse_definitions(path, &data)?;
    Ok(Modelfile::new(path.to_path_buf(), models))
}

/// Parse definition file contents; `path` is used for error context only.
pub fn parse_definitions(path: &Path, data: &str) -> Result<Vec<ModelDef>> {
    let value: Value = serde_json::from_str(data).map_err(|err| RegistryError::Format {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;
    schema::validate_definitions(path, &value)?;

    let format_err = |err: serde_json::Error| RegistryError::Format {
        path: path.to_path_buf(),
        message: err.to_string(),
    };
    let models: Vec<ModelDef> = match value {
        Value::Array(items) => items
            .into_iter()
            .map(serde_json::from_value)
            .collect::<std::result::Result<_, _>>()
            .map_err(format_err)?,
        other => vec![serde_json::from_value(other).map_err(format_err)?],
    };
    apply_extends(path, models)
}

fn apply_extends(path: &Path, models: Vec<ModelDef>) -> Result<Vec<ModelDef>> {
    if models.iter().all(|model| model.extends.is_empty()) {
        return Ok(models);
    }

    let mut by_name: BTreeMap<&str, &ModelDef> = BTreeMap::new();
    for model in &models {
        by_name.entry(model.name.as_str()).or_insert(model);
    }

    let mut resolved = Vec::with_capacity(models.len());
    for model in &models {
        let mut stack = Vec::new();
        resolved.push(resolve_model(path, model, &by_name, &mut stack)?);
    }
    Ok(resolved)
}

fn resolve_model(
    path: &Path,
    model: &ModelDef,
    by_name: &BTreeMap<&str, &ModelDef>,
    stack: &mut Vec<String>,
) -> Result<ModelDef> {
    if stack.contains(&model.name) {
        stack.push(model.name.clone());
        return Err(RegistryError::Reference {
            path: path.to_path_buf(),
            message: format!("cycle in model extends: {}", stack.join(" -> ")),
        });
    }
    stack.push(model.name.clone());

    let mut description = model.description.clone();
    let mut resources: Vec<ResourceDef> = Vec::new();
    for parent_name in &model.extends {
        let parent = by_name.get(parent_name.as_str()).ok_or_else(|| RegistryError::Reference {
            path: path.to_path_buf(),
            message: format!(
                "model '{}' extends undefined model '{}'",
                model.name, parent_name
            ),
        })?;
        let parent = resolve_model(path, parent, by_name, stack)?;
        if description.is_none() {
            description = parent.description;
        }
        for res in parent.resources {
            if !resources.iter().any(|existing| existing.name == res.name) {
                resources.push(res);
            }
        }
    }
    for res in &model.resources {
        resources.retain(|existing| existing.name != res.name);
        resources.push(res.clone());
    }

    stack.pop();
    Ok(ModelDef {
        name: model.name.clone(),
        description,
        private: model.private,
        extends: model.extends.clone(),
        resources,
    })
}
