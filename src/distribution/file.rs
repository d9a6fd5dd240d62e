//! Distributions synthesized from a definition file on the search path.

use crate::error::{RegistryError, Result};
use crate::modelfile::{ModelDef, Modelfile};
use crate::namespace::{Namespace, modelfile_project_name};
use std::fmt;
use std::path::{Component, Path, PathBuf};

#[derive(Debug)]
/// A single definition file acting as a package.
///
/// The project name encodes the directory holding the file relative to the
/// base directory the registry resolves roots against (normally the working
/// directory), so it can be mapped back to that directory with
/// [`crate::namespace::is_file_namespace_member`].
pub struct FileDistribution {
    project_name: String,
    modelfile: Modelfile,
}

impl FileDistribution {
    pub fn new(modelfile: Modelfile, base_dir: &Path) -> Self {
        let dir = modelfile.src().parent().unwrap_or_else(|| Path::new(""));
        let project_name = modelfile_project_name(&relative_dir(dir, base_dir));
        Self {
            project_name,
            modelfile,
        }
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    /// Path of the definition file.
    pub fn location(&self) -> &Path {
        self.modelfile.src()
    }

    pub fn modelfile(&self) -> &Modelfile {
        &self.modelfile
    }

    pub fn get_model(&self, name: &str) -> Result<&ModelDef> {
        self.modelfile
            .get(name)
            .ok_or_else(|| RegistryError::ModelNotInDistribution {
                name: name.to_string(),
                dist: self.to_string(),
            })
    }

    /// Always fails: a definition file is not an installable package.
    pub fn install_requirement(&self) -> Result<String> {
        Namespace::Modelfile.install_requirement(&self.project_name)
    }
}

impl fmt::Display for FileDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.modelfile.src().display())
    }
}

/// Path of `dir` relative to `base`, always starting with `.`.
///
/// Both paths are normalized lexically (no symlink resolution). A result that
/// does not already start with `.` gets a `./` prefix.
pub(crate) fn relative_dir(dir: &Path, base: &Path) -> String {
    let base = normalize(base);
    let dir = if dir.is_absolute() {
        normalize(dir)
    } else {
        normalize(&base.join(dir))
    };

    let base_parts: Vec<Component<'_>> = base.components().collect();
    let dir_parts: Vec<Component<'_>> = dir.components().collect();
    let common = base_parts
        .iter()
        .zip(&dir_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<String> = Vec::new();
    parts.extend(std::iter::repeat_n("..".to_string(), base_parts.len() - common));
    parts.extend(
        dir_parts[common..]
            .iter()
            .map(|part| part.as_os_str().to_string_lossy().into_owned()),
    );

    let rel = if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    };
    if rel.starts_with('.') {
        rel
    } else {
        format!("./{rel}")
    }
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
