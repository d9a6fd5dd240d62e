//! Project-name namespaces and the reversible path escape used by
//! file-backed distributions.
//!
//! A distribution synthesized from a `MODELS` file has no real project name,
//! so one is derived from the directory holding the file: `.modelfile.`
//! followed by the base16 encoding of the directory path. The encoding uses
//! only `0-9A-F`, which survives project-name normalization untouched and can
//! always be decoded back to the original path.

use crate::error::{RegistryError, Result};

/// Prefix carried by every file-backed project name.
pub const MODELFILE_PREFIX: &str = ".modelfile.";

/// Answer a namespace gives when asked whether it owns a project name.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Membership {
    Yes,
    Maybe,
    No,
}

/// Namespaces known to the registry, in priority order.
///
/// `Modelfile` claims names produced by [`modelfile_project_name`]; `Pypi`
/// is the catch-all for installed packages.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Namespace {
    Modelfile,
    Pypi,
}

impl Namespace {
    pub const ALL: [Namespace; 2] = [Namespace::Modelfile, Namespace::Pypi];

    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::Modelfile => "modelfile",
            Namespace::Pypi => "pypi",
        }
    }

    /// Test whether `project_name` belongs to this namespace.
    ///
    /// The second element is the project name as the namespace understands
    /// it: for `Modelfile` that is the recovered relative path.
    pub fn is_project_name_member(&self, project_name: &str) -> Result<(Membership, Option<String>)> {
        match self {
            Namespace::Modelfile => is_file_namespace_member(project_name),
            Namespace::Pypi => {
                if project_name.starts_with(MODELFILE_PREFIX) {
                    Ok((Membership::No, None))
                } else {
                    Ok((Membership::Maybe, Some(project_name.to_string())))
                }
            }
        }
    }

    /// Requirement string a package installer would need for `project_name`.
    pub fn install_requirement(&self, project_name: &str) -> Result<String> {
        match self {
            Namespace::Modelfile => Err(RegistryError::Unsupported(format!(
                "'{project_name}' is defined by a model file and cannot be installed as a package"
            ))),
            Namespace::Pypi => Ok(project_name.to_string()),
        }
    }

    /// Display form of a project name this namespace owns.
    ///
    /// Neither built-in namespace rewrites names; file-backed names keep
    /// their `.modelfile.` prefix.
    pub fn qualify(&self, project_name: &str) -> String {
        match self {
            Namespace::Modelfile | Namespace::Pypi => project_name.to_string(),
        }
    }

    /// Pick the namespace owning `project_name`.
    ///
    /// The first namespace answering `Yes` wins, otherwise the first answering
    /// `Maybe`. Malformed file-backed names surface as decode errors.
    pub fn for_project_name(project_name: &str) -> Result<(Namespace, String)> {
        let mut fallback = None;
        for ns in Self::ALL {
            match ns.is_project_name_member(project_name)? {
                (Membership::Yes, recovered) => {
                    return Ok((ns, recovered.unwrap_or_else(|| project_name.to_string())));
                }
                (Membership::Maybe, recovered) if fallback.is_none() => {
                    fallback = Some((ns, recovered.unwrap_or_else(|| project_name.to_string())));
                }
                _ => {}
            }
        }
        fallback.ok_or_else(|| RegistryError::NotFound(project_name.to_string()))
    }
}

/// Encode a relative path as an uppercase base16 token.
pub fn escape(path: &str) -> String {
    hex::encode_upper(path.as_bytes())
}

/// Decode a token produced by [`escape`].
///
/// Lowercase digits are rejected so every path has exactly one token.
pub fn unescape(token: &str) -> Result<String> {
    if let Some(bad) = token.chars().find(|c| !matches!(c, '0'..='9' | 'A'..='F')) {
        return Err(decode_error(token, format!("unexpected character '{bad}'")));
    }
    let bytes = hex::decode(token).map_err(|err| decode_error(token, err.to_string()))?;
    String::from_utf8(bytes).map_err(|err| decode_error(token, err.to_string()))
}

/// Project name for a distribution defined by a file in `relative_dir`.
pub fn modelfile_project_name(relative_dir: &str) -> String {
    format!("{MODELFILE_PREFIX}{}", escape(relative_dir))
}

/// Display prefix for a project name, as chosen by the namespace owning it.
///
/// A name that looks file-backed but does not decode is left unchanged: it
/// can only come from a package that happens to carry the prefix.
pub fn qualify(project_name: &str) -> String {
    match Namespace::for_project_name(project_name) {
        Ok((ns, _)) => ns.qualify(project_name),
        Err(_) => project_name.to_string(),
    }
}

/// Test whether `identifier` follows the file-backed naming convention.
///
/// On a match the escaped token (everything up to the first `/`) is decoded
/// and any remainder is appended, so `.modelfile.<token>/net` recovers
/// `./dir/net`.
pub fn is_file_namespace_member(identifier: &str) -> Result<(Membership, Option<String>)> {
    let Some(rest) = identifier.strip_prefix(MODELFILE_PREFIX) else {
        return Ok((Membership::No, None));
    };
    let (token, remainder) = match rest.split_once('/') {
        Some((token, remainder)) => (token, Some(remainder)),
        None => (rest, None),
    };
    let path = unescape(token)?;
    let recovered = match remainder {
        Some(remainder) => format!("{path}/{remainder}"),
        None => path,
    };
    Ok((Membership::Yes, Some(recovered)))
}

fn decode_error(token: &str, message: String) -> RegistryError {
    RegistryError::Decode {
        token: token.to_string(),
        message,
    }
}
