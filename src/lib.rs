//! Model registry: resolves model names contributed by installed packages
//! and by `MODELS` files found on a search path.
//!
//! Packages and definition files both become [`Distribution`]s; the
//! [`Registry`] scans its search path in order, indexes every contributed
//! model under `<project name>/<model name>`, and caches the index until the
//! path changes. File-backed project names encode their directory with a
//! reversible escape (see [`namespace`]), so `.modelfile.2E2F6D6F64656C73/net`
//! is the `net` model defined in `./models/MODELS`.
//!
//! The free functions re-exported here ([`for_name`], [`iter_models`],
//! [`add_model_path`], ...) operate on one process-wide registry seeded from
//! the environment (see [`config`]).

pub mod config;
pub mod discovery;
pub mod distribution;
pub mod error;
pub mod model;
pub mod modelfile;
pub mod namespace;
pub mod registry;
pub mod warning;

pub use config::RegistryConfig;
pub use discovery::{FsScanner, RootScanner, probe};
pub use distribution::{
    Distribution, FileDistribution, ModelEntry, PackageDistribution, ResourceEntry,
};
pub use error::{RegistryError, Result};
pub use model::{Model, Resource};
pub use modelfile::{ModelDef, Modelfile, ResourceDef};
pub use namespace::{Membership, Namespace, escape, is_file_namespace_member, qualify, unescape};
pub use registry::{
    Registry, add_model_path, for_name, get_path, iter_models, set_path, warnings,
};
pub use warning::ScanWarning;
