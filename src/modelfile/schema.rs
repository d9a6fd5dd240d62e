//! JSON Schema gate for definition files.
//!
//! The schema ships inside the binary so validation never depends on the
//! working directory. It is compiled once per process.

use crate::error::{RegistryError, Result};
use jsonschema::JSONSchema;
use serde_json::Value;
use std::path::Path;
use std::sync::OnceLock;

const MODELFILE_SCHEMA: &str = include_str!("../../schema/modelfile.schema.json");

static COMPILED: OnceLock<std::result::Result<JSONSchema, String>> = OnceLock::new();

fn compiled_schema() -> std::result::Result<&'static JSONSchema, &'static str> {
    COMPILED
        .get_or_init(|| {
            let raw: Value = serde_json::from_str(MODELFILE_SCHEMA)
                .map_err(|err| format!("parsing embedded schema: {err}"))?;
            let compiled = JSONSchema::compile(&raw)
                .map_err(|err| format!("compiling embedded schema: {err}"));
            compiled
        })
        .as_ref()
        .map_err(String::as_str)
}

/// Validate a parsed definition document.
///
/// All schema violations are joined into a single `Format` error so the
/// warning for a bad file lists every problem at once.
pub(crate) fn validate_definitions(path: &Path, value: &Value) -> Result<()> {
    let schema = compiled_schema().map_err(|message| RegistryError::Format {
        path: path.to_path_buf(),
        message: message.to_string(),
    })?;
    if let Err(errors) = schema.validate(value) {
        let details = errors
            .map(|err| err.to_string())
            .collect::<Vec<_>>()
            .join("\n");
        return Err(RegistryError::Format {
            path: path.to_path_buf(),
            message: format!("failed schema validation:\n{details}"),
        });
    }
    Ok(())
}
