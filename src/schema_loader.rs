//! Shared JSON Schema loading and validation.
//!
//! Used for the annotated output (validating configuration documents against
//! it) and for the built-in contract every documentation record must satisfy.

use anyhow::{Context, Result, anyhow, bail};
use jsonschema::JSONSchema;
use serde_json::Value;
use std::fs::File;
use std::path::Path;

/// A compiled validator for one schema document.
pub struct CompiledSchema {
    compiled: JSONSchema,
}

impl CompiledSchema {
    pub fn compile(schema: &Value) -> Result<Self> {
        let compiled =
            JSONSchema::compile(schema).map_err(|err| anyhow!("compiling schema: {err}"))?;
        Ok(Self { compiled })
    }

    /// Validate `instance`, reporting every violation at once.
    pub fn validate(&self, instance: &Value) -> Result<()> {
        if let Err(errors) = self.compiled.validate(instance) {
            let details = errors
                .map(|err| format!("{} at '{}'", err, err.instance_path))
                .collect::<Vec<_>>()
                .join("\n");
            bail!("{}", details);
        }
        Ok(())
    }

    pub fn is_valid(&self, instance: &Value) -> bool {
        self.compiled.is_valid(instance)
    }
}

pub fn read_json(path: &Path) -> Result<Value> {
    serde_json::from_reader(
        File::open(path).with_context(|| format!("opening {}", path.display()))?,
    )
    .with_context(|| format!("parsing {}", path.display()))
}

pub fn load_json_schema(path: &Path) -> Result<CompiledSchema> {
    let schema = read_json(path)?;
    CompiledSchema::compile(&schema).with_context(|| format!("compiling schema {}", path.display()))
}
