//! JSON Schema validation for incoming events

use crate::error::{EventError, EventResult};
use jsonschema::Validator;
use serde_json::Value;
use std::fmt;
use std::path::Path;

/// Draft-07 schema compiled into the binary, used when no override is configured.
pub const BUNDLED_SCHEMA: &str = include_str!("schema.json");

/// A compiled event schema. Compiled once at startup and shared read-only.
pub struct EventSchema {
    validator: Validator,
}

impl EventSchema {
    pub fn compile(schema: &Value) -> EventResult<Self> {
        let validator =
            jsonschema::validator_for(schema).map_err(|e| EventError::Schema(e.to_string()))?;
        Ok(Self { validator })
    }

    pub fn bundled() -> EventResult<Self> {
        Self::parse(BUNDLED_SCHEMA)
    }

    pub fn from_file(path: impl AsRef<Path>) -> EventResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::parse(&raw)
    }

    /// Load the schema at `path`, or the bundled one when none is given.
    pub fn load(path: Option<&Path>) -> EventResult<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::bundled(),
        }
    }

    fn parse(raw: &str) -> EventResult<Self> {
        let schema: Value =
            serde_json::from_str(raw).map_err(|e| EventError::Schema(e.to_string()))?;
        Self::compile(&schema)
    }

    pub fn validate(&self, candidate: &Value) -> bool {
        self.validator.is_valid(candidate)
    }

    /// Human-readable validation failures, empty when `candidate` is valid.
    pub fn errors(&self, candidate: &Value) -> Vec<String> {
        self.validator
            .iter_errors(candidate)
            .map(|error| match error.instance_path.to_string() {
                path if path.is_empty() => error.to_string(),
                path => format!("{}: {}", path, error),
            })
            .collect()
    }
}

impl fmt::Debug for EventSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSchema").finish_non_exhaustive()
    }
}
