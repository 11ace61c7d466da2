use std::fmt;

use jsonschema::{validator_for, Validator};
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Schema compile error for '{tool}': {message}")]
    Compile { tool: String, message: String },
}

/// A tool's input contract: the JSON Schema advertised in `tools/list`
/// together with its compiled validator.
///
/// Advertising and validating from the same value keeps the two from
/// drifting apart.
pub struct ToolContract {
    tool: &'static str,
    schema: Value,
    validator: Validator,
}

impl ToolContract {
    pub fn compile(tool: &'static str, schema: Value) -> Result<Self, SchemaError> {
        let validator = validator_for(&schema).map_err(|e| SchemaError::Compile {
            tool: tool.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self {
            tool,
            schema,
            validator,
        })
    }

    pub fn tool(&self) -> &'static str {
        self.tool
    }

    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// Check an argument object against the contract.
    ///
    /// Returns every violation found, in validator order.
    pub fn validate(&self, arguments: &Value) -> Result<(), Vec<String>> {
        let violations: Vec<String> = self
            .validator
            .iter_errors(arguments)
            .map(|err| err.to_string())
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

impl fmt::Debug for ToolContract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolContract")
            .field("tool", &self.tool)
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}
