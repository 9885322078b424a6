//! Tool catalog: typed metadata, argument validation, function-schema rendering.
//!
//! Owns tool *metadata* only. Execution lives in [`crate::dispatch`], which
//! routes on the [`ToolBackend`] recorded here.

use crate::types::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

// =============================================================================
// Parameter types
// =============================================================================

/// Parameter type for tool inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    String,
    Integer {
        minimum: Option<i64>,
        maximum: Option<i64>,
    },
    StringList,
    EnumList(Vec<String>),
}

impl ParamType {
    /// Unbounded integer.
    pub fn integer() -> Self {
        ParamType::Integer {
            minimum: None,
            maximum: None,
        }
    }

    /// Validate a JSON value against this parameter type.
    pub fn validate(&self, value: &Value) -> std::result::Result<(), String> {
        match self {
            ParamType::String => {
                if value.is_string() {
                    Ok(())
                } else {
                    Err(format!("expected string, got {}", value_type_name(value)))
                }
            }
            ParamType::Integer { minimum, maximum } => {
                let n = integer_like(value)
                    .ok_or_else(|| format!("expected integer, got {}", value_type_name(value)))?;
                if let Some(min) = minimum {
                    if n < i128::from(*min) {
                        return Err(format!("{} is below minimum {}", n, min));
                    }
                }
                if let Some(max) = maximum {
                    if n > i128::from(*max) {
                        return Err(format!("{} is above maximum {}", n, max));
                    }
                }
                Ok(())
            }
            ParamType::StringList => {
                let arr = value
                    .as_array()
                    .ok_or_else(|| format!("expected array, got {}", value_type_name(value)))?;
                for (i, item) in arr.iter().enumerate() {
                    if !item.is_string() {
                        return Err(format!(
                            "expected string at index {}, got {}",
                            i,
                            value_type_name(item)
                        ));
                    }
                }
                Ok(())
            }
            ParamType::EnumList(variants) => {
                let arr = value
                    .as_array()
                    .ok_or_else(|| format!("expected array, got {}", value_type_name(value)))?;
                for item in arr {
                    match item.as_str() {
                        Some(s) if variants.iter().any(|v| v == s) => {}
                        Some(s) => {
                            return Err(format!(
                                "invalid enum value '{}', expected one of: {}",
                                s,
                                variants.join(", ")
                            ))
                        }
                        None => {
                            return Err(format!(
                                "expected string for enum, got {}",
                                value_type_name(item)
                            ))
                        }
                    }
                }
                Ok(())
            }
        }
    }

    /// JSON-schema fragment for this type.
    pub fn to_schema(&self) -> Value {
        match self {
            ParamType::String => json!({ "type": "string" }),
            ParamType::Integer { minimum, maximum } => {
                let mut schema = Map::new();
                schema.insert("type".to_string(), json!("integer"));
                if let Some(min) = minimum {
                    schema.insert("minimum".to_string(), json!(min));
                }
                if let Some(max) = maximum {
                    schema.insert("maximum".to_string(), json!(max));
                }
                Value::Object(schema)
            }
            ParamType::StringList => json!({
                "type": "array",
                "items": { "type": "string" },
            }),
            ParamType::EnumList(variants) => json!({
                "type": "array",
                "items": { "type": "string", "enum": variants },
            }),
        }
    }
}

/// Integers, integral floats and numeric strings all count; models emit all three.
/// Widened to `i128` so the whole `u64` range fits.
fn integer_like(value: &Value) -> Option<i128> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .map(i128::from)
            .or_else(|| n.as_u64().map(i128::from))
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && f.abs() < i128::MAX as f64)
                    .map(|f| f as i128)
            }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn value_type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// =============================================================================
// Parameter definition
// =============================================================================

/// A single parameter definition for a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamDef {
    pub name: String,
    pub param_type: ParamType,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default)]
    pub required: bool,
}

impl ParamDef {
    pub fn required(name: &str, param_type: ParamType) -> Self {
        Self {
            name: name.to_string(),
            param_type,
            description: String::new(),
            required: true,
        }
    }

    pub fn optional(name: &str, param_type: ParamType) -> Self {
        Self {
            required: false,
            ..Self::required(name, param_type)
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    fn to_schema(&self) -> Value {
        let mut schema = self.param_type.to_schema();
        if !self.description.is_empty() {
            if let Some(obj) = schema.as_object_mut() {
                obj.insert("description".to_string(), json!(self.description));
            }
        }
        schema
    }
}

// =============================================================================
// Tool entry
// =============================================================================

/// Which external system executes a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolBackend {
    /// Public ICP statistics REST API (read-only).
    Statistics,
    /// Proposal-store canister (reads and writes).
    Canister,
}

/// Complete tool metadata entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolEntry {
    pub name: String,
    pub description: String,
    pub parameters: Vec<ParamDef>,
    pub backend: ToolBackend,
}

impl ToolEntry {
    pub fn new(name: &str, description: &str, backend: ToolBackend) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            parameters: Vec::new(),
            backend,
        }
    }

    pub fn param(mut self, param: ParamDef) -> Self {
        self.parameters.push(param);
        self
    }

    /// JSON-schema object describing the parameters.
    pub fn parameters_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for param in &self.parameters {
            properties.insert(param.name.clone(), param.to_schema());
            if param.required {
                required.push(json!(param.name));
            }
        }
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": false,
        })
    }

    /// Render as a function tool for the completion API.
    pub fn to_function_spec(&self) -> Value {
        json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": self.parameters_schema(),
                "strict": true,
            }
        })
    }
}

// =============================================================================
// Tool catalog
// =============================================================================

/// In-memory tool catalog. Owns metadata, not implementations.
///
/// Entries keep their registration order so the menu sent to the model is stable.
#[derive(Debug, Default, Clone)]
pub struct ToolCatalog {
    entries: Vec<ToolEntry>,
}

impl ToolCatalog {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Register a tool entry.
    pub fn register(&mut self, entry: ToolEntry) -> Result<()> {
        if entry.name.is_empty() {
            return Err(Error::validation("Tool name cannot be empty"));
        }
        if self.has_tool(&entry.name) {
            return Err(Error::validation(format!(
                "Tool already registered: {}",
                entry.name
            )));
        }
        self.entries.push(entry);
        Ok(())
    }

    /// Get a tool entry by name.
    pub fn get(&self, name: &str) -> Option<&ToolEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Check if a tool exists.
    pub fn has_tool(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Backend responsible for a tool.
    pub fn backend_for(&self, name: &str) -> Option<ToolBackend> {
        self.get(name).map(|e| e.backend)
    }

    /// List all tool names in registration order.
    pub fn list_names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    /// List all tool entries in registration order.
    pub fn list_entries(&self) -> &[ToolEntry] {
        &self.entries
    }

    /// Names of the tools served by one backend.
    pub fn names_for(&self, backend: ToolBackend) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.backend == backend)
            .map(|e| e.name.as_str())
            .collect()
    }

    /// Function-tool menu for the completion API.
    pub fn to_function_specs(&self) -> Vec<Value> {
        self.entries.iter().map(ToolEntry::to_function_spec).collect()
    }

    /// Validate arguments against a tool's parameter definitions.
    ///
    /// Returns a list of validation errors (empty = valid).
    pub fn validate_args(&self, name: &str, args: &Value) -> Result<Vec<String>> {
        let entry = self
            .get(name)
            .ok_or_else(|| Error::not_found(format!("Unsupported tool: {}", name)))?;

        let arg_map = args
            .as_object()
            .ok_or_else(|| Error::validation("Tool arguments must be a JSON object"))?;

        let mut errors = Vec::new();

        for param in &entry.parameters {
            if param.required && !arg_map.contains_key(&param.name) {
                errors.push(format!("Missing required parameter: {}", param.name));
            }
        }

        for (key, value) in arg_map {
            match entry.parameters.iter().find(|p| &p.name == key) {
                // Models send explicit nulls for optional fields under strict mode.
                Some(param) if value.is_null() && !param.required => {}
                Some(param) => {
                    if let Err(e) = param.param_type.validate(value) {
                        errors.push(format!("Parameter '{}': {}", key, e));
                    }
                }
                None => errors.push(format!("Unknown parameter: {}", key)),
            }
        }

        Ok(errors)
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_entry() -> ToolEntry {
        ToolEntry::new(
            "get_ic_proposals",
            "List NNS proposals",
            ToolBackend::Statistics,
        )
        .param(
            ParamDef::optional(
                "limit",
                ParamType::Integer {
                    minimum: Some(50),
                    maximum: Some(100),
                },
            )
            .with_description("Items per page (default 50)"),
        )
        .param(ParamDef::optional(
            "include_status",
            ParamType::EnumList(vec!["OPEN".to_string(), "ADOPTED".to_string()]),
        ))
    }

    fn info_entry() -> ToolEntry {
        ToolEntry::new(
            "get_ic_proposal_info",
            "Get one proposal",
            ToolBackend::Statistics,
        )
        .param(ParamDef::required("proposal_id", ParamType::integer()))
    }

    #[test]
    fn test_register_and_get() {
        let mut catalog = ToolCatalog::new();
        catalog.register(sample_entry()).unwrap();

        assert!(catalog.has_tool("get_ic_proposals"));
        assert!(!catalog.has_tool("nonexistent"));
        assert_eq!(catalog.len(), 1);
        assert_eq!(
            catalog.backend_for("get_ic_proposals"),
            Some(ToolBackend::Statistics)
        );
    }

    #[test]
    fn test_register_empty_name_fails() {
        let mut catalog = ToolCatalog::new();
        let mut entry = sample_entry();
        entry.name = String::new();
        assert!(catalog.register(entry).is_err());
    }

    #[test]
    fn test_register_duplicate_fails() {
        let mut catalog = ToolCatalog::new();
        catalog.register(sample_entry()).unwrap();
        assert!(catalog.register(sample_entry()).is_err());
    }

    #[test]
    fn test_validate_args_valid() {
        let mut catalog = ToolCatalog::new();
        catalog.register(sample_entry()).unwrap();

        let args = json!({"limit": 75, "include_status": ["OPEN"]});
        let errors = catalog.validate_args("get_ic_proposals", &args).unwrap();
        assert!(errors.is_empty(), "Expected no errors, got: {:?}", errors);
    }

    #[test]
    fn test_validate_args_missing_required() {
        let mut catalog = ToolCatalog::new();
        catalog.register(info_entry()).unwrap();

        let errors = catalog
            .validate_args("get_ic_proposal_info", &json!({}))
            .unwrap();
        assert_eq!(errors, vec!["Missing required parameter: proposal_id"]);
    }

    #[test]
    fn test_validate_args_out_of_range() {
        let mut catalog = ToolCatalog::new();
        catalog.register(sample_entry()).unwrap();

        let errors = catalog
            .validate_args("get_ic_proposals", &json!({"limit": 10}))
            .unwrap();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("below minimum 50"));
    }

    #[test]
    fn test_validate_args_bad_enum() {
        let mut catalog = ToolCatalog::new();
        catalog.register(sample_entry()).unwrap();

        let errors = catalog
            .validate_args("get_ic_proposals", &json!({"include_status": ["PENDING"]}))
            .unwrap();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("invalid enum value 'PENDING'"));
    }

    #[test]
    fn test_validate_args_unknown_param() {
        let mut catalog = ToolCatalog::new();
        catalog.register(info_entry()).unwrap();

        let errors = catalog
            .validate_args("get_ic_proposal_info", &json!({"proposal_id": 1, "bogus": true}))
            .unwrap();
        assert_eq!(errors, vec!["Unknown parameter: bogus"]);
    }

    #[test]
    fn test_validate_args_null_optional_accepted() {
        let mut catalog = ToolCatalog::new();
        catalog.register(sample_entry()).unwrap();

        let errors = catalog
            .validate_args("get_ic_proposals", &json!({"limit": null}))
            .unwrap();
        assert!(errors.is_empty());
    }

    #[test]
    fn test_validate_args_unknown_tool() {
        let catalog = ToolCatalog::new();
        assert!(matches!(
            catalog.validate_args("nonexistent", &json!({})),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_function_spec_shape() {
        let spec = info_entry().to_function_spec();
        assert_eq!(
            spec,
            json!({
                "type": "function",
                "function": {
                    "name": "get_ic_proposal_info",
                    "description": "Get one proposal",
                    "parameters": {
                        "type": "object",
                        "properties": { "proposal_id": { "type": "integer" } },
                        "required": ["proposal_id"],
                        "additionalProperties": false,
                    },
                    "strict": true,
                }
            })
        );
    }

    #[test]
    fn test_integer_schema_carries_bounds_and_description() {
        let schema = sample_entry().parameters_schema();
        assert_eq!(
            schema["properties"]["limit"],
            json!({
                "type": "integer",
                "minimum": 50,
                "maximum": 100,
                "description": "Items per page (default 50)",
            })
        );
        assert_eq!(schema["required"], json!([]));
    }

    #[test]
    fn test_param_type_string_list_validation() {
        let pt = ParamType::StringList;
        assert!(pt.validate(&json!(["a", "b"])).is_ok());
        assert!(pt.validate(&json!([1, 2])).is_err());
        assert!(pt.validate(&json!("not array")).is_err());
    }

    #[test]
    fn test_param_type_integer_rejects_float() {
        let err = ParamType::integer().validate(&json!(1.5)).unwrap_err();
        assert_eq!(err, "expected integer, got number");
    }

    #[test]
    fn test_param_type_integer_accepts_integer_like() {
        let ty = ParamType::integer();
        assert!(ty.validate(&json!("130000")).is_ok());
        assert!(ty.validate(&json!(42.0)).is_ok());
        assert!(ty.validate(&json!("forty")).is_err());

        let bounded = ParamType::Integer {
            minimum: Some(50),
            maximum: None,
        };
        assert_eq!(bounded.validate(&json!("10")).unwrap_err(), "10 is below minimum 50");
    }

    #[test]
    fn test_param_type_integer_accepts_full_u64_range() {
        let ty = ParamType::integer();
        assert!(ty.validate(&json!(u64::MAX)).is_ok());
        assert!(ty.validate(&json!(u64::MAX.to_string())).is_ok());
        assert!(ty.validate(&json!(i64::MIN)).is_ok());

        let bounded = ParamType::Integer {
            minimum: None,
            maximum: Some(i64::MAX),
        };
        assert_eq!(
            bounded.validate(&json!(u64::MAX)).unwrap_err(),
            format!("{} is above maximum {}", u64::MAX, i64::MAX)
        );
    }

    #[test]
    fn test_large_proposal_id_passes_catalog_validation() {
        let catalog = ToolCatalog::governance();
        let args = json!({ "proposal_id": u64::MAX });
        assert!(catalog.validate_args("add_proposal_id", &args).unwrap().is_empty());
        assert_eq!(crate::validation::normalize_proposal_id(&args).unwrap(), u64::MAX);
    }
}
