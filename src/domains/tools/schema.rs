//! Parameter schemas and argument validation.
//!
//! Every tool declares its parameters explicitly as a list of [`ParamSpec`].
//! The same list validates inbound arguments and renders the JSON Schema
//! advertised to clients, so the two can never drift apart.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;

use super::error::ToolError;

// ============================================================================
// Parameter Declarations
// ============================================================================

/// Semantic type of a tool parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Boolean,
    Integer,
    Number,
}

impl ParamType {
    /// JSON Schema type name.
    pub fn json_type(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Number => "number",
        }
    }

    /// Coerce a JSON value into this type, or `None` if it cannot be.
    fn coerce(self, value: &Value) -> Option<Value> {
        match (self, value) {
            (Self::String, Value::String(_)) => Some(value.clone()),
            (Self::Boolean, Value::Bool(_)) => Some(value.clone()),
            (Self::Boolean, Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Some(Value::Bool(true)),
                "false" | "0" => Some(Value::Bool(false)),
                _ => None,
            },
            (Self::Integer, Value::Number(n)) => {
                if let Some(i) = n.as_i64() {
                    Some(json!(i))
                } else {
                    n.as_f64()
                        .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                        .map(|f| json!(f as i64))
                }
            }
            (Self::Integer, Value::String(s)) => s.trim().parse::<i64>().ok().map(|i| json!(i)),
            (Self::Number, Value::Number(_)) => Some(value.clone()),
            (Self::Number, Value::String(s)) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(|f| json!(f)),
            _ => None,
        }
    }
}

/// Declaration of one tool parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    /// Parameter name, as used in the argument map.
    pub name: String,

    /// Semantic type.
    #[serde(rename = "type")]
    pub ty: ParamType,

    /// Whether the caller must supply the parameter.
    pub required: bool,

    /// Value used when an optional parameter is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    /// Human-readable description.
    #[serde(default)]
    pub description: String,
}

impl ParamSpec {
    /// Declare a required parameter.
    pub fn required(name: impl Into<String>, ty: ParamType, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty,
            required: true,
            default: None,
            description: description.into(),
        }
    }

    /// Declare an optional parameter with no default.
    pub fn optional(name: impl Into<String>, ty: ParamType, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty,
            required: false,
            default: None,
            description: description.into(),
        }
    }

    /// Attach a default value to an optional parameter.
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }
}

/// Check a parameter list against the tool contract.
pub(crate) fn check_params(params: &[ParamSpec]) -> Result<(), ToolError> {
    let mut seen = std::collections::HashSet::new();
    for param in params {
        if param.name.trim().is_empty() {
            return Err(ToolError::invalid_descriptor("parameter name must not be empty"));
        }
        if !seen.insert(param.name.as_str()) {
            return Err(ToolError::invalid_descriptor(format!(
                "duplicate parameter '{}'",
                param.name
            )));
        }
        if param.required && param.default.is_some() {
            return Err(ToolError::invalid_descriptor(format!(
                "required parameter '{}' cannot declare a default",
                param.name
            )));
        }
        if let Some(default) = &param.default {
            if param.ty.coerce(default).is_none() {
                return Err(ToolError::invalid_descriptor(format!(
                    "default for '{}' is not a valid {}",
                    param.name,
                    param.ty.json_type()
                )));
            }
        }
    }
    Ok(())
}

/// Render a parameter list as a JSON Schema object.
pub fn input_schema(params: &[ParamSpec]) -> Map<String, Value> {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for param in params {
        let mut prop = Map::new();
        prop.insert("type".into(), json!(param.ty.json_type()));
        if !param.description.is_empty() {
            prop.insert("description".into(), json!(param.description));
        }
        if let Some(default) = &param.default {
            prop.insert("default".into(), default.clone());
        }
        properties.insert(param.name.clone(), Value::Object(prop));

        if param.required {
            required.push(json!(param.name));
        }
    }

    let mut schema = Map::new();
    schema.insert("type".into(), json!("object"));
    schema.insert("properties".into(), Value::Object(properties));
    schema.insert("required".into(), Value::Array(required));
    schema.insert("additionalProperties".into(), json!(false));
    schema
}

// ============================================================================
// Validated Arguments
// ============================================================================

/// Arguments after validation and coercion.
///
/// Every declared parameter that is present (or defaulted) holds a value of
/// its declared type, so the typed accessors only fail on programming errors
/// inside a handler, which they report as `InvalidArguments`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolArgs {
    values: BTreeMap<String, Value>,
}

impl ToolArgs {
    /// Raw access to a value.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// A required string parameter.
    pub fn string(&self, name: &str) -> Result<String, ToolError> {
        self.opt_string(name)?
            .ok_or_else(|| ToolError::invalid_arguments(format!("missing parameter '{}'", name)))
    }

    /// An optional string parameter.
    pub fn opt_string(&self, name: &str) -> Result<Option<String>, ToolError> {
        match self.values.get(name) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(type_mismatch(name, ParamType::String)),
        }
    }

    /// A boolean parameter, `false` when absent.
    pub fn flag(&self, name: &str) -> Result<bool, ToolError> {
        match self.values.get(name) {
            None => Ok(false),
            Some(Value::Bool(b)) => Ok(*b),
            Some(_) => Err(type_mismatch(name, ParamType::Boolean)),
        }
    }

    /// An optional integer parameter.
    pub fn opt_i64(&self, name: &str) -> Result<Option<i64>, ToolError> {
        match self.values.get(name) {
            None => Ok(None),
            Some(v) => v
                .as_i64()
                .map(Some)
                .ok_or_else(|| type_mismatch(name, ParamType::Integer)),
        }
    }

    /// An optional floating point parameter.
    pub fn opt_f64(&self, name: &str) -> Result<Option<f64>, ToolError> {
        match self.values.get(name) {
            None => Ok(None),
            Some(v) => v
                .as_f64()
                .map(Some)
                .ok_or_else(|| type_mismatch(name, ParamType::Number)),
        }
    }

    /// Number of values held.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no values are held.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<const N: usize> From<[(&str, Value); N]> for ToolArgs {
    fn from(pairs: [(&str, Value); N]) -> Self {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        }
    }
}

fn type_mismatch(name: &str, ty: ParamType) -> ToolError {
    ToolError::invalid_arguments(format!("parameter '{}' is not a {}", name, ty.json_type()))
}

/// Validate a loosely-typed argument value against a parameter list.
///
/// Unknown keys are rejected. `null` counts as absent. All problems are
/// collected and reported in a single `InvalidArguments` error.
pub fn validate_arguments(params: &[ParamSpec], arguments: &Value) -> Result<ToolArgs, ToolError> {
    let empty = Map::new();
    let supplied = match arguments {
        Value::Null => &empty,
        Value::Object(map) => map,
        other => {
            return Err(ToolError::invalid_arguments(format!(
                "arguments must be an object, got {}",
                json_kind(other)
            )));
        }
    };

    let mut values = BTreeMap::new();
    let mut missing = Vec::new();
    let mut invalid = Vec::new();

    for param in params {
        match supplied.get(&param.name).filter(|v| !v.is_null()) {
            Some(value) => match param.ty.coerce(value) {
                Some(coerced) => {
                    values.insert(param.name.clone(), coerced);
                }
                None => invalid.push(format!(
                    "'{}' expected {}, got {}",
                    param.name,
                    param.ty.json_type(),
                    json_kind(value)
                )),
            },
            None if param.required => missing.push(param.name.as_str()),
            None => {
                if let Some(default) = &param.default {
                    if let Some(coerced) = param.ty.coerce(default) {
                        values.insert(param.name.clone(), coerced);
                    }
                }
            }
        }
    }

    let mut unknown: Vec<&str> = supplied
        .keys()
        .filter(|key| !params.iter().any(|p| &p.name == *key))
        .map(String::as_str)
        .collect();
    unknown.sort_unstable();

    let mut problems = Vec::new();
    if !missing.is_empty() {
        problems.push(format!("missing required parameter(s): {}", missing.join(", ")));
    }
    if !invalid.is_empty() {
        problems.push(format!("invalid value(s): {}", invalid.join(", ")));
    }
    if !unknown.is_empty() {
        problems.push(format!("unknown parameter(s): {}", unknown.join(", ")));
    }

    if problems.is_empty() {
        Ok(ToolArgs { values })
    } else {
        Err(ToolError::invalid_arguments(problems.join("; ")))
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan_params() -> Vec<ParamSpec> {
        vec![
            ParamSpec::required("ip", ParamType::String, "Target"),
            ParamSpec::optional("port", ParamType::String, "Ports"),
            ParamSpec::optional("os_detection", ParamType::Boolean, "OS detection")
                .with_default(json!(false)),
            ParamSpec::optional("retries", ParamType::Integer, "Retries"),
        ]
    }

    #[test]
    fn test_validate_applies_defaults() {
        let args = validate_arguments(&scan_params(), &json!({ "ip": "10.0.0.1" })).unwrap();
        assert_eq!(args.string("ip").unwrap(), "10.0.0.1");
        assert_eq!(args.opt_string("port").unwrap(), None);
        assert!(!args.flag("os_detection").unwrap());
        assert_eq!(args.opt_i64("retries").unwrap(), None);
    }

    #[test]
    fn test_validate_coerces_strings() {
        let args = validate_arguments(
            &scan_params(),
            &json!({ "ip": "h", "os_detection": "true", "retries": "3" }),
        )
        .unwrap();
        assert!(args.flag("os_detection").unwrap());
        assert_eq!(args.opt_i64("retries").unwrap(), Some(3));
    }

    #[test]
    fn test_number_accepts_numeric_strings() {
        let params = vec![ParamSpec::required("ratio", ParamType::Number, "Ratio")];
        let args = validate_arguments(&params, &json!({ "ratio": "0.25" })).unwrap();
        assert_eq!(args.opt_f64("ratio").unwrap(), Some(0.25));

        let args = validate_arguments(&params, &json!({ "ratio": 3 })).unwrap();
        assert_eq!(args.opt_f64("ratio").unwrap(), Some(3.0));

        assert!(validate_arguments(&params, &json!({ "ratio": "NaN" })).is_err());
    }

    #[test]
    fn test_validate_integral_float_is_integer() {
        let args = validate_arguments(&scan_params(), &json!({ "ip": "h", "retries": 2.0 })).unwrap();
        assert_eq!(args.opt_i64("retries").unwrap(), Some(2));

        let err = validate_arguments(&scan_params(), &json!({ "ip": "h", "retries": 2.5 }))
            .unwrap_err();
        assert!(err.to_string().contains("retries"));
    }

    #[test]
    fn test_validate_reports_every_problem() {
        let err = validate_arguments(
            &scan_params(),
            &json!({ "os_detection": "maybe", "colour": "blue" }),
        )
        .unwrap_err();

        let ToolError::InvalidArguments(msg) = err else {
            panic!("expected InvalidArguments");
        };
        assert!(msg.contains("missing required parameter(s): ip"));
        assert!(msg.contains("'os_detection' expected boolean"));
        assert!(msg.contains("unknown parameter(s): colour"));
    }

    #[test]
    fn test_null_is_absent() {
        let args = validate_arguments(&scan_params(), &json!({ "ip": "h", "port": null })).unwrap();
        assert_eq!(args.opt_string("port").unwrap(), None);

        let err = validate_arguments(&scan_params(), &json!({ "ip": null })).unwrap_err();
        assert!(err.to_string().contains("missing required parameter(s): ip"));
    }

    #[test]
    fn test_non_object_arguments_rejected() {
        let err = validate_arguments(&scan_params(), &json!(["10.0.0.1"])).unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));

        // null arguments behave like an empty map
        let params = vec![ParamSpec::optional("x", ParamType::Number, "")];
        assert!(validate_arguments(&params, &Value::Null).unwrap().is_empty());
    }

    #[test]
    fn test_check_params_rejects_contract_violations() {
        let dup = vec![
            ParamSpec::required("a", ParamType::String, ""),
            ParamSpec::optional("a", ParamType::String, ""),
        ];
        assert!(check_params(&dup).is_err());

        let bad_default =
            vec![ParamSpec::optional("a", ParamType::Boolean, "").with_default(json!("nope"))];
        assert!(check_params(&bad_default).is_err());

        let required_default =
            vec![ParamSpec::required("a", ParamType::Integer, "").with_default(json!(1))];
        assert!(check_params(&required_default).is_err());

        assert!(check_params(&scan_params()).is_ok());
    }

    #[test]
    fn test_input_schema_shape() {
        let schema = input_schema(&scan_params());
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["required"], json!(["ip"]));
        assert_eq!(schema["properties"]["os_detection"]["type"], "boolean");
        assert_eq!(schema["properties"]["os_detection"]["default"], json!(false));
        assert_eq!(schema["properties"]["retries"]["type"], "integer");
    }
}
