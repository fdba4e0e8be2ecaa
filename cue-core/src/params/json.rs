//! Structured-object stage.

use serde_json::Value;

use crate::error::CueError;
use crate::params::ParamMap;

/// Parse `raw` as JSON.
///
/// Objects map key to value. Arrays map element index to value. Any other
/// document parses successfully to an empty map. String values are taken
/// verbatim; everything else becomes its compact JSON text.
pub fn parse(raw: &str) -> Result<ParamMap, CueError> {
    let document: Value = serde_json::from_str(raw)?;
    let params = match document {
        Value::Object(fields) => fields
            .into_iter()
            .map(|(key, value)| (key, render(value)))
            .collect(),
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, value)| (index.to_string(), render(value)))
            .collect(),
        _ => ParamMap::new(),
    };
    Ok(params)
}

fn render(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_of_strings() {
        let params = parse(r#"{"f0":"Alice","f1":"Producer"}"#).unwrap();
        assert_eq!(params["f0"], "Alice");
        assert_eq!(params["f1"], "Producer");
    }

    #[test]
    fn non_string_values_are_rendered() {
        let params = parse(r#"{"n":3,"b":true,"z":null,"list":[1,"a"]}"#).unwrap();
        assert_eq!(params["n"], "3");
        assert_eq!(params["b"], "true");
        assert_eq!(params["z"], "null");
        assert_eq!(params["list"], r#"[1,"a"]"#);
    }

    #[test]
    fn array_keys_are_indices() {
        let params = parse(r#"["first","second"]"#).unwrap();
        assert_eq!(params["0"], "first");
        assert_eq!(params["1"], "second");
    }

    #[test]
    fn bare_scalar_succeeds_empty() {
        assert!(parse("42").unwrap().is_empty());
        assert!(parse(r#""text""#).unwrap().is_empty());
    }

    #[test]
    fn malformed_is_an_error() {
        assert!(matches!(parse("{\"f0\":"), Err(CueError::Json(_))));
        assert!(parse("").is_err());
        assert!(parse("<root/>").is_err());
    }
}
