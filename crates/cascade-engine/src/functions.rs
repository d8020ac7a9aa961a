//! Helper functions backing the template pipeline
//!
//! These are the value transformations reachable through `| name:args` in a
//! template expression. Dispatch and argument handling live in
//! [`crate::template`]; the functions here are pure.

use serde_json::Value;

use crate::{EngineError, Result};

/// ISO alpha-3 code for a country name, matched case-insensitively on the
/// trimmed input. Unknown countries map to three spaces, not the empty
/// string.
pub fn country_to_alpha3(country: &str) -> &'static str {
    match country.trim().to_lowercase().as_str() {
        "united states" => "USA",
        "united kingdom" => "GBR",
        "germany" => "DEU",
        "france" => "FRA",
        "canada" => "CAN",
        "australia" => "AUS",
        "india" => "IND",
        "china" => "CHN",
        "japan" => "JPN",
        "brazil" => "BRA",
        "israel" => "IL",
        _ => "   ",
    }
}

/// First `max_len` bytes of a string, backing off to the nearest character
/// boundary. No-op when the string is already short enough.
pub fn truncate(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        return s;
    }
    let mut end = max_len;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Concatenate two strings with a single space, trimming the result
pub fn join(a: &str, b: &str) -> String {
    format!("{} {}", a, b).trim().to_string()
}

/// Coerce a value to a float: numbers pass through, the empty string is 0,
/// other strings are parsed. Anything else is a fatal mismatch.
pub fn to_number(value: &Value) -> Result<f64> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| EngineError::Resolver(format!("toNumber: unrepresentable number {n}"))),
        Value::String(s) if s.is_empty() => Ok(0.0),
        Value::String(s) => s
            .parse::<f64>()
            .map_err(|_| EngineError::Resolver(format!("toNumber: cannot parse '{s}' as a number"))),
        other => Err(EngineError::Resolver(format!(
            "toNumber: unsupported type {}",
            type_name(other)
        ))),
    }
}

/// Coerce a value to a boolean: booleans pass through, the empty string is
/// false, other strings accept the usual spellings (`true`/`false`, `t`/`f`,
/// `1`/`0`, any casing of `True`/`False`). Anything else is a fatal mismatch.
pub fn to_boolean(value: &Value) -> Result<bool> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::String(s) if s.is_empty() => Ok(false),
        Value::String(s) => match s.as_str() {
            "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
            "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
            _ => Err(EngineError::Resolver(format!(
                "toBoolean: cannot parse '{s}' as a boolean"
            ))),
        },
        other => Err(EngineError::Resolver(format!(
            "toBoolean: unsupported type {}",
            type_name(other)
        ))),
    }
}

fn type_name(value: &Value) -> &'static str {
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
    use serde_json::json;

    #[test]
    fn country_lookup_is_case_and_whitespace_insensitive() {
        assert_eq!(country_to_alpha3("Germany"), "DEU");
        assert_eq!(country_to_alpha3("  gErMaNy  "), "DEU");
        assert_eq!(country_to_alpha3("UNITED STATES"), "USA");
        assert_eq!(country_to_alpha3("israel"), "IL");
    }

    #[test]
    fn unknown_country_yields_three_spaces() {
        assert_eq!(country_to_alpha3("Atlantis"), "   ");
        assert_eq!(country_to_alpha3(""), "   ");
    }

    #[test]
    fn truncate_shortens_and_passes_through() {
        assert_eq!(truncate("DEU", 2), "DE");
        assert_eq!(truncate("DE", 10), "DE");
        assert_eq!(truncate("", 5), "");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        // 'é' is two bytes; cutting mid-character backs off to the boundary
        assert_eq!(truncate("été", 2), "é");
    }

    #[test]
    fn join_trims_around_missing_sides() {
        assert_eq!(join("John", "Doe"), "John Doe");
        assert_eq!(join("John", ""), "John");
        assert_eq!(join("", "Doe"), "Doe");
    }

    #[test]
    fn to_number_conversions() {
        assert_eq!(to_number(&json!(42)).unwrap(), 42.0);
        assert_eq!(to_number(&json!(4.5)).unwrap(), 4.5);
        assert_eq!(to_number(&json!("")).unwrap(), 0.0);
        assert_eq!(to_number(&json!("3.25")).unwrap(), 3.25);
        assert!(to_number(&json!("abc")).is_err());
        assert!(to_number(&json!([1])).is_err());
    }

    #[test]
    fn to_boolean_conversions() {
        assert!(to_boolean(&json!(true)).unwrap());
        assert!(!to_boolean(&json!("")).unwrap());
        assert!(to_boolean(&json!("true")).unwrap());
        assert!(to_boolean(&json!("1")).unwrap());
        assert!(!to_boolean(&json!("False")).unwrap());
        assert!(to_boolean(&json!("yes")).is_err());
        assert!(to_boolean(&json!(1)).is_err());
    }
}
