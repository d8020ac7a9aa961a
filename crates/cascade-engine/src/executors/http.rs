//! HTTP request node executor
//!
//! Sends one HTTP request per execution and publishes the status, headers,
//! and body. JSON bodies are additionally parsed and their fields lifted
//! into the result so downstream templates can address them directly.

use reqwest::Method;
use serde_json::{Map, Value};

use crate::context::ExecutionContext;
use crate::model::Node;
use crate::template::{render, Resolver};
use crate::{EngineError, Result};

/// Execute an `httpRequest` node. The result is published even when the
/// response status is an error, after which the node fails.
pub async fn execute(
    node: &Node,
    ctx: &mut ExecutionContext,
    client: &reqwest::Client,
) -> Result<()> {
    let params = Resolver::new(ctx).resolve_value(&node.parameters)?;
    let url = required_str(&params, "url", node)?;
    let method_str = required_str(&params, "method", node)?;
    let method = Method::from_bytes(method_str.as_bytes())
        .map_err(|_| EngineError::Action(format!("invalid HTTP method '{method_str}'")))?;

    let mut request = client.request(method, url);
    if let Some(headers) = params.get("headers").and_then(Value::as_object) {
        for (name, value) in headers {
            request = request.header(name.as_str(), render(value));
        }
    }
    if let Some(body) = params.get("body") {
        request = request.json(body);
    }

    let response = request
        .send()
        .await
        .map_err(|e| EngineError::Action(format!("HTTP request failed: {e}")))?;
    let status = response.status().as_u16();

    let mut header_map = Map::new();
    for (name, value) in response.headers() {
        header_map.insert(
            name.to_string(),
            Value::String(String::from_utf8_lossy(value.as_bytes()).into_owned()),
        );
    }

    let body_text = response
        .text()
        .await
        .map_err(|e| EngineError::Action(format!("failed to read response body: {e}")))?;

    let mut result = Map::new();
    result.insert("httpStatusCode".to_string(), status.into());
    result.insert("headers".to_string(), Value::Object(header_map));
    result.insert("body".to_string(), Value::String(body_text.clone()));

    if let Ok(json_body) = serde_json::from_str::<Value>(&body_text) {
        result.insert("json".to_string(), json_body.clone());
        if let Value::Object(map) = &json_body {
            lift_fields(map, &mut result);
        }
    }

    ctx.record_result(&node.id, Value::Object(result));

    if status >= 400 {
        return Err(EngineError::Action(format!(
            "HTTP request failed with status {status}: {body_text}"
        )));
    }
    Ok(())
}

/// Lift fields of a parsed JSON object body to the top of the result map.
/// OData-style bodies with a `value` array instead publish `rowCount` and
/// the fields of the first row; `@odata.` annotations are dropped.
fn lift_fields(body: &Map<String, Value>, result: &mut Map<String, Value>) {
    match body.get("value") {
        Some(Value::Array(rows)) => {
            result.insert("rowCount".to_string(), rows.len().into());
            if let Some(Value::Object(first)) = rows.first() {
                for (key, value) in first {
                    result.insert(key.clone(), value.clone());
                }
            }
        }
        _ => {
            for (key, value) in body {
                if !key.starts_with("@odata.") {
                    result.insert(key.clone(), value.clone());
                }
            }
        }
    }
}

fn required_str<'p>(params: &'p Value, key: &str, node: &Node) -> Result<&'p str> {
    params.get(key).and_then(Value::as_str).ok_or_else(|| {
        EngineError::Action(format!(
            "httpRequest node {} is missing a string '{key}' parameter",
            node.id
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lift_odata_value_array() {
        let body = json!({"value": [{"a": 1, "b": 2}, {"a": 3}]});
        let mut result = Map::new();
        lift_fields(body.as_object().unwrap(), &mut result);

        assert_eq!(result["rowCount"], json!(2));
        assert_eq!(result["a"], json!(1));
        assert_eq!(result["b"], json!(2));
    }

    #[test]
    fn lift_plain_object_skips_odata_annotations() {
        let body = json!({"@odata.context": "meta", "total": 9, "status": "ok"});
        let mut result = Map::new();
        lift_fields(body.as_object().unwrap(), &mut result);

        assert!(!result.contains_key("@odata.context"));
        assert_eq!(result["total"], json!(9));
        assert_eq!(result["status"], json!("ok"));
    }

    #[test]
    fn empty_value_array_still_reports_row_count() {
        let body = json!({"value": []});
        let mut result = Map::new();
        lift_fields(body.as_object().unwrap(), &mut result);

        assert_eq!(result["rowCount"], json!(0));
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn non_array_value_field_is_lifted_as_is() {
        let body = json!({"value": "scalar", "other": 1});
        let mut result = Map::new();
        lift_fields(body.as_object().unwrap(), &mut result);

        assert_eq!(result["value"], json!("scalar"));
        assert_eq!(result["other"], json!(1));
        assert!(!result.contains_key("rowCount"));
    }
}
