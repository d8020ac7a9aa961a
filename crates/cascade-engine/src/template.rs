//! Template expression resolution
//!
//! Node parameters may embed `{{ … }}` expressions. An expression is a base
//! reference (`config.<key>`, `$node['<id>'].<path>`, or literal text)
//! optionally piped through named functions: `{{ base | func:arg | func }}`.
//! Resolution walks a JSON tree and rewrites every string in place; text
//! outside placeholders is preserved.

use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::context::ExecutionContext;
use crate::functions;
use crate::{EngineError, Result};

/// Resolves template expressions against a live execution context
pub struct Resolver<'a> {
    context: &'a ExecutionContext,
    placeholder: Regex,
    node_ref: Regex,
    indexed_segment: Regex,
}

impl<'a> Resolver<'a> {
    /// Create a resolver over the given context
    pub fn new(context: &'a ExecutionContext) -> Self {
        Self {
            context,
            placeholder: Regex::new(r"\{\{(.*?)\}\}").unwrap(),
            node_ref: Regex::new(r"^\$node\['([^']+)'\]\.(.+)$").unwrap(),
            indexed_segment: Regex::new(r#"^([^\[]+)\[['"]?([^\]'"]+)['"]?\]$"#).unwrap(),
        }
    }

    /// Resolve every template expression inside a JSON tree, returning a
    /// structurally identical tree. Non-string scalars pass through.
    pub fn resolve_value(&self, value: &Value) -> Result<Value> {
        match value {
            Value::String(s) => Ok(Value::String(self.resolve_string(s)?)),
            Value::Object(map) => {
                let mut resolved = serde_json::Map::with_capacity(map.len());
                for (key, val) in map {
                    resolved.insert(key.clone(), self.resolve_value(val)?);
                }
                Ok(Value::Object(resolved))
            }
            Value::Array(items) => {
                let mut resolved = Vec::with_capacity(items.len());
                for item in items {
                    resolved.push(self.resolve_value(item)?);
                }
                Ok(Value::Array(resolved))
            }
            other => Ok(other.clone()),
        }
    }

    /// Rewrite each `{{ … }}` occurrence in a string; surrounding text is
    /// kept verbatim.
    pub fn resolve_string(&self, template: &str) -> Result<String> {
        let mut out = String::with_capacity(template.len());
        let mut last = 0;
        for captures in self.placeholder.captures_iter(template) {
            let whole = captures.get(0).expect("match always has group 0");
            let inner = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
            out.push_str(&template[last..whole.start()]);
            let value = self.resolve_expression(inner)?;
            out.push_str(&render(&value));
            last = whole.end();
        }
        out.push_str(&template[last..]);
        Ok(out)
    }

    /// Evaluate one expression: base reference, then the function pipeline
    /// left to right.
    fn resolve_expression(&self, expression: &str) -> Result<Value> {
        let mut parts = expression.split('|');
        let base = parts.next().unwrap_or_default().trim();
        let mut value = self.resolve_base(base);
        debug!(base, value = %value, "resolved template base");
        for call in parts {
            value = self.apply_function(call, value)?;
        }
        Ok(value)
    }

    /// Evaluate a base reference. `config.<key>` reads the config map
    /// (missing keys yield null); `$node['<id>'].<path>` traverses a prior
    /// node result; anything else is literal text. A reference to a node
    /// that has not executed resolves to the reference itself.
    fn resolve_base(&self, expression: &str) -> Value {
        if let Some(key) = expression.strip_prefix("config.") {
            return self
                .context
                .config(key)
                .cloned()
                .unwrap_or(Value::Null);
        }

        if expression.starts_with("$node['") {
            let Some(captures) = self.node_ref.captures(expression) else {
                return Value::String(expression.to_string());
            };
            let node_id = &captures[1];
            let path = &captures[2];
            return match self.context.node_result(node_id) {
                Some(result) => self.traverse(result, path),
                None => Value::String(expression.to_string()),
            };
        }

        Value::String(expression.to_string())
    }

    /// Follow a dotted path into a result tree. Dotted segments index object
    /// keys; `field[0]` indexes into an array field, `field['key']` into an
    /// object field. A segment that cannot be followed resolves to its own
    /// literal text.
    fn traverse(&self, data: &Value, path: &str) -> Value {
        let mut current = data;
        for segment in path.split('.') {
            if current.is_null() {
                return Value::Null;
            }

            if let Some(captures) = self.indexed_segment.captures(segment) {
                let field = &captures[1];
                let key = &captures[2];
                let Some(field_value) = current.as_object().and_then(|map| map.get(field)) else {
                    return Value::String(segment.to_string());
                };
                match field_value {
                    Value::Array(items) => {
                        let Some(item) = key.parse::<usize>().ok().and_then(|i| items.get(i))
                        else {
                            return Value::String(segment.to_string());
                        };
                        current = item;
                    }
                    Value::Object(map) => {
                        let Some(item) = map.get(key) else {
                            return Value::String(segment.to_string());
                        };
                        current = item;
                    }
                    _ => return Value::String(segment.to_string()),
                }
            } else {
                let Some(next) = current.as_object().and_then(|map| map.get(segment)) else {
                    return Value::String(segment.to_string());
                };
                current = next;
            }
        }
        current.clone()
    }

    /// Apply one pipeline function call (`name` or `name:arg1,arg2`) to the
    /// current value. Unknown names are fatal.
    fn apply_function(&self, call: &str, value: Value) -> Result<Value> {
        let call = call.trim();
        let (name, args) = match call.split_once(':') {
            Some((name, raw)) => (
                name.trim(),
                raw.split(',').map(|a| a.trim().to_string()).collect(),
            ),
            None => (call, Vec::new()),
        };

        match name {
            "countryToAlpha3" => Ok(match value {
                Value::String(s) => Value::String(functions::country_to_alpha3(&s).to_string()),
                other => other,
            }),
            "truncate" => {
                let max_len = single_arg(name, &args)?.parse::<usize>().map_err(|_| {
                    EngineError::Resolver(format!("truncate: invalid length '{}'", args[0]))
                })?;
                Ok(match value {
                    Value::String(s) => Value::String(functions::truncate(&s, max_len).to_string()),
                    other => other,
                })
            }
            "join" => {
                let arg = self.resolve_base(single_arg(name, &args)?);
                Ok(match (value, arg) {
                    (Value::String(a), Value::String(b)) => {
                        Value::String(functions::join(&a, &b))
                    }
                    (other, _) => other,
                })
            }
            "toNumber" => functions::to_number(&value).map(float_value),
            "toBoolean" => functions::to_boolean(&value).map(Value::Bool),
            "defaultIfEmpty" => {
                let fallback = single_arg(name, &args)?;
                Ok(match value {
                    Value::Null => Value::String(fallback.to_string()),
                    Value::String(s) if s.is_empty() => Value::String(fallback.to_string()),
                    other => other,
                })
            }
            other => Err(EngineError::Resolver(format!("unknown function: {other}"))),
        }
    }
}

/// JSON number for a coerced float, collapsing integral values so they
/// render without a trailing `.0`
fn float_value(n: f64) -> Value {
    if n.fract() == 0.0 && (i64::MIN as f64..=i64::MAX as f64).contains(&n) {
        Value::Number(serde_json::Number::from(n as i64))
    } else {
        serde_json::Number::from_f64(n)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

fn single_arg<'v>(name: &str, args: &'v [String]) -> Result<&'v str> {
    match args {
        [arg] => Ok(arg.as_str()),
        _ => Err(EngineError::Resolver(format!(
            "{name} requires exactly one argument, got {}",
            args.len()
        ))),
    }
}

/// Textual rendering of a resolved value when spliced into a string: strings
/// verbatim, null as empty, other scalars via their JSON form, composites as
/// compact JSON.
pub(crate) fn render(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}
