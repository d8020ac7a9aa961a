//! Conditional node executor
//!
//! An `if` node carries `conditions.number`, an array of
//! `{value1, operation, value2}` triples combined with short-circuit OR.
//! `value1` is resolved through the template resolver; both sides are then
//! compared numerically. Triples whose operands fail to parse are skipped.

use serde_json::{json, Value};

use crate::context::ExecutionContext;
use crate::model::Node;
use crate::template::{render, Resolver};
use crate::Result;

/// Execute an `if` node, publishing `{conditionResult: bool}`
pub fn execute(node: &Node, ctx: &mut ExecutionContext) -> Result<()> {
    let outcome = evaluate(node, ctx)?;
    ctx.record_result(&node.id, json!({ "conditionResult": outcome }));
    Ok(())
}

/// True if any triple holds. Malformed or unparseable triples never make
/// the node fail; they simply do not match.
fn evaluate(node: &Node, ctx: &ExecutionContext) -> Result<bool> {
    let resolver = Resolver::new(ctx);
    let triples = node
        .parameters
        .get("conditions")
        .and_then(|c| c.get("number"))
        .and_then(Value::as_array);
    let Some(triples) = triples else {
        return Ok(false);
    };

    for triple in triples {
        let Some(triple) = triple.as_object() else {
            continue;
        };
        let Some(value1) = triple.get("value1") else {
            continue;
        };
        let Some(operation) = triple.get("operation").and_then(Value::as_str) else {
            continue;
        };

        let resolved = resolver.resolve_value(value1)?;
        let Ok(left) = render(&resolved).parse::<f64>() else {
            continue;
        };
        let right = triple.get("value2").map(render).unwrap_or_default();
        let Ok(right) = right.parse::<f64>() else {
            continue;
        };

        let holds = match operation {
            "equals" => left == right,
            "greater" => left > right,
            "less" => left < right,
            _ => false,
        };
        if holds {
            return Ok(true);
        }
    }
    Ok(false)
}
