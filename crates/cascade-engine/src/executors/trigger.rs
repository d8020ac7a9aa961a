//! Trigger node executor

use serde_json::json;

use crate::context::ExecutionContext;
use crate::model::Node;
use crate::Result;

/// Publishes the caller-supplied trigger payload as the node's result.
/// Never fails.
pub fn execute(node: &Node, ctx: &mut ExecutionContext) -> Result<()> {
    let result = json!({ "triggerData": ctx.trigger_data().clone() });
    ctx.record_result(&node.id, result);
    Ok(())
}
