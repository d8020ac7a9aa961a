//! SQL query node executor
//!
//! Queries run through the [`QueryRunner`] seam so hosts and tests can
//! substitute their own backend. The production runner uses sqlx's Any
//! driver: the node's resolved `connectionString` URL selects the database,
//! and a fresh connection is opened per node and dropped when it finishes.

use std::sync::Once;

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use sqlx::any::AnyRow;
use sqlx::{AnyConnection, Column, Connection, Row};

use crate::context::ExecutionContext;
use crate::model::Node;
use crate::template::Resolver;
use crate::{EngineError, Result};

/// Runs a SQL query against a connection string, returning rows as JSON
/// objects keyed by lowercased column name
#[async_trait]
pub trait QueryRunner: Send + Sync {
    async fn run_query(
        &self,
        connection_string: &str,
        query: &str,
    ) -> Result<Vec<Map<String, Value>>>;
}

/// Production [`QueryRunner`] backed by sqlx's Any driver
pub struct SqlxQueryRunner;

impl SqlxQueryRunner {
    /// Create a runner, registering the compiled-in sqlx drivers on first use
    pub fn new() -> Self {
        static INSTALL_DRIVERS: Once = Once::new();
        INSTALL_DRIVERS.call_once(sqlx::any::install_default_drivers);
        Self
    }
}

impl Default for SqlxQueryRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QueryRunner for SqlxQueryRunner {
    async fn run_query(
        &self,
        connection_string: &str,
        query: &str,
    ) -> Result<Vec<Map<String, Value>>> {
        let mut conn = AnyConnection::connect(connection_string)
            .await
            .map_err(|e| EngineError::Action(format!("failed to connect to database: {e}")))?;

        let rows = sqlx::query(query)
            .fetch_all(&mut conn)
            .await
            .map_err(|e| EngineError::Action(format!("failed to execute query: {e}")))?;

        let mut results = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut object = Map::new();
            for (index, column) in row.columns().iter().enumerate() {
                object.insert(column.name().to_lowercase(), column_value(row, index));
            }
            results.push(object);
        }

        conn.close().await.ok();
        Ok(results)
    }
}

/// Decode one column into JSON, trying the scalar types the Any driver
/// supports in turn
fn column_value(row: &AnyRow, index: usize) -> Value {
    if let Ok(v) = row.try_get::<Option<i64>, _>(index) {
        return v.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<f64>, _>(index) {
        return v.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<bool>, _>(index) {
        return v.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<String>, _>(index) {
        return v.map(Value::from).unwrap_or(Value::Null);
    }
    Value::Null
}

/// Execute a `sqlQuery` node: resolve `query` and `connectionString`, run
/// the query, publish `{results, rowCount}`
pub async fn execute(
    node: &Node,
    ctx: &mut ExecutionContext,
    runner: &dyn QueryRunner,
) -> Result<()> {
    let params = Resolver::new(ctx).resolve_value(&node.parameters)?;
    let query = required_str(&params, "query", node)?;
    let connection_string = required_str(&params, "connectionString", node)?;

    let rows = runner.run_query(connection_string, query).await?;
    let result = json!({
        "results": rows,
        "rowCount": rows.len(),
    });
    ctx.record_result(&node.id, result);
    Ok(())
}

fn required_str<'p>(params: &'p Value, key: &str, node: &Node) -> Result<&'p str> {
    params.get(key).and_then(Value::as_str).ok_or_else(|| {
        EngineError::Action(format!(
            "sqlQuery node {} is missing a string '{key}' parameter",
            node.id
        ))
    })
}
