//! Workflow document store
//!
//! Documents are stored verbatim as JSON text keyed by caller-chosen id.
//! Saving is an upsert; `created_at` survives updates.

use chrono::Utc;
use serde_json::Value;

use crate::db::connection::DatabasePool;
use crate::db::error::StoreError;

/// Repository for workflow documents
pub struct WorkflowStore;

impl WorkflowStore {
    /// Insert or update a workflow document under the given id.
    /// Rejects documents without a top-level `workflow` key.
    pub async fn save(pool: &DatabasePool, id: &str, document: &Value) -> Result<(), StoreError> {
        if document.get("workflow").is_none() {
            return Err(StoreError::MissingWorkflowField);
        }

        let text = serde_json::to_string(document)?;
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT INTO workflows (id, document, created_at, updated_at)
             VALUES (?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                 document = excluded.document,
                 updated_at = excluded.updated_at",
        )
        .bind(id)
        .bind(&text)
        .bind(&now)
        .bind(&now)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Fetch a workflow document by id
    pub async fn get(pool: &DatabasePool, id: &str) -> Result<Value, StoreError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT document FROM workflows WHERE id = ?")
                .bind(id)
                .fetch_optional(pool)
                .await?;

        match row {
            Some((text,)) => Ok(serde_json::from_str(&text)?),
            None => Err(StoreError::NotFound(id.to_string())),
        }
    }

    /// Delete a workflow document by id
    pub async fn delete(pool: &DatabasePool, id: &str) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM workflows WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    /// All stored workflow ids, oldest first
    pub async fn list_ids(pool: &DatabasePool) -> Result<Vec<String>, StoreError> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT id FROM workflows ORDER BY created_at, id")
                .fetch_all(pool)
                .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::DatabaseConnection;
    use serde_json::json;

    async fn setup_db() -> DatabaseConnection {
        let db = DatabaseConnection::new("sqlite::memory:").await.unwrap();
        db.init_schema().await.unwrap();
        db
    }

    fn document(name: &str) -> Value {
        json!({"workflow": {"name": name}, "nodes": [], "connections": []})
    }

    #[tokio::test]
    async fn save_then_get_round_trips() {
        let db = setup_db().await;
        let doc = document("Round trip");

        WorkflowStore::save(db.pool(), "w1", &doc).await.unwrap();
        let fetched = WorkflowStore::get(db.pool(), "w1").await.unwrap();

        assert_eq!(fetched, doc);
    }

    #[tokio::test]
    async fn save_is_an_upsert() {
        let db = setup_db().await;

        WorkflowStore::save(db.pool(), "w1", &document("v1")).await.unwrap();
        WorkflowStore::save(db.pool(), "w1", &document("v2")).await.unwrap();

        let fetched = WorkflowStore::get(db.pool(), "w1").await.unwrap();
        assert_eq!(fetched["workflow"]["name"], json!("v2"));
        assert_eq!(
            WorkflowStore::list_ids(db.pool()).await.unwrap(),
            vec!["w1".to_string()]
        );
    }

    #[tokio::test]
    async fn save_rejects_documents_without_workflow_field() {
        let db = setup_db().await;
        let err = WorkflowStore::save(db.pool(), "w1", &json!({"nodes": []}))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::MissingWorkflowField));
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let db = setup_db().await;
        assert!(WorkflowStore::get(db.pool(), "ghost")
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn delete_removes_and_reports_missing() {
        let db = setup_db().await;
        WorkflowStore::save(db.pool(), "w1", &document("doomed")).await.unwrap();

        WorkflowStore::delete(db.pool(), "w1").await.unwrap();
        assert!(WorkflowStore::get(db.pool(), "w1")
            .await
            .unwrap_err()
            .is_not_found());
        assert!(WorkflowStore::delete(db.pool(), "w1")
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn list_ids_returns_everything() {
        let db = setup_db().await;
        WorkflowStore::save(db.pool(), "a", &document("a")).await.unwrap();
        WorkflowStore::save(db.pool(), "b", &document("b")).await.unwrap();

        let ids = WorkflowStore::list_ids(db.pool()).await.unwrap();
        assert_eq!(ids, vec!["a".to_string(), "b".to_string()]);
    }
}
