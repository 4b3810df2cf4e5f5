//! # Audit Log Repository
//!
//! Append-only audit trail. Rows are never updated or deleted.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use mercado_core::{AuditAction, AuditLogEntry};

const AUDIT_COLUMNS: &str = "id, actor, action, entity, entity_id, description, created_at";

#[derive(Debug, Clone)]
pub struct AuditRepository {
    pool: SqlitePool,
}

impl AuditRepository {
    pub fn new(pool: SqlitePool) -> Self {
        AuditRepository { pool }
    }

    /// Appends an audit entry.
    pub async fn append(&self, entry: &AuditLogEntry) -> DbResult<()> {
        debug!(
            actor = entry.actor_name(),
            action = ?entry.action,
            entity = %entry.entity,
            "Appending audit entry"
        );

        sqlx::query(
            r#"
            INSERT INTO audit_log (id, actor, action, entity, entity_id, description, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.actor)
        .bind(entry.action)
        .bind(&entry.entity)
        .bind(&entry.entity_id)
        .bind(&entry.description)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Lists the most recent entries, newest first.
    pub async fn list_recent(&self, limit: u32) -> DbResult<Vec<AuditLogEntry>> {
        let entries = sqlx::query_as::<_, AuditLogEntry>(&format!(
            "SELECT {AUDIT_COLUMNS} FROM audit_log ORDER BY created_at DESC LIMIT ?1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Lists entries for a given actor, newest first.
    pub async fn list_by_actor(&self, actor: &str, limit: u32) -> DbResult<Vec<AuditLogEntry>> {
        let entries = sqlx::query_as::<_, AuditLogEntry>(&format!(
            r#"
            SELECT {AUDIT_COLUMNS}
            FROM audit_log
            WHERE actor = ?1
            ORDER BY created_at DESC
            LIMIT ?2
            "#
        ))
        .bind(actor)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Lists entries for a given entity type ("Product", "Sale", ...),
    /// newest first.
    pub async fn list_by_entity(&self, entity: &str, limit: u32) -> DbResult<Vec<AuditLogEntry>> {
        let entries = sqlx::query_as::<_, AuditLogEntry>(&format!(
            r#"
            SELECT {AUDIT_COLUMNS}
            FROM audit_log
            WHERE entity = ?1
            ORDER BY created_at DESC
            LIMIT ?2
            "#
        ))
        .bind(entity)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Lists entries of a given action kind, newest first.
    pub async fn list_by_action(
        &self,
        action: AuditAction,
        limit: u32,
    ) -> DbResult<Vec<AuditLogEntry>> {
        let entries = sqlx::query_as::<_, AuditLogEntry>(&format!(
            r#"
            SELECT {AUDIT_COLUMNS}
            FROM audit_log
            WHERE action = ?1
            ORDER BY created_at DESC
            LIMIT ?2
            "#
        ))
        .bind(action)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Lists entries recorded in `[from, to)`, newest first.
    pub async fn list_between(
        &self,
        from: chrono::DateTime<chrono::Utc>,
        to: chrono::DateTime<chrono::Utc>,
    ) -> DbResult<Vec<AuditLogEntry>> {
        let entries = sqlx::query_as::<_, AuditLogEntry>(&format!(
            r#"
            SELECT {AUDIT_COLUMNS}
            FROM audit_log
            WHERE created_at >= ?1 AND created_at < ?2
            ORDER BY created_at DESC
            "#
        ))
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::Utc;
    use mercado_core::AuditAction;
    use uuid::Uuid;

    fn entry(actor: Option<&str>, action: AuditAction, description: &str) -> AuditLogEntry {
        AuditLogEntry {
            id: Uuid::new_v4().to_string(),
            actor: actor.map(str::to_string),
            action,
            entity: "Product".to_string(),
            entity_id: Some("p-1".to_string()),
            description: description.to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_append_and_list() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        db.audit()
            .append(&entry(Some("maria"), AuditAction::Create, "created product"))
            .await
            .unwrap();
        db.audit()
            .append(&entry(None, AuditAction::StockUpdated, "stock adjusted"))
            .await
            .unwrap();

        let recent = db.audit().list_recent(10).await.unwrap();
        assert_eq!(recent.len(), 2);

        let by_maria = db.audit().list_by_actor("maria", 10).await.unwrap();
        assert_eq!(by_maria.len(), 1);
        assert_eq!(by_maria[0].actor_name(), "maria");
        assert_eq!(by_maria[0].action, AuditAction::Create);

        // System entries display as "system"
        let system = recent
            .iter()
            .find(|e| e.actor.is_none())
            .expect("system entry");
        assert_eq!(system.actor_name(), "system");
    }

    #[tokio::test]
    async fn test_filtered_queries() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        db.audit()
            .append(&entry(Some("maria"), AuditAction::Create, "created"))
            .await
            .unwrap();
        db.audit()
            .append(&entry(Some("joao"), AuditAction::Delete, "deactivated"))
            .await
            .unwrap();

        let creates = db.audit().list_by_action(AuditAction::Create, 10).await.unwrap();
        assert_eq!(creates.len(), 1);
        assert_eq!(creates[0].actor_name(), "maria");

        let products = db.audit().list_by_entity("Product", 10).await.unwrap();
        assert_eq!(products.len(), 2);

        let now = Utc::now();
        let hour = chrono::Duration::hours(1);
        assert_eq!(db.audit().list_between(now - hour, now + hour).await.unwrap().len(), 2);
        assert!(db.audit().list_between(now + hour, now + hour * 2).await.unwrap().is_empty());
    }
}
