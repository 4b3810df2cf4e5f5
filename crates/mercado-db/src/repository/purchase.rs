//! # Purchase Repository
//!
//! Persistence for committed goods receipts.
//!
//! Committing a receipt is the mirror image of finalizing a sale: one
//! transaction inserts the purchase row and its items, increments stock
//! for every line, and overwrites each product's unit cost with the
//! latest receipt cost (last-purchase-price policy). Increments can't
//! conflict, so the only rollback causes are constraint violations and
//! missing products.

use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::DbResult;
use crate::repository::product::ProductRepository;
use mercado_core::{Purchase, PurchaseLine};

const PURCHASE_COLUMNS: &str =
    "id, supplier_id, invoice_number, total_cents, user_id, created_at, committed_at";

const LINE_COLUMNS: &str = "product_id, barcode_snapshot AS barcode, name_snapshot AS name, \
     unit_cost_cents, quantity, subtotal_cents";

/// Repository for purchase database operations.
#[derive(Debug, Clone)]
pub struct PurchaseRepository {
    pool: SqlitePool,
}

impl PurchaseRepository {
    /// Creates a new PurchaseRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PurchaseRepository { pool }
    }

    /// Persists a committed purchase, increments stock, updates costs.
    ///
    /// All-or-nothing: a missing product on any line rolls the whole
    /// receipt back.
    pub async fn insert_committed(&self, purchase: &Purchase) -> DbResult<()> {
        debug!(
            purchase_id = %purchase.id,
            lines = purchase.lines.len(),
            "Persisting committed purchase"
        );

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO purchases
                (id, supplier_id, invoice_number, total_cents, user_id, created_at, committed_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&purchase.id)
        .bind(&purchase.supplier_id)
        .bind(&purchase.invoice_number)
        .bind(purchase.total_cents)
        .bind(&purchase.user_id)
        .bind(purchase.created_at)
        .bind(purchase.committed_at)
        .execute(&mut *tx)
        .await?;

        for (position, line) in purchase.lines.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO purchase_items
                    (id, purchase_id, product_id, barcode_snapshot, name_snapshot,
                     unit_cost_cents, quantity, subtotal_cents, position)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&purchase.id)
            .bind(&line.product_id)
            .bind(&line.barcode)
            .bind(&line.name)
            .bind(line.unit_cost_cents)
            .bind(line.quantity)
            .bind(line.subtotal_cents)
            .bind(position as i64)
            .execute(&mut *tx)
            .await?;

            ProductRepository::receive_stock(
                &mut *tx,
                &line.product_id,
                line.quantity,
                line.unit_cost_cents,
            )
            .await?;
        }

        tx.commit().await?;

        info!(
            purchase_id = %purchase.id,
            total_cents = purchase.total_cents,
            "Purchase persisted"
        );
        Ok(())
    }

    /// Gets a purchase by ID with its lines in insertion order.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Purchase>> {
        let purchase = sqlx::query_as::<_, Purchase>(&format!(
            "SELECT {PURCHASE_COLUMNS} FROM purchases WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(mut purchase) = purchase else {
            return Ok(None);
        };

        purchase.lines = self.load_lines(id).await?;
        Ok(Some(purchase))
    }

    /// Lists purchases created in `[from, to)`, newest first.
    pub async fn list_between(
        &self,
        from: chrono::DateTime<chrono::Utc>,
        to: chrono::DateTime<chrono::Utc>,
    ) -> DbResult<Vec<Purchase>> {
        let mut purchases = sqlx::query_as::<_, Purchase>(&format!(
            r#"
            SELECT {PURCHASE_COLUMNS}
            FROM purchases
            WHERE created_at >= ?1 AND created_at < ?2
            ORDER BY created_at DESC
            "#
        ))
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        for purchase in &mut purchases {
            purchase.lines = self.load_lines(&purchase.id).await?;
        }
        Ok(purchases)
    }

    async fn load_lines(&self, purchase_id: &str) -> DbResult<Vec<PurchaseLine>> {
        let lines = sqlx::query_as::<_, PurchaseLine>(&format!(
            "SELECT {LINE_COLUMNS} FROM purchase_items WHERE purchase_id = ?1 ORDER BY position"
        ))
        .bind(purchase_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::test_support::{sample_product, sample_supplier, seed_category};
    use mercado_core::Money;

    #[tokio::test]
    async fn test_commit_increments_stock_and_overwrites_cost() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        seed_category(&db, "cat-1").await;

        let supplier = sample_supplier("Atacado Norte", "11.111.111/0001-11");
        db.suppliers().insert(&supplier).await.unwrap();

        let mut product = sample_product("cat-1", "900", 4);
        product.cost_cents = 300;
        db.products().insert(&product).await.unwrap();

        let mut purchase = Purchase::new(supplier.id.clone(), None);
        purchase
            .add_line(&product, 20, Money::from_cents(250))
            .unwrap();
        purchase.commit().unwrap();

        db.purchases().insert_committed(&purchase).await.unwrap();

        let after = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(after.stock_qty, 24);
        assert_eq!(after.cost_cents, 250);

        let persisted = db
            .purchases()
            .get_by_id(&purchase.id)
            .await
            .unwrap()
            .unwrap();
        assert!(persisted.committed_at.is_some());
        assert_eq!(persisted.lines.len(), 1);
        assert_eq!(persisted.total_cents, 5000);
    }

    #[tokio::test]
    async fn test_missing_product_rolls_back_receipt() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        seed_category(&db, "cat-1").await;

        let supplier = sample_supplier("Atacado Norte", "11.111.111/0001-11");
        db.suppliers().insert(&supplier).await.unwrap();

        let real = sample_product("cat-1", "901", 4);
        db.products().insert(&real).await.unwrap();

        // Second line references a product that was never persisted.
        let ghost = sample_product("cat-1", "902", 0);

        let mut purchase = Purchase::new(supplier.id.clone(), None);
        purchase.add_line(&real, 10, Money::from_cents(100)).unwrap();
        purchase.add_line(&ghost, 5, Money::from_cents(100)).unwrap();
        purchase.commit().unwrap();

        assert!(db.purchases().insert_committed(&purchase).await.is_err());

        // Rolled back: no purchase row, first product's stock untouched.
        assert!(db
            .purchases()
            .get_by_id(&purchase.id)
            .await
            .unwrap()
            .is_none());
        let after = db.products().get_by_id(&real.id).await.unwrap().unwrap();
        assert_eq!(after.stock_qty, 4);
    }
}
