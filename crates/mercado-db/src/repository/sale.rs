//! # Sale Repository
//!
//! Persistence for finalized and cancelled sales.
//!
//! ## Atomic Finalize
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN TRANSACTION                                                      │
//! │       │                                                                 │
//! │       ├── INSERT sale row                                               │
//! │       │                                                                 │
//! │       ├── For each line (in insertion order):                           │
//! │       │      INSERT sale_items row                                      │
//! │       │      UPDATE products SET stock_qty = stock_qty - qty            │
//! │       │             WHERE id = ? AND stock_qty >= qty                   │
//! │       │      rows_affected == 0 → StockConflict → ROLLBACK everything   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  COMMIT  (sale + items + all decrements, or none of them)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Open carts live in memory as `mercado_core::Sale`; nothing is written
//! until the sale is finalized or cancelled.

use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::product::ProductRepository;
use mercado_core::{Sale, SaleLine, SaleStatus};

const SALE_COLUMNS: &str = "id, status, discount_bps, subtotal_cents, discount_cents, \
     total_cents, payment_method, amount_paid_cents, change_cents, user_id, notes, \
     created_at, finalized_at";

const LINE_COLUMNS: &str = "product_id, barcode_snapshot AS barcode, name_snapshot AS name, \
     unit_price_cents, quantity, discount_cents, subtotal_cents";

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Persists a finalized sale and decrements stock, atomically.
    ///
    /// Every line's decrement is guarded; if any product lacks stock the
    /// whole transaction rolls back and `DbError::StockConflict` names the
    /// losing product. The caller is expected to return the in-memory sale
    /// to its open state (`Sale::rollback_finalize`).
    pub async fn insert_finalized(&self, sale: &Sale) -> DbResult<()> {
        debug!(sale_id = %sale.id, lines = sale.lines.len(), "Persisting finalized sale");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO sales
                (id, status, discount_bps, subtotal_cents, discount_cents, total_cents,
                 payment_method, amount_paid_cents, change_cents, user_id, notes,
                 created_at, finalized_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
        )
        .bind(&sale.id)
        .bind(sale.status)
        .bind(sale.discount_bps)
        .bind(sale.subtotal_cents)
        .bind(sale.discount_cents)
        .bind(sale.total_cents)
        .bind(sale.payment_method)
        .bind(sale.amount_paid_cents)
        .bind(sale.change_cents)
        .bind(&sale.user_id)
        .bind(&sale.notes)
        .bind(sale.created_at)
        .bind(sale.finalized_at)
        .execute(&mut *tx)
        .await?;

        for (position, line) in sale.lines.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO sale_items
                    (id, sale_id, product_id, barcode_snapshot, name_snapshot,
                     unit_price_cents, quantity, discount_cents, subtotal_cents, position)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&sale.id)
            .bind(&line.product_id)
            .bind(&line.barcode)
            .bind(&line.name)
            .bind(line.unit_price_cents)
            .bind(line.quantity)
            .bind(line.discount_cents)
            .bind(line.subtotal_cents)
            .bind(position as i64)
            .execute(&mut *tx)
            .await?;

            // The `?` on StockConflict drops `tx`, which rolls back the
            // sale row and every item inserted so far.
            ProductRepository::try_decrement_stock(&mut *tx, &line.product_id, line.quantity)
                .await?;
        }

        tx.commit().await?;

        info!(sale_id = %sale.id, total_cents = sale.total_cents, "Sale persisted");
        Ok(())
    }

    /// Persists a cancelled sale for record keeping.
    ///
    /// Cancellation never touches stock: open carts only reserve stock
    /// logically, the decrement happens at finalize.
    pub async fn insert_cancelled(&self, sale: &Sale) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO sales
                (id, status, discount_bps, subtotal_cents, discount_cents, total_cents,
                 payment_method, amount_paid_cents, change_cents, user_id, notes,
                 created_at, finalized_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
        )
        .bind(&sale.id)
        .bind(sale.status)
        .bind(sale.discount_bps)
        .bind(sale.subtotal_cents)
        .bind(sale.discount_cents)
        .bind(sale.total_cents)
        .bind(sale.payment_method)
        .bind(sale.amount_paid_cents)
        .bind(sale.change_cents)
        .bind(&sale.user_id)
        .bind(&sale.notes)
        .bind(sale.created_at)
        .bind(sale.finalized_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Cancels a persisted FINALIZED sale (back-office reversal).
    ///
    /// The status flips to CANCELLED but stock is NOT returned; inventory
    /// corrections after a reversal are a separate, explicit adjustment.
    /// Only finalized sales qualify, so an unknown id and an
    /// already-cancelled sale both come back as `NotFound`.
    pub async fn cancel(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE sales SET status = ?1 WHERE id = ?2 AND status = ?3",
        )
        .bind(SaleStatus::Cancelled)
        .bind(id)
        .bind(SaleStatus::Finalized)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale", id));
        }

        info!(sale_id = %id, "Finalized sale cancelled");
        Ok(())
    }

    /// Gets a sale by ID with its lines in insertion order.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(mut sale) = sale else {
            return Ok(None);
        };

        sale.lines = self.load_lines(id).await?;
        Ok(Some(sale))
    }

    /// Lists sales created in `[from, to)`, newest first, lines included.
    pub async fn list_between(
        &self,
        from: chrono::DateTime<chrono::Utc>,
        to: chrono::DateTime<chrono::Utc>,
    ) -> DbResult<Vec<Sale>> {
        let mut sales = sqlx::query_as::<_, Sale>(&format!(
            r#"
            SELECT {SALE_COLUMNS}
            FROM sales
            WHERE created_at >= ?1 AND created_at < ?2
            ORDER BY created_at DESC
            "#
        ))
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        for sale in &mut sales {
            sale.lines = self.load_lines(&sale.id).await?;
        }
        Ok(sales)
    }

    async fn load_lines(&self, sale_id: &str) -> DbResult<Vec<SaleLine>> {
        let lines = sqlx::query_as::<_, SaleLine>(&format!(
            "SELECT {LINE_COLUMNS} FROM sale_items WHERE sale_id = ?1 ORDER BY position"
        ))
        .bind(sale_id)
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
    use crate::test_support::{sample_product, seed_category};
    use mercado_core::{Money, PaymentMethod};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn finalized_sale(products: &[(&mercado_core::Product, i64)]) -> Sale {
        let mut sale = Sale::new(None);
        for (product, qty) in products {
            sale.add_line(product, *qty).unwrap();
        }
        sale.finalize(PaymentMethod::Cash, Money::from_cents(1_000_000))
            .unwrap();
        sale
    }

    #[tokio::test]
    async fn test_finalize_decrements_stock() {
        let db = test_db().await;
        seed_category(&db, "cat-1").await;

        let product = sample_product("cat-1", "100", 10);
        db.products().insert(&product).await.unwrap();

        let sale = finalized_sale(&[(&product, 3)]);
        db.sales().insert_finalized(&sale).await.unwrap();

        let after = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(after.stock_qty, 7);

        let persisted = db.sales().get_by_id(&sale.id).await.unwrap().unwrap();
        assert_eq!(persisted.status, SaleStatus::Finalized);
        assert_eq!(persisted.lines.len(), 1);
        assert_eq!(persisted.lines[0].quantity, 3);
        assert_eq!(persisted.lines[0].barcode, "100");
    }

    #[tokio::test]
    async fn test_stock_conflict_rolls_back_everything() {
        let db = test_db().await;
        seed_category(&db, "cat-1").await;

        // First product has plenty, second has too little. The core-side
        // check passed when the lines were added (stock was 5 then), but
        // the database is the source of truth at finalize time.
        let plenty = sample_product("cat-1", "200", 10);
        let mut scarce = sample_product("cat-1", "300", 5);
        db.products().insert(&plenty).await.unwrap();
        db.products().insert(&scarce).await.unwrap();

        let mut sale = Sale::new(None);
        sale.add_line(&plenty, 2).unwrap();
        sale.add_line(&scarce, 5).unwrap();
        sale.finalize(PaymentMethod::Pix, Money::from_cents(1_000_000))
            .unwrap();

        // Someone else bought the scarce product in the meantime.
        db.products().adjust_stock(&scarce.id, -3).await.unwrap();
        scarce.stock_qty = 2;

        let err = db.sales().insert_finalized(&sale).await.unwrap_err();
        assert!(matches!(err, DbError::StockConflict { requested: 5, .. }));

        // Full rollback: no sale row, no items, and the first product's
        // stock untouched.
        assert!(db.sales().get_by_id(&sale.id).await.unwrap().is_none());
        let p = db.products().get_by_id(&plenty.id).await.unwrap().unwrap();
        assert_eq!(p.stock_qty, 10);

        // Core-side recovery path.
        sale.rollback_finalize();
        assert_eq!(sale.status, SaleStatus::Open);
        assert!(sale.payment_method.is_none());
    }

    #[tokio::test]
    async fn test_cancelled_sale_keeps_stock() {
        let db = test_db().await;
        seed_category(&db, "cat-1").await;

        let product = sample_product("cat-1", "400", 10);
        db.products().insert(&product).await.unwrap();

        let mut sale = Sale::new(None);
        sale.add_line(&product, 4).unwrap();
        sale.cancel().unwrap();
        db.sales().insert_cancelled(&sale).await.unwrap();

        let after = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(after.stock_qty, 10);

        let persisted = db.sales().get_by_id(&sale.id).await.unwrap().unwrap();
        assert_eq!(persisted.status, SaleStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_cancel_flips_finalized_sale_without_restock() {
        let db = test_db().await;
        seed_category(&db, "cat-1").await;

        let product = sample_product("cat-1", "600", 10);
        db.products().insert(&product).await.unwrap();

        let sale = finalized_sale(&[(&product, 4)]);
        db.sales().insert_finalized(&sale).await.unwrap();

        db.sales().cancel(&sale.id).await.unwrap();

        let persisted = db.sales().get_by_id(&sale.id).await.unwrap().unwrap();
        assert_eq!(persisted.status, SaleStatus::Cancelled);

        // The decrement from finalize stands; the reversal is bookkeeping,
        // not a restock.
        let after = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(after.stock_qty, 6);

        // A cancelled sale cannot be cancelled again, and unknown ids
        // surface the same way.
        let err = db.sales().cancel(&sale.id).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
        let err = db.sales().cancel("no-such-sale").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_between_filters_by_created_at() {
        let db = test_db().await;
        seed_category(&db, "cat-1").await;

        let product = sample_product("cat-1", "500", 100);
        db.products().insert(&product).await.unwrap();

        let sale = finalized_sale(&[(&product, 1)]);
        db.sales().insert_finalized(&sale).await.unwrap();

        let now = chrono::Utc::now();
        let hour = chrono::Duration::hours(1);

        let hits = db.sales().list_between(now - hour, now + hour).await.unwrap();
        assert_eq!(hits.len(), 1);

        let misses = db.sales().list_between(now + hour, now + hour * 2).await.unwrap();
        assert!(misses.is_empty());
    }
}
