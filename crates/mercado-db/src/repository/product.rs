//! # Product Repository
//!
//! Database operations for the product catalog and stock ledger.
//!
//! ## Key Operations
//! - CRUD with soft delete
//! - Barcode lookup (the hot path at the register)
//! - Guarded stock decrement for sale finalization
//!
//! ## Guarded Decrement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  UPDATE products                                                        │
//! │  SET stock_qty = stock_qty - ?2                                         │
//! │  WHERE id = ?1 AND stock_qty >= ?2                                      │
//! │                                                                         │
//! │  rows_affected == 1  → decrement applied                                │
//! │  rows_affected == 0  → a concurrent sale got there first                │
//! │                        → DbError::StockConflict, caller rolls back      │
//! │                                                                         │
//! │  The WHERE guard makes check-and-decrement a single atomic statement;   │
//! │  stock can never go negative no matter how the writes interleave.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use mercado_core::Product;

const PRODUCT_COLUMNS: &str = "id, barcode, name, category_id, cost_cents, price_cents, \
     stock_qty, min_stock_qty, unit, is_active, created_at, updated_at";

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let product = repo.get_by_barcode("7891000100103").await?;
/// let low = repo.list_low_stock().await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Inserts a new product.
    ///
    /// The UNIQUE index on `barcode` surfaces as `DbError::UniqueViolation`.
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(barcode = %product.barcode, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products
                (id, barcode, name, category_id, cost_cents, price_cents,
                 stock_qty, min_stock_qty, unit, is_active, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&product.id)
        .bind(&product.barcode)
        .bind(&product.name)
        .bind(&product.category_id)
        .bind(product.cost_cents)
        .bind(product.price_cents)
        .bind(product.stock_qty)
        .bind(product.min_stock_qty)
        .bind(&product.unit)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates an existing product's editable fields.
    ///
    /// Stock is deliberately NOT updated here; stock movements go through
    /// the guarded decrement / increment paths so every change is either
    /// a sale, a receipt, or an explicit adjustment.
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET barcode = ?2,
                name = ?3,
                category_id = ?4,
                cost_cents = ?5,
                price_cents = ?6,
                min_stock_qty = ?7,
                unit = ?8,
                is_active = ?9,
                updated_at = ?10
            WHERE id = ?1
            "#,
        )
        .bind(&product.id)
        .bind(&product.barcode)
        .bind(&product.name)
        .bind(&product.category_id)
        .bind(product.cost_cents)
        .bind(product.price_cents)
        .bind(product.min_stock_qty)
        .bind(&product.unit)
        .bind(product.is_active)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }
        Ok(())
    }

    /// Gets a product by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product by its barcode.
    ///
    /// This is the register hot path; `barcode` carries a UNIQUE index.
    pub async fn get_by_barcode(&self, barcode: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE barcode = ?1"
        ))
        .bind(barcode)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// True when any product (active or not) carries this barcode.
    ///
    /// Used for duplicate checks before insert; soft-deleted products
    /// still hold their barcode.
    pub async fn exists_by_barcode(&self, barcode: &str) -> DbResult<bool> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE barcode = ?1")
                .bind(barcode)
                .fetch_one(&self.pool)
                .await?;
        Ok(count > 0)
    }

    /// Searches active products by name or barcode prefix.
    pub async fn search(&self, query: &str, limit: u32) -> DbResult<Vec<Product>> {
        let query = query.trim();

        debug!(query = %query, limit = %limit, "Searching products");

        if query.is_empty() {
            return self.list_active(limit).await;
        }

        let pattern = format!("%{query}%");
        let prefix = format!("{query}%");

        let products = sqlx::query_as::<_, Product>(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM products
            WHERE is_active = 1
              AND (name LIKE ?1 OR barcode LIKE ?2)
            ORDER BY name
            LIMIT ?3
            "#
        ))
        .bind(pattern)
        .bind(prefix)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        debug!(count = products.len(), "Search returned products");
        Ok(products)
    }

    /// Lists active products sorted by name.
    pub async fn list_active(&self, limit: u32) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM products
            WHERE is_active = 1
            ORDER BY name
            LIMIT ?1
            "#
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Counts all products, active or not.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Lists active products at or below their minimum stock level.
    pub async fn list_low_stock(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM products
            WHERE is_active = 1
              AND stock_qty <= min_stock_qty
            ORDER BY stock_qty ASC, name
            "#
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Soft-deletes (deactivates) a product.
    ///
    /// Sold products keep their snapshots in `sale_items`, so the catalog
    /// row only needs to stop matching lookups.
    pub async fn set_active(&self, id: &str, active: bool) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE products SET is_active = ?2, updated_at = ?3 WHERE id = ?1",
        )
        .bind(id)
        .bind(active)
        .bind(chrono::Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }
        Ok(())
    }

    /// Manually adjusts stock by a signed delta (inventory correction).
    ///
    /// Negative deltas are guarded the same way sale decrements are.
    pub async fn adjust_stock(&self, id: &str, delta: i64) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET stock_qty = stock_qty + ?2, updated_at = ?3
            WHERE id = ?1 AND stock_qty + ?2 >= 0
            "#,
        )
        .bind(id)
        .bind(delta)
        .bind(chrono::Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            if self.get_by_id(id).await?.is_none() {
                return Err(DbError::not_found("Product", id));
            }
            return Err(DbError::StockConflict {
                product_id: id.to_string(),
                requested: -delta,
            });
        }
        Ok(())
    }

    /// Guarded stock decrement, for use inside a finalize transaction.
    ///
    /// Zero rows affected means the guard rejected the decrement; the
    /// caller must roll back the enclosing transaction.
    pub(crate) async fn try_decrement_stock(
        conn: &mut SqliteConnection,
        product_id: &str,
        quantity: i64,
    ) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET stock_qty = stock_qty - ?2, updated_at = ?3
            WHERE id = ?1 AND stock_qty >= ?2
            "#,
        )
        .bind(product_id)
        .bind(quantity)
        .bind(chrono::Utc::now())
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::StockConflict {
                product_id: product_id.to_string(),
                requested: quantity,
            });
        }
        Ok(())
    }

    /// Stock increment + cost overwrite, for use inside a receipt transaction.
    ///
    /// Last-purchase-price policy: the product's unit cost is replaced by
    /// the cost on the incoming receipt line.
    pub(crate) async fn receive_stock(
        conn: &mut SqliteConnection,
        product_id: &str,
        quantity: i64,
        unit_cost_cents: i64,
    ) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET stock_qty = stock_qty + ?2,
                cost_cents = ?3,
                updated_at = ?4
            WHERE id = ?1
            "#,
        )
        .bind(product_id)
        .bind(quantity)
        .bind(unit_cost_cents)
        .bind(chrono::Utc::now())
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", product_id));
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
