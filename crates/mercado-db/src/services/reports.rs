//! # Reports Service
//!
//! Read-only aggregation queries for management screens.
//!
//! Reports return raw data rows; formatting and rendering belong to the
//! caller. Only finalized sales count toward revenue.

use sqlx::FromRow;
use serde::Serialize;

use crate::error::{DbError, DbResult};
use crate::pool::Database;
use mercado_core::{Product, Sale};

/// Totals over the finalized sales of a period.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SalesSummary {
    pub sales_count: i64,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
}

/// A best-selling product over a period.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TopProduct {
    pub product_id: String,
    pub name: String,
    pub quantity_sold: i64,
    pub revenue_cents: i64,
}

/// Service for report queries.
#[derive(Debug, Clone)]
pub struct ReportsService {
    db: Database,
}

impl ReportsService {
    pub fn new(db: Database) -> Self {
        ReportsService { db }
    }

    /// Totals for finalized sales created in `[from, to)`.
    pub async fn sales_summary(
        &self,
        from: chrono::DateTime<chrono::Utc>,
        to: chrono::DateTime<chrono::Utc>,
    ) -> DbResult<SalesSummary> {
        let summary = sqlx::query_as::<_, SalesSummary>(
            r#"
            SELECT
                COUNT(*) AS sales_count,
                COALESCE(SUM(subtotal_cents), 0) AS subtotal_cents,
                COALESCE(SUM(discount_cents), 0) AS discount_cents,
                COALESCE(SUM(total_cents), 0) AS total_cents
            FROM sales
            WHERE status = 'finalized'
              AND created_at >= ?1 AND created_at < ?2
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_one(self.db.pool())
        .await?;

        Ok(summary)
    }

    /// Best-selling products in `[from, to)` by quantity, ties broken by
    /// revenue. Uses the name snapshot, so renamed products report under
    /// the name they were sold as.
    pub async fn top_products(
        &self,
        from: chrono::DateTime<chrono::Utc>,
        to: chrono::DateTime<chrono::Utc>,
        limit: u32,
    ) -> DbResult<Vec<TopProduct>> {
        let rows = sqlx::query_as::<_, TopProduct>(
            r#"
            SELECT
                i.product_id AS product_id,
                i.name_snapshot AS name,
                SUM(i.quantity) AS quantity_sold,
                SUM(i.subtotal_cents) AS revenue_cents
            FROM sale_items i
            INNER JOIN sales s ON s.id = i.sale_id
            WHERE s.status = 'finalized'
              AND s.created_at >= ?1 AND s.created_at < ?2
            GROUP BY i.product_id, i.name_snapshot
            ORDER BY quantity_sold DESC, revenue_cents DESC
            LIMIT ?3
            "#,
        )
        .bind(from)
        .bind(to)
        .bind(limit)
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows)
    }

    /// Full sale records (with lines) for a period, newest first.
    ///
    /// Includes cancelled sales; callers filter on status as needed.
    pub async fn sales_for_period(
        &self,
        from: chrono::DateTime<chrono::Utc>,
        to: chrono::DateTime<chrono::Utc>,
    ) -> DbResult<Vec<Sale>> {
        self.db.sales().list_between(from, to).await
    }

    /// One sale with its lines in insertion order, for receipt rendering.
    pub async fn receipt(&self, sale_id: &str) -> DbResult<Sale> {
        self.db
            .sales()
            .get_by_id(sale_id)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", sale_id))
    }

    /// Active products at or below their minimum stock level.
    pub async fn low_stock(&self) -> DbResult<Vec<Product>> {
        self.db.products().list_low_stock().await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::DbConfig;
    use crate::services::CheckoutService;
    use crate::test_support::{sample_product, seed_category, test_session};
    use chrono::{Duration, Utc};
    use mercado_core::{Money, PaymentMethod};

    #[tokio::test]
    async fn test_summary_and_top_products_count_only_finalized() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        seed_category(&db, "cat-1").await;
        let checkout = CheckoutService::new(db.clone());
        let reports = ReportsService::new(db.clone());
        let session = test_session();

        let mut coffee = sample_product("cat-1", "c-1", 100);
        coffee.name = "Cafe".to_string();
        coffee.price_cents = 1000;
        db.products().insert(&coffee).await.unwrap();

        let mut rice = sample_product("cat-1", "r-1", 100);
        rice.name = "Arroz".to_string();
        rice.price_cents = 2000;
        db.products().insert(&rice).await.unwrap();

        // Finalized: 3 coffee + 1 rice
        let mut sale = checkout.begin_sale(&session);
        checkout.add_item(&mut sale, "c-1", 3).await.unwrap();
        checkout.add_item(&mut sale, "r-1", 1).await.unwrap();
        checkout
            .finalize(&session, &mut sale, PaymentMethod::Cash, Money::from_cents(10_000))
            .await
            .unwrap();

        // Cancelled: must not count
        let mut cancelled = checkout.begin_sale(&session);
        checkout.add_item(&mut cancelled, "r-1", 50).await.unwrap();
        checkout.cancel(&session, &mut cancelled).await.unwrap();

        let now = Utc::now();
        let window = (now - Duration::hours(1), now + Duration::hours(1));

        let summary = reports.sales_summary(window.0, window.1).await.unwrap();
        assert_eq!(summary.sales_count, 1);
        assert_eq!(summary.total_cents, 5000);

        let top = reports.top_products(window.0, window.1, 10).await.unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].name, "Cafe");
        assert_eq!(top[0].quantity_sold, 3);
        assert_eq!(top[0].revenue_cents, 3000);
        assert_eq!(top[1].name, "Arroz");
        assert_eq!(top[1].revenue_cents, 2000);
    }

    #[tokio::test]
    async fn test_low_stock_report() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        seed_category(&db, "cat-1").await;
        let reports = ReportsService::new(db.clone());

        let mut low = sample_product("cat-1", "l-1", 1);
        low.min_stock_qty = 10;
        db.products().insert(&low).await.unwrap();

        let list = reports.low_stock().await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].barcode, "l-1");
    }
}
