//! # Checkout Service
//!
//! The sale lifecycle at the register.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  begin_sale() ─────────► Sale (in memory, OPEN)                         │
//! │       │                                                                 │
//! │  scan + add_item ──────► snapshot price/name, merge duplicates,         │
//! │       │                  re-check stock on the merged quantity          │
//! │       │                                                                 │
//! │  finalize ─────────────► core validates payment, then ONE transaction   │
//! │       │                  persists sale + items + stock decrements       │
//! │       │                                                                 │
//! │       ├── StockConflict? rollback tx, sale returns to OPEN, the         │
//! │       │                  cashier removes the offending item and retries │
//! │       ▼                                                                 │
//! │  change returned to cashier                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::DbError;
use crate::pool::Database;
use crate::services::error::{ServiceError, ServiceResult};
use mercado_core::{
    AuditAction, AuditLogEntry, CoreError, Money, PaymentMethod, Product, Sale, SaleStatus,
    Session,
};

/// Service for running sales at the register.
#[derive(Debug, Clone)]
pub struct CheckoutService {
    db: Database,
}

impl CheckoutService {
    pub fn new(db: Database) -> Self {
        CheckoutService { db }
    }

    /// Starts a new open sale for the session's user.
    pub fn begin_sale(&self, session: &Session) -> Sale {
        Sale::new(Some(session.user_id.clone()))
    }

    /// Looks up a product by barcode for the register.
    ///
    /// Unknown barcodes surface as a domain error, not a database one:
    /// from the cashier's point of view "no such product" is a scan
    /// problem, not a system problem.
    pub async fn scan(&self, barcode: &str) -> ServiceResult<Product> {
        self.db
            .products()
            .get_by_barcode(barcode)
            .await?
            .ok_or_else(|| ServiceError::Core(CoreError::ProductNotFound(barcode.to_string())))
    }

    /// Scans a barcode and adds the product to the sale.
    ///
    /// Duplicate barcodes merge into the existing line; the stock check
    /// runs against the merged quantity.
    pub async fn add_item(
        &self,
        sale: &mut Sale,
        barcode: &str,
        quantity: i64,
    ) -> ServiceResult<()> {
        let product = self.scan(barcode).await?;
        sale.add_line(&product, quantity)?;
        Ok(())
    }

    /// Finalizes the sale: validates payment, persists atomically,
    /// decrements stock. Returns the change due.
    ///
    /// On a stock conflict the sale is returned to its open state so the
    /// cashier can fix the cart and retry; nothing was persisted.
    pub async fn finalize(
        &self,
        session: &Session,
        sale: &mut Sale,
        method: PaymentMethod,
        amount_paid: Money,
    ) -> ServiceResult<Money> {
        let change = sale.finalize(method, amount_paid)?;

        if let Err(err) = self.db.sales().insert_finalized(sale).await {
            sale.rollback_finalize();
            if let DbError::StockConflict { product_id, requested } = &err {
                warn!(
                    sale_id = %sale.id,
                    product_id = %product_id,
                    requested = requested,
                    "Stock conflict at finalize; sale reopened"
                );
            }
            return Err(err.into());
        }

        info!(
            sale_id = %sale.id,
            total_cents = sale.total_cents,
            change_cents = change.cents(),
            "Sale finalized"
        );
        self.audit(
            session,
            AuditAction::SaleFinalized,
            &sale.id,
            format!(
                "sale finalized: {} items, total {}",
                sale.lines.len(),
                Money::from_cents(sale.total_cents)
            ),
        )
        .await;

        Ok(change)
    }

    /// Cancels the sale and records it. Stock is untouched.
    ///
    /// An open cart is cancelled in place and written out once for record
    /// keeping. A sale that was already finalized and persisted is flipped
    /// to CANCELLED by a back-office update instead; the stock decrement
    /// from finalize stands.
    pub async fn cancel(&self, session: &Session, sale: &mut Sale) -> ServiceResult<()> {
        if sale.status == SaleStatus::Finalized {
            self.db.sales().cancel(&sale.id).await?;
            sale.status = SaleStatus::Cancelled;
        } else {
            sale.cancel()?;
            self.db.sales().insert_cancelled(sale).await?;
        }

        self.audit(
            session,
            AuditAction::SaleCancelled,
            &sale.id,
            "sale cancelled".to_string(),
        )
        .await;

        Ok(())
    }

    /// Best-effort audit append; failures are logged, never propagated.
    async fn audit(&self, session: &Session, action: AuditAction, sale_id: &str, description: String) {
        let entry = AuditLogEntry {
            id: Uuid::new_v4().to_string(),
            actor: Some(session.user_name.clone()),
            action,
            entity: "Sale".to_string(),
            entity_id: Some(sale_id.to_string()),
            description,
            created_at: Utc::now(),
        };

        if let Err(err) = self.db.audit().append(&entry).await {
            warn!(error = %err, sale_id = %sale_id, "Audit write failed");
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::DbConfig;
    use crate::test_support::{sample_product, seed_category, test_session};
    use mercado_core::SaleStatus;

    async fn setup() -> (Database, CheckoutService, Session) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        seed_category(&db, "cat-1").await;
        let service = CheckoutService::new(db.clone());
        (db, service, test_session())
    }

    #[tokio::test]
    async fn test_full_checkout_flow() {
        let (db, service, session) = setup().await;

        let mut product = sample_product("cat-1", "7891000100103", 10);
        product.price_cents = 550;
        db.products().insert(&product).await.unwrap();

        let mut sale = service.begin_sale(&session);
        service.add_item(&mut sale, "7891000100103", 2).await.unwrap();
        // Same barcode again: merges to quantity 3
        service.add_item(&mut sale, "7891000100103", 1).await.unwrap();
        assert_eq!(sale.lines.len(), 1);
        assert_eq!(sale.lines[0].quantity, 3);

        let change = service
            .finalize(&session, &mut sale, PaymentMethod::Cash, Money::from_cents(2000))
            .await
            .unwrap();
        // 3 × 550 = 1650; paid 2000 → change 350
        assert_eq!(change.cents(), 350);

        let after = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(after.stock_qty, 7);

        let audit = db.audit().list_recent(10).await.unwrap();
        assert!(audit.iter().any(|e| e.action == AuditAction::SaleFinalized));
    }

    #[tokio::test]
    async fn test_unknown_barcode_is_domain_error() {
        let (_db, service, session) = setup().await;

        let mut sale = service.begin_sale(&session);
        let err = service.add_item(&mut sale, "000", 1).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Core(CoreError::ProductNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_stock_conflict_reopens_sale() {
        let (db, service, session) = setup().await;

        let product = sample_product("cat-1", "111", 5);
        db.products().insert(&product).await.unwrap();

        let mut sale = service.begin_sale(&session);
        service.add_item(&mut sale, "111", 5).await.unwrap();

        // Concurrent sale drains the stock before finalize.
        db.products().adjust_stock(&product.id, -4).await.unwrap();

        let err = service
            .finalize(&session, &mut sale, PaymentMethod::Pix, Money::from_cents(100_000))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Db(DbError::StockConflict { .. })));

        // Back to open; cashier can fix the quantity and retry.
        assert_eq!(sale.status, SaleStatus::Open);
        let fresh = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        sale.set_line_quantity(&fresh, 1).unwrap();
        service
            .finalize(&session, &mut sale, PaymentMethod::Pix, Money::from_cents(100_000))
            .await
            .unwrap();

        let after = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(after.stock_qty, 0);
    }

    #[tokio::test]
    async fn test_cancel_after_finalize_flips_persisted_sale() {
        let (db, service, session) = setup().await;

        let product = sample_product("cat-1", "333", 10);
        db.products().insert(&product).await.unwrap();

        let mut sale = service.begin_sale(&session);
        service.add_item(&mut sale, "333", 4).await.unwrap();
        service
            .finalize(&session, &mut sale, PaymentMethod::CreditCard, Money::from_cents(100_000))
            .await
            .unwrap();

        // Back-office reversal of the already-persisted sale.
        service.cancel(&session, &mut sale).await.unwrap();
        assert_eq!(sale.status, SaleStatus::Cancelled);

        let persisted = db.sales().get_by_id(&sale.id).await.unwrap().unwrap();
        assert_eq!(persisted.status, SaleStatus::Cancelled);

        // The finalize-time decrement is not undone.
        let after = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(after.stock_qty, 6);

        let audit = db.audit().list_recent(10).await.unwrap();
        assert!(audit.iter().any(|e| e.action == AuditAction::SaleCancelled));
    }

    #[tokio::test]
    async fn test_audit_failure_does_not_unwind_finalize() {
        let (db, service, session) = setup().await;

        let product = sample_product("cat-1", "444", 5);
        db.products().insert(&product).await.unwrap();

        // Break the audit sink; the sale itself must still go through.
        sqlx::query("DROP TABLE audit_log")
            .execute(db.pool())
            .await
            .unwrap();

        let mut sale = service.begin_sale(&session);
        service.add_item(&mut sale, "444", 2).await.unwrap();
        service
            .finalize(&session, &mut sale, PaymentMethod::Cash, Money::from_cents(1000))
            .await
            .unwrap();

        let persisted = db.sales().get_by_id(&sale.id).await.unwrap().unwrap();
        assert_eq!(persisted.status, SaleStatus::Finalized);
        let after = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(after.stock_qty, 3);
    }

    #[tokio::test]
    async fn test_cancel_records_sale_without_stock_change() {
        let (db, service, session) = setup().await;

        let product = sample_product("cat-1", "222", 8);
        db.products().insert(&product).await.unwrap();

        let mut sale = service.begin_sale(&session);
        service.add_item(&mut sale, "222", 3).await.unwrap();
        service.cancel(&session, &mut sale).await.unwrap();

        let after = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(after.stock_qty, 8);

        let persisted = db.sales().get_by_id(&sale.id).await.unwrap().unwrap();
        assert_eq!(persisted.status, SaleStatus::Cancelled);
    }
}
