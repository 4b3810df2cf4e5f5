//! # Receiving Service
//!
//! Goods receipts from suppliers.
//!
//! A receipt is built in memory like a sale cart, then committed once:
//! the commit increments stock for every line and overwrites each
//! product's unit cost with the receipt's cost (last-purchase-price
//! policy). A receipt can only be committed once.

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::DbError;
use crate::pool::Database;
use crate::services::error::{ServiceError, ServiceResult};
use mercado_core::{
    AuditAction, AuditLogEntry, CoreError, Money, Purchase, Session,
};

/// Service for receiving goods from suppliers.
#[derive(Debug, Clone)]
pub struct ReceivingService {
    db: Database,
}

impl ReceivingService {
    pub fn new(db: Database) -> Self {
        ReceivingService { db }
    }

    /// Starts a new receipt against an active supplier.
    pub async fn begin_receipt(
        &self,
        session: &Session,
        supplier_id: &str,
        invoice_number: Option<String>,
    ) -> ServiceResult<Purchase> {
        let supplier = self
            .db
            .suppliers()
            .get_by_id(supplier_id)
            .await?
            .filter(|s| s.is_active)
            .ok_or_else(|| DbError::not_found("Supplier", supplier_id))?;

        let mut purchase = Purchase::new(supplier.id, Some(session.user_id.clone()));
        purchase.invoice_number = invoice_number;
        Ok(purchase)
    }

    /// Adds a product to the receipt by barcode.
    ///
    /// Duplicate barcodes merge into one line; the latest unit cost wins.
    pub async fn add_item(
        &self,
        purchase: &mut Purchase,
        barcode: &str,
        quantity: i64,
        unit_cost: Money,
    ) -> ServiceResult<()> {
        let product = self
            .db
            .products()
            .get_by_barcode(barcode)
            .await?
            .ok_or_else(|| ServiceError::Core(CoreError::ProductNotFound(barcode.to_string())))?;
        purchase.add_line(&product, quantity, unit_cost)?;
        Ok(())
    }

    /// Commits the receipt: applies stock increments and cost updates
    /// atomically, then persists the receipt.
    pub async fn commit(&self, session: &Session, purchase: &mut Purchase) -> ServiceResult<()> {
        purchase.commit()?;

        if let Err(err) = self.db.purchases().insert_committed(purchase).await {
            // Nothing was persisted; allow the caller to fix and retry.
            purchase.committed_at = None;
            return Err(err.into());
        }

        info!(
            purchase_id = %purchase.id,
            total_cents = purchase.total_cents,
            "Receipt committed"
        );
        self.audit(session, purchase).await;

        Ok(())
    }

    /// Best-effort audit append; failures are logged, never propagated.
    async fn audit(&self, session: &Session, purchase: &Purchase) {
        let entry = AuditLogEntry {
            id: Uuid::new_v4().to_string(),
            actor: Some(session.user_name.clone()),
            action: AuditAction::StockUpdated,
            entity: "Purchase".to_string(),
            entity_id: Some(purchase.id.clone()),
            description: format!(
                "receipt committed: {} lines, total {}",
                purchase.lines.len(),
                Money::from_cents(purchase.total_cents)
            ),
            created_at: Utc::now(),
        };

        if let Err(err) = self.db.audit().append(&entry).await {
            warn!(error = %err, purchase_id = %purchase.id, "Audit write failed");
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
