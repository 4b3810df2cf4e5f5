//! # Purchase Aggregate (Goods Receipt)
//!
//! One goods-receipt transaction increasing stock.
//!
//! Mirrors the sale aggregate with two deliberate differences: there is no
//! discount or payment handling, and committing it *increments* stock
//! rather than decrementing it. A committed purchase also overwrites each
//! product's cost price with the line's unit cost - the last purchase
//! price becomes the new cost basis. That is a carried-over business
//! policy, not a defect.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::Product;

// =============================================================================
// Purchase Line
// =============================================================================

/// A line item in a goods receipt. Product snapshot frozen at add time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PurchaseLine {
    pub product_id: String,
    /// Barcode at time of adding (frozen). Lines are unique by barcode.
    pub barcode: String,
    pub name: String,
    /// Unit cost in centavos. Becomes the product's new cost price.
    pub unit_cost_cents: i64,
    /// Quantity received. Always > 0.
    pub quantity: i64,
    /// unit_cost × quantity.
    pub subtotal_cents: i64,
}

impl PurchaseLine {
    fn from_product(product: &Product, quantity: i64, unit_cost: Money) -> Self {
        let mut line = PurchaseLine {
            product_id: product.id.clone(),
            barcode: product.barcode.clone(),
            name: product.name.clone(),
            unit_cost_cents: unit_cost.cents(),
            quantity,
            subtotal_cents: 0,
        };
        line.recompute();
        line
    }

    #[inline]
    pub fn recompute(&mut self) {
        self.subtotal_cents = self.unit_cost_cents * self.quantity;
    }

    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }
}

// =============================================================================
// Purchase
// =============================================================================

/// One goods-receipt transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Purchase {
    pub id: String,
    pub supplier_id: String,
    /// Invoice (nota fiscal) number, when the supplier provided one.
    pub invoice_number: Option<String>,

    /// Ordered line items. Loaded separately by the persistence layer.
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub lines: Vec<PurchaseLine>,

    /// Sum of line subtotals.
    pub total_cents: i64,

    /// User who registered the receipt.
    pub user_id: Option<String>,

    pub created_at: DateTime<Utc>,
    /// Set exactly once, by `commit`.
    pub committed_at: Option<DateTime<Utc>>,
}

impl Purchase {
    /// Creates a new uncommitted purchase for the given supplier.
    pub fn new(supplier_id: impl Into<String>, user_id: Option<String>) -> Self {
        Purchase {
            id: Uuid::new_v4().to_string(),
            supplier_id: supplier_id.into(),
            invoice_number: None,
            lines: Vec::new(),
            total_cents: 0,
            user_id,
            created_at: Utc::now(),
            committed_at: None,
        }
    }

    fn ensure_uncommitted(&self) -> CoreResult<()> {
        if self.committed_at.is_some() {
            return Err(CoreError::PurchaseCommitted(self.id.clone()));
        }
        Ok(())
    }

    /// Adds a received product, or merges into the existing line.
    ///
    /// Merging sums quantities; the most recent unit cost wins, matching
    /// the last-purchase-price policy applied at commit time.
    ///
    /// ## Errors
    /// - `PurchaseCommitted` - receipt already committed
    /// - `InvalidQuantity` - quantity <= 0
    pub fn add_line(&mut self, product: &Product, quantity: i64, unit_cost: Money) -> CoreResult<()> {
        self.ensure_uncommitted()?;

        if quantity <= 0 {
            return Err(CoreError::InvalidQuantity { quantity });
        }

        if let Some(line) = self.lines.iter_mut().find(|l| l.barcode == product.barcode) {
            line.quantity += quantity;
            line.unit_cost_cents = unit_cost.cents();
            line.recompute();
        } else {
            self.lines
                .push(PurchaseLine::from_product(product, quantity, unit_cost));
        }

        self.recompute_total();
        Ok(())
    }

    /// Removes the line for the given barcode.
    pub fn remove_line(&mut self, barcode: &str) -> CoreResult<()> {
        self.ensure_uncommitted()?;

        let before = self.lines.len();
        self.lines.retain(|l| l.barcode != barcode);
        if self.lines.len() == before {
            return Err(CoreError::ProductNotFound(barcode.to_string()));
        }

        self.recompute_total();
        Ok(())
    }

    /// Recomputes the purchase total. Idempotent.
    pub fn recompute_total(&mut self) {
        for line in &mut self.lines {
            line.recompute();
        }
        self.total_cents = self.lines.iter().map(|l| l.subtotal_cents).sum();
    }

    /// Commits the receipt.
    ///
    /// Fails with `EmptyPurchase` if there are no lines and with
    /// `PurchaseCommitted` on a second call. The receiving service is then
    /// responsible for persisting the purchase, incrementing stock per
    /// line and overwriting each product's cost price, in one transaction.
    pub fn commit(&mut self) -> CoreResult<()> {
        self.ensure_uncommitted()?;

        if self.lines.is_empty() {
            return Err(CoreError::EmptyPurchase);
        }

        self.recompute_total();
        self.committed_at = Some(Utc::now());
        Ok(())
    }

    #[inline]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product(barcode: &str) -> Product {
        Product {
            id: format!("id-{}", barcode),
            barcode: barcode.to_string(),
            name: format!("Product {}", barcode),
            category_id: "c1".to_string(),
            cost_cents: 500,
            price_cents: 900,
            stock_qty: 10,
            min_stock_qty: 0,
            unit: "UN".to_string(),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_add_line_totals() {
        let mut purchase = Purchase::new("sup-1", None);
        purchase
            .add_line(&product("111"), 10, Money::from_cents(450))
            .unwrap();
        purchase
            .add_line(&product("222"), 4, Money::from_cents(200))
            .unwrap();

        assert_eq!(purchase.line_count(), 2);
        assert_eq!(purchase.total_cents, 4500 + 800);
    }

    #[test]
    fn test_merge_keeps_latest_unit_cost() {
        let mut purchase = Purchase::new("sup-1", None);
        let p = product("111");
        purchase.add_line(&p, 10, Money::from_cents(450)).unwrap();
        purchase.add_line(&p, 5, Money::from_cents(400)).unwrap();

        assert_eq!(purchase.line_count(), 1);
        assert_eq!(purchase.lines[0].quantity, 15);
        assert_eq!(purchase.lines[0].unit_cost_cents, 400);
        assert_eq!(purchase.total_cents, 15 * 400);
    }

    #[test]
    fn test_add_line_rejects_non_positive_quantity() {
        let mut purchase = Purchase::new("sup-1", None);
        assert!(matches!(
            purchase.add_line(&product("111"), 0, Money::from_cents(100)),
            Err(CoreError::InvalidQuantity { quantity: 0 })
        ));
    }

    #[test]
    fn test_commit_empty_rejected() {
        let mut purchase = Purchase::new("sup-1", None);
        assert!(matches!(purchase.commit(), Err(CoreError::EmptyPurchase)));
        assert!(purchase.committed_at.is_none());
    }

    #[test]
    fn test_commit_exactly_once() {
        let mut purchase = Purchase::new("sup-1", None);
        purchase
            .add_line(&product("111"), 2, Money::from_cents(300))
            .unwrap();

        purchase.commit().unwrap();
        assert!(purchase.committed_at.is_some());

        assert!(matches!(
            purchase.commit(),
            Err(CoreError::PurchaseCommitted(_))
        ));
        // committed receipts are immutable
        assert!(purchase
            .add_line(&product("222"), 1, Money::from_cents(100))
            .is_err());
        assert!(purchase.remove_line("111").is_err());
    }

    #[test]
    fn test_remove_line() {
        let mut purchase = Purchase::new("sup-1", None);
        purchase
            .add_line(&product("111"), 2, Money::from_cents(300))
            .unwrap();
        purchase.remove_line("111").unwrap();
        assert!(purchase.is_empty());
        assert_eq!(purchase.total_cents, 0);

        assert!(matches!(
            purchase.remove_line("111"),
            Err(CoreError::ProductNotFound(_))
        ));
    }
}
