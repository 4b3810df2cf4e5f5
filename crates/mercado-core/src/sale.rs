//! # Sale Aggregate
//!
//! One checkout transaction and its line items.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                       Sale Lifecycle                                │
//! │                                                                     │
//! │   Sale::new() ──► OPEN                                              │
//! │                    │  add_line / remove_line / set_discount         │
//! │                    │  (totals recomputed after every mutation)      │
//! │                    ▼                                                │
//! │   finalize(method, paid) ──► FINALIZED  (change = paid − total)     │
//! │                    │                                                │
//! │                    ▼  later admin action                            │
//! │                CANCELLED                                            │
//! │                                                                     │
//! │   FINALIZED and CANCELLED are terminal - no transition out.         │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Stock Semantics
//! `add_line` checks the requested quantity against the product's *current*
//! on-hand count - stock is not reserved while the sale is open. The
//! authoritative decrement happens exactly once, when the persistence layer
//! commits the finalized sale with a conditional UPDATE. Two terminals can
//! both pass the in-memory check; only one survives the conditional
//! decrement.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::money::{DiscountRate, Money};
use crate::types::{PaymentMethod, Product, SaleStatus};

// =============================================================================
// Sale Line
// =============================================================================

/// A line item in a sale.
///
/// Uses the snapshot pattern: barcode, name and unit price are frozen at
/// add time, so the receipt stays consistent even if the product changes
/// in the catalog afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleLine {
    /// Product ID (UUID) for the stock decrement at finalize time.
    pub product_id: String,

    /// Barcode at time of adding (frozen). Lines are unique by barcode.
    pub barcode: String,

    /// Product name at time of adding (frozen).
    pub name: String,

    /// Unit price in centavos at time of adding (frozen).
    pub unit_price_cents: i64,

    /// Quantity sold. Always > 0.
    pub quantity: i64,

    /// Per-line discount in centavos. Always >= 0.
    pub discount_cents: i64,

    /// unit_price × quantity − discount. Recomputed on every change.
    pub subtotal_cents: i64,
}

impl SaleLine {
    /// Creates a line from a product snapshot and quantity.
    pub fn from_product(product: &Product, quantity: i64) -> Self {
        let mut line = SaleLine {
            product_id: product.id.clone(),
            barcode: product.barcode.clone(),
            name: product.name.clone(),
            unit_price_cents: product.price_cents,
            quantity,
            discount_cents: 0,
            subtotal_cents: 0,
        };
        line.recompute();
        line
    }

    /// Recomputes the line subtotal.
    #[inline]
    pub fn recompute(&mut self) {
        self.subtotal_cents = self.unit_price_cents * self.quantity - self.discount_cents;
    }

    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns the line subtotal as Money.
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }
}

// =============================================================================
// Sale
// =============================================================================

/// One checkout transaction.
///
/// Lines keep insertion order - the order matters for receipt display.
/// Totals are recomputed after every mutation and the recomputation is
/// idempotent: running it twice in a row yields identical totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: String,
    pub status: SaleStatus,

    /// Ordered line items. Loaded separately by the persistence layer.
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub lines: Vec<SaleLine>,

    /// Percentage discount in basis points (1000 = 10%).
    pub discount_bps: u32,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,

    pub payment_method: Option<PaymentMethod>,
    pub amount_paid_cents: i64,
    /// paid − total. Negative signals insufficient payment; whether that
    /// blocks finalization is the caller's decision, not the aggregate's.
    pub change_cents: i64,

    /// Cashier who owns this checkout session.
    pub user_id: Option<String>,
    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub finalized_at: Option<DateTime<Utc>>,
}

impl Sale {
    /// Creates a new open sale for the given cashier.
    pub fn new(user_id: Option<String>) -> Self {
        Sale {
            id: Uuid::new_v4().to_string(),
            status: SaleStatus::Open,
            lines: Vec::new(),
            discount_bps: 0,
            subtotal_cents: 0,
            discount_cents: 0,
            total_cents: 0,
            payment_method: None,
            amount_paid_cents: 0,
            change_cents: 0,
            user_id,
            notes: None,
            created_at: Utc::now(),
            finalized_at: None,
        }
    }

    fn ensure_open(&self) -> CoreResult<()> {
        if self.status != SaleStatus::Open {
            return Err(CoreError::SaleNotOpen {
                status: self.status.to_string(),
            });
        }
        Ok(())
    }

    /// Adds a product to the sale, or merges into the existing line.
    ///
    /// ## Merge Semantics
    /// If a line for the same barcode exists, quantities are merged and the
    /// stock check re-applies to the **merged** total, not just the delta.
    /// An added quantity that would only be valid incrementally but not
    /// cumulatively is rejected and the existing line stays untouched.
    ///
    /// ## Errors
    /// - `SaleNotOpen` - sale already finalized or cancelled
    /// - `InvalidQuantity` - quantity <= 0
    /// - `ProductInactive` - soft-deleted product
    /// - `OutOfStock` - requested (cumulative) quantity exceeds on-hand
    pub fn add_line(&mut self, product: &Product, quantity: i64) -> CoreResult<()> {
        self.ensure_open()?;

        if quantity <= 0 {
            return Err(CoreError::InvalidQuantity { quantity });
        }
        if !product.is_active {
            return Err(CoreError::ProductInactive(product.barcode.clone()));
        }

        if let Some(line) = self.lines.iter_mut().find(|l| l.barcode == product.barcode) {
            let merged = line.quantity + quantity;
            if product.stock_qty < merged {
                return Err(CoreError::OutOfStock {
                    barcode: product.barcode.clone(),
                    available: product.stock_qty,
                    requested: merged,
                });
            }
            line.quantity = merged;
            line.recompute();
        } else {
            if product.stock_qty < quantity {
                return Err(CoreError::OutOfStock {
                    barcode: product.barcode.clone(),
                    available: product.stock_qty,
                    requested: quantity,
                });
            }
            self.lines.push(SaleLine::from_product(product, quantity));
        }

        self.recompute_totals();
        Ok(())
    }

    /// Removes the line for the given barcode.
    pub fn remove_line(&mut self, barcode: &str) -> CoreResult<()> {
        self.ensure_open()?;

        let before = self.lines.len();
        self.lines.retain(|l| l.barcode != barcode);
        if self.lines.len() == before {
            return Err(CoreError::ProductNotFound(barcode.to_string()));
        }

        self.recompute_totals();
        Ok(())
    }

    /// Replaces the quantity on an existing line, re-checking stock.
    pub fn set_line_quantity(&mut self, product: &Product, quantity: i64) -> CoreResult<()> {
        self.ensure_open()?;

        if quantity <= 0 {
            return Err(CoreError::InvalidQuantity { quantity });
        }
        if product.stock_qty < quantity {
            return Err(CoreError::OutOfStock {
                barcode: product.barcode.clone(),
                available: product.stock_qty,
                requested: quantity,
            });
        }

        let line = self
            .lines
            .iter_mut()
            .find(|l| l.barcode == product.barcode)
            .ok_or_else(|| CoreError::ProductNotFound(product.barcode.clone()))?;
        line.quantity = quantity;
        line.recompute();

        self.recompute_totals();
        Ok(())
    }

    /// Sets the per-line discount for the given barcode.
    pub fn set_line_discount(&mut self, barcode: &str, discount: Money) -> CoreResult<()> {
        self.ensure_open()?;

        if discount.is_negative() {
            return Err(CoreError::InvalidDiscount {
                reason: format!("line discount {} is negative", discount),
            });
        }

        let line = self
            .lines
            .iter_mut()
            .find(|l| l.barcode == barcode)
            .ok_or_else(|| CoreError::ProductNotFound(barcode.to_string()))?;
        line.discount_cents = discount.cents();
        line.recompute();

        self.recompute_totals();
        Ok(())
    }

    /// Sets the percentage discount for the whole sale.
    ///
    /// Fails with `InvalidDiscount` unless the rate is within 0-100%; on
    /// failure the previous rate is left unchanged.
    pub fn set_discount(&mut self, rate: DiscountRate) -> CoreResult<()> {
        self.ensure_open()?;

        if !rate.is_valid() {
            return Err(CoreError::InvalidDiscount {
                reason: format!("{}% is outside 0-100%", rate.percentage()),
            });
        }

        self.discount_bps = rate.bps();
        self.recompute_totals();
        Ok(())
    }

    /// Records the amount tendered so far and recomputes change.
    ///
    /// Change may go negative - that signals insufficient payment to the
    /// caller, it does not block anything here.
    pub fn set_amount_paid(&mut self, amount: Money) -> CoreResult<()> {
        self.ensure_open()?;
        self.amount_paid_cents = amount.cents();
        self.recompute_totals();
        Ok(())
    }

    /// Recomputes subtotal, discount, total and change.
    ///
    /// Run after every mutation. Idempotent: calling it twice in a row
    /// yields the same totals.
    pub fn recompute_totals(&mut self) {
        for line in &mut self.lines {
            line.recompute();
        }

        self.subtotal_cents = self.lines.iter().map(|l| l.subtotal_cents).sum();

        let subtotal = Money::from_cents(self.subtotal_cents);
        let rate = DiscountRate::from_bps(self.discount_bps);
        self.discount_cents = subtotal.discount_amount(rate).cents();
        self.total_cents = self.subtotal_cents - self.discount_cents;

        self.change_cents = if self.amount_paid_cents > 0 {
            self.amount_paid_cents - self.total_cents
        } else {
            0
        };
    }

    /// Finalizes the sale.
    ///
    /// ## Errors
    /// - `SaleNotOpen` - already finalized or cancelled
    /// - `EmptySale` - no line items
    /// - `InsufficientPayment` - amount paid < total (the sale is left
    ///   unchanged)
    ///
    /// On success the status becomes FINALIZED and the change is returned.
    /// The caller is then responsible for persisting the sale and
    /// decrementing stock for every line, exactly once (see the checkout
    /// service for the transactional version).
    pub fn finalize(&mut self, method: PaymentMethod, amount_paid: Money) -> CoreResult<Money> {
        self.ensure_open()?;

        if self.lines.is_empty() {
            return Err(CoreError::EmptySale);
        }

        self.recompute_totals();
        if amount_paid.cents() < self.total_cents {
            return Err(CoreError::InsufficientPayment {
                paid_cents: amount_paid.cents(),
                total_cents: self.total_cents,
            });
        }

        self.payment_method = Some(method);
        self.amount_paid_cents = amount_paid.cents();
        self.change_cents = amount_paid.cents() - self.total_cents;
        self.status = SaleStatus::Finalized;
        self.finalized_at = Some(Utc::now());

        Ok(Money::from_cents(self.change_cents))
    }

    /// Cancels the sale (later admin action on a finalized sale, or
    /// abandoning an open one). Cancelled is terminal.
    pub fn cancel(&mut self) -> CoreResult<()> {
        if self.status == SaleStatus::Cancelled {
            return Err(CoreError::SaleNotOpen {
                status: self.status.to_string(),
            });
        }
        self.status = SaleStatus::Cancelled;
        Ok(())
    }

    /// Returns a finalized-but-unpersisted sale to OPEN.
    ///
    /// Used only by the checkout service when the finalize transaction
    /// fails: no stock was decremented, so the sale must remain OPEN for
    /// the cashier to retry. Never call this on a persisted sale.
    pub fn rollback_finalize(&mut self) {
        self.status = SaleStatus::Open;
        self.payment_method = None;
        self.finalized_at = None;
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Number of distinct lines.
    #[inline]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Total quantity across all lines.
    #[inline]
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }

    #[inline]
    pub fn discount(&self) -> Money {
        Money::from_cents(self.discount_cents)
    }

    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    #[inline]
    pub fn change(&self) -> Money {
        Money::from_cents(self.change_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
