//! # Domain Types
//!
//! Core domain types used throughout Mercado POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                │
//! │                                                                     │
//! │  ┌───────────────┐   ┌───────────────┐   ┌────────────────┐         │
//! │  │    Product    │   │   Category    │   │    Supplier    │         │
//! │  │ ───────────── │   │ ───────────── │   │ ────────────── │         │
//! │  │ barcode (biz) │   │ name (unique) │   │ name / tax_id  │         │
//! │  │ price / cost  │   │ description   │   │ contact info   │         │
//! │  │ stock_qty     │   │ is_active     │   │ is_active      │         │
//! │  └───────────────┘   └───────────────┘   └────────────────┘         │
//! │                                                                     │
//! │  ┌───────────────┐   ┌───────────────┐   ┌────────────────┐         │
//! │  │  SaleStatus   │   │ PaymentMethod │   │  AuditAction   │         │
//! │  │ ───────────── │   │ ───────────── │   │ ────────────── │         │
//! │  │ Open          │   │ Cash          │   │ SaleFinalized  │         │
//! │  │ Finalized     │   │ CreditCard    │   │ StockUpdated   │         │
//! │  │ Cancelled     │   │ DebitCard/Pix │   │ ...            │         │
//! │  └───────────────┘   └───────────────┘   └────────────────┘         │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID: (barcode, name, tax id) - human-readable, unique

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A product in the catalog.
///
/// Carries its own stock ledger: an integer on-hand quantity and a minimum
/// threshold. Sales decrement on-hand, goods receipts increment it.
/// Products are never hard-deleted; `is_active = false` is the soft delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Barcode - unique business identifier (EAN-13, UPC-A, etc.).
    pub barcode: String,

    /// Display name shown to cashier and on receipt.
    pub name: String,

    /// Category this product belongs to.
    pub category_id: String,

    /// Cost price in centavos. Overwritten by the latest goods receipt.
    pub cost_cents: i64,

    /// Sale price in centavos. Write invariant: price_cents >= cost_cents.
    pub price_cents: i64,

    /// Current on-hand quantity. Never negative.
    pub stock_qty: i64,

    /// Minimum-stock threshold for low-stock alerts.
    pub min_stock_qty: i64,

    /// Unit of measure ("UN", "KG", "LT", ...).
    pub unit: String,

    /// Whether product is active (soft delete).
    pub is_active: bool,

    /// When the product was created.
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the sale price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Returns the cost price as a Money type.
    #[inline]
    pub fn cost(&self) -> Money {
        Money::from_cents(self.cost_cents)
    }

    /// Adds quantity to the in-memory stock ledger.
    ///
    /// Fails with `InvalidQuantity` if `qty` is negative.
    pub fn add_stock(&mut self, qty: i64) -> CoreResult<()> {
        if qty < 0 {
            return Err(CoreError::InvalidQuantity { quantity: qty });
        }
        self.stock_qty += qty;
        Ok(())
    }

    /// Removes quantity from the in-memory stock ledger.
    ///
    /// Fails with `InvalidQuantity` if `qty` is negative and with
    /// `InsufficientStock` if on-hand would go negative.
    ///
    /// ## Note
    /// This is the single-terminal rule. Under concurrent terminals the
    /// authoritative decrement is the conditional UPDATE in the database
    /// layer; this method mirrors it for in-memory use and tests.
    pub fn remove_stock(&mut self, qty: i64) -> CoreResult<()> {
        if qty < 0 {
            return Err(CoreError::InvalidQuantity { quantity: qty });
        }
        if self.stock_qty < qty {
            return Err(CoreError::InsufficientStock {
                available: self.stock_qty,
                requested: qty,
            });
        }
        self.stock_qty -= qty;
        Ok(())
    }

    /// True when on-hand has reached the minimum threshold.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.stock_qty <= self.min_stock_qty
    }

    /// Profit margin as a percentage scaled by 10^4.
    ///
    /// `(price - cost) / cost × 100`, rounded half-up at four decimal
    /// places: a return value of 500_000 means 50.0000%.
    ///
    /// Returns 0 when cost is zero - a deliberate policy to avoid division
    /// by zero, not a true margin.
    pub fn profit_margin_e4(&self) -> i64 {
        if self.cost_cents == 0 {
            return 0;
        }
        let profit = (self.price_cents - self.cost_cents) as i128;
        // percent × 10^4 => profit / cost × 100 × 10^4, half-up
        let scaled = profit * 1_000_000;
        let cost = self.cost_cents as i128;
        let rounded = if scaled >= 0 {
            (scaled + cost / 2) / cost
        } else {
            (scaled - cost / 2) / cost
        };
        rounded as i64
    }

    /// Profit margin as a plain percentage, for display.
    #[inline]
    pub fn profit_margin_percent(&self) -> f64 {
        self.profit_margin_e4() as f64 / 10_000.0
    }
}

// =============================================================================
// Category & Supplier
// =============================================================================

/// Product category - simple reference data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Category {
    pub id: String,
    /// Unique name.
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Supplier - reference data for goods receipts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Supplier {
    pub id: String,
    /// Unique name.
    pub name: String,
    /// Unique fiscal identifier (CNPJ).
    pub tax_id: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Sale Status
// =============================================================================

/// The status of a sale transaction.
///
/// Open is the only mutable state. Finalized and Cancelled are terminal;
/// the sole exception is the later admin action Finalized → Cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    /// Sale is in progress (items being added).
    Open,
    /// Sale has been paid and finalized.
    Finalized,
    /// Sale was cancelled by a later admin action.
    Cancelled,
}

impl Default for SaleStatus {
    fn default() -> Self {
        SaleStatus::Open
    }
}

impl std::fmt::Display for SaleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SaleStatus::Open => "open",
            SaleStatus::Finalized => "finalized",
            SaleStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

// =============================================================================
// Payment Method
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash payment (DINHEIRO).
    Cash,
    /// Credit card on external terminal.
    CreditCard,
    /// Debit card on external terminal.
    DebitCard,
    /// PIX instant transfer.
    Pix,
}

// =============================================================================
// Audit Log
// =============================================================================

/// Kinds of auditable user actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Login,
    Logout,
    Create,
    Update,
    Delete,
    SaleFinalized,
    SaleCancelled,
    StockUpdated,
    Backup,
    Error,
}

/// An append-only audit record. Immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct AuditLogEntry {
    pub id: String,
    /// Acting user; `None` means "system".
    pub actor: Option<String>,
    pub action: AuditAction,
    /// Target entity name ("Product", "Sale", ...).
    pub entity: String,
    /// Target entity id, when applicable.
    pub entity_id: Option<String>,
    /// Free-text description.
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl AuditLogEntry {
    /// The actor name for display, substituting "system" when absent.
    pub fn actor_name(&self) -> &str {
        self.actor.as_deref().unwrap_or("system")
    }
}

// =============================================================================
// Session
// =============================================================================

/// Explicit per-terminal session context.
///
/// Passed by reference into the service layer instead of living in a
/// process-wide "current user" global, so several terminals can share one
/// process without trampling each other's identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Logged-in user's id.
    pub user_id: String,
    /// Logged-in user's display name (used as the audit actor).
    pub user_name: String,
    /// Terminal identifier ("caixa-01").
    pub terminal_id: String,
}

impl Session {
    pub fn new(
        user_id: impl Into<String>,
        user_name: impl Into<String>,
        terminal_id: impl Into<String>,
    ) -> Self {
        Session {
            user_id: user_id.into(),
            user_name: user_name.into(),
            terminal_id: terminal_id.into(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
