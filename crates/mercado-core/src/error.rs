//! # Error Types
//!
//! Domain-specific error types for mercado-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                 │
//! │                                                                     │
//! │  mercado-core errors (this file)                                    │
//! │  ├── CoreError        - Business-rule rejections                    │
//! │  └── ValidationError  - Input validation failures                   │
//! │                                                                     │
//! │  mercado-db errors (separate crate)                                 │
//! │  ├── DbError          - Database operation failures                 │
//! │  └── ServiceError     - Core + Db, surfaced to callers              │
//! │                                                                     │
//! │  Flow: ValidationError → CoreError → ServiceError → UI layer        │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (barcode, quantities, amounts)
//! 3. Errors are enum variants, never String
//! 4. These are synchronous business-rule rejections - no retry semantics

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or domain logic failures.
/// They should be caught and translated to user-friendly messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Quantity is zero or negative where a positive amount is required,
    /// or negative where a non-negative amount is required.
    #[error("Invalid quantity: {quantity}")]
    InvalidQuantity { quantity: i64 },

    /// Adding a line (or merging quantities into an existing line) would
    /// exceed the product's current on-hand quantity.
    ///
    /// ## When This Occurs
    /// - Cashier scans more units than are in stock
    /// - A merge pushes the *cumulative* line quantity past on-hand;
    ///   the check always runs against the merged total, not the delta
    #[error("Out of stock for {barcode}: available {available}, requested {requested}")]
    OutOfStock {
        barcode: String,
        available: i64,
        requested: i64,
    },

    /// Removing more stock than is on hand.
    #[error("Insufficient stock: available {available}, requested {requested}")]
    InsufficientStock { available: i64, requested: i64 },

    /// Discount outside the valid range.
    ///
    /// Percentage discounts must be within 0-100%; line discounts must be
    /// non-negative. A rejected discount leaves the prior value unchanged.
    #[error("Invalid discount: {reason}")]
    InvalidDiscount { reason: String },

    /// The sale is not OPEN, so it cannot be mutated.
    ///
    /// FINALIZED and CANCELLED are terminal states; there is no transition
    /// out of a terminal state.
    #[error("Sale is {status}, expected open")]
    SaleNotOpen { status: String },

    /// Finalizing a sale with no line items.
    #[error("Cannot finalize a sale with no items")]
    EmptySale,

    /// Committing a purchase with no line items.
    #[error("Cannot commit a purchase with no items")]
    EmptyPurchase,

    /// Committing a purchase twice. Stock increments must happen exactly
    /// once per goods receipt.
    #[error("Purchase {0} has already been committed")]
    PurchaseCommitted(String),

    /// Amount paid is less than the sale total.
    #[error("Insufficient payment: paid {paid_cents}, total {total_cents}")]
    InsufficientPayment { paid_cents: i64, total_cents: i64 },

    /// Product cannot be found by barcode or id.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Product exists but has been deactivated (soft delete).
    #[error("Product is inactive: {0}")]
    ProductInactive(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustBeNonNegative { field: String },

    /// Sale price below cost price violates the catalog write invariant.
    #[error("Sale price {price_cents} is below cost price {cost_cents}")]
    PriceBelowCost { price_cents: i64, cost_cents: i64 },

    /// Invalid format (e.g., invalid barcode characters).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
