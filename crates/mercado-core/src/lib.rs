//! # mercado-core: Pure Business Logic for Mercado POS
//!
//! This crate is the **heart** of Mercado POS. It contains all business
//! logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Mercado POS Architecture                       │
//! │                                                                     │
//! │  ┌─────────────────────────────────────────────────────────────┐    │
//! │  │            UI layer / report renderer (external)            │    │
//! │  └─────────────────────────────┬───────────────────────────────┘    │
//! │                                │                                    │
//! │  ┌─────────────────────────────▼───────────────────────────────┐    │
//! │  │              ★ mercado-core (THIS CRATE) ★                  │    │
//! │  │                                                             │    │
//! │  │  ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌────────────┐        │    │
//! │  │  │  money  │ │  sale   │ │ purchase │ │ validation │        │    │
//! │  │  │  Money  │ │  Sale   │ │ Purchase │ │   rules    │        │    │
//! │  │  │Discount │ │SaleLine │ │  Line    │ │   checks   │        │    │
//! │  │  └─────────┘ └─────────┘ └──────────┘ └────────────┘        │    │
//! │  │                                                             │    │
//! │  │  NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS         │    │
//! │  └─────────────────────────────┬───────────────────────────────┘    │
//! │                                │                                    │
//! │  ┌─────────────────────────────▼───────────────────────────────┐    │
//! │  │                mercado-db (Database Layer)                  │    │
//! │  │        SQLite queries, migrations, repositories,            │    │
//! │  │        checkout / receiving / catalog / report services     │    │
//! │  └─────────────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Category, Supplier, audit log, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`sale`] - The Sale (cart) aggregate and its line items
//! - [`purchase`] - The Purchase (goods receipt) aggregate
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: deterministic - same input, same output
//! 2. **No I/O**: database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: all monetary values are centavos (i64)
//! 4. **Explicit Errors**: all errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use mercado_core::money::{DiscountRate, Money};
//!
//! let subtotal = Money::from_cents(5000);       // R$ 50.00
//! let rate = DiscountRate::from_percentage(10.0);
//!
//! assert_eq!(subtotal.apply_discount(rate).cents(), 4500);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod purchase;
pub mod sale;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use mercado_core::Money` instead of
// `use mercado_core::money::Money`

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{DiscountRate, Money};
pub use purchase::{Purchase, PurchaseLine};
pub use sale::{Sale, SaleLine};
pub use types::*;
