//! # mercado-db: Database and Service Layer for Mercado POS
//!
//! SQLite persistence (sqlx, WAL mode, embedded migrations) plus the
//! service layer that orchestrates the `mercado-core` domain aggregates.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Mercado POS Data Flow                             │
//! │                                                                         │
//! │  Caller (register UI, back office, seed tool)                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    mercado-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   Services (checkout, receiving, catalog, reports)              │   │
//! │  │       │   drive mercado-core aggregates, stamp timestamps,      │   │
//! │  │       │   write audit entries                                   │   │
//! │  │       ▼                                                         │   │
//! │  │   Repositories (product, sale, purchase, ...)                   │   │
//! │  │       │   own the SQL and the transactions                      │   │
//! │  │       ▼                                                         │   │
//! │  │   Database (pool.rs) + embedded migrations                      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite (WAL mode, foreign keys on)                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mercado_db::{CheckoutService, Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/mercado.db")).await?;
//! let checkout = CheckoutService::new(db.clone());
//!
//! let mut sale = checkout.begin_sale(&session);
//! checkout.add_item(&mut sale, "7891000100103", 2).await?;
//! let change = checkout
//!     .finalize(&session, &mut sale, PaymentMethod::Cash, paid)
//!     .await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod services;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::audit::AuditRepository;
pub use repository::category::CategoryRepository;
pub use repository::product::ProductRepository;
pub use repository::purchase::PurchaseRepository;
pub use repository::sale::SaleRepository;
pub use repository::supplier::SupplierRepository;

pub use services::{
    CatalogService, CheckoutService, NewProduct, ReceivingService, ReportsService,
    ServiceError, ServiceResult,
};

// =============================================================================
// Test Support
// =============================================================================
