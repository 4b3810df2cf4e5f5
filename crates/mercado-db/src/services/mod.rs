//! # Service Layer
//!
//! Use-case orchestration on top of the repositories.
//!
//! Services combine domain logic from `mercado-core` with persistence:
//! they load products, drive the aggregates, stamp timestamps, persist
//! results, and write audit entries. Audit writes are best-effort; a
//! failed audit append is logged and never fails the primary operation.
//!
//! - [`catalog`]   - product / category / supplier management
//! - [`checkout`]  - sale lifecycle at the register
//! - [`receiving`] - goods receipts from suppliers
//! - [`reports`]   - read-only aggregation queries

pub mod catalog;
pub mod checkout;
pub mod error;
pub mod receiving;
pub mod reports;

pub use catalog::{CatalogService, NewProduct};
pub use checkout::CheckoutService;
pub use error::{ServiceError, ServiceResult};
pub use receiving::ReceivingService;
pub use reports::{ReportsService, SalesSummary, TopProduct};
