//! # Repository Layer
//!
//! One repository per aggregate. Repositories own the SQL; domain rules
//! live in `mercado-core` and are enforced before anything reaches here.
//!
//! ## Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Service (checkout, receiving, catalog)                                 │
//! │       │  domain-validated aggregates                                    │
//! │       ▼                                                                 │
//! │  Repository (this module) ← SQL + transactions                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod audit;
pub mod category;
pub mod product;
pub mod purchase;
pub mod sale;
pub mod supplier;
