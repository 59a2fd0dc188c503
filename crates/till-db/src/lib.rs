//! # till-db: Database Layer for Tillpos
//!
//! Owns everything that touches SQLite: the connection pool, embedded
//! migrations, per-aggregate repositories, and the checkout transactions
//! (sale finalization and return processing) whose atomicity the rest of
//! the system depends on.
//!
//! ## Usage
//! ```rust,ignore
//! use till_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("till.db")).await?;
//! let products = db.products().list().await?;
//! ```
//!
//! All domain types come from `till-core`; this crate adds the storage and
//! the transaction boundaries, never business rules of its own. The one
//! deliberate duplication: the schema repeats the core invariants as CHECK
//! constraints so no write path can bypass them.

pub mod checkout;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use checkout::{
    CheckoutError, CheckoutRepository, CheckoutResult, CommittedSale, ProcessedReturn, ReturnLine,
    SaleDraft,
};
pub use error::{StoreError, StoreResult};
pub use pool::{Database, DbConfig};
pub use repository::{
    CustomerRepository, ExpenseRepository, NewCustomer, NewExpense, NewProduct, NewPurchaseOrder,
    NewPurchaseOrderLine, NewSupplier, OutboxRepository, ProductRepository, ProductUpdate,
    PurchaseOrderRepository, ReportRepository, SaleRepository, SalesSummary, SupplierRepository,
    TopProduct,
};
