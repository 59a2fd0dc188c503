//! # Repository Modules
//!
//! One repository per aggregate. Repositories own the SQL; callers see
//! typed rows and [`StoreError`](crate::error::StoreError)s, never sqlx.
//!
//! Multi-table writes that must be atomic (sale finalization, returns, PO
//! creation) do not live here; see [`crate::checkout`] and the purchase
//! order repository's transactional methods.

pub mod customer;
pub mod expense;
pub mod outbox;
pub mod product;
pub mod purchase_order;
pub mod report;
pub mod sale;
pub mod supplier;

pub use customer::{CustomerRepository, NewCustomer};
pub use expense::{ExpenseRepository, NewExpense};
pub use outbox::OutboxRepository;
pub use product::{NewProduct, ProductRepository, ProductUpdate};
pub use purchase_order::{NewPurchaseOrder, NewPurchaseOrderLine, PurchaseOrderRepository};
pub use report::{ReportRepository, SalesSummary, TopProduct};
pub use sale::SaleRepository;
pub use supplier::{NewSupplier, SupplierRepository};
