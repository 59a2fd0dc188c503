//! # till-engine: Sale Session Orchestration for Tillpos
//!
//! The operator-facing surface of the sale transaction engine. A
//! [`SaleSession`] holds one in-progress cart and exposes the full flow:
//!
//! 1. `add_line` / `set_cart_discount` - cart assembly (session state only)
//! 2. `finalize` - the atomic checkout transaction via `till-db`
//! 3. `process_return` - atomic restock + refund against a committed sale
//!
//! Committed events fan out through the [`EventBus`]: transaction-critical
//! ones (`new_sale`, `inventory_updated`) via the database outbox, derived
//! alerts (`low_stock_alert`) published directly after commit.
//!
//! ## Example
//! ```rust,ignore
//! use till_db::{Database, DbConfig};
//! use till_engine::{EventBus, SaleSession};
//!
//! let db = Database::new(DbConfig::new("till.db")).await?;
//! let bus = EventBus::new();
//! let mut session = SaleSession::new(db, bus.clone());
//!
//! session.add_line("Cola 330ml", "2").await?;
//! session.set_cart_discount("10")?;
//! let committed = session.finalize("Ayesha Khan", "cash").await?;
//! ```

pub mod error;
pub mod events;
pub mod session;

pub use error::{EngineError, EngineResult};
pub use events::EventBus;
pub use session::SaleSession;
