//! # GemClaw Inventory
//!
//! The structured half of the assistant: a SQLite inventory table loaded
//! from CSV, and a tool that answers questions by having the model write SQL.
//!
//! ## How it works
//! ```text
//! "How many Ideal cut diamonds do we have?"
//!   ↓ schema + question → LLM
//! SELECT COUNT(*) FROM inventory WHERE cut = 'Ideal'
//!   ↓ read-only guard → SQLite
//! [(21551,)]
//!   ↓ question + SQL + result → LLM
//! "We have 21,551 Ideal cut diamonds in stock."
//! ```

pub mod guard;
pub mod store;
pub mod tool;

pub use store::InventoryDb;
pub use tool::SqlQueryTool;
