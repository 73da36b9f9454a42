//! Persistence layer (redb)
//!
//! - [`storage`] - database handle, tables, errors
//! - `inventory` - credential pools (`has_stock`, `take_one`, `add_many`)
//! - `bindings` - charge bindings with guarded transitions
//! - `orders` - order ledger
//! - `alerts` - operator alert queue

mod alerts;
mod bindings;
mod inventory;
mod orders;
pub mod storage;

pub use storage::{Storage, StorageError, StorageResult};
