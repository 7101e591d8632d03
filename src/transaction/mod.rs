//! Transactions: the domain model, the storage functions, and the pages
//! and endpoints for creating, listing, editing and deleting them.

pub(crate) mod core;
mod create;
mod delete;
mod edit;
mod form;
mod list;

pub use core::{Transaction, TransactionKind, create_transaction_table, get_transactions_for_user};
pub use create::{create_transaction_endpoint, get_add_transaction_page};
pub use delete::delete_transaction_endpoint;
pub use edit::{edit_transaction_endpoint, get_edit_transaction_page};
pub use list::get_transactions_page;
