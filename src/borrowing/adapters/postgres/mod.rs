//! `PostgreSQL` adapters for borrowing persistence.

mod models;
mod repository;
mod schema;

pub use models::{BorrowingRow, NewBorrowingRow};
pub use repository::{BorrowingPgPool, PostgresBorrowingRepository, row_to_record, to_new_row};
