//! Diesel row models for borrowing persistence.

use super::schema::borrowings;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for borrowing records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = borrowings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct BorrowingRow {
    /// Borrowing identifier.
    pub id: uuid::Uuid,
    /// Borrower party identifier.
    pub borrower_id: String,
    /// Lender party identifier.
    pub lender_id: String,
    /// Product snapshot JSON payload.
    pub product: Value,
    /// Rental start.
    pub start_date: DateTime<Utc>,
    /// Rental end.
    pub end_date: DateTime<Utc>,
    /// Total charged in minor units.
    pub total_minor: i64,
    /// Refundable deposit in minor units.
    pub deposit_minor: i64,
    /// Payment gateway charge reference.
    pub payment_intent: String,
    /// Lifecycle state.
    pub state: String,
    /// Issued pickup code, if any.
    pub pickup_code: Option<String>,
    /// Issued return code, if any.
    pub return_code: Option<String>,
    /// Wrong submissions against the issued code.
    pub failed_code_attempts: i32,
    /// Deposit refund reference, once settled.
    pub refund_ref: Option<String>,
    /// Review reference, once requested.
    pub review_ref: Option<uuid::Uuid>,
    /// Transition history JSON payload.
    pub history: Value,
    /// Optimistic concurrency version.
    pub version: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert and full-update model for borrowing records.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = borrowings)]
#[diesel(treat_none_as_null = true)]
pub struct NewBorrowingRow {
    /// Borrowing identifier.
    pub id: uuid::Uuid,
    /// Borrower party identifier.
    pub borrower_id: String,
    /// Lender party identifier.
    pub lender_id: String,
    /// Product snapshot JSON payload.
    pub product: Value,
    /// Rental start.
    pub start_date: DateTime<Utc>,
    /// Rental end.
    pub end_date: DateTime<Utc>,
    /// Total charged in minor units.
    pub total_minor: i64,
    /// Refundable deposit in minor units.
    pub deposit_minor: i64,
    /// Payment gateway charge reference.
    pub payment_intent: String,
    /// Lifecycle state.
    pub state: String,
    /// Issued pickup code, if any.
    pub pickup_code: Option<String>,
    /// Issued return code, if any.
    pub return_code: Option<String>,
    /// Wrong submissions against the issued code.
    pub failed_code_attempts: i32,
    /// Deposit refund reference, once settled.
    pub refund_ref: Option<String>,
    /// Review reference, once requested.
    pub review_ref: Option<uuid::Uuid>,
    /// Transition history JSON payload.
    pub history: Value,
    /// Optimistic concurrency version.
    pub version: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}
