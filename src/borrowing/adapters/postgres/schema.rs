//! Diesel schema for borrowing persistence.

diesel::table! {
    /// Borrowing records, one per rental transaction.
    borrowings (id) {
        /// Borrowing identifier.
        id -> Uuid,
        /// Borrower party identifier.
        #[max_length = 255]
        borrower_id -> Varchar,
        /// Lender party identifier.
        #[max_length = 255]
        lender_id -> Varchar,
        /// Product snapshot taken at booking time.
        product -> Jsonb,
        /// Rental start.
        start_date -> Timestamptz,
        /// Rental end.
        end_date -> Timestamptz,
        /// Total charged in minor units.
        total_minor -> Int8,
        /// Refundable deposit in minor units.
        deposit_minor -> Int8,
        /// Payment gateway charge reference.
        #[max_length = 255]
        payment_intent -> Varchar,
        /// Lifecycle state.
        #[max_length = 50]
        state -> Varchar,
        /// Issued pickup code, if any.
        #[max_length = 32]
        pickup_code -> Nullable<Varchar>,
        /// Issued return code, if any.
        #[max_length = 32]
        return_code -> Nullable<Varchar>,
        /// Wrong submissions against the issued code.
        failed_code_attempts -> Int4,
        /// Deposit refund reference, once settled.
        #[max_length = 255]
        refund_ref -> Nullable<Varchar>,
        /// Review reference, once requested.
        review_ref -> Nullable<Uuid>,
        /// Transition history.
        history -> Jsonb,
        /// Optimistic concurrency version.
        version -> Int8,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}
