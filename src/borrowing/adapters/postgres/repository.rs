//! `PostgreSQL` repository implementation for borrowing storage.

use super::{
    models::{BorrowingRow, NewBorrowingRow},
    schema::borrowings,
};
use crate::borrowing::{
    domain::{
        BorrowingId, BorrowingRecord, BorrowingState, BorrowingTerms, HandoverCode, MinorUnits,
        PartyId, PaymentIntentRef, PersistedBorrowingData, ProductSnapshot, RecordVersion,
        RentalWindow, ReviewRef, StateChange,
    },
    ports::{BorrowingRepository, BorrowingRepositoryError, BorrowingRepositoryResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by borrowing adapters.
pub type BorrowingPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed borrowing repository.
///
/// Updates are conditional on the stored version, so concurrent writers
/// from different processes cannot overwrite each other.
#[derive(Debug, Clone)]
pub struct PostgresBorrowingRepository {
    pool: BorrowingPgPool,
}

impl PostgresBorrowingRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: BorrowingPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> BorrowingRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> BorrowingRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(BorrowingRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(BorrowingRepositoryError::persistence)?
    }
}

#[async_trait]
impl BorrowingRepository for PostgresBorrowingRepository {
    async fn store(&self, record: &BorrowingRecord) -> BorrowingRepositoryResult<()> {
        let borrowing_id = record.id();
        let new_row = to_new_row(record)?;

        self.run_blocking(move |connection| {
            diesel::insert_into(borrowings::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        BorrowingRepositoryError::DuplicateBorrowing(borrowing_id)
                    }
                    _ => BorrowingRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn update(
        &self,
        record: &BorrowingRecord,
        expected: RecordVersion,
    ) -> BorrowingRepositoryResult<()> {
        let borrowing_id = record.id();
        let row = to_new_row(record)?;
        let expected_version = to_db_version(expected)?;

        self.run_blocking(move |connection| {
            let updated = diesel::update(
                borrowings::table
                    .filter(borrowings::id.eq(borrowing_id.into_inner()))
                    .filter(borrowings::version.eq(expected_version)),
            )
            .set(&row)
            .execute(connection)
            .map_err(BorrowingRepositoryError::persistence)?;

            if updated == 1 {
                return Ok(());
            }

            // Zero rows: either the record is gone or another writer got in
            // first.
            let stored_version = borrowings::table
                .filter(borrowings::id.eq(borrowing_id.into_inner()))
                .select(borrowings::version)
                .first::<i64>(connection)
                .optional()
                .map_err(BorrowingRepositoryError::persistence)?;

            match stored_version {
                None => Err(BorrowingRepositoryError::NotFound(borrowing_id)),
                Some(actual) => Err(BorrowingRepositoryError::VersionConflict {
                    borrowing_id,
                    expected,
                    actual: from_db_version(actual)?,
                }),
            }
        })
        .await
    }

    async fn find_by_id(
        &self,
        id: BorrowingId,
    ) -> BorrowingRepositoryResult<Option<BorrowingRecord>> {
        self.run_blocking(move |connection| {
            let row = borrowings::table
                .filter(borrowings::id.eq(id.into_inner()))
                .select(BorrowingRow::as_select())
                .first::<BorrowingRow>(connection)
                .optional()
                .map_err(BorrowingRepositoryError::persistence)?;
            row.map(row_to_record).transpose()
        })
        .await
    }

    async fn find_by_party(
        &self,
        party: &PartyId,
    ) -> BorrowingRepositoryResult<Vec<BorrowingRecord>> {
        let lookup = party.as_str().to_owned();
        self.run_blocking(move |connection| {
            let rows = borrowings::table
                .filter(
                    borrowings::borrower_id
                        .eq(lookup.as_str())
                        .or(borrowings::lender_id.eq(lookup.as_str())),
                )
                .order((borrowings::created_at.asc(), borrowings::id.asc()))
                .select(BorrowingRow::as_select())
                .load::<BorrowingRow>(connection)
                .map_err(BorrowingRepositoryError::persistence)?;
            rows.into_iter().map(row_to_record).collect()
        })
        .await
    }
}

/// Converts a domain record into its insert/update row.
///
/// # Errors
///
/// Returns [`BorrowingRepositoryError::Persistence`] when an amount or
/// counter does not fit its column or JSON encoding fails.
pub fn to_new_row(record: &BorrowingRecord) -> BorrowingRepositoryResult<NewBorrowingRow> {
    let product =
        serde_json::to_value(record.product()).map_err(BorrowingRepositoryError::persistence)?;
    let history =
        serde_json::to_value(record.history()).map_err(BorrowingRepositoryError::persistence)?;

    Ok(NewBorrowingRow {
        id: record.id().into_inner(),
        borrower_id: record.borrower_id().as_str().to_owned(),
        lender_id: record.lender_id().as_str().to_owned(),
        product,
        start_date: record.window().start(),
        end_date: record.window().end(),
        total_minor: to_db_amount(record.total())?,
        deposit_minor: to_db_amount(record.deposit())?,
        payment_intent: record.payment_intent().as_str().to_owned(),
        state: record.state().as_str().to_owned(),
        pickup_code: record.pickup_code().map(|code| code.as_str().to_owned()),
        return_code: record.return_code().map(|code| code.as_str().to_owned()),
        failed_code_attempts: i32::try_from(record.failed_code_attempts())
            .map_err(BorrowingRepositoryError::persistence)?,
        refund_ref: record.refund_ref().map(str::to_owned),
        review_ref: record.review_ref().map(ReviewRef::into_inner),
        history,
        version: to_db_version(record.version())?,
        created_at: record.created_at(),
        updated_at: record.updated_at(),
    })
}

/// Reconstructs a domain record from a stored row.
///
/// # Errors
///
/// Returns [`BorrowingRepositoryError::Persistence`] when any column holds a
/// value the domain rejects.
pub fn row_to_record(row: BorrowingRow) -> BorrowingRepositoryResult<BorrowingRecord> {
    let BorrowingRow {
        id,
        borrower_id,
        lender_id,
        product: persisted_product,
        start_date,
        end_date,
        total_minor,
        deposit_minor,
        payment_intent,
        state: persisted_state,
        pickup_code,
        return_code,
        failed_code_attempts,
        refund_ref,
        review_ref,
        history: persisted_history,
        version,
        created_at,
        updated_at,
    } = row;

    let product = serde_json::from_value::<ProductSnapshot>(persisted_product)
        .map_err(BorrowingRepositoryError::persistence)?;
    let history = serde_json::from_value::<Vec<StateChange>>(persisted_history)
        .map_err(BorrowingRepositoryError::persistence)?;
    let state = BorrowingState::try_from(persisted_state.as_str())
        .map_err(BorrowingRepositoryError::persistence)?;

    let terms = BorrowingTerms {
        borrower_id: PartyId::new(borrower_id).map_err(BorrowingRepositoryError::persistence)?,
        lender_id: PartyId::new(lender_id).map_err(BorrowingRepositoryError::persistence)?,
        product,
        window: RentalWindow::new(start_date, end_date)
            .map_err(BorrowingRepositoryError::persistence)?,
        total: from_db_amount(total_minor)?,
        deposit: from_db_amount(deposit_minor)?,
        payment_intent: PaymentIntentRef::new(payment_intent)
            .map_err(BorrowingRepositoryError::persistence)?,
    };

    let data = PersistedBorrowingData {
        id: BorrowingId::from_uuid(id),
        terms,
        state,
        pickup_code: pickup_code.map(parse_code).transpose()?,
        return_code: return_code.map(parse_code).transpose()?,
        failed_code_attempts: u32::try_from(failed_code_attempts)
            .map_err(BorrowingRepositoryError::persistence)?,
        refund_ref,
        review_ref: review_ref.map(ReviewRef::from_uuid),
        history,
        version: from_db_version(version)?,
        created_at,
        updated_at,
    };
    Ok(BorrowingRecord::from_persisted(data))
}

fn parse_code(value: String) -> BorrowingRepositoryResult<HandoverCode> {
    HandoverCode::new(value).map_err(BorrowingRepositoryError::persistence)
}

fn to_db_amount(amount: MinorUnits) -> BorrowingRepositoryResult<i64> {
    i64::try_from(amount.value()).map_err(BorrowingRepositoryError::persistence)
}

fn from_db_amount(value: i64) -> BorrowingRepositoryResult<MinorUnits> {
    u64::try_from(value)
        .map(MinorUnits::new)
        .map_err(BorrowingRepositoryError::persistence)
}

fn to_db_version(version: RecordVersion) -> BorrowingRepositoryResult<i64> {
    i64::try_from(version.value()).map_err(BorrowingRepositoryError::persistence)
}

fn from_db_version(value: i64) -> BorrowingRepositoryResult<RecordVersion> {
    u64::try_from(value)
        .map(RecordVersion::new)
        .map_err(BorrowingRepositoryError::persistence)
}
