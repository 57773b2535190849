//! Contract tests for [`InMemoryBorrowingRepository`].

use crate::in_memory::helpers::{clock, requested_record};
use eyre::{bail, ensure};
use lendwise::borrowing::{
    adapters::memory::InMemoryBorrowingRepository,
    domain::{HandoverCode, PartyId, RecordVersion},
    ports::{BorrowingRepository, BorrowingRepositoryError},
};
use mockable::DefaultClock;
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn store_rejects_duplicate_ids(clock: DefaultClock) -> eyre::Result<()> {
    let repo = InMemoryBorrowingRepository::new();
    let record = requested_record("ana", "ben", &clock)?;
    repo.store(&record).await?;

    let result = repo.store(&record).await;

    ensure!(matches!(
        result,
        Err(BorrowingRepositoryError::DuplicateBorrowing(id)) if id == record.id()
    ));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn update_requires_the_stored_version(clock: DefaultClock) -> eyre::Result<()> {
    let repo = InMemoryBorrowingRepository::new();
    let record = requested_record("ana", "ben", &clock)?;
    repo.store(&record).await?;

    let mut confirmed = record.clone();
    confirmed.confirm(HandoverCode::new("1234567")?, &clock)?;
    repo.update(&confirmed, record.version()).await?;

    let stale = repo.update(&confirmed, record.version()).await;
    let Err(BorrowingRepositoryError::VersionConflict {
        expected, actual, ..
    }) = stale
    else {
        bail!("expected version conflict, got {stale:?}");
    };
    ensure!(expected == RecordVersion::INITIAL);
    ensure!(actual == confirmed.version());

    let stored = repo.find_by_id(record.id()).await?;
    ensure!(stored.as_ref() == Some(&confirmed));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn update_of_unknown_record_is_not_found(clock: DefaultClock) -> eyre::Result<()> {
    let repo = InMemoryBorrowingRepository::new();
    let record = requested_record("ana", "ben", &clock)?;

    let result = repo.update(&record, record.version()).await;

    ensure!(matches!(
        result,
        Err(BorrowingRepositoryError::NotFound(id)) if id == record.id()
    ));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn find_by_party_matches_either_role_in_creation_order(
    clock: DefaultClock,
) -> eyre::Result<()> {
    let repo = InMemoryBorrowingRepository::new();
    let borrowed = requested_record("ana", "ben", &clock)?;
    let lent = requested_record("cleo", "ana", &clock)?;
    let unrelated = requested_record("cleo", "ben", &clock)?;
    for record in [&lent, &unrelated, &borrowed] {
        repo.store(record).await?;
    }

    let found = repo.find_by_party(&PartyId::new("ana")?).await?;

    let ids: Vec<_> = found.iter().map(|record| record.id()).collect();
    ensure!(ids == vec![borrowed.id(), lent.id()]);
    Ok(())
}
