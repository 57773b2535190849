//! Borrowing flows through the public service API.

use crate::in_memory::helpers::{Wiring, booking, wiring, wiring_with};
use eyre::{OptionExt, ensure};
use lendwise::borrowing::{
    domain::{BorrowingState, CodeKind, PartyId},
    ports::BorrowingRepository,
    services::{LifecycleConfig, LifecycleErrorKind},
};
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn borrowing_completes_with_generated_codes(wiring: Wiring) -> eyre::Result<()> {
    let Wiring {
        service,
        payments,
        reviews,
        ..
    } = wiring;
    let id = service.create_request(booking("ana", "ben")).await?.id();

    let confirmed = service.confirm(id).await?;
    let pickup = confirmed
        .pickup_code()
        .ok_or_eyre("pickup code issued on confirmation")?;
    ensure!(pickup.len() == 7);
    service.submit_pickup_code(id, pickup.as_str()).await?;
    service.confirm_pickup(id).await?;

    let returning = service.issue_return_code(id).await?;
    let return_code = returning
        .return_code()
        .ok_or_eyre("return code issued at end of rental")?;
    ensure!(return_code.len() == 7);
    service.submit_return_code(id, return_code.as_str()).await?;
    service.confirm_return(id).await?;

    let resolution = service.resolve_condition(id, true).await?;
    let review = service.request_review(id).await?;

    ensure!(resolution.record().state() == BorrowingState::Completed);
    ensure!(payments.call_count() == 1);
    ensure!(reviews.unlocked() == vec![id]);
    let stored = service.find_by_id(id).await?.ok_or_eyre("borrowing stored")?;
    ensure!(stored.review_ref() == Some(review));
    ensure!(stored.history().len() == 8);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn configured_attempt_limit_persists_across_calls() -> eyre::Result<()> {
    let config = LifecycleConfig::from_json(r#"{"max_code_attempts": 2}"#)?;
    let Wiring { service, .. } = wiring_with(config)?;
    let id = service.create_request(booking("ana", "ben")).await?.id();
    let issued = service.confirm(id).await?;
    let pickup = issued
        .pickup_code()
        .map(|code| code.as_str().to_owned())
        .ok_or_eyre("pickup code issued")?;
    let wrong = if pickup == "0000000" { "1111111" } else { "0000000" };

    for _ in 0..2 {
        let err = service.submit_pickup_code(id, wrong).await.err();
        ensure!(err.map(|e| e.kind()) == Some(LifecycleErrorKind::CodeMismatch));
    }
    let locked = service.submit_pickup_code(id, &pickup).await.err();
    ensure!(locked.map(|e| e.kind()) == Some(LifecycleErrorKind::CodeLocked));

    let (reissued, kind) = service.reissue_code(id).await?;
    ensure!(kind == CodeKind::Pickup);
    let fresh = reissued
        .pickup_code()
        .map(|code| code.as_str().to_owned())
        .ok_or_eyre("reissued pickup code")?;
    let accepted = service.submit_pickup_code(id, &fresh).await?;
    ensure!(accepted.state() == BorrowingState::AwaitingPickupConfirmation);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn parties_see_their_own_borrowings(wiring: Wiring) -> eyre::Result<()> {
    let first = wiring.service.create_request(booking("ana", "ben")).await?;
    let second = wiring.service.create_request(booking("ben", "cleo")).await?;

    let ben = wiring.service.find_by_party(&PartyId::new("ben")?).await?;
    let cleo = wiring.service.find_by_party(&PartyId::new("cleo")?).await?;

    ensure!(ben.iter().map(|r| r.id()).eq([first.id(), second.id()]));
    ensure!(cleo.iter().map(|r| r.id()).eq([second.id()]));
    ensure!(wiring.repository.find_by_id(first.id()).await?.is_some());
    Ok(())
}
