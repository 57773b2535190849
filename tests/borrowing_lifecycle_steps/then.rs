//! Then steps for borrowing lifecycle BDD scenarios.

use super::world::{BorrowingWorld, run_async};
use lendwise::borrowing::{
    domain::{BorrowingState, MinorUnits},
    services::LifecycleErrorKind,
};
use rstest_bdd_macros::then;

#[then(r#"the borrowing state is "{state}""#)]
fn borrowing_state_is(world: &BorrowingWorld, state: String) -> Result<(), eyre::Report> {
    let expected = BorrowingState::try_from(state.as_str())
        .map_err(|err| eyre::eyre!("invalid expected state in scenario: {err}"))?;
    let id = world.borrowing_id()?;
    let stored = run_async(world.service.find_by_id(id))?
        .ok_or_else(|| eyre::eyre!("borrowing {id} is no longer stored"))?;

    if stored.state() != expected {
        return Err(eyre::eyre!(
            "expected state {}, found {}",
            expected.as_str(),
            stored.state().as_str()
        ));
    }
    Ok(())
}

#[then(r#"the action fails with "{kind}""#)]
fn action_fails_with(world: &BorrowingWorld, kind: String) -> Result<(), eyre::Report> {
    let expected = match kind.as_str() {
        "invalid_transition" => LifecycleErrorKind::InvalidTransition,
        "code_mismatch" => LifecycleErrorKind::CodeMismatch,
        "code_locked" => LifecycleErrorKind::CodeLocked,
        "refund_failed" => LifecycleErrorKind::RefundFailed,
        "not_found" => LifecycleErrorKind::NotFound,
        other => return Err(eyre::eyre!("unknown error kind in scenario: {other}")),
    };
    let err = world
        .last_error
        .as_ref()
        .ok_or_else(|| eyre::eyre!("expected the last action to fail"))?;

    if err.kind() != expected {
        return Err(eyre::eyre!("expected {expected:?} error, got {err:?}"));
    }
    Ok(())
}

#[then("a deposit refund of {amount:u64} was issued")]
fn deposit_refund_issued(world: &BorrowingWorld, amount: u64) -> Result<(), eyre::Report> {
    let id = world.borrowing_id()?;
    let refund = world
        .payments
        .refund_for(id)
        .ok_or_else(|| eyre::eyre!("no refund recorded for {id}"))?;

    if refund.amount != MinorUnits::new(amount) {
        return Err(eyre::eyre!(
            "expected refund of {amount}, found {}",
            refund.amount
        ));
    }
    Ok(())
}

#[then("the review is unlocked")]
fn review_is_unlocked(world: &BorrowingWorld) -> Result<(), eyre::Report> {
    let id = world.borrowing_id()?;
    if !world.reviews.unlocked().contains(&id) {
        return Err(eyre::eyre!("review for {id} was not unlocked"));
    }
    Ok(())
}
