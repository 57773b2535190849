//! When steps for borrowing lifecycle BDD scenarios.

use super::world::{BorrowingWorld, run_async};
use rstest_bdd_macros::when;

#[when("the lender confirms the booking")]
fn lender_confirms_booking(world: &mut BorrowingWorld) -> Result<(), eyre::Report> {
    let id = world.borrowing_id()?;
    let result = run_async(world.service.confirm(id));
    world.record_outcome(result);
    Ok(())
}

#[when("the borrower submits the issued pickup code")]
fn borrower_submits_issued_pickup_code(world: &mut BorrowingWorld) -> Result<(), eyre::Report> {
    let borrowing = world.borrowing()?;
    let id = borrowing.id();
    let code = borrowing
        .pickup_code()
        .map(|issued| issued.as_str().to_owned())
        .ok_or_else(|| eyre::eyre!("no pickup code was issued"))?;
    let result = run_async(world.service.submit_pickup_code(id, &code));
    world.record_outcome(result);
    Ok(())
}

#[when(r#"the borrower submits pickup code "{code}""#)]
fn borrower_submits_pickup_code(
    world: &mut BorrowingWorld,
    code: String,
) -> Result<(), eyre::Report> {
    let id = world.borrowing_id()?;
    let result = run_async(world.service.submit_pickup_code(id, &code));
    world.record_outcome(result);
    Ok(())
}

#[when("the lender confirms the pickup")]
fn lender_confirms_pickup(world: &mut BorrowingWorld) -> Result<(), eyre::Report> {
    let id = world.borrowing_id()?;
    let result = run_async(world.service.confirm_pickup(id));
    world.record_outcome(result);
    Ok(())
}

#[when("the return code is issued")]
fn return_code_issued(world: &mut BorrowingWorld) -> Result<(), eyre::Report> {
    let id = world.borrowing_id()?;
    let result = run_async(world.service.issue_return_code(id));
    world.record_outcome(result);
    Ok(())
}

#[when("the borrower submits the issued return code")]
fn borrower_submits_issued_return_code(world: &mut BorrowingWorld) -> Result<(), eyre::Report> {
    let borrowing = world.borrowing()?;
    let id = borrowing.id();
    let code = borrowing
        .return_code()
        .map(|issued| issued.as_str().to_owned())
        .ok_or_else(|| eyre::eyre!("no return code was issued"))?;
    let result = run_async(world.service.submit_return_code(id, &code));
    world.record_outcome(result);
    Ok(())
}

#[when("the return is confirmed")]
fn return_confirmed(world: &mut BorrowingWorld) -> Result<(), eyre::Report> {
    let id = world.borrowing_id()?;
    let result = run_async(world.service.confirm_return(id));
    world.record_outcome(result);
    Ok(())
}

#[when("the lender approves the condition")]
fn lender_approves_condition(world: &mut BorrowingWorld) -> Result<(), eyre::Report> {
    let id = world.borrowing_id()?;
    let result = run_async(world.service.resolve_condition(id, true))
        .map(|resolution| resolution.record().clone());
    world.record_outcome(result);
    Ok(())
}
