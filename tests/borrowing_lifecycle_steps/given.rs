//! Given steps for borrowing lifecycle BDD scenarios.

use super::world::{BorrowingWorld, drill_booking, run_async};
use eyre::WrapErr;
use lendwise::borrowing::{domain::HandoverCode, ports::PaymentError};
use rstest_bdd_macros::given;

#[given("a requested borrowing with a deposit of {deposit:u64}")]
fn requested_borrowing(world: &mut BorrowingWorld, deposit: u64) -> Result<(), eyre::Report> {
    create_borrowing(world, deposit)
}

#[given("a borrowing awaiting its pickup code")]
fn borrowing_awaiting_pickup_code(world: &mut BorrowingWorld) -> Result<(), eyre::Report> {
    create_borrowing(world, 5_000)?;
    confirm_booking(world)
}

#[given("a borrowing awaiting its condition check")]
fn borrowing_awaiting_condition_check(world: &mut BorrowingWorld) -> Result<(), eyre::Report> {
    create_borrowing(world, 5_000)?;
    confirm_booking(world)?;
    let id = world.borrowing_id()?;
    let pickup_code = issued_code(world.borrowing()?.pickup_code())?;

    run_async(async {
        world.service.submit_pickup_code(id, &pickup_code).await?;
        world.service.confirm_pickup(id).await?;
        let issued = world.service.issue_return_code(id).await?;
        let return_code = issued_code(issued.return_code())?;
        world.service.submit_return_code(id, &return_code).await?;
        let pending = world.service.confirm_return(id).await?;
        world.borrowing = Some(pending);
        Ok::<_, eyre::Report>(())
    })
    .wrap_err("drive borrowing to condition check")
}

#[given("the payment gateway is unavailable")]
fn payment_gateway_unavailable(world: &mut BorrowingWorld) {
    world
        .payments
        .fail_next(PaymentError::Unavailable("connection refused".to_owned()));
}

fn create_borrowing(world: &mut BorrowingWorld, deposit: u64) -> Result<(), eyre::Report> {
    let created = run_async(world.service.create_request(drill_booking(deposit)))
        .wrap_err("create borrowing for scenario")?;
    world.borrowing = Some(created);
    Ok(())
}

fn confirm_booking(world: &mut BorrowingWorld) -> Result<(), eyre::Report> {
    let id = world.borrowing_id()?;
    let confirmed = run_async(world.service.confirm(id)).wrap_err("confirm booking")?;
    world.borrowing = Some(confirmed);
    Ok(())
}

fn issued_code(code: Option<&HandoverCode>) -> Result<String, eyre::Report> {
    code.map(|issued| issued.as_str().to_owned())
        .ok_or_else(|| eyre::eyre!("expected an issued handover code"))
}
