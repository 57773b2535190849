//! Behaviour tests for the borrowing lifecycle.

#[path = "borrowing_lifecycle_steps/mod.rs"]
mod borrowing_lifecycle_steps_defs;

use borrowing_lifecycle_steps_defs::world::{BorrowingWorld, world};
use rstest_bdd_macros::scenario;

#[scenario(
    path = "tests/features/borrowing_lifecycle.feature",
    name = "Complete a borrowing from request to review"
)]
#[tokio::test(flavor = "multi_thread")]
async fn complete_borrowing_from_request_to_review(world: BorrowingWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/borrowing_lifecycle.feature",
    name = "Reject a wrong pickup code"
)]
#[tokio::test(flavor = "multi_thread")]
async fn reject_wrong_pickup_code(world: BorrowingWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/borrowing_lifecycle.feature",
    name = "Retry a failed deposit refund"
)]
#[tokio::test(flavor = "multi_thread")]
async fn retry_failed_deposit_refund(world: BorrowingWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/borrowing_lifecycle.feature",
    name = "Reject a pickup confirmation before the booking is confirmed"
)]
#[tokio::test(flavor = "multi_thread")]
async fn reject_pickup_confirmation_before_booking_confirmed(world: BorrowingWorld) {
    let _ = world;
}
