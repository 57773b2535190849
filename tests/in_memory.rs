//! In-memory adapter integration tests.
//!
//! Tests are organized into modules by functionality:
//! - `repository_tests`: Repository contract and version checks
//! - `lifecycle_tests`: Borrowing flows through the public service API

mod in_memory {
    pub mod helpers;

    mod lifecycle_tests;
    mod repository_tests;
}
