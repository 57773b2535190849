//! Application services for borrowing lifecycle orchestration.

mod config;
mod lifecycle;
mod locks;

pub use config::{LifecycleConfig, LifecycleConfigError};
pub use lifecycle::{
    BorrowingLifecycleError, BorrowingLifecycleResult, BorrowingLifecycleService,
    ConditionResolution, CreateBorrowingRequest, LifecycleErrorKind,
};
