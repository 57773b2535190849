//! Random handover code generator.

use crate::borrowing::{
    domain::{BorrowingDomainError, HandoverCode},
    ports::CodeGenerator,
};
use rand::Rng;

/// Draws each digit uniformly from `0-9` using the thread-local RNG.
///
/// Leading zeros are kept, so every code of the requested length is equally
/// likely.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomCodeGenerator;

impl CodeGenerator for RandomCodeGenerator {
    fn generate(&self, length: usize) -> Result<HandoverCode, BorrowingDomainError> {
        let mut rng = rand::thread_rng();
        let digits: String = (0..length)
            .map(|_| char::from(b'0' + rng.gen_range(0..10_u8)))
            .collect();
        HandoverCode::new(digits)
    }
}
