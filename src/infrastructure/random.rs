use crate::domain::ports::ClaimCodeGenerator;
use rand::Rng;
use rand::distributions::Alphanumeric;

pub const DEFAULT_CLAIM_CODE_LENGTH: usize = 128;
/// Shorter alphanumeric codes collide too often to be handed out.
pub const MIN_CLAIM_CODE_LENGTH: usize = 8;

/// Generates claim codes from a thread-local CSPRNG.
#[derive(Debug, Clone)]
pub struct RandomClaimCodeGenerator {
    length: usize,
}

impl RandomClaimCodeGenerator {
    pub fn new(length: usize) -> Self {
        Self { length }
    }
}

impl Default for RandomClaimCodeGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_CLAIM_CODE_LENGTH)
    }
}

impl ClaimCodeGenerator for RandomClaimCodeGenerator {
    fn generate(&self) -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(self.length)
            .map(char::from)
            .collect()
    }
}
