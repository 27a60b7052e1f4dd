//! Fixed-width numeric code generator

use std::sync::Arc;

use crate::errors::{DomainError, DomainResult};
use crate::services::random::SecureRandom;

/// Generates codes uniformly over `0 ..= 10^length - 1`, zero-padded
///
/// Leading zeros are part of the range: `000123` is as likely as `999999`.
#[derive(Clone)]
pub struct CodeGenerator {
    length: usize,
    random: Arc<dyn SecureRandom>,
}

impl CodeGenerator {
    pub fn new(length: usize, random: Arc<dyn SecureRandom>) -> Self {
        Self { length, random }
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn generate(&self) -> DomainResult<String> {
        let upper = u32::try_from(self.length)
            .ok()
            .and_then(|len| 10u64.checked_pow(len))
            .filter(|_| self.length > 0)
            .ok_or_else(|| DomainError::Internal {
                message: format!("unsupported code length {}", self.length),
            })?;

        let value = self.random.next_int(0, upper)?;
        Ok(format!("{:0width$}", value, width = self.length))
    }
}

impl std::fmt::Debug for CodeGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodeGenerator")
            .field("length", &self.length)
            .finish_non_exhaustive()
    }
}
