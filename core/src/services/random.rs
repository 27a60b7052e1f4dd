//! Cryptographically secure integer source.

use rand::{rngs::OsRng, RngCore};
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::errors::{DomainError, DomainResult};

/// Source of uniformly distributed integers
pub trait SecureRandom: Send + Sync {
    /// Uniform integer in `[min, max)`
    fn next_int(&self, min: u64, max: u64) -> DomainResult<u64>;
}

/// Operating-system CSPRNG
///
/// Never falls back to a seeded generator: if the OS source fails, the
/// error is returned to the caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsSecureRandom;

impl OsSecureRandom {
    /// Draw once to make sure the OS source is usable
    ///
    /// Called at startup; the server refuses to run when this fails.
    pub fn ensure_available() -> DomainResult<()> {
        OsSecureRandom.next_u64().map(|_| ())
    }

    fn next_u64(&self) -> DomainResult<u64> {
        let mut bytes = [0u8; 8];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| DomainError::RandomSourceUnavailable {
                message: e.to_string(),
            })?;
        Ok(u64::from_le_bytes(bytes))
    }
}

impl SecureRandom for OsSecureRandom {
    fn next_int(&self, min: u64, max: u64) -> DomainResult<u64> {
        let span = checked_span(min, max)?;

        // Rejection sampling: draws at or above the largest multiple of
        // `span` would bias the low residues.
        let zone = (u64::MAX / span) * span;
        loop {
            let value = self.next_u64()?;
            if value < zone {
                return Ok(min + value % span);
            }
        }
    }
}

/// Deterministic source replaying a fixed sequence
///
/// Each value is reduced into the requested range; the sequence wraps
/// around when exhausted.
#[derive(Debug)]
pub struct SequenceRandom {
    values: Mutex<VecDeque<u64>>,
}

impl SequenceRandom {
    pub fn new(values: impl IntoIterator<Item = u64>) -> Self {
        Self {
            values: Mutex::new(values.into_iter().collect()),
        }
    }
}

impl SecureRandom for SequenceRandom {
    fn next_int(&self, min: u64, max: u64) -> DomainResult<u64> {
        let span = checked_span(min, max)?;
        let mut values = self.values.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let value = values.pop_front().ok_or_else(|| DomainError::RandomSourceUnavailable {
            message: "sequence is empty".to_string(),
        })?;
        values.push_back(value);
        Ok(min + value % span)
    }
}

fn checked_span(min: u64, max: u64) -> DomainResult<u64> {
    if max <= min {
        return Err(DomainError::Internal {
            message: format!("empty random range [{}, {})", min, max),
        });
    }
    Ok(max - min)
}
