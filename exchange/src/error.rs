// Structured errors for the one place a `Book` can actually fail at
// runtime: rejecting a malformed `BookConfig`. Everything else the book
// does is either infallible or a programming-error invariant violation,
// which panics (via `debug_assert!`) rather than returning a `Result` — a
// caller can't meaningfully recover from "the matching core is internally
// inconsistent."

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("initial_ring_capacity must be a power of two >= 2, got {0}")]
    InvalidRingCapacity(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_is_descriptive() {
        assert_eq!(
            ConfigError::InvalidRingCapacity(3).to_string(),
            "initial_ring_capacity must be a power of two >= 2, got 3"
        );
    }
}
