//! Error types for the collection primitives

use thiserror::Error;

/// Priority queue errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueueError {
    /// Peek or pop on a queue with no items
    #[error("priority queue is empty")]
    Empty,
}

/// Result type for queue operations
pub type Result<T> = std::result::Result<T, QueueError>;
