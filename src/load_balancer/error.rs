// src/load_balancer/error.rs

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SelectError {
    /// The registry is empty, or its only invoker reports itself down.
    /// Callers apply their own retry policy.
    #[error("No invoker available for selection")]
    Unavailable,
}
