// src/load_balancer/algorithm.rs
use super::{SelectError, WeightSnapshot};
use std::sync::Arc;

/// The seam a dispatch layer drives: pick an invoker, then report how the
/// call went.
pub trait LoadBalancer<I: ?Sized>: Send + Sync {
    fn select(&self) -> Result<Arc<I>, SelectError>;

    fn on_success(&self, invoker: &I);

    fn on_failure(&self, invoker: &I);

    fn snapshot(&self) -> Vec<WeightSnapshot>;

    fn name(&self) -> &'static str;
}
