// src/invoker/mod.rs
mod endpoint;

pub use endpoint::Endpoint;

use std::fmt::Debug;

/// A selectable target of dispatched work.
///
/// The balancer never mutates an invoker; all selection weight state lives
/// in the balancer's registry. Identifiers must be stable for the lifetime
/// of the invoker and unique within one balancer.
pub trait Invoker: Send + Sync + Debug {
    fn id(&self) -> &str;

    fn is_available(&self) -> bool;
}
