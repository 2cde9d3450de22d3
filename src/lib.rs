// src/lib.rs
//! Smooth weighted round-robin selection with success/failure feedback.
//!
//! [`load_balancer::SmoothWeightedBalancer`] is the core; the remaining
//! modules configure it, drive it and report on it.

pub mod config;
pub mod invoker;
pub mod load_balancer;
pub mod metrics;
pub mod report;
pub mod retry;
pub mod simulation;

pub use invoker::{Endpoint, Invoker};
pub use load_balancer::{LoadBalancer, SelectError, SmoothWeightedBalancer, WeightSnapshot};
