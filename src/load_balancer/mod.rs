// src/load_balancer/mod.rs
mod algorithm;
mod error;
mod registry;
mod smooth_weighted;

pub use algorithm::LoadBalancer;
pub use error::SelectError;
pub use registry::{Registry, WeightRecord, WeightSnapshot};
pub use smooth_weighted::SmoothWeightedBalancer;
