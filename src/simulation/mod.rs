// src/simulation/mod.rs
//! Drives a balancer the way a dispatch layer would: select an invoker,
//! pretend to call it, report the outcome.

use crate::config::{BackendConfig, Config, SimulationConfig};
use crate::invoker::{Endpoint, Invoker};
use crate::load_balancer::{LoadBalancer, SmoothWeightedBalancer, WeightSnapshot};
use crate::metrics::MetricsCollector;
use crate::retry::RetryStrategy;
use dashmap::DashMap;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info};
use uuid::Uuid;

/// Build endpoints and a balancer over them, in configuration order.
pub fn build_balancer(
    backends: &[BackendConfig],
) -> (Vec<Arc<Endpoint>>, SmoothWeightedBalancer<Endpoint>) {
    let endpoints: Vec<Arc<Endpoint>> = backends
        .iter()
        .map(|b| Arc::new(Endpoint::new(b.url.clone()).with_availability(b.available)))
        .collect();

    let balancer = SmoothWeightedBalancer::new(
        endpoints
            .iter()
            .cloned()
            .zip(backends.iter().map(|b| b.weight)),
    );

    (endpoints, balancer)
}

/// Unvalidated configs may carry NaN or out-of-range rates; `gen_bool`
/// panics on those.
fn usable_rate(rate: f64) -> f64 {
    if rate.is_finite() {
        rate.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InvokerTally {
    pub selections: u64,
    pub successes: u64,
    pub failures: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvokerReport {
    #[serde(flatten)]
    pub weights: WeightSnapshot,
    #[serde(flatten)]
    pub tally: InvokerTally,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationReport {
    pub balancer: String,
    pub dispatched: u64,
    pub dropped: u64,
    pub invokers: Vec<InvokerReport>,
}

pub struct Simulation<B> {
    balancer: Arc<B>,
    config: SimulationConfig,
    retry: RetryStrategy,
    failure_rates: HashMap<String, f64>,
    metrics: Option<Arc<MetricsCollector>>,

    tallies: DashMap<String, InvokerTally>,
    dispatched: AtomicU64,
    dropped: AtomicU64,
}

impl<B> Simulation<B>
where
    B: LoadBalancer<Endpoint> + 'static,
{
    pub fn new(balancer: Arc<B>, config: &Config, metrics: Option<Arc<MetricsCollector>>) -> Self {
        let failure_rates = config
            .backends
            .iter()
            .map(|b| {
                let id = Endpoint::new(b.url.clone()).id;
                (id, usable_rate(b.failure_rate))
            })
            .collect();

        Self {
            balancer,
            config: config.simulation.clone(),
            retry: RetryStrategy::new(config.retry.clone()),
            failure_rates,
            metrics,
            tallies: DashMap::new(),
            dispatched: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
        }
    }

    /// Run all iterations across the configured workers and report the
    /// final state.
    pub async fn run(self: Arc<Self>) -> SimulationReport {
        let workers = self.config.workers.max(1) as u64;
        let per_worker = self.config.iterations / workers;
        let remainder = self.config.iterations % workers;

        info!(
            "Starting simulation: {} iterations across {} workers using {}",
            self.config.iterations,
            workers,
            self.balancer.name()
        );

        let mut tasks = Vec::new();
        for worker in 0..workers {
            let count = per_worker + u64::from(worker < remainder);
            let simulation = self.clone();
            tasks.push(tokio::spawn(async move {
                simulation.run_worker(worker, count).await
            }));
        }

        for result in futures::future::join_all(tasks).await {
            if let Err(e) = result {
                error!("Worker task join error: {}", e);
            }
        }

        let report = self.report();
        info!(
            "Simulation complete: {} dispatched, {} dropped",
            report.dispatched, report.dropped
        );
        report
    }

    async fn run_worker(&self, worker: u64, count: u64) {
        let mut rng = StdRng::seed_from_u64(self.config.seed.wrapping_add(worker));
        debug!("Worker {} dispatching {} requests", worker, count);

        for _ in 0..count {
            self.dispatch(&mut rng).await;
        }
    }

    async fn dispatch(&self, rng: &mut StdRng) {
        let request_id = Uuid::new_v4();

        match self.retry.execute(|| async { self.balancer.select() }).await {
            Ok(invoker) => {
                let rate = self.failure_rates.get(invoker.id()).copied().unwrap_or(0.0);
                let success = !rng.gen_bool(rate);

                if success {
                    self.balancer.on_success(&invoker);
                } else {
                    self.balancer.on_failure(&invoker);
                }
                debug!(%request_id, invoker = invoker.id(), success, "dispatched");

                let mut tally = self.tallies.entry(invoker.id().to_string()).or_default();
                tally.selections += 1;
                if success {
                    tally.successes += 1;
                } else {
                    tally.failures += 1;
                }
                drop(tally);

                if let Some(metrics) = &self.metrics {
                    metrics.record_selection(invoker.id());
                    metrics.record_outcome(invoker.id(), success);
                }
            }
            Err(e) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                if let Some(metrics) = &self.metrics {
                    metrics.record_unavailable();
                }
                debug!(%request_id, "dropped: {}", e);
            }
        }

        let n = self.dispatched.fetch_add(1, Ordering::Relaxed) + 1;
        if self.config.report_every > 0 && n % self.config.report_every == 0 {
            let snapshot = self.balancer.snapshot();
            info!(
                "After {} dispatches: {}",
                n,
                snapshot
                    .iter()
                    .map(|s| format!("{}={}/{}", s.id, s.effective_weight, s.current_weight))
                    .collect::<Vec<_>>()
                    .join(" ")
            );
            if let Some(metrics) = &self.metrics {
                metrics.observe_weights(&snapshot);
            }
        }
    }

    pub fn report(&self) -> SimulationReport {
        let snapshot = self.balancer.snapshot();
        if let Some(metrics) = &self.metrics {
            metrics.observe_weights(&snapshot);
        }

        let invokers = snapshot
            .into_iter()
            .map(|weights| {
                let tally = self
                    .tallies
                    .get(&weights.id)
                    .map(|t| *t)
                    .unwrap_or_default();
                InvokerReport { weights, tally }
            })
            .collect();

        SimulationReport {
            balancer: self.balancer.name().to_string(),
            dispatched: self.dispatched.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            invokers,
        }
    }
}
