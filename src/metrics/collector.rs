// src/metrics/collector.rs
use crate::load_balancer::WeightSnapshot;
use anyhow::{Context, Result};
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGaugeVec, Opts, Registry, TextEncoder};
use std::sync::Arc;

pub struct MetricsRegistry {
    registry: Registry,
    collector: Arc<MetricsCollector>,
}

impl MetricsRegistry {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();
        let collector = Arc::new(MetricsCollector::new(&registry)?);

        Ok(Self {
            registry,
            collector,
        })
    }

    pub fn collector(&self) -> Arc<MetricsCollector> {
        self.collector.clone()
    }

    pub fn gather(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .context("Failed to encode metrics")?;
        String::from_utf8(buffer).context("Metrics output is not UTF-8")
    }
}

pub struct MetricsCollector {
    // Selection metrics
    pub selections_total: IntCounterVec,
    pub unavailable_total: IntCounter,

    // Feedback metrics
    pub outcomes_total: IntCounterVec,

    // Weight state
    pub effective_weight: IntGaugeVec,
    pub current_weight: IntGaugeVec,
}

impl MetricsCollector {
    pub fn new(registry: &Registry) -> Result<Self> {
        let selections_total = IntCounterVec::new(
            Opts::new("swrr_selections_total", "Total selections per invoker"),
            &["invoker"],
        )?;
        registry.register(Box::new(selections_total.clone()))?;

        let unavailable_total = IntCounter::new(
            "swrr_unavailable_total",
            "Dispatches dropped because no invoker was available",
        )?;
        registry.register(Box::new(unavailable_total.clone()))?;

        let outcomes_total = IntCounterVec::new(
            Opts::new("swrr_outcomes_total", "Reported call outcomes per invoker"),
            &["invoker", "outcome"],
        )?;
        registry.register(Box::new(outcomes_total.clone()))?;

        let effective_weight = IntGaugeVec::new(
            Opts::new("swrr_effective_weight", "Current effective weight per invoker"),
            &["invoker"],
        )?;
        registry.register(Box::new(effective_weight.clone()))?;

        let current_weight = IntGaugeVec::new(
            Opts::new("swrr_current_weight", "Selection accumulator per invoker"),
            &["invoker"],
        )?;
        registry.register(Box::new(current_weight.clone()))?;

        Ok(Self {
            selections_total,
            unavailable_total,
            outcomes_total,
            effective_weight,
            current_weight,
        })
    }

    pub fn record_selection(&self, invoker: &str) {
        self.selections_total.with_label_values(&[invoker]).inc();
    }

    pub fn record_unavailable(&self) {
        self.unavailable_total.inc();
    }

    pub fn record_outcome(&self, invoker: &str, success: bool) {
        let outcome = if success { "success" } else { "failure" };
        self.outcomes_total
            .with_label_values(&[invoker, outcome])
            .inc();
    }

    pub fn observe_weights(&self, snapshot: &[WeightSnapshot]) {
        for entry in snapshot {
            self.effective_weight
                .with_label_values(&[entry.id.as_str()])
                .set(entry.effective_weight);
            self.current_weight
                .with_label_values(&[entry.id.as_str()])
                .set(entry.current_weight);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_and_gauges() {
        let registry = MetricsRegistry::new().unwrap();
        let metrics = registry.collector();

        metrics.record_selection("a:80");
        metrics.record_selection("a:80");
        metrics.record_unavailable();
        metrics.record_outcome("a:80", false);
        metrics.observe_weights(&[WeightSnapshot {
            id: "a:80".into(),
            static_weight: 5,
            effective_weight: 4,
            current_weight: -3,
        }]);

        assert_eq!(metrics.selections_total.with_label_values(&["a:80"]).get(), 2);
        assert_eq!(metrics.unavailable_total.get(), 1);
        assert_eq!(
            metrics
                .outcomes_total
                .with_label_values(&["a:80", "failure"])
                .get(),
            1
        );
        assert_eq!(metrics.effective_weight.with_label_values(&["a:80"]).get(), 4);
        assert_eq!(metrics.current_weight.with_label_values(&["a:80"]).get(), -3);

        let text = registry.gather().unwrap();
        assert!(text.contains("swrr_selections_total{invoker=\"a:80\"} 2"));
        assert!(text.contains("swrr_unavailable_total 1"));
    }
}
