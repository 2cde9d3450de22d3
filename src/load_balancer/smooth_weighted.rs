// src/load_balancer/smooth_weighted.rs
use super::{LoadBalancer, Registry, SelectError, WeightSnapshot};
use crate::invoker::Invoker;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Smooth weighted round-robin with success/failure feedback.
///
/// Every call adds each record's effective weight to its current weight,
/// picks the record with the highest current weight (the first one in
/// registry order on ties) and knocks the winner back down by the sum of
/// all effective weights. For weights `{a: 5, b: 1, c: 1}` this yields
/// `a a b a c a a` rather than `a a a a a b c`.
///
/// Failures lower an invoker's effective weight by one, successes raise it
/// by one up to its static weight. There is no floor: an invoker that keeps
/// failing can reach zero or negative effective weight.
///
/// All operations take the same registry-wide lock, so the balancer can be
/// shared across threads behind an `Arc`.
pub struct SmoothWeightedBalancer<I: Invoker + ?Sized = dyn Invoker> {
    registry: Mutex<Registry<I>>,
}

impl<I: Invoker + ?Sized> SmoothWeightedBalancer<I> {
    /// Builds the registry in iteration order.
    pub fn new<W>(weights: W) -> Self
    where
        W: IntoIterator<Item = (Arc<I>, i64)>,
    {
        Self {
            registry: Mutex::new(Registry::new(weights)),
        }
    }

    pub fn len(&self) -> usize {
        self.registry.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.lock().is_empty()
    }

    pub fn select(&self) -> Result<Arc<I>, SelectError> {
        let mut registry = self.registry.lock();

        match registry.records() {
            [] => {
                debug!("Selection failed: no invokers registered");
                return Err(SelectError::Unavailable);
            }
            // Liveness is only consulted when there is nothing else to pick.
            [only] => {
                return if only.invoker.is_available() {
                    Ok(only.invoker.clone())
                } else {
                    debug!("Selection failed: sole invoker {} is unavailable", only.invoker.id());
                    Err(SelectError::Unavailable)
                };
            }
            _ => {}
        }

        let records = registry.records_mut();
        let mut total = 0i64;
        let mut best: Option<(usize, i64)> = None;

        for (position, record) in records.iter_mut().enumerate() {
            // Weight sums wrap on overflow.
            total = total.wrapping_add(record.effective_weight);
            record.current_weight = record.current_weight.wrapping_add(record.effective_weight);

            // Strictly greater: the earliest record wins ties.
            match best {
                Some((_, max)) if record.current_weight <= max => {}
                _ => best = Some((position, record.current_weight)),
            }
        }

        let Some((winner, _)) = best else {
            return Err(SelectError::Unavailable);
        };

        let record = &mut records[winner];
        record.current_weight = record.current_weight.wrapping_sub(total);

        trace!(
            invoker = record.invoker.id(),
            current_weight = record.current_weight,
            total,
            "selected invoker"
        );

        Ok(record.invoker.clone())
    }

    pub fn on_success(&self, invoker: &I) {
        let mut registry = self.registry.lock();

        let Some(record) = registry.find_mut(invoker.id()) else {
            debug!("Success reported for unregistered invoker {}", invoker.id());
            return;
        };

        if record.effective_weight < record.static_weight {
            record.effective_weight += 1;
            debug!(
                "Invoker {} recovering, effective weight {}/{}",
                invoker.id(),
                record.effective_weight,
                record.static_weight
            );
        }
    }

    pub fn on_failure(&self, invoker: &I) {
        let mut registry = self.registry.lock();

        let Some(record) = registry.find_mut(invoker.id()) else {
            debug!("Failure reported for unregistered invoker {}", invoker.id());
            return;
        };

        record.effective_weight = record.effective_weight.wrapping_sub(1);

        if record.effective_weight <= 0 {
            warn!(
                "Invoker {} effective weight dropped to {}",
                invoker.id(),
                record.effective_weight
            );
        } else {
            debug!(
                "Invoker {} degraded, effective weight {}/{}",
                invoker.id(),
                record.effective_weight,
                record.static_weight
            );
        }
    }

    pub fn snapshot(&self) -> Vec<WeightSnapshot> {
        self.registry.lock().snapshot()
    }
}

impl<I: Invoker + ?Sized> Default for SmoothWeightedBalancer<I> {
    fn default() -> Self {
        Self {
            registry: Mutex::new(Registry::default()),
        }
    }
}

impl<I: Invoker + ?Sized> LoadBalancer<I> for SmoothWeightedBalancer<I> {
    fn select(&self) -> Result<Arc<I>, SelectError> {
        SmoothWeightedBalancer::select(self)
    }

    fn on_success(&self, invoker: &I) {
        SmoothWeightedBalancer::on_success(self, invoker)
    }

    fn on_failure(&self, invoker: &I) {
        SmoothWeightedBalancer::on_failure(self, invoker)
    }

    fn snapshot(&self) -> Vec<WeightSnapshot> {
        SmoothWeightedBalancer::snapshot(self)
    }

    fn name(&self) -> &'static str {
        "smooth_weighted_round_robin"
    }
}
