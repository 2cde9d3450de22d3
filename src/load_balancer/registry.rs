// src/load_balancer/registry.rs
use crate::invoker::Invoker;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// Weight state for one invoker.
///
/// `effective_weight` never rises above `static_weight` through feedback,
/// but has no lower bound.
pub struct WeightRecord<I: ?Sized> {
    pub invoker: Arc<I>,
    pub static_weight: i64,
    pub effective_weight: i64,
    pub current_weight: i64,
}

impl<I: Invoker + ?Sized> WeightRecord<I> {
    fn new(invoker: Arc<I>, weight: i64) -> Self {
        Self {
            invoker,
            static_weight: weight,
            effective_weight: weight,
            current_weight: 0,
        }
    }

    pub fn snapshot(&self) -> WeightSnapshot {
        WeightSnapshot {
            id: self.invoker.id().to_string(),
            static_weight: self.static_weight,
            effective_weight: self.effective_weight,
            current_weight: self.current_weight,
        }
    }
}

/// Point-in-time copy of one record, for diagnostics only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeightSnapshot {
    pub id: String,
    pub static_weight: i64,
    pub effective_weight: i64,
    pub current_weight: i64,
}

/// Insertion-ordered, fixed-cardinality set of weight records.
///
/// Records are neither added nor removed after construction, so the
/// id-to-position index never changes.
pub struct Registry<I: ?Sized> {
    records: Vec<WeightRecord<I>>,
    index: HashMap<String, usize>,
}

impl<I: Invoker + ?Sized> Registry<I> {
    pub fn new<W>(weights: W) -> Self
    where
        W: IntoIterator<Item = (Arc<I>, i64)>,
    {
        let mut records = Vec::new();
        let mut index = HashMap::new();

        for (invoker, weight) in weights {
            let id = invoker.id().to_string();
            if index.contains_key(&id) {
                warn!("Duplicate invoker {} ignored, keeping first registration", id);
                continue;
            }

            index.insert(id, records.len());
            records.push(WeightRecord::new(invoker, weight));
        }

        Self { records, index }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut WeightRecord<I>> {
        let position = self.find(id)?;
        self.records.get_mut(position)
    }

    pub fn records(&self) -> &[WeightRecord<I>] {
        &self.records
    }

    pub fn records_mut(&mut self) -> &mut [WeightRecord<I>] {
        &mut self.records
    }

    pub fn snapshot(&self) -> Vec<WeightSnapshot> {
        self.records.iter().map(WeightRecord::snapshot).collect()
    }
}

impl<I: Invoker + ?Sized> Default for Registry<I> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            index: HashMap::new(),
        }
    }
}
