use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use meter_domain::AggregatedPoint;

use crate::report::ChartRequest;

/// Cache for repeated chart redraws over an unchanged range.
///
/// Entries are immutable `Arc`s keyed by the full chart request
/// (meter, range, granularity, policy, columns). An entry is only ever
/// replaced wholesale, never mutated in place, so concurrent readers can
/// hold a result across a refresh without partial-update races.
#[derive(Debug, Default)]
pub struct ReportCache {
    entries: RwLock<HashMap<ChartRequest, Arc<Vec<AggregatedPoint>>>>,
}

impl ReportCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, request: &ChartRequest) -> Option<Arc<Vec<AggregatedPoint>>> {
        let guard = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        guard.get(request).map(Arc::clone)
    }

    pub fn insert(
        &self,
        request: ChartRequest,
        points: Vec<AggregatedPoint>,
    ) -> Arc<Vec<AggregatedPoint>> {
        let entry = Arc::new(points);
        let mut guard = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        guard.insert(request, Arc::clone(&entry));
        entry
    }

    /// Look up the request, computing and storing on a miss.
    pub fn get_or_insert_with<F>(&self, request: &ChartRequest, compute: F) -> Arc<Vec<AggregatedPoint>>
    where
        F: FnOnce() -> Vec<AggregatedPoint>,
    {
        if let Some(hit) = self.get(request) {
            metrics::counter!("report_cache_hits_total").increment(1);
            return hit;
        }
        metrics::counter!("report_cache_misses_total").increment(1);
        self.insert(request.clone(), compute())
    }

    pub fn clear(&self) {
        let mut guard = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        guard.clear();
    }
}
