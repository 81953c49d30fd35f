//! Per-evaluation timing for the right-hand-side driver.
//!
//! [`RhsMetrics`] captures where the time of one
//! [`Simulation::rhs`](crate::Simulation::rhs) call went, per component
//! and per phase.

/// Timing collected during a single right-hand-side evaluation.
///
/// All durations are in microseconds. Entries are keyed by component
/// label (`"d+ (evolve_density)"`) and appear in pipeline order.
#[derive(Clone, Debug, Default)]
pub struct RhsMetrics {
    /// Wall-clock time for the entire evaluation, in microseconds.
    pub total_us: u64,
    /// Per-component `transform` times: `(label, microseconds)`.
    pub transform_us: Vec<(String, u64)>,
    /// Per-component `finally` times: `(label, microseconds)`.
    pub finally_us: Vec<(String, u64)>,
    /// Time spent on the finiteness scan, zero when it is disabled.
    pub finite_check_us: u64,
    /// Cumulative number of completed evaluations.
    pub evaluations: u64,
}

impl RhsMetrics {
    /// Combined `transform` and `finally` time of one component.
    pub fn component_us(&self, label: &str) -> Option<u64> {
        let find = |entries: &[(String, u64)]| {
            entries
                .iter()
                .find(|(l, _)| l == label)
                .map(|&(_, us)| us)
        };
        match (find(&self.transform_us), find(&self.finally_us)) {
            (None, None) => None,
            (t, f) => Some(t.unwrap_or(0) + f.unwrap_or(0)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_metrics_are_zero() {
        let m = RhsMetrics::default();
        assert_eq!(m.total_us, 0);
        assert!(m.transform_us.is_empty());
        assert!(m.finally_us.is_empty());
        assert_eq!(m.finite_check_us, 0);
        assert_eq!(m.evaluations, 0);
    }

    #[test]
    fn component_time_sums_both_phases() {
        let m = RhsMetrics {
            transform_us: vec![("d+ (evolve_density)".into(), 3)],
            finally_us: vec![("d+ (evolve_density)".into(), 40)],
            ..RhsMetrics::default()
        };
        assert_eq!(m.component_us("d+ (evolve_density)"), Some(43));
        assert_eq!(m.component_us("e (evolve_density)"), None);
    }
}
