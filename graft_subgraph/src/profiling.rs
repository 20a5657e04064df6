//! Scoped timers for the matcher's hot paths.
//!
//! With the `profiling` feature each [`Timer`] adds its lifetime to a global
//! per-label tally that [`report`] logs; without it timers compile to nothing.

#[cfg(feature = "profiling")]
mod enabled {
    use std::sync::OnceLock;
    use std::time::Instant;

    use dashmap::DashMap;

    /// Label -> (calls, total nanoseconds).
    static STATS: OnceLock<DashMap<&'static str, (u64, u128)>> = OnceLock::new();

    fn stats() -> &'static DashMap<&'static str, (u64, u128)> {
        STATS.get_or_init(DashMap::new)
    }

    /// Records the time between construction and drop under a label.
    pub struct Timer {
        label: &'static str,
        start: Instant,
    }

    impl Timer {
        /// Start timing `label`.
        #[inline]
        pub fn new(label: &'static str) -> Self {
            Timer {
                label,
                start: Instant::now(),
            }
        }
    }

    impl Drop for Timer {
        fn drop(&mut self) {
            let nanos = self.start.elapsed().as_nanos();
            let mut entry = stats().entry(self.label).or_insert((0, 0));
            entry.0 += 1;
            entry.1 += nanos;
        }
    }

    /// Log every label's call count and total time, slowest first.
    pub fn report() {
        let mut rows: Vec<(&'static str, u64, u128)> = stats()
            .iter()
            .map(|kv| (*kv.key(), kv.value().0, kv.value().1))
            .collect();
        rows.sort_by(|a, b| b.2.cmp(&a.2));

        for (label, calls, total_ns) in rows {
            tracing::info!(
                label,
                calls,
                total_ms = total_ns as f64 / 1_000_000.0,
                "profile"
            );
        }
    }
}

#[cfg(not(feature = "profiling"))]
mod disabled {
    /// No-op timer.
    #[derive(Clone, Copy)]
    pub struct Timer;

    impl Timer {
        /// Start timing nothing.
        #[inline]
        pub fn new(_: &'static str) -> Self {
            Timer
        }
    }

    /// No-op.
    pub fn report() {}
}

#[cfg(feature = "profiling")]
pub use enabled::*;

#[cfg(not(feature = "profiling"))]
pub use disabled::*;
