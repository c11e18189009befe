use std::future::Future;
use std::time::Duration;

use crate::domain::routine::Routine;

/// Drives a routine forever, alternating one run with one fixed-length sleep.
/// The routine and the sleep are both injected, so a single cycle can be
/// exercised without the infinite loop.
pub struct Scheduler {
    interval: Duration,
}

impl Scheduler {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// One RUNNING phase. The routine is the unit of failure: whatever error
    /// report it returns is logged here and goes no further.
    pub async fn run_cycle(&self, routine: &dyn Routine) {
        tracing::info!("🔄 Starting new sync run...");
        match routine.run().await {
            Ok(()) => tracing::info!("✅ {}: OK", routine.name()),
            Err(report) => tracing::error!("❌ {}: {:?}", routine.name(), report),
        }
    }

    /// Alternates RUNNING and SLEEPING until the process is terminated from
    /// the outside.
    pub async fn run_forever<S, F>(&self, routine: &dyn Routine, mut sleep: S)
    where
        S: FnMut(Duration) -> F,
        F: Future<Output = ()>,
    {
        loop {
            self.run_cycle(routine).await;
            tracing::info!("⏸ Sleeping for {} seconds...", self.interval.as_secs());
            sleep(self.interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::routine::RoutineError;
    use error_stack::report;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingRoutine {
        runs: AtomicUsize,
        fail: bool,
    }

    #[async_trait::async_trait]
    impl Routine for CountingRoutine {
        fn name(&self) -> &str {
            "Counting"
        }

        async fn run(&self) -> error_stack::Result<(), RoutineError> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(report!(RoutineError::routine_failure("boom")));
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_run_cycle_invokes_the_routine_once() {
        let routine = CountingRoutine::default();
        let scheduler = Scheduler::new(Duration::from_secs(7200));
        scheduler.run_cycle(&routine).await;
        scheduler.run_cycle(&routine).await;
        assert_eq!(routine.runs.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_run_cycle_swallows_routine_errors() {
        let routine = CountingRoutine {
            runs: AtomicUsize::new(0),
            fail: true,
        };
        let scheduler = Scheduler::new(Duration::from_secs(7200));
        // A failed run must be a no-op for the cycle, not a crash.
        scheduler.run_cycle(&routine).await;
        assert_eq!(routine.runs.load(Ordering::SeqCst), 1);
    }
}
