//! Fixed-period tick loop with a single tick in flight.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{Instant, sleep_until};
use tracing::{Instrument, debug, error, info_span};

/// One unit of scheduled work.
#[async_trait]
pub trait Job: Send + Sync {
    async fn run(&self) -> Result<()>;
}

/// Stops a running [`Scheduler`] once the current tick has finished.
#[derive(Clone)]
pub struct ShutdownHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl ShutdownHandle {
    pub fn shutdown(&self) {
        debug!("Scheduler shutdown requested");
        self.tx.send_replace(true);
    }
}

pub struct Scheduler {
    period: Duration,
    shutdown: Arc<watch::Sender<bool>>,
}

impl Scheduler {
    /// # Panics
    /// Panics if `period` is zero.
    pub fn new(period: Duration) -> Self {
        assert!(!period.is_zero(), "scheduler period must be non-zero");
        let (tx, _) = watch::channel(false);
        Scheduler {
            period,
            shutdown: Arc::new(tx),
        }
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            tx: Arc::clone(&self.shutdown),
        }
    }

    /// Runs `job` immediately and then once per period until shutdown.
    ///
    /// Ticks run inline, so a slow job delays the loop instead of overlapping
    /// with the next tick. Periods that elapse while a tick is still running
    /// are dropped and the next tick waits for the following period boundary.
    /// Returns the number of ticks executed.
    pub async fn run<J: Job + ?Sized>(&self, job: &J) -> usize {
        let mut stop = self.shutdown.subscribe();
        let mut due = Instant::now();

        let mut ticks = 0;
        loop {
            if *stop.borrow_and_update() {
                break;
            }

            tokio::select! {
                biased;
                changed = stop.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    continue;
                }
                _ = sleep_until(due) => {}
            }

            ticks += 1;
            self.tick(job).instrument(info_span!("tick", n = ticks)).await;
            due = self.next_due(due, Instant::now());
        }

        debug!(ticks, "Scheduler stopped");
        ticks
    }

    /// First period boundary after `scheduled` that is not already in the past.
    fn next_due(&self, scheduled: Instant, now: Instant) -> Instant {
        let next = scheduled + self.period;
        if next >= now {
            return next;
        }
        let missed = (now - next).as_nanos().div_ceil(self.period.as_nanos());
        debug!(missed, "Tick overran its period, skipping missed ticks");
        next + self.period * u32::try_from(missed).unwrap_or(u32::MAX)
    }

    /// Runs a single tick. Errors are logged here and never escape.
    pub async fn tick<J: Job + ?Sized>(&self, job: &J) -> bool {
        match job.run().await {
            Ok(()) => true,
            Err(e) => {
                error!("Tick failed: {e:#}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::sleep;

    #[derive(Default)]
    struct CountingJob {
        runs: AtomicUsize,
    }

    #[async_trait]
    impl Job for CountingJob {
        async fn run(&self) -> Result<()> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[derive(Default)]
    struct FailingJob {
        runs: AtomicUsize,
    }

    #[async_trait]
    impl Job for FailingJob {
        async fn run(&self) -> Result<()> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            anyhow::bail!("upstream unavailable")
        }
    }

    struct SlowJob {
        duration: Duration,
        origin: Instant,
        starts: std::sync::Mutex<Vec<u64>>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl SlowJob {
        fn new(duration: Duration) -> Self {
            SlowJob {
                duration,
                origin: Instant::now(),
                starts: std::sync::Mutex::new(Vec::new()),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            }
        }

        fn starts(&self) -> Vec<u64> {
            self.starts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Job for SlowJob {
        async fn run(&self) -> Result<()> {
            let elapsed = self.origin.elapsed().as_secs();
            self.starts.lock().unwrap().push(elapsed);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            sleep(self.duration).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_tick_is_immediate_then_periodic() {
        let scheduler = Scheduler::new(Duration::from_secs(600));
        let handle = scheduler.shutdown_handle();
        let job = Arc::new(CountingJob::default());

        let task = {
            let job = Arc::clone(&job);
            tokio::spawn(async move { scheduler.run(job.as_ref()).await })
        };

        sleep(Duration::from_secs(1)).await;
        assert_eq!(job.runs.load(Ordering::SeqCst), 1);

        sleep(Duration::from_secs(598)).await;
        assert_eq!(job.runs.load(Ordering::SeqCst), 1);

        sleep(Duration::from_secs(2)).await;
        assert_eq!(job.runs.load(Ordering::SeqCst), 2);

        handle.shutdown();
        assert_eq!(task.await.unwrap(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_ticks_do_not_stop_the_loop() {
        let scheduler = Scheduler::new(Duration::from_secs(10));
        let handle = scheduler.shutdown_handle();
        let job = Arc::new(FailingJob::default());

        let task = {
            let job = Arc::clone(&job);
            tokio::spawn(async move { scheduler.run(job.as_ref()).await })
        };

        sleep(Duration::from_secs(25)).await;
        handle.shutdown();

        assert_eq!(task.await.unwrap(), 3);
        assert_eq!(job.runs.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_ticks_never_overlap() {
        let scheduler = Scheduler::new(Duration::from_secs(10));
        let handle = scheduler.shutdown_handle();
        let job = Arc::new(SlowJob::new(Duration::from_secs(25)));

        let task = {
            let job = Arc::clone(&job);
            tokio::spawn(async move { scheduler.run(job.as_ref()).await })
        };

        sleep(Duration::from_secs(100)).await;
        handle.shutdown();
        let ticks = task.await.unwrap();

        assert_eq!(job.max_in_flight.load(Ordering::SeqCst), 1);
        assert_eq!(job.starts(), vec![0, 30, 60, 90]);
        assert_eq!(ticks, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_overrun_waits_for_next_period_boundary() {
        let scheduler = Scheduler::new(Duration::from_secs(10));
        let handle = scheduler.shutdown_handle();
        let job = Arc::new(SlowJob::new(Duration::from_secs(15)));

        let task = {
            let job = Arc::clone(&job);
            tokio::spawn(async move { scheduler.run(job.as_ref()).await })
        };

        sleep(Duration::from_secs(62)).await;
        handle.shutdown();
        task.await.unwrap();

        // Ticks due at 10, 30 and 50 fall inside a running tick and are dropped
        assert_eq!(job.starts(), vec![0, 20, 40, 60]);
    }

    #[test]
    fn test_next_due_skips_to_following_boundary() {
        let scheduler = Scheduler::new(Duration::from_secs(10));
        let start = Instant::now();
        let secs = Duration::from_secs;

        assert_eq!(scheduler.next_due(start, start + secs(3)), start + secs(10));
        assert_eq!(scheduler.next_due(start, start + secs(10)), start + secs(10));
        assert_eq!(scheduler.next_due(start, start + secs(15)), start + secs(20));
        assert_eq!(scheduler.next_due(start, start + secs(20)), start + secs(20));
        assert_eq!(scheduler.next_due(start, start + secs(21)), start + secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_before_run_executes_no_ticks() {
        let scheduler = Scheduler::new(Duration::from_secs(10));
        scheduler.shutdown_handle().shutdown();

        let job = CountingJob::default();
        assert_eq!(scheduler.run(&job).await, 0);
        assert_eq!(job.runs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_tick_reports_outcome() {
        let scheduler = Scheduler::new(Duration::from_secs(10));
        assert!(scheduler.tick(&CountingJob::default()).await);
        assert!(!scheduler.tick(&FailingJob::default()).await);
    }

    #[test]
    #[should_panic(expected = "scheduler period must be non-zero")]
    fn test_zero_period_is_rejected() {
        Scheduler::new(Duration::ZERO);
    }
}
