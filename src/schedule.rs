use std::{
    future::Future,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use tokio::{
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};

/// What to do when a tick fires while the previous run is still going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlap {
    /// Start another run anyway; whichever finishes last wins.
    Allow,
    /// Drop the tick.
    Skip,
}

/// Clears the in-flight flag when a run ends, including by panic.
struct RunGuard(Arc<AtomicBool>);

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// A repeating task. The first run starts immediately.
///
/// Dropping the handle does not stop the task; call [`Periodic::cancel`].
#[derive(Debug)]
pub struct Periodic {
    driver: JoinHandle<()>,
}

impl Periodic {
    pub fn spawn<F, Fut>(period: Duration, overlap: Overlap, mut task: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let running = Arc::new(AtomicBool::new(false));
        let driver = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if overlap == Overlap::Skip && running.swap(true, Ordering::AcqRel) {
                    tracing::debug!("previous run still in flight, skipping tick");
                    continue;
                }
                let run = task();
                let guard = RunGuard(running.clone());
                tokio::spawn(async move {
                    let _guard = guard;
                    run.await;
                });
            }
        });
        Self { driver }
    }

    /// Stops future ticks. Runs already started are left to finish.
    pub fn cancel(&self) {
        self.driver.abort();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;
    use tokio::time::sleep;

    fn counting(
        starts: &Arc<AtomicUsize>,
        busy: Duration,
    ) -> impl FnMut() -> std::pin::Pin<Box<dyn Future<Output = ()> + Send>> + Send + 'static {
        let starts = starts.clone();
        move || {
            let starts = starts.clone();
            Box::pin(async move {
                starts.fetch_add(1, Ordering::SeqCst);
                sleep(busy).await;
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_immediately_then_every_period() {
        let starts = Arc::new(AtomicUsize::new(0));
        let task = Periodic::spawn(
            Duration::from_secs(10),
            Overlap::Allow,
            counting(&starts, Duration::ZERO),
        );
        sleep(Duration::from_secs(25)).await;
        assert_eq!(starts.load(Ordering::SeqCst), 3);
        task.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn overlapping_runs_are_allowed_by_default() {
        let starts = Arc::new(AtomicUsize::new(0));
        let task = Periodic::spawn(
            Duration::from_secs(10),
            Overlap::Allow,
            counting(&starts, Duration::from_secs(15)),
        );
        sleep(Duration::from_secs(32)).await;
        assert_eq!(starts.load(Ordering::SeqCst), 4);
        task.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn skip_guard_drops_ticks_while_busy() {
        let starts = Arc::new(AtomicUsize::new(0));
        let task = Periodic::spawn(
            Duration::from_secs(10),
            Overlap::Skip,
            counting(&starts, Duration::from_secs(15)),
        );
        sleep(Duration::from_secs(32)).await;
        assert_eq!(starts.load(Ordering::SeqCst), 2);
        task.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn skip_guard_recovers_after_a_panicking_run() {
        let starts = Arc::new(AtomicUsize::new(0));
        let counter = starts.clone();
        let task = Periodic::spawn(Duration::from_secs(10), Overlap::Skip, move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    panic!("first run fails");
                }
            }
        });
        sleep(Duration::from_secs(25)).await;
        assert_eq!(starts.load(Ordering::SeqCst), 3);
        task.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_future_ticks() {
        let starts = Arc::new(AtomicUsize::new(0));
        let task = Periodic::spawn(
            Duration::from_secs(10),
            Overlap::Allow,
            counting(&starts, Duration::ZERO),
        );
        sleep(Duration::from_secs(5)).await;
        task.cancel();
        sleep(Duration::from_secs(50)).await;
        assert_eq!(starts.load(Ordering::SeqCst), 1);
    }
}
