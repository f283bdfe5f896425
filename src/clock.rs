use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Monotonic wall-clock abstraction. The worker and strategies only ever
/// read "now" and sleep through this trait, so tests can swap in
/// `TestClock` and drive time deterministically instead of waiting on a
/// real clock.
#[async_trait::async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
    async fn sleep(&self, duration: Duration);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

#[async_trait::async_trait]
impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// A clock a test owns and advances by hand. `sleep` never actually waits;
/// it returns immediately, since tests advance `now` directly and rely on
/// the worker re-checking `update_scheduled()` rather than on real time
/// passing.
#[derive(Debug, Clone)]
pub struct TestClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl TestClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        TestClock {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub async fn advance(&self, duration: chrono::Duration) {
        let mut now = self.now.lock().await;
        *now += duration;
    }

    pub async fn set(&self, when: DateTime<Utc>) {
        let mut now = self.now.lock().await;
        *now = when;
    }

    pub async fn current(&self) -> DateTime<Utc> {
        *self.now.lock().await
    }
}

#[async_trait::async_trait]
impl Clock for TestClock {
    fn now(&self) -> DateTime<Utc> {
        // try_lock is safe here: nothing holds this mutex across an await
        // point, and tests are single-threaded with respect to the clock.
        *self
            .now
            .try_lock()
            .expect("TestClock is not held across an await point")
    }

    async fn sleep(&self, _duration: Duration) {}
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::TimeZone;

    #[tokio::test]
    async fn test_test_clock_advance() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let clock = TestClock::new(start);
        assert_eq!(clock.now(), start);
        clock.advance(chrono::Duration::seconds(10)).await;
        assert_eq!(clock.now(), start + chrono::Duration::seconds(10));
    }

    #[tokio::test]
    async fn test_test_clock_sleep_does_not_block() {
        let clock = TestClock::new(Utc::now());
        // would hang forever on a real clock; must return immediately here
        clock.sleep(Duration::from_secs(3600)).await;
    }
}
