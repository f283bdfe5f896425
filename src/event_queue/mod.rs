use crate::clock::Clock;
use crate::models::{Event, EventPayload, EventType};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Notify;

/// What a completed action reports to the worker. `Skip`/`Fail` never reach
/// [`EventQueue::event_done`] the same way `Success`/`Instant` do — see the
/// worker loop for the full mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerOutcome {
    Success,
    Fail,
    Skip,
    Instant,
}

/// The two-valued result `event_done` actually fans out on: whether
/// subscribers are notified at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    Success,
    Fail,
}

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("no ready event within the timeout")]
    Timeout,
}

type Subscriber = Box<dyn Fn(&Event) + Send + Sync>;

/// Hybrid ready-FIFO plus deferred time-priority queue with completion
/// subscriptions. One instance is process-wide; every producer-side
/// operation (`new_id`, `put`, `schedule`, `subscribe`) is a plain
/// synchronous function, not `async` — strategies' completion callbacks are
/// themselves synchronous `Fn(&Event)` closures (matching the distilled
/// source's strategy methods, which call `event_queue.put(...)` directly,
/// no await), so enqueueing from inside one must not require a runtime
/// hand-off. Only `get`, which genuinely waits on a condition, is async.
pub struct EventQueue {
    ready: Mutex<VecDeque<Event>>,
    ready_notify: Notify,
    deferred: Mutex<BTreeMap<(chrono::DateTime<chrono::Utc>, u64), Event>>,
    next_id: AtomicU64,
    subscribers: Mutex<HashMap<(EventType, &'static str), Vec<Subscriber>>>,
    clock: Arc<dyn Clock>,
}

impl EventQueue {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        EventQueue {
            ready: Mutex::new(VecDeque::new()),
            ready_notify: Notify::new(),
            deferred: Mutex::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
            subscribers: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Strictly increasing, thread-safe.
    pub fn new_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Assigns an ID; does not enqueue.
    pub fn new_event(&self, payload: EventPayload) -> Event {
        Event::new(self.new_id(), payload)
    }

    /// Assigns IDs left-to-right so batch ordering survives a tie-break by
    /// ID when the batch is later scheduled at the same `when`.
    pub fn new_events_from(&self, payloads: Vec<EventPayload>) -> Vec<Event> {
        payloads
            .into_iter()
            .map(|payload| self.new_event(payload))
            .collect()
    }

    /// Pushes an already-identified event to the back of the ready FIFO.
    pub fn put_event(&self, event: Event) -> u64 {
        let id = event.id;
        self.ready.lock().unwrap().push_back(event);
        self.ready_notify.notify_one();
        id
    }

    /// Convenience: assign an ID and enqueue in one call.
    pub fn put(&self, payload: EventPayload) -> u64 {
        let event = self.new_event(payload);
        self.put_event(event)
    }

    /// Inserts events into the deferred priority queue keyed by `when` then
    /// `id`. Because IDs are assigned monotonically before this call,
    /// events sharing `when` preserve the order they were created in.
    pub fn schedule(&self, when: chrono::DateTime<chrono::Utc>, events: Vec<Event>) {
        let mut deferred = self.deferred.lock().unwrap();
        for event in events {
            deferred.insert((when, event.id), event);
        }
    }

    /// Blocking (async) pop from the ready FIFO; resolves to `Timeout` if
    /// nothing becomes ready within `timeout`.
    pub async fn get(&self, timeout: Duration) -> Result<Event, QueueError> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if let Some(event) = self.ready.lock().unwrap().pop_front() {
                return Ok(event);
            }
            let notified = self.ready_notify.notified();
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            if remaining.is_zero() {
                return Err(QueueError::Timeout);
            }
            if tokio::time::timeout(remaining, notified).await.is_err() {
                // re-check the queue once more: a put() could have raced
                // the timeout between our last pop_front and this wakeup.
                if let Some(event) = self.ready.lock().unwrap().pop_front() {
                    return Ok(event);
                }
                return Err(QueueError::Timeout);
            }
        }
    }

    /// Pops all deferred entries whose `when <= now()` and pushes them onto
    /// the ready FIFO in scheduled order, stopping at the first future
    /// entry.
    pub fn update_scheduled(&self) {
        let now = self.clock.now();
        let mut deferred = self.deferred.lock().unwrap();
        let mut due = Vec::new();
        loop {
            let is_due = match deferred.keys().next() {
                Some((when, _)) => *when <= now,
                None => false,
            };
            if !is_due {
                break;
            }
            let key = *deferred.keys().next().unwrap();
            due.push(deferred.remove(&key).unwrap());
        }
        drop(deferred);
        if due.is_empty() {
            return;
        }
        let mut ready = self.ready.lock().unwrap();
        for event in due {
            ready.push_back(event);
        }
        drop(ready);
        self.ready_notify.notify_waiters();
    }

    /// Marks completion. `Fail` discards notification; otherwise every
    /// subscriber registered for `(event.type, event.name)` is invoked in
    /// registration order. A panicking subscriber is caught and logged; it
    /// must not disrupt other subscribers or the worker.
    pub fn event_done(&self, event: &Event, outcome: EventOutcome) {
        log::debug!(
            "event done: {}.{} #{} -> {:?}",
            event.event_type(),
            event.event_name(),
            event.id,
            outcome
        );
        if outcome == EventOutcome::Fail {
            return;
        }
        let key = (event.event_type(), event.event_name());
        let subscribers = self.subscribers.lock().unwrap();
        let Some(callbacks) = subscribers.get(&key) else {
            return;
        };
        for callback in callbacks {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                callback(event);
            }));
            if let Err(panic) = result {
                let message = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "<non-string panic payload>".to_string());
                log::error!(
                    "subscriber panicked handling {}.{}: {}",
                    event.event_type(),
                    event.event_name(),
                    message
                );
            }
        }
    }

    /// Appends `callback` to the subscriber list for `(event_type, event_name)`.
    pub fn subscribe(&self, event_type: EventType, event_name: &'static str, callback: Subscriber) {
        self.subscribers
            .lock()
            .unwrap()
            .entry((event_type, event_name))
            .or_default()
            .push(callback);
    }

    #[cfg(test)]
    pub fn deferred_len(&self) -> usize {
        self.deferred.lock().unwrap().len()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::clock::TestClock;
    use chrono::{TimeZone, Utc};
    use std::sync::atomic::AtomicUsize;

    fn queue_at(when: chrono::DateTime<chrono::Utc>) -> (EventQueue, Arc<TestClock>) {
        let clock = Arc::new(TestClock::new(when));
        (EventQueue::new(clock.clone()), clock)
    }

    #[tokio::test]
    async fn test_scheduler_ordering() {
        // Scenario 1: schedule(t=10, A), schedule(t=5, B), put(C). Expected: C, B, A.
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let (queue, clock) = queue_at(start);

        let a = queue.new_event(EventPayload::ShipDock {
            ship: "A".to_string(),
        });
        let b = queue.new_event(EventPayload::ShipOrbit {
            ship: "B".to_string(),
        });
        queue.schedule(start + chrono::Duration::seconds(10), vec![a]);
        queue.schedule(start + chrono::Duration::seconds(5), vec![b]);
        let c_id = queue.put(EventPayload::ShipRefuel {
            ship: "C".to_string(),
        });

        let first = queue.get(Duration::from_millis(50)).await.unwrap();
        assert_eq!(first.id, c_id);

        clock.advance(chrono::Duration::seconds(10)).await;
        queue.update_scheduled();

        let second = queue.get(Duration::from_millis(50)).await.unwrap();
        assert_eq!(second.event_name(), "orbit");
        let third = queue.get(Duration::from_millis(50)).await.unwrap();
        assert_eq!(third.event_name(), "dock");
    }

    #[tokio::test]
    async fn test_get_times_out_when_empty() {
        let (queue, _clock) = queue_at(Utc::now());
        let result = queue.get(Duration::from_millis(20)).await;
        assert!(matches!(result, Err(QueueError::Timeout)));
    }

    #[tokio::test]
    async fn test_update_scheduled_idempotent_when_nothing_due() {
        let (queue, _clock) = queue_at(Utc::now());
        queue.update_scheduled();
        queue.update_scheduled();
        assert_eq!(queue.deferred_len(), 0);
    }

    #[tokio::test]
    async fn test_batch_preserves_order_at_same_when() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let (queue, clock) = queue_at(start);

        let events = queue.new_events_from(vec![
            EventPayload::ShipDock {
                ship: "S".to_string(),
            },
            EventPayload::ShipRefuel {
                ship: "S".to_string(),
            },
            EventPayload::ShipOrbit {
                ship: "S".to_string(),
            },
        ]);
        queue.schedule(start, events);

        clock.advance(chrono::Duration::seconds(1)).await;
        queue.update_scheduled();

        let first = queue.get(Duration::from_millis(50)).await.unwrap();
        let second = queue.get(Duration::from_millis(50)).await.unwrap();
        let third = queue.get(Duration::from_millis(50)).await.unwrap();
        assert_eq!(first.event_name(), "dock");
        assert_eq!(second.event_name(), "refuel");
        assert_eq!(third.event_name(), "orbit");
    }

    #[tokio::test]
    async fn test_subscriber_isolation() {
        // Scenario 6: first subscriber panics, second still runs exactly once.
        let (queue, _clock) = queue_at(Utc::now());
        let second_calls = Arc::new(AtomicUsize::new(0));
        let second_calls_clone = second_calls.clone();

        queue.subscribe(EventType::Ship, "navigate", Box::new(|_event| panic!("boom")));
        queue.subscribe(
            EventType::Ship,
            "navigate",
            Box::new(move |_event| {
                second_calls_clone.fetch_add(1, Ordering::SeqCst);
            }),
        );

        let event = queue.new_event(EventPayload::ShipNavigate {
            ship: "S".to_string(),
            waypoint: crate::models::WaypointSymbol("X1-TZ26-A1".to_string()),
        });
        queue.event_done(&event, EventOutcome::Success);

        assert_eq!(second_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fail_discards_notification() {
        let (queue, _clock) = queue_at(Utc::now());
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();
        queue.subscribe(
            EventType::Ship,
            "dock",
            Box::new(move |_event| {
                calls_clone.fetch_add(1, Ordering::SeqCst);
            }),
        );
        let event = queue.new_event(EventPayload::ShipDock {
            ship: "S".to_string(),
        });
        queue.event_done(&event, EventOutcome::Fail);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_scheduling_same_event_twice_delivers_twice() {
        // "Same event" means the same (type, name) scheduled twice, each
        // occurrence carrying its own freshly assigned id; duplicate ids
        // for the literal same Event are not a supported usage.
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let (queue, clock) = queue_at(start);
        let first = queue.new_event(EventPayload::ShipRefuel {
            ship: "S".to_string(),
        });
        let second = queue.new_event(EventPayload::ShipRefuel {
            ship: "S".to_string(),
        });
        queue.schedule(start, vec![first]);
        queue.schedule(start, vec![second]);
        clock.advance(chrono::Duration::seconds(1)).await;
        queue.update_scheduled();
        assert!(queue.get(Duration::from_millis(50)).await.is_ok());
        assert!(queue.get(Duration::from_millis(50)).await.is_ok());
    }
}
