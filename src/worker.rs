use crate::context::Context;
use crate::event_queue::{EventOutcome, HandlerOutcome, QueueError};
use crate::handlers::HandlerRegistry;
use crate::models::EventPayload;
use log::*;

/// Single cooperative dispatcher: promote due deferred events, pull the
/// next ready one, dispatch it, then either pace (on a real remote call)
/// or loop straight back around (instant/local work). Mirrors the
/// distilled source's single-threaded worker loop — there is deliberately
/// only one of these per process, since the remote API itself is the
/// shared rate-limited resource.
pub async fn run(ctx: Context, handlers: HandlerRegistry) {
    let t_pace = crate::config::CONFIG.t_pace;
    let t_empty = crate::config::CONFIG.t_empty;

    loop {
        ctx.queue.update_scheduled();

        let event = match ctx.queue.get(t_empty).await {
            Ok(event) => event,
            Err(QueueError::Timeout) => continue,
        };

        if matches!(event.payload, EventPayload::DefaultExit) {
            info!("worker: exit event received, shutting down");
            return;
        }

        let outcome = handlers.dispatch(&ctx, &event).await;
        match outcome {
            Ok(HandlerOutcome::Success) => {
                info!("[ok] {}.{} #{}", event.event_type(), event.event_name(), event.id);
                ctx.queue.event_done(&event, EventOutcome::Success);
                ctx.clock.sleep(t_pace).await;
            }
            Ok(HandlerOutcome::Instant) => {
                ctx.queue.event_done(&event, EventOutcome::Success);
            }
            Ok(HandlerOutcome::Skip) => {
                debug!("skip {}.{} #{}", event.event_type(), event.event_name(), event.id);
            }
            Ok(HandlerOutcome::Fail) => {
                warn!("fail {}.{} #{}", event.event_type(), event.event_name(), event.id);
                ctx.queue.event_done(&event, EventOutcome::Fail);
            }
            Err(err) => {
                error!(
                    "{}.{} #{} handler error: {err}",
                    event.event_type(),
                    event.event_name(),
                    event.id
                );
                ctx.queue.event_done(&event, EventOutcome::Fail);
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::clock::{Clock, TestClock};
    use crate::event_queue::EventQueue;
    use crate::game_state::GameState;
    use crate::store::InMemoryStore;
    use crate::strategies::StrategyRegistry;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_worker_stops_on_exit_event() {
        let clock: Arc<dyn Clock> = Arc::new(TestClock::new(chrono::Utc::now()));
        let ctx = Context {
            game: Arc::new(crate::api_client::HttpGameApi::new()),
            store: Arc::new(InMemoryStore::new()),
            state: Arc::new(GameState::default()),
            queue: Arc::new(EventQueue::new(clock.clone())),
            clock,
        };
        let strategies = StrategyRegistry::new(ctx.clone());
        let handlers = HandlerRegistry::new(strategies);

        ctx.queue.put(EventPayload::DefaultExit);
        run(ctx, handlers).await;
    }
}
