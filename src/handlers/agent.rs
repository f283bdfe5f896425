use crate::context::Context;
use crate::error::HandlerError;
use crate::event_queue::HandlerOutcome;
use log::*;

pub async fn fetch(ctx: &Context) -> Result<HandlerOutcome, HandlerError> {
    let agent = ctx.game.fetch_agent().await?;
    info!("[ok] fetched agent {}, {} credits", agent.symbol, agent.credits);
    ctx.state.set_agent(agent);
    Ok(HandlerOutcome::Success)
}

/// Skips if an agent token is already bound — registration only ever
/// happens once per run.
pub async fn register(
    ctx: &Context,
    symbol: &str,
    faction: &str,
    email: Option<&str>,
) -> Result<HandlerOutcome, HandlerError> {
    if ctx.game.agent_token().is_some() {
        debug!("agent token already set, skipping register");
        return Ok(HandlerOutcome::Skip);
    }
    let result = ctx.game.register(symbol, faction, email).await?;
    ctx.game.set_agent_token(&result.token)?;
    if let Err(e) = ctx.store.save_agent_token(symbol, &result.token).await {
        warn!("failed to persist agent token for {symbol}: {e}");
    }
    info!("[ok] registered agent {symbol} under {faction}");
    ctx.state.set_agent(result.agent);
    ctx.state.upsert_ship(result.ship);
    ctx.state.upsert_contract(result.contract);
    Ok(HandlerOutcome::Success)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::clock::TestClock;
    use crate::event_queue::EventQueue;
    use crate::game_state::GameState;
    use crate::store::InMemoryStore;
    use chrono::Utc;
    use std::sync::Arc;

    fn test_context() -> Context {
        let clock = Arc::new(TestClock::new(Utc::now()));
        Context {
            game: Arc::new(crate::api_client::HttpGameApi::new()),
            store: Arc::new(InMemoryStore::new()),
            state: Arc::new(GameState::new()),
            queue: Arc::new(EventQueue::new(clock.clone())),
            clock,
        }
    }

    #[tokio::test]
    async fn test_register_skips_when_token_already_set() {
        let ctx = test_context();
        ctx.game.set_agent_token("already-set").unwrap();
        let outcome = register(&ctx, "BOT", "COSMIC", None).await.unwrap();
        assert_eq!(outcome, HandlerOutcome::Skip);
    }
}
