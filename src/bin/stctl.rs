use log::*;
use std::sync::Arc;
use stctl::api_client::{GameApi, HttpGameApi};
use stctl::clock::SystemClock;
use stctl::config::CONFIG;
use stctl::context::Context;
use stctl::event_queue::EventQueue;
use stctl::game_state::GameState;
use stctl::handlers::HandlerRegistry;
use stctl::store::{InMemoryStore, PgStore, Store};
use stctl::strategies::StrategyRegistry;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    pretty_env_logger::init_timed();

    info!("stctl starting, api base {}", CONFIG.api_base_url);

    let game = Arc::new(HttpGameApi::new());
    if let Some(token) = &CONFIG.token {
        if let Err(err) = game.set_agent_token(token) {
            warn!("failed to set agent token from config: {err}");
        }
    }

    let store: Arc<dyn Store> = match &CONFIG.database_url {
        Some(_) => {
            info!("using PgStore");
            Arc::new(PgStore::connect().await.expect("failed to connect to database"))
        }
        None => {
            info!("no DATABASE_URL set, using InMemoryStore");
            Arc::new(InMemoryStore::new())
        }
    };

    let clock = Arc::new(SystemClock);
    let ctx = Context {
        game,
        store,
        state: Arc::new(GameState::new()),
        queue: Arc::new(EventQueue::new(clock.clone())),
        clock,
    };

    let strategies = StrategyRegistry::new(ctx.clone());
    let handlers = HandlerRegistry::new(strategies);

    let worker_handle = tokio::spawn(stctl::worker::run(ctx.clone(), handlers.clone()));

    stctl::repl::run(ctx, handlers).await;

    if let Err(err) = worker_handle.await {
        error!("worker task panicked: {err}");
    }
    info!("stctl exiting");
}
