use crate::api_client::GameApi;
use crate::clock::Clock;
use crate::event_queue::EventQueue;
use crate::game_state::GameState;
use crate::store::Store;
use std::sync::Arc;

/// Process-wide collaborators, threaded through handlers and strategies
/// instead of touched as true globals so tests can substitute fakes.
#[derive(Clone)]
pub struct Context {
    pub game: Arc<dyn GameApi>,
    pub store: Arc<dyn Store>,
    pub state: Arc<GameState>,
    pub queue: Arc<EventQueue>,
    pub clock: Arc<dyn Clock>,
}
