pub mod agent;
pub mod contract;
pub mod ship;
pub mod system;
pub mod view;

use crate::context::Context;
use crate::error::HandlerError;
use crate::event_queue::HandlerOutcome;
use crate::models::{Event, EventPayload};
use crate::strategies::StrategyRegistry;
use log::*;
use std::sync::Arc;

/// Dispatches one [`Event`] to its handler function. The dispatch key lives
/// in the `EventPayload` enum itself (REDESIGN FLAG 1), so this is a single
/// match rather than the original's two-level `{event_type: {event_name:
/// handler}}` dict lookup — an unmatched combination can't exist here the
/// way `NO EVENT TYPE/NAME HANDLER` could in the source.
#[derive(Clone)]
pub struct HandlerRegistry {
    strategies: Arc<StrategyRegistry>,
}

impl HandlerRegistry {
    pub fn new(strategies: Arc<StrategyRegistry>) -> Self {
        HandlerRegistry { strategies }
    }

    pub async fn dispatch(&self, ctx: &Context, event: &Event) -> Result<HandlerOutcome, HandlerError> {
        use EventPayload::*;
        match &event.payload {
            ShipDock { ship: s } => ship::dock(ctx, s).await,
            ShipOrbit { ship: s } => ship::orbit(ctx, s).await,
            ShipNavigate { ship: s, waypoint } => ship::navigate(ctx, s, waypoint).await,
            ShipRefuel { ship: s } => ship::refuel(ctx, s).await,
            ShipExtract { ship: s, survey_signature } => {
                ship::extract(ctx, s, survey_signature.as_deref()).await
            }
            ShipSurvey { ship: s } => ship::survey(ctx, s).await,
            ShipSellCargoItem { ship: s, resource, units } => {
                ship::sell_cargo_item(ctx, s, resource, *units).await
            }
            ShipBuyCargoItem { ship: s, resource, units } => {
                ship::buy_cargo_item(ctx, s, resource, *units).await
            }
            ShipJettisonCargoItem { ship: s, resource, units } => {
                ship::jettison_cargo_item(ctx, s, resource, *units).await
            }
            ShipPurchase { waypoint, ship_type } => ship::purchase(ctx, waypoint, ship_type).await,
            ShipJump { ship: s, system } => ship::jump(ctx, s, system).await,
            ShipFlightMode { ship: s, mode } => ship::flight_mode(ctx, s, *mode).await,
            ShipChart { ship: s } => ship::chart(ctx, s).await,
            ShipScanWaypoints { ship: s } => ship::scan_waypoints(ctx, s).await,
            ShipFetchAll => ship::fetch_all(ctx).await,

            AgentFetch => agent::fetch(ctx).await,
            AgentRegister { symbol, faction, email } => {
                agent::register(ctx, symbol, faction, email.as_deref()).await
            }

            ContractFetchAll => contract::fetch_all(ctx).await,
            ContractAccept { contract_id } => contract::accept(ctx, contract_id).await,
            ContractDeliver { contract_id, ship: s, resource, units } => {
                contract::deliver(ctx, contract_id, s, resource, *units).await
            }
            ContractFulfill { contract_id } => contract::fulfill(ctx, contract_id).await,
            ContractStrategy { contract_id, asteroid_waypoint } => {
                self.strategies
                    .start_contract_strategy(ctx, contract_id.clone(), asteroid_waypoint.clone())
                    .await;
                Ok(HandlerOutcome::Instant)
            }
            ContractAssignStrategyShip { contract_id, ship: s } => {
                self.strategies.assign_strategy_ship(contract_id, s.clone());
                Ok(HandlerOutcome::Instant)
            }
            ContractAssignStrategySurveyor { contract_id, ship: s } => {
                self.strategies.assign_strategy_surveyor(contract_id, s.clone());
                Ok(HandlerOutcome::Instant)
            }
            ContractAssignStrategySurvey { contract_id, signature } => {
                self.strategies.assign_strategy_survey(contract_id, signature.clone());
                Ok(HandlerOutcome::Instant)
            }

            SystemSystem { system } => system::system(ctx, system).await,
            SystemJumpGate { system } => system::jump_gate(ctx, system).await,
            SystemWaypoint { waypoint } => system::waypoint(ctx, waypoint).await,
            SystemSystemWaypoints { system } => system::system_waypoints(ctx, system).await,
            SystemFetchMarket { waypoint } => system::fetch_market(ctx, waypoint).await,
            SystemShipyard { waypoint } => system::shipyard(ctx, waypoint).await,

            ViewShip { ship: s } => view::ship(ctx, s).await,
            ViewShips => view::ships(ctx).await,
            ViewAgent => view::agent(ctx).await,
            ViewContracts => view::contracts(ctx).await,
            ViewMarket { waypoint } => view::market(ctx, waypoint).await,
            ViewShipyard { waypoint } => view::shipyard(ctx, waypoint).await,
            ViewSurveys => view::surveys(ctx).await,

            StrategyTrade { ship: s } => {
                self.strategies.assign_trade_ship(ctx, s.clone()).await;
                Ok(HandlerOutcome::Instant)
            }
            StrategyMarketUpdate { ship: s, system } => {
                self.strategies.assign_market_updater(ctx, s.clone(), system.clone()).await;
                Ok(HandlerOutcome::Instant)
            }
            StrategyTradeRoutes => {
                self.strategies.rebuild_trade_routes(ctx).await;
                Ok(HandlerOutcome::Instant)
            }

            DefaultExit => {
                // the worker loop intercepts `exit` before ever reaching
                // dispatch; this arm only exists so the match stays total.
                warn!("exit event reached the handler registry directly");
                Ok(HandlerOutcome::Instant)
            }
        }
    }
}
