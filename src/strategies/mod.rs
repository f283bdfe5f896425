pub mod contract;
pub mod trade;

use crate::context::Context;
use crate::models::{SystemSymbol, WaypointSymbol};
use contract::ContractStrategy;
use log::*;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use trade::TradeStrategy;

/// Owns every long-lived strategy object and routes the `*.strategy`/
/// `assign_strategy_*` events `HandlerRegistry::dispatch` forwards here.
/// One [`TradeStrategy`] per process (it already tracks its own system/
/// route state); contract strategies are one per active contract, keyed
/// by contract id.
pub struct StrategyRegistry {
    trade: Arc<TradeStrategy>,
    contracts: Mutex<HashMap<String, Arc<ContractStrategy>>>,
}

impl StrategyRegistry {
    pub fn new(ctx: Context) -> Arc<Self> {
        Arc::new(StrategyRegistry {
            trade: TradeStrategy::new(ctx),
            contracts: Mutex::new(HashMap::new()),
        })
    }

    pub async fn start_contract_strategy(
        &self,
        ctx: &Context,
        contract_id: String,
        asteroid_waypoint: WaypointSymbol,
    ) {
        let strategy = ContractStrategy::new(ctx.clone(), contract_id.clone(), asteroid_waypoint);
        self.contracts.lock().unwrap().insert(contract_id, strategy);
    }

    pub fn assign_strategy_ship(&self, contract_id: &str, ship: String) {
        match self.contracts.lock().unwrap().get(contract_id) {
            Some(strategy) => strategy.assign_ship(ship),
            None => warn!("assign_strategy_ship: no contract strategy for {contract_id}"),
        }
    }

    pub fn assign_strategy_surveyor(&self, contract_id: &str, ship: String) {
        match self.contracts.lock().unwrap().get(contract_id) {
            Some(strategy) => strategy.assign_surveyor(ship),
            None => warn!("assign_strategy_surveyor: no contract strategy for {contract_id}"),
        }
    }

    pub fn assign_strategy_survey(&self, contract_id: &str, signature: String) {
        match self.contracts.lock().unwrap().get(contract_id) {
            Some(strategy) => strategy.assign_survey(signature),
            None => warn!("assign_strategy_survey: no contract strategy for {contract_id}"),
        }
    }

    pub async fn assign_trade_ship(&self, _ctx: &Context, ship: String) {
        self.trade.assign_ship(ship).await;
    }

    pub async fn assign_market_updater(&self, _ctx: &Context, ship: String, system: SystemSymbol) {
        self.trade.assign_market_updater(ship, system).await;
    }

    pub async fn rebuild_trade_routes(&self, _ctx: &Context) {
        self.trade.build_trade_routes();
    }
}
