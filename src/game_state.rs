use crate::models::{Agent, Contract, KeyedSurvey, Market, Ship, Waypoint};
use dashmap::DashMap;
use std::sync::RwLock;

/// In-memory mapping of agent, ships, contracts, surveys, markets, and
/// waypoints. The only shared mutable structure in the process: handlers
/// mutate it under per-collection locks/maps, strategies read the same way.
/// `DashMap` gives per-key granularity without a single coarse mutex, the
/// same pattern the teacher's `SurveyManager` and caches use throughout.
pub struct GameState {
    pub agent: RwLock<Option<Agent>>,
    pub ships: DashMap<String, Ship>,
    pub contracts: DashMap<String, Contract>,
    /// Keyed by asteroid waypoint; each asteroid can hold several live
    /// surveys at once.
    pub surveys: DashMap<crate::models::WaypointSymbol, Vec<KeyedSurvey>>,
    pub markets: DashMap<crate::models::WaypointSymbol, Market>,
    pub waypoints: DashMap<crate::models::WaypointSymbol, Waypoint>,
}

impl Default for GameState {
    fn default() -> Self {
        GameState {
            agent: RwLock::new(None),
            ships: DashMap::new(),
            contracts: DashMap::new(),
            surveys: DashMap::new(),
            markets: DashMap::new(),
            waypoints: DashMap::new(),
        }
    }
}

impl GameState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_agent(&self) -> Option<Agent> {
        self.agent.read().unwrap().clone()
    }

    pub fn set_agent(&self, agent: Agent) {
        *self.agent.write().unwrap() = Some(agent);
    }

    pub fn get_ship(&self, symbol: &str) -> Option<Ship> {
        self.ships.get(symbol).map(|s| s.clone())
    }

    pub fn upsert_ship(&self, ship: Ship) {
        self.ships.insert(ship.symbol.clone(), ship);
    }

    pub fn get_contract(&self, id: &str) -> Option<Contract> {
        self.contracts.get(id).map(|c| c.clone())
    }

    pub fn upsert_contract(&self, contract: Contract) {
        self.contracts.insert(contract.id.clone(), contract);
    }

    /// Live surveys (expiration > now) at `waypoint`, pruning expired
    /// entries in the process.
    pub fn live_surveys(
        &self,
        waypoint: &crate::models::WaypointSymbol,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Vec<KeyedSurvey> {
        let mut entry = self.surveys.entry(waypoint.clone()).or_default();
        entry.retain(|s| s.survey.expiration > now);
        entry.clone()
    }

    pub fn insert_surveys(&self, waypoint: &crate::models::WaypointSymbol, surveys: Vec<KeyedSurvey>) {
        self.surveys.entry(waypoint.clone()).or_default().extend(surveys);
    }

    pub fn remove_survey(&self, waypoint: &crate::models::WaypointSymbol, signature: &str) {
        if let Some(mut entry) = self.surveys.get_mut(waypoint) {
            entry.retain(|s| s.survey.signature != signature);
        }
    }

    pub fn get_waypoint(&self, symbol: &crate::models::WaypointSymbol) -> Option<Waypoint> {
        self.waypoints.get(symbol).map(|w| w.clone())
    }

    pub fn upsert_waypoint(&self, waypoint: Waypoint) {
        self.waypoints.insert(waypoint.symbol.clone(), waypoint);
    }

    pub fn get_market(&self, symbol: &crate::models::WaypointSymbol) -> Option<Market> {
        self.markets.get(symbol).map(|m| m.clone())
    }

    pub fn upsert_market(&self, market: Market) {
        self.markets.insert(market.symbol.clone(), market);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::models::WaypointSymbol;

    #[test]
    fn test_upsert_and_get_ship() {
        let state = GameState::new();
        assert!(state.get_ship("S-1").is_none());
    }

    #[test]
    fn test_live_surveys_prunes_expired() {
        use crate::models::{KeyedSurvey, Survey};
        let state = GameState::new();
        let wp = WaypointSymbol("X1-TZ26-A1".to_string());
        let now = chrono::Utc::now();
        let expired = KeyedSurvey {
            uuid: uuid::Uuid::new_v4(),
            survey: Survey {
                signature: "EXPIRED".to_string(),
                symbol: wp.clone(),
                deposits: vec![],
                expiration: now - chrono::Duration::seconds(10),
                size: "SMALL".to_string(),
            },
        };
        let live = KeyedSurvey {
            uuid: uuid::Uuid::new_v4(),
            survey: Survey {
                signature: "LIVE".to_string(),
                symbol: wp.clone(),
                deposits: vec![],
                expiration: now + chrono::Duration::seconds(600),
                size: "SMALL".to_string(),
            },
        };
        state.insert_surveys(&wp, vec![expired, live]);
        let remaining = state.live_surveys(&wp, now);
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].survey.signature, "LIVE");
    }
}
