pub mod db_models;
pub mod pg_store;

use crate::error::StoreError;
use crate::models::{KeyedSurvey, Market, MarketTransaction, Shipyard, System, WaypointSymbol};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::RwLock;

pub use pg_store::PgStore;

/// Persistence port: blob snapshots (waypoints/markets/shipyards/systems,
/// used as a cache filled on demand by the handlers that fetch them) plus a
/// relational trade-transaction log. Only the handlers that cache write;
/// strategies read waypoints for a system via `load_waypoints`.
#[async_trait]
pub trait Store: Send + Sync {
    async fn get_agent_token(&self, callsign: &str) -> Result<Option<String>, StoreError>;
    async fn save_agent_token(&self, callsign: &str, token: &str) -> Result<(), StoreError>;

    async fn load_system(&self, symbol: &crate::models::SystemSymbol) -> Result<Option<System>, StoreError>;
    async fn save_system(&self, system: &System) -> Result<(), StoreError>;

    async fn load_waypoints(
        &self,
        system: &crate::models::SystemSymbol,
    ) -> Result<Vec<crate::models::Waypoint>, StoreError>;
    async fn save_waypoint(&self, waypoint: &crate::models::Waypoint) -> Result<(), StoreError>;

    async fn load_market(&self, symbol: &WaypointSymbol) -> Result<Option<Market>, StoreError>;
    async fn save_market(&self, market: &Market) -> Result<(), StoreError>;

    async fn load_shipyard(&self, symbol: &WaypointSymbol) -> Result<Option<Shipyard>, StoreError>;
    async fn save_shipyard(&self, shipyard: &Shipyard) -> Result<(), StoreError>;

    async fn insert_surveys(&self, surveys: &[KeyedSurvey]) -> Result<(), StoreError>;
    async fn load_surveys(&self, asteroid: &WaypointSymbol) -> Result<Vec<KeyedSurvey>, StoreError>;
    async fn remove_survey(&self, uuid: &uuid::Uuid) -> Result<(), StoreError>;

    async fn record_trade_transaction(&self, transaction: &MarketTransaction) -> Result<(), StoreError>;
}

/// Default adapter when no database is configured, and the adapter every
/// test in this crate runs against. Per-collection `DashMap`s, same
/// granularity as `GameState`.
#[derive(Default)]
pub struct InMemoryStore {
    agent_tokens: DashMap<String, String>,
    systems: DashMap<String, System>,
    waypoints: DashMap<WaypointSymbol, crate::models::Waypoint>,
    markets: DashMap<WaypointSymbol, Market>,
    shipyards: DashMap<WaypointSymbol, Shipyard>,
    surveys: DashMap<WaypointSymbol, Vec<KeyedSurvey>>,
    trade_log: RwLock<Vec<MarketTransaction>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn get_agent_token(&self, callsign: &str) -> Result<Option<String>, StoreError> {
        Ok(self.agent_tokens.get(callsign).map(|t| t.clone()))
    }

    async fn save_agent_token(&self, callsign: &str, token: &str) -> Result<(), StoreError> {
        self.agent_tokens.insert(callsign.to_string(), token.to_string());
        Ok(())
    }

    async fn load_system(&self, symbol: &crate::models::SystemSymbol) -> Result<Option<System>, StoreError> {
        Ok(self.systems.get(&symbol.0).map(|s| s.clone()))
    }

    async fn save_system(&self, system: &System) -> Result<(), StoreError> {
        self.systems.insert(system.symbol.0.clone(), system.clone());
        Ok(())
    }

    async fn load_waypoints(
        &self,
        system: &crate::models::SystemSymbol,
    ) -> Result<Vec<crate::models::Waypoint>, StoreError> {
        Ok(self
            .waypoints
            .iter()
            .filter(|e| e.value().system_symbol == *system)
            .map(|e| e.value().clone())
            .collect())
    }

    async fn save_waypoint(&self, waypoint: &crate::models::Waypoint) -> Result<(), StoreError> {
        self.waypoints.insert(waypoint.symbol.clone(), waypoint.clone());
        Ok(())
    }

    async fn load_market(&self, symbol: &WaypointSymbol) -> Result<Option<Market>, StoreError> {
        Ok(self.markets.get(symbol).map(|m| m.clone()))
    }

    async fn save_market(&self, market: &Market) -> Result<(), StoreError> {
        self.markets.insert(market.symbol.clone(), market.clone());
        Ok(())
    }

    async fn load_shipyard(&self, symbol: &WaypointSymbol) -> Result<Option<Shipyard>, StoreError> {
        Ok(self.shipyards.get(symbol).map(|s| s.clone()))
    }

    async fn save_shipyard(&self, shipyard: &Shipyard) -> Result<(), StoreError> {
        self.shipyards.insert(shipyard.symbol.clone(), shipyard.clone());
        Ok(())
    }

    async fn insert_surveys(&self, surveys: &[KeyedSurvey]) -> Result<(), StoreError> {
        for survey in surveys {
            self.surveys
                .entry(survey.survey.symbol.clone())
                .or_default()
                .push(survey.clone());
        }
        Ok(())
    }

    async fn load_surveys(&self, asteroid: &WaypointSymbol) -> Result<Vec<KeyedSurvey>, StoreError> {
        Ok(self.surveys.get(asteroid).map(|s| s.clone()).unwrap_or_default())
    }

    async fn remove_survey(&self, uuid: &uuid::Uuid) -> Result<(), StoreError> {
        for mut entry in self.surveys.iter_mut() {
            entry.retain(|s| s.uuid != *uuid);
        }
        Ok(())
    }

    async fn record_trade_transaction(&self, transaction: &MarketTransaction) -> Result<(), StoreError> {
        self.trade_log.write().unwrap().push(transaction.clone());
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::models::{Survey, Symbol};
    use chrono::Utc;

    fn survey(signature: &str, waypoint: &str) -> KeyedSurvey {
        KeyedSurvey {
            uuid: uuid::Uuid::new_v4(),
            survey: Survey {
                signature: signature.to_string(),
                symbol: WaypointSymbol(waypoint.to_string()),
                deposits: vec![Symbol { symbol: "IRON_ORE".to_string() }],
                expiration: Utc::now() + chrono::Duration::seconds(600),
                size: "SMALL".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn test_agent_token_roundtrip() {
        let store = InMemoryStore::new();
        assert_eq!(store.get_agent_token("BOT").await.unwrap(), None);
        store.save_agent_token("BOT", "tkn").await.unwrap();
        assert_eq!(store.get_agent_token("BOT").await.unwrap(), Some("tkn".to_string()));
    }

    #[tokio::test]
    async fn test_survey_insert_and_remove() {
        let store = InMemoryStore::new();
        let s = survey("SIG-1", "X1-TZ26-A1");
        let uuid = s.uuid;
        store.insert_surveys(&[s]).await.unwrap();
        let loaded = store.load_surveys(&WaypointSymbol("X1-TZ26-A1".to_string())).await.unwrap();
        assert_eq!(loaded.len(), 1);
        store.remove_survey(&uuid).await.unwrap();
        let loaded = store.load_surveys(&WaypointSymbol("X1-TZ26-A1".to_string())).await.unwrap();
        assert!(loaded.is_empty());
    }
}
