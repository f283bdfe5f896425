//! Wire DTOs specific to the remote API's response shapes that don't match
//! a domain type one-to-one. Kept private to the `HttpGameApi` adapter.
use crate::models::{SystemSymbol, WaypointSymbol};
use serde::{Deserialize, Serialize};

/// The `/systems/{system}` endpoint nests only simplified waypoints (no
/// traits, no `systemSymbol`); `HttpGameApi::get_system` folds these into
/// full [`crate::models::Waypoint`]s using the parent system's symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteSystem {
    pub symbol: SystemSymbol,
    #[serde(rename = "type")]
    pub system_type: String,
    pub x: i64,
    pub y: i64,
    pub waypoints: Vec<RemoteSimplifiedWaypoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteSimplifiedWaypoint {
    pub symbol: WaypointSymbol,
    #[serde(rename = "type")]
    pub waypoint_type: String,
    pub x: i64,
    pub y: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponseData {
    pub agent: crate::models::Agent,
    pub contract: crate::models::Contract,
    pub faction: crate::models::Faction,
    pub ship: crate::models::Ship,
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavResponseData {
    pub nav: crate::models::ShipNav,
    pub fuel: crate::models::ShipFuel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CooldownNavData {
    pub nav: crate::models::ShipNav,
    pub cooldown: crate::models::ShipCooldown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefuelData {
    pub agent: crate::models::Agent,
    pub fuel: crate::models::ShipFuel,
    pub transaction: crate::models::MarketTransaction,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionYield {
    pub symbol: String,
    pub units: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractData {
    pub cooldown: crate::models::ShipCooldown,
    pub extraction: ExtractionRecord,
    pub cargo: crate::models::ShipCargo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionRecord {
    pub ship_symbol: String,
    #[serde(rename = "yield")]
    pub extraction_yield: ExtractionYield,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyData {
    pub cooldown: crate::models::ShipCooldown,
    pub surveys: Vec<crate::models::Survey>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketTransactionData {
    pub agent: crate::models::Agent,
    pub cargo: crate::models::ShipCargo,
    pub transaction: crate::models::MarketTransaction,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractAcceptData {
    pub contract: crate::models::Contract,
    pub agent: crate::models::Agent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractDeliverData {
    pub contract: crate::models::Contract,
    pub cargo: crate::models::ShipCargo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractFulfillData {
    pub contract: crate::models::Contract,
    pub agent: crate::models::Agent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseShipData {
    pub ship: crate::models::Ship,
    pub agent: crate::models::Agent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JumpGateData {
    pub connections: Vec<WaypointSymbol>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanWaypointsData {
    pub cooldown: crate::models::ShipCooldown,
    pub waypoints: Vec<crate::models::Waypoint>,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_deserialize_remote_system() {
        let json = r#"{"symbol":"X1-HN18","type":"ORANGE_STAR","x":-4792,"y":-5050,"waypoints":[{"symbol":"X1-HN18-ZX1B","type":"GAS_GIANT","x":16,"y":3}]}"#;
        let system: RemoteSystem = serde_json::from_str(json).unwrap();
        assert_eq!(system.waypoints.len(), 1);
    }
}
