mod contract;
mod event;
mod faction;
mod market;
mod ship;
mod system;
mod waypoint_symbol;

use chrono::{DateTime, Utc};
pub use contract::*;
pub use event::*;
pub use faction::*;
pub use market::*;
pub use ship::*;
pub use system::*;
use uuid::Uuid;
pub use waypoint_symbol::*;

use serde::{Deserialize, Serialize};

/// Cargo symbols strategies must never sell, buy, or jettison.
pub const RESERVED_ITEMS: &[&str] = &["ANTIMATTER"];

pub fn is_reserved_item(symbol: &str) -> bool {
    RESERVED_ITEMS.contains(&symbol)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    pub status: String,
    pub version: String,
    pub reset_date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    // account_id field is only present for own agent
    pub account_id: Option<String>,
    pub symbol: String,
    pub headquarters: WaypointSymbol,
    pub credits: i64,
    pub starting_faction: String,
    pub ship_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedList<T> {
    pub data: Vec<T>,
    pub meta: Meta,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meta {
    pub page: u32,
    pub limit: u32,
    pub total: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Data<T> {
    pub data: T,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Symbol {
    pub symbol: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolNameDescr {
    pub symbol: String,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithTimestamp<T> {
    pub timestamp: DateTime<Utc>,
    pub data: T,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Construction {
    pub symbol: WaypointSymbol,
    pub materials: Vec<ConstructionMaterial>,
    pub is_complete: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstructionMaterial {
    pub trade_symbol: String,
    pub required: i64,
    pub fulfilled: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Survey {
    pub signature: String,
    pub symbol: WaypointSymbol,
    pub deposits: Vec<Symbol>,
    pub expiration: DateTime<Utc>,
    pub size: String,
}

#[derive(Debug, Clone)]
pub struct KeyedSurvey {
    pub uuid: Uuid,
    pub survey: Survey,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_deserialise_status() {
        let status_json = r#"{"status":"online","version":"v2.1.5","resetDate":"2024-01-28"}"#;
        let status: Status = serde_json::from_str(status_json).unwrap();
        assert_eq!(status.status, "online");
        assert_eq!(status.version, "v2.1.5");
    }

    #[test]
    fn test_construction_deserialize() {
        let json = r#"{"data":{"symbol":"X1-HS80-I58","materials":[{"tradeSymbol":"FAB_MATS","required":4000,"fulfilled":0},{"tradeSymbol":"ADVANCED_CIRCUITRY","required":1200,"fulfilled":0},{"tradeSymbol":"QUANTUM_STABILIZERS","required":1,"fulfilled":1}],"isComplete":false}}"#;
        let construction: Data<Construction> = serde_json::from_str(json).unwrap();
        assert_eq!(construction.data.materials.len(), 3);
    }

    #[test]
    fn test_reserved_items() {
        assert!(is_reserved_item("ANTIMATTER"));
        assert!(!is_reserved_item("IRON_ORE"));
    }
}
