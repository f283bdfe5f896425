use crate::models::{SymbolNameDescr, SystemSymbol, WaypointSymbol};
use serde::{Deserialize, Serialize};

pub const TRAIT_MARKETPLACE: &str = "MARKETPLACE";
pub const TRAIT_SHIPYARD: &str = "SHIPYARD";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Waypoint {
    pub system_symbol: SystemSymbol,
    pub symbol: WaypointSymbol,
    #[serde(rename = "type")]
    pub waypoint_type: String,
    pub x: i64,
    pub y: i64,
    pub traits: Vec<SymbolNameDescr>,
    #[serde(default)]
    pub is_under_construction: bool,
}

impl Waypoint {
    pub fn has_trait(&self, symbol: &str) -> bool {
        self.traits.iter().any(|t| t.symbol == symbol)
    }

    pub fn is_marketplace(&self) -> bool {
        self.has_trait(TRAIT_MARKETPLACE)
    }

    pub fn is_shipyard(&self) -> bool {
        self.has_trait(TRAIT_SHIPYARD)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct System {
    pub symbol: SystemSymbol,
    #[serde(rename = "type")]
    pub system_type: String,
    pub x: i64,
    pub y: i64,
    pub waypoints: Vec<Waypoint>,
}

#[cfg(test)]
mod test {
    use super::*;

    fn wp(symbol: &str, x: i64, y: i64, traits: &[&str]) -> Waypoint {
        Waypoint {
            system_symbol: SystemSymbol("X1-TZ26".into()),
            symbol: WaypointSymbol(symbol.into()),
            waypoint_type: "PLANET".into(),
            x,
            y,
            traits: traits
                .iter()
                .map(|t| SymbolNameDescr {
                    symbol: t.to_string(),
                    name: t.to_string(),
                    description: String::new(),
                })
                .collect(),
            is_under_construction: false,
        }
    }

    #[test]
    fn test_has_trait() {
        let w = wp("X1-TZ26-A1", 0, 0, &["MARKETPLACE", "SHIPYARD"]);
        assert!(w.is_marketplace());
        assert!(w.is_shipyard());
        assert!(!w.has_trait("UNCHARTED"));
    }

    #[test]
    fn test_deserialize_waypoint() {
        let json = r#"{"systemSymbol":"X1-TZ26","symbol":"X1-TZ26-A1","type":"PLANET","x":23,"y":7,"traits":[{"symbol":"MARKETPLACE","name":"Marketplace","description":"d"}],"isUnderConstruction":false}"#;
        let w: Waypoint = serde_json::from_str(json).unwrap();
        assert!(w.is_marketplace());
        assert!(!w.is_shipyard());
    }
}
