use crate::models::{SystemSymbol, WaypointSymbol};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ship {
    pub symbol: String,
    pub nav: ShipNav,
    pub crew: ShipCrew,
    pub fuel: ShipFuel,
    pub cooldown: ShipCooldown,
    pub frame: ShipFrame,
    pub reactor: ShipReactor,
    pub engine: ShipEngine,
    pub modules: Vec<ShipModule>,
    pub mounts: Vec<ShipMount>,
    pub registration: ShipRegistration,
    pub cargo: ShipCargo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipNav {
    pub system_symbol: SystemSymbol,
    pub waypoint_symbol: WaypointSymbol,
    pub route: ShipNavRoute,
    pub status: ShipNavStatus,
    pub flight_mode: ShipFlightMode,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ShipFlightMode {
    #[serde(rename = "CRUISE")]
    Cruise,
    #[serde(rename = "BURN")]
    Burn,
    #[serde(rename = "DRIFT")]
    Drift,
    #[serde(rename = "STEALTH")]
    Stealth,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ShipNavStatus {
    #[serde(rename = "DOCKED")]
    Docked,
    #[serde(rename = "IN_TRANSIT")]
    InTransit,
    #[serde(rename = "IN_ORBIT")]
    InOrbit,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipNavRoute {
    pub origin: ShipNavRouteWaypoint,
    pub destination: ShipNavRouteWaypoint,
    pub arrival: DateTime<Utc>,
    pub departure_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipNavRouteWaypoint {
    pub symbol: WaypointSymbol,
    #[serde(rename = "type")]
    pub waypoint_type: String,
    pub system_symbol: SystemSymbol,
    pub x: i64,
    pub y: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipCrew {
    pub current: i64,
    pub capacity: i64,
    pub required: i64,
    pub rotation: String,
    pub morale: i64,
    pub wages: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipFuel {
    pub current: i64,
    pub capacity: i64,
    pub consumed: ShipFuelConsumed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipFuelConsumed {
    pub amount: i64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipCooldown {
    pub ship_symbol: String,
    pub total_seconds: i64,
    pub remaining_seconds: i64,
    pub expiration: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipFrame {
    pub symbol: String,
    pub name: String,
    pub description: String,
    pub module_slots: i64,
    pub mounting_points: i64,
    pub fuel_capacity: i64,
    pub condition: Option<f64>,
    pub integrity: Option<f64>,
    pub requirements: ShipRequirements,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipRequirements {
    #[serde(default)]
    pub power: i64,
    #[serde(default)]
    pub crew: i64,
    #[serde(default)]
    pub slots: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipReactor {
    pub symbol: String,
    pub name: String,
    pub description: String,
    pub condition: Option<f64>,
    pub integrity: Option<f64>,
    pub power_output: i64,
    pub requirements: ShipRequirements,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipEngine {
    pub symbol: String,
    pub name: String,
    pub description: String,
    pub condition: Option<f64>,
    pub integrity: Option<f64>,
    pub speed: i64,
    pub requirements: ShipRequirements,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipModule {
    pub symbol: String,
    pub name: String,
    pub description: String,
    pub capacity: Option<i64>,
    pub requirements: ShipRequirements,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipMount {
    pub symbol: String,
    pub name: String,
    pub description: String,
    pub strength: Option<i64>,
    pub requirements: ShipRequirements,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipRegistration {
    pub name: String,
    pub faction_symbol: String,
    pub role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipCargo {
    pub capacity: i64,
    pub units: i64,
    pub inventory: Vec<ShipCargoItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipCargoItem {
    pub symbol: String,
    pub units: i64,
    pub name: String,
    pub description: String,
}

impl Ship {
    pub fn symbol(&self) -> String {
        self.symbol.clone()
    }

    /// Units already in cargo for items strategies reserve and never sell.
    pub fn reserved_units(&self) -> i64 {
        self.cargo
            .inventory
            .iter()
            .filter(|item| crate::models::is_reserved_item(&item.symbol))
            .map(|item| item.units)
            .sum()
    }

    pub fn cargo_units_of(&self, symbol: &str) -> i64 {
        self.cargo
            .inventory
            .iter()
            .find(|item| item.symbol == symbol)
            .map(|item| item.units)
            .unwrap_or(0)
    }

    pub fn incr_cargo(&mut self, item: ShipCargoItem) {
        self.cargo.units += item.units;
        let good = self
            .cargo
            .inventory
            .iter_mut()
            .find(|good| good.symbol == item.symbol);
        match good {
            Some(good) => {
                good.units += item.units;
            }
            None => {
                self.cargo.inventory.push(item);
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn ship_fixture() -> Ship {
        let json = r#"{
            "symbol": "TEST-1",
            "nav": {
                "systemSymbol": "X1-TZ26",
                "waypointSymbol": "X1-TZ26-A1",
                "route": {
                    "origin": {"symbol":"X1-TZ26-A1","type":"PLANET","systemSymbol":"X1-TZ26","x":0,"y":0},
                    "destination": {"symbol":"X1-TZ26-A1","type":"PLANET","systemSymbol":"X1-TZ26","x":0,"y":0},
                    "arrival": "2024-01-01T00:00:00Z",
                    "departureTime": "2024-01-01T00:00:00Z"
                },
                "status": "DOCKED",
                "flightMode": "CRUISE"
            },
            "crew": {"current":0,"capacity":0,"required":0,"rotation":"STRICT","morale":100,"wages":0},
            "fuel": {"current":100,"capacity":100,"consumed":{"amount":0,"timestamp":"2024-01-01T00:00:00Z"}},
            "cooldown": {"shipSymbol":"TEST-1","totalSeconds":0,"remainingSeconds":0,"expiration":null},
            "frame": {"symbol":"FRAME_DRONE","name":"Drone","description":"d","moduleSlots":0,"mountingPoints":1,"fuelCapacity":100,"condition":1.0,"integrity":1.0,"requirements":{}},
            "reactor": {"symbol":"REACTOR_CHEMICAL_I","name":"Reactor","description":"d","condition":1.0,"integrity":1.0,"powerOutput":3,"requirements":{}},
            "engine": {"symbol":"ENGINE_IMPULSE_DRIVE_I","name":"Engine","description":"d","condition":1.0,"integrity":1.0,"speed":3,"requirements":{}},
            "modules": [],
            "mounts": [{"symbol":"MOUNT_MINING_LASER_I","name":"Laser","description":"d","strength":10,"requirements":{}}],
            "registration": {"name":"TEST-1","factionSymbol":"COSMIC","role":"EXCAVATOR"},
            "cargo": {"capacity":15,"units":0,"inventory":[]}
        }"#;
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_deserialize_ship() {
        let ship = ship_fixture();
        assert_eq!(ship.symbol(), "TEST-1");
        assert_eq!(ship.nav.status, ShipNavStatus::Docked);
    }

    #[test]
    fn test_incr_cargo() {
        let mut ship = ship_fixture();
        ship.incr_cargo(ShipCargoItem {
            symbol: "IRON_ORE".into(),
            units: 5,
            name: "Iron Ore".into(),
            description: String::new(),
        });
        ship.incr_cargo(ShipCargoItem {
            symbol: "IRON_ORE".into(),
            units: 3,
            name: "Iron Ore".into(),
            description: String::new(),
        });
        assert_eq!(ship.cargo.units, 8);
        assert_eq!(ship.cargo_units_of("IRON_ORE"), 8);
    }

    #[test]
    fn test_reserved_units() {
        let mut ship = ship_fixture();
        ship.incr_cargo(ShipCargoItem {
            symbol: "ANTIMATTER".into(),
            units: 1,
            name: "Antimatter".into(),
            description: String::new(),
        });
        assert_eq!(ship.reserved_units(), 1);
    }
}
