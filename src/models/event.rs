use crate::models::{ShipFlightMode, SystemSymbol, WaypointSymbol};
use std::fmt;

/// The coarse category an [`Event`] belongs to; together with its name this
/// forms the dispatch key used by `HandlerRegistry` and subscription lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    Ship,
    Contract,
    Agent,
    System,
    View,
    Strategy,
    Default,
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EventType::Ship => "ship",
            EventType::Contract => "contract",
            EventType::Agent => "agent",
            EventType::System => "system",
            EventType::View => "view",
            EventType::Strategy => "strategy",
            EventType::Default => "default",
        };
        write!(f, "{s}")
    }
}

/// Every event the system can enqueue, as a tagged sum keyed by name rather
/// than the heterogeneous positional arguments of the distilled source.
/// `-1` for a units field keeps the "sell/buy/jettison everything" meaning
/// from the original command surface.
#[derive(Debug, Clone)]
pub enum EventPayload {
    ShipDock {
        ship: String,
    },
    ShipOrbit {
        ship: String,
    },
    ShipNavigate {
        ship: String,
        waypoint: WaypointSymbol,
    },
    ShipRefuel {
        ship: String,
    },
    ShipExtract {
        ship: String,
        survey_signature: Option<String>,
    },
    ShipSurvey {
        ship: String,
    },
    ShipSellCargoItem {
        ship: String,
        resource: String,
        units: i64,
    },
    ShipBuyCargoItem {
        ship: String,
        resource: String,
        units: i64,
    },
    ShipJettisonCargoItem {
        ship: String,
        resource: String,
        units: i64,
    },
    ShipPurchase {
        waypoint: WaypointSymbol,
        ship_type: String,
    },
    ShipJump {
        ship: String,
        system: SystemSymbol,
    },
    ShipFlightMode {
        ship: String,
        mode: ShipFlightMode,
    },
    ShipChart {
        ship: String,
    },
    ShipScanWaypoints {
        ship: String,
    },
    ShipFetchAll,

    AgentFetch,
    AgentRegister {
        symbol: String,
        faction: String,
        email: Option<String>,
    },

    ContractFetchAll,
    ContractAccept {
        contract_id: String,
    },
    ContractDeliver {
        contract_id: String,
        ship: String,
        resource: String,
        units: i64,
    },
    ContractFulfill {
        contract_id: String,
    },
    /// Creates a new contract-mining strategy for `contract_id`, rooted at
    /// `asteroid_waypoint`.
    ContractStrategy {
        contract_id: String,
        asteroid_waypoint: WaypointSymbol,
    },
    ContractAssignStrategyShip {
        contract_id: String,
        ship: String,
    },
    ContractAssignStrategySurveyor {
        contract_id: String,
        ship: String,
    },
    ContractAssignStrategySurvey {
        contract_id: String,
        signature: String,
    },

    SystemSystem {
        system: SystemSymbol,
    },
    SystemJumpGate {
        system: SystemSymbol,
    },
    SystemWaypoint {
        waypoint: WaypointSymbol,
    },
    SystemSystemWaypoints {
        system: SystemSymbol,
    },
    SystemFetchMarket {
        waypoint: WaypointSymbol,
    },
    SystemShipyard {
        waypoint: WaypointSymbol,
    },

    ViewShip {
        ship: String,
    },
    ViewShips,
    ViewAgent,
    ViewContracts,
    ViewMarket {
        waypoint: WaypointSymbol,
    },
    ViewShipyard {
        waypoint: WaypointSymbol,
    },
    ViewSurveys,

    /// Assigns a ship into the in-system trader pool.
    StrategyTrade {
        ship: String,
    },
    /// Assigns a ship as the market-scouting ship for `system`.
    StrategyMarketUpdate {
        ship: String,
        system: SystemSymbol,
    },
    /// Forces an immediate re-run of the trade-route planner.
    StrategyTradeRoutes,

    DefaultExit,
}

impl EventPayload {
    pub fn event_type(&self) -> EventType {
        use EventPayload::*;
        match self {
            ShipDock { .. }
            | ShipOrbit { .. }
            | ShipNavigate { .. }
            | ShipRefuel { .. }
            | ShipExtract { .. }
            | ShipSurvey { .. }
            | ShipSellCargoItem { .. }
            | ShipBuyCargoItem { .. }
            | ShipJettisonCargoItem { .. }
            | ShipPurchase { .. }
            | ShipJump { .. }
            | ShipFlightMode { .. }
            | ShipChart { .. }
            | ShipScanWaypoints { .. }
            | ShipFetchAll => EventType::Ship,

            AgentFetch | AgentRegister { .. } => EventType::Agent,

            ContractFetchAll
            | ContractAccept { .. }
            | ContractDeliver { .. }
            | ContractFulfill { .. }
            | ContractStrategy { .. }
            | ContractAssignStrategyShip { .. }
            | ContractAssignStrategySurveyor { .. }
            | ContractAssignStrategySurvey { .. } => EventType::Contract,

            SystemSystem { .. }
            | SystemJumpGate { .. }
            | SystemWaypoint { .. }
            | SystemSystemWaypoints { .. }
            | SystemFetchMarket { .. }
            | SystemShipyard { .. } => EventType::System,

            ViewShip { .. }
            | ViewShips
            | ViewAgent
            | ViewContracts
            | ViewMarket { .. }
            | ViewShipyard { .. }
            | ViewSurveys => EventType::View,

            StrategyTrade { .. } | StrategyMarketUpdate { .. } | StrategyTradeRoutes => {
                EventType::Strategy
            }

            DefaultExit => EventType::Default,
        }
    }

    /// The name half of the `(EventType, EventName)` dispatch key. Matches
    /// the verb a caller would type at the REPL, e.g. `ship dock S`.
    pub fn event_name(&self) -> &'static str {
        use EventPayload::*;
        match self {
            ShipDock { .. } => "dock",
            ShipOrbit { .. } => "orbit",
            ShipNavigate { .. } => "navigate",
            ShipRefuel { .. } => "refuel",
            ShipExtract { .. } => "extract",
            ShipSurvey { .. } => "survey",
            ShipSellCargoItem { .. } => "sell_cargo_item",
            ShipBuyCargoItem { .. } => "buy_cargo_item",
            ShipJettisonCargoItem { .. } => "jettison_cargo_item",
            ShipPurchase { .. } => "purchase",
            ShipJump { .. } => "jump",
            ShipFlightMode { .. } => "flight_mode",
            ShipChart { .. } => "chart",
            ShipScanWaypoints { .. } => "scan_waypoints",
            ShipFetchAll => "fetch_all",

            AgentFetch => "fetch",
            AgentRegister { .. } => "register",

            ContractFetchAll => "fetch_all",
            ContractAccept { .. } => "accept",
            ContractDeliver { .. } => "deliver",
            ContractFulfill { .. } => "fulfill",
            ContractStrategy { .. } => "strategy",
            ContractAssignStrategyShip { .. } => "assign_strategy_ship",
            ContractAssignStrategySurveyor { .. } => "assign_strategy_surveyor",
            ContractAssignStrategySurvey { .. } => "assign_strategy_survey",

            SystemSystem { .. } => "system",
            SystemJumpGate { .. } => "jump_gate",
            SystemWaypoint { .. } => "waypoint",
            SystemSystemWaypoints { .. } => "system_waypoints",
            SystemFetchMarket { .. } => "fetch_market",
            SystemShipyard { .. } => "shipyard",

            ViewShip { .. } => "ship",
            ViewShips => "ships",
            ViewAgent => "agent",
            ViewContracts => "contracts",
            ViewMarket { .. } => "market",
            ViewShipyard { .. } => "shipyard",
            ViewSurveys => "surveys",

            StrategyTrade { .. } => "trade",
            StrategyMarketUpdate { .. } => "market_update",
            StrategyTradeRoutes => "trade_routes",

            DefaultExit => "exit",
        }
    }
}

/// An enqueued unit of work. `id` is assigned once at creation by
/// `EventQueue::new_id` and never reused.
#[derive(Debug, Clone)]
pub struct Event {
    pub id: u64,
    pub payload: EventPayload,
}

impl Event {
    pub fn new(id: u64, payload: EventPayload) -> Self {
        Event { id, payload }
    }

    pub fn event_type(&self) -> EventType {
        self.payload.event_type()
    }

    pub fn event_name(&self) -> &'static str {
        self.payload.event_name()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_event_type_and_name() {
        let e = Event::new(
            1,
            EventPayload::ShipDock {
                ship: "S".to_string(),
            },
        );
        assert_eq!(e.event_type(), EventType::Ship);
        assert_eq!(e.event_name(), "dock");
    }

    #[test]
    fn test_default_exit() {
        let e = Event::new(2, EventPayload::DefaultExit);
        assert_eq!(e.event_type(), EventType::Default);
        assert_eq!(e.event_name(), "exit");
    }

    #[test]
    fn test_display_event_type() {
        assert_eq!(EventType::Ship.to_string(), "ship");
        assert_eq!(EventType::Strategy.to_string(), "strategy");
    }
}
