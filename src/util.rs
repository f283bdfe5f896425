use crate::models::{ShipFlightMode, Waypoint};

const BASE_TRAVEL_TIME: f64 = 15.0;
const TRAVEL_TIME: f64 = 25.0;

/// Types with (x, y) coordinates in a system, so distance math works over
/// waypoints without committing to one concrete type.
pub trait Coord {
    fn x(&self) -> i64;
    fn y(&self) -> i64;
}

impl Coord for Waypoint {
    fn x(&self) -> i64 {
        self.x
    }
    fn y(&self) -> i64 {
        self.y
    }
}

/// Euclidean distance, rounded to the nearest integer and floored at 1 for
/// any two distinct waypoints (matches the remote game's own rounding).
pub fn distance<T: Coord>(a: &T, b: &T) -> i64 {
    let d2 = (a.x() - b.x()).pow(2) + (a.y() - b.y()).pow(2);
    if d2 == 0 {
        return 0;
    }
    std::cmp::max(1, (d2 as f64).sqrt().round() as i64)
}

/// Fuel consumed by a single leg; does not apply to engines without fuel
/// tanks (probes), which callers must special-case before invoking this.
pub fn fuel_cost(flight_mode: &ShipFlightMode, distance: i64) -> i64 {
    match flight_mode {
        ShipFlightMode::Burn => distance * 2,
        ShipFlightMode::Cruise => distance,
        ShipFlightMode::Drift => 1,
        ShipFlightMode::Stealth => distance,
    }
}

/// Estimated travel time in seconds; only an estimate because engine
/// condition can slow an in-flight ship further.
pub fn estimated_travel_duration(flight_mode: &ShipFlightMode, speed: i64, distance: i64) -> i64 {
    let mult = match flight_mode {
        ShipFlightMode::Cruise => 1.0,
        ShipFlightMode::Burn => 0.5,
        ShipFlightMode::Stealth => 2.0,
        ShipFlightMode::Drift => 10.0,
    };
    (BASE_TRAVEL_TIME + (TRAVEL_TIME * distance as f64 / speed as f64) * mult).round() as i64
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::models::{SymbolNameDescr, SystemSymbol, WaypointSymbol};

    fn wp(symbol: &str, x: i64, y: i64) -> Waypoint {
        Waypoint {
            system_symbol: SystemSymbol("X1-TZ26".into()),
            symbol: WaypointSymbol(symbol.into()),
            waypoint_type: "PLANET".into(),
            x,
            y,
            traits: Vec::<SymbolNameDescr>::new(),
            is_under_construction: false,
        }
    }

    #[test]
    fn test_distance_same_point() {
        let a = wp("X1-TZ26-A1", 10, 10);
        assert_eq!(distance(&a, &a), 0);
    }

    #[test]
    fn test_distance_minimum_one() {
        let a = wp("X1-TZ26-A1", 0, 0);
        let b = wp("X1-TZ26-A2", 0, 0);
        // distinct waypoints that coincide in space are still 1 unit apart
        assert_eq!(distance(&a, &b), 1);
    }

    #[test]
    fn test_distance_scout_example() {
        // matches the trade-planner example in the end-to-end scenarios:
        // two markets 50 units apart
        let a = wp("X1-TZ26-A1", 0, 0);
        let b = wp("X1-TZ26-B1", 30, 40);
        assert_eq!(distance(&a, &b), 50);
    }

    #[test]
    fn test_fuel_cost_burn_doubles() {
        assert_eq!(fuel_cost(&ShipFlightMode::Cruise, 50), 50);
        assert_eq!(fuel_cost(&ShipFlightMode::Burn, 50), 100);
        assert_eq!(fuel_cost(&ShipFlightMode::Drift, 50), 1);
    }
}
