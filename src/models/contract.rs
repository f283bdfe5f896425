use crate::models::WaypointSymbol;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Hash)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    pub id: String,
    pub faction_symbol: String,
    #[serde(rename = "type")]
    pub contract_type: String,
    pub terms: Terms,
    pub accepted: bool,
    pub fulfilled: bool,
    pub expiration: DateTime<Utc>,
    pub deadline_to_accept: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Hash)]
pub struct Terms {
    pub deadline: String,
    pub payment: Payment,
    pub deliver: Vec<Deliver>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Hash)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub on_fulfilled: i64,
    pub on_accepted: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Hash)]
#[serde(rename_all = "camelCase")]
pub struct Deliver {
    pub trade_symbol: String,
    pub destination_symbol: WaypointSymbol,
    pub units_required: i64,
    pub units_fulfilled: i64,
}

impl Deliver {
    pub fn units_remaining(&self) -> i64 {
        self.units_required - self.units_fulfilled
    }

    pub fn is_fulfilled(&self) -> bool {
        self.units_fulfilled >= self.units_required
    }
}

impl Contract {
    pub fn deliver_for(&self, trade_symbol: &str) -> Option<&Deliver> {
        self.terms
            .deliver
            .iter()
            .find(|d| d.trade_symbol == trade_symbol)
    }

    pub fn is_deliverable(&self) -> bool {
        self.accepted && !self.fulfilled
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn deliver(required: i64, fulfilled: i64) -> Deliver {
        Deliver {
            trade_symbol: "IRON_ORE".into(),
            destination_symbol: WaypointSymbol("X1-TZ26-A1".into()),
            units_required: required,
            units_fulfilled: fulfilled,
        }
    }

    #[test]
    fn test_units_remaining() {
        let d = deliver(100, 40);
        assert_eq!(d.units_remaining(), 60);
        assert!(!d.is_fulfilled());
    }

    #[test]
    fn test_is_fulfilled() {
        let d = deliver(100, 100);
        assert!(d.is_fulfilled());
    }
}
