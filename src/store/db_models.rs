use chrono::{DateTime, Utc};
use diesel::{Insertable, Queryable, Selectable};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = crate::schema::agent_tokens)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AgentToken {
    pub callsign: String,
    pub token: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = crate::schema::systems)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SystemRow {
    pub symbol: String,
    pub system_data: Value,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = crate::schema::waypoints)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct WaypointRow {
    pub symbol: String,
    pub system_symbol: String,
    pub waypoint_data: Value,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = crate::schema::markets)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MarketRow {
    pub waypoint_symbol: String,
    pub market_data: Value,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = crate::schema::shipyards)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ShipyardRow {
    pub waypoint_symbol: String,
    pub shipyard_data: Value,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = crate::schema::surveys)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SurveyRow {
    pub uuid: Uuid,
    pub survey: Value,
    pub asteroid_symbol: String,
    pub inserted_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::trade_transactions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewTradeTransaction {
    pub waypoint_symbol: String,
    pub ship_symbol: String,
    pub trade_symbol: String,
    pub type_: String,
    pub units: i32,
    pub price_per_unit: i32,
    pub total_price: i32,
    pub timestamp: DateTime<Utc>,
}
