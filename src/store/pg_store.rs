use super::db_models;
use super::Store;
use crate::config::CONFIG;
use crate::error::StoreError;
use crate::models::{KeyedSurvey, Market, MarketTransaction, Shipyard, System, SystemSymbol, WaypointSymbol};
use crate::schema::*;
use async_trait::async_trait;
use chrono::Utc;
use diesel::upsert::excluded;
use diesel::ExpressionMethods as _;
use diesel::OptionalExtension as _;
use diesel::QueryDsl as _;
use diesel::SelectableHelper as _;
use diesel_async::pooled_connection::deadpool::{Object, Pool};
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::AsyncPgConnection;
use diesel_async::RunQueryDsl as _;
use log::*;

/// Postgres-backed `Store`, built the way the teacher's `database`/`db`
/// modules build their pool: `diesel-async` over a `deadpool` connection
/// pool, `ON CONFLICT ... DO UPDATE` for the snapshot tables.
#[derive(Clone)]
pub struct PgStore {
    pool: Pool<AsyncPgConnection>,
}

impl PgStore {
    pub async fn connect() -> Result<Self, StoreError> {
        let database_url = CONFIG
            .database_url
            .clone()
            .ok_or_else(|| StoreError::Pool("no database configured".to_string()))?;
        let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url);
        let pool = Pool::builder(manager)
            .max_size(5)
            .build()
            .map_err(|e| StoreError::Pool(e.to_string()))?;
        info!("connected to postgres store");
        Ok(PgStore { pool })
    }

    async fn conn(&self) -> Result<Object<AsyncPgConnection>, StoreError> {
        self.pool
            .get()
            .await
            .map_err(|e| StoreError::Pool(e.to_string()))
    }
}

#[async_trait]
impl Store for PgStore {
    async fn get_agent_token(&self, callsign: &str) -> Result<Option<String>, StoreError> {
        let token: Option<String> = agent_tokens::table
            .filter(agent_tokens::callsign.eq(callsign))
            .select(agent_tokens::token)
            .first(&mut self.conn().await?)
            .await
            .optional()?;
        Ok(token)
    }

    async fn save_agent_token(&self, callsign: &str, token: &str) -> Result<(), StoreError> {
        diesel::insert_into(agent_tokens::table)
            .values((
                agent_tokens::callsign.eq(callsign),
                agent_tokens::token.eq(token),
                agent_tokens::created_at.eq(Utc::now()),
            ))
            .on_conflict(agent_tokens::callsign)
            .do_update()
            .set(agent_tokens::token.eq(token))
            .execute(&mut self.conn().await?)
            .await?;
        Ok(())
    }

    async fn load_system(&self, symbol: &SystemSymbol) -> Result<Option<System>, StoreError> {
        let row: Option<db_models::SystemRow> = systems::table
            .filter(systems::symbol.eq(symbol.to_string()))
            .select(db_models::SystemRow::as_select())
            .first(&mut self.conn().await?)
            .await
            .optional()?;
        Ok(row.map(|r| serde_json::from_value(r.system_data)).transpose()?)
    }

    async fn save_system(&self, system: &System) -> Result<(), StoreError> {
        let data = serde_json::to_value(system)?;
        diesel::insert_into(systems::table)
            .values((
                systems::symbol.eq(system.symbol.to_string()),
                systems::system_data.eq(&data),
                systems::updated_at.eq(Utc::now()),
            ))
            .on_conflict(systems::symbol)
            .do_update()
            .set((
                systems::system_data.eq(excluded(systems::system_data)),
                systems::updated_at.eq(Utc::now()),
            ))
            .execute(&mut self.conn().await?)
            .await?;
        Ok(())
    }

    async fn load_waypoints(
        &self,
        system: &SystemSymbol,
    ) -> Result<Vec<crate::models::Waypoint>, StoreError> {
        let rows: Vec<db_models::WaypointRow> = waypoints::table
            .filter(waypoints::system_symbol.eq(system.to_string()))
            .select(db_models::WaypointRow::as_select())
            .load(&mut self.conn().await?)
            .await?;
        rows.into_iter()
            .map(|r| serde_json::from_value(r.waypoint_data).map_err(StoreError::from))
            .collect()
    }

    async fn save_waypoint(&self, waypoint: &crate::models::Waypoint) -> Result<(), StoreError> {
        let data = serde_json::to_value(waypoint)?;
        diesel::insert_into(waypoints::table)
            .values((
                waypoints::symbol.eq(waypoint.symbol.to_string()),
                waypoints::system_symbol.eq(waypoint.system_symbol.to_string()),
                waypoints::waypoint_data.eq(&data),
                waypoints::updated_at.eq(Utc::now()),
            ))
            .on_conflict(waypoints::symbol)
            .do_update()
            .set((
                waypoints::waypoint_data.eq(excluded(waypoints::waypoint_data)),
                waypoints::updated_at.eq(Utc::now()),
            ))
            .execute(&mut self.conn().await?)
            .await?;
        Ok(())
    }

    async fn load_market(&self, symbol: &WaypointSymbol) -> Result<Option<Market>, StoreError> {
        let row: Option<db_models::MarketRow> = markets::table
            .filter(markets::waypoint_symbol.eq(symbol.to_string()))
            .select(db_models::MarketRow::as_select())
            .first(&mut self.conn().await?)
            .await
            .optional()?;
        Ok(row.map(|r| serde_json::from_value(r.market_data)).transpose()?)
    }

    async fn save_market(&self, market: &Market) -> Result<(), StoreError> {
        let data = serde_json::to_value(market)?;
        diesel::insert_into(markets::table)
            .values((
                markets::waypoint_symbol.eq(market.symbol.to_string()),
                markets::market_data.eq(&data),
                markets::updated_at.eq(Utc::now()),
            ))
            .on_conflict(markets::waypoint_symbol)
            .do_update()
            .set((
                markets::market_data.eq(excluded(markets::market_data)),
                markets::updated_at.eq(Utc::now()),
            ))
            .execute(&mut self.conn().await?)
            .await?;
        Ok(())
    }

    async fn load_shipyard(&self, symbol: &WaypointSymbol) -> Result<Option<Shipyard>, StoreError> {
        let row: Option<db_models::ShipyardRow> = shipyards::table
            .filter(shipyards::waypoint_symbol.eq(symbol.to_string()))
            .select(db_models::ShipyardRow::as_select())
            .first(&mut self.conn().await?)
            .await
            .optional()?;
        Ok(row.map(|r| serde_json::from_value(r.shipyard_data)).transpose()?)
    }

    async fn save_shipyard(&self, shipyard: &Shipyard) -> Result<(), StoreError> {
        let data = serde_json::to_value(shipyard)?;
        diesel::insert_into(shipyards::table)
            .values((
                shipyards::waypoint_symbol.eq(shipyard.symbol.to_string()),
                shipyards::shipyard_data.eq(&data),
                shipyards::updated_at.eq(Utc::now()),
            ))
            .on_conflict(shipyards::waypoint_symbol)
            .do_update()
            .set((
                shipyards::shipyard_data.eq(excluded(shipyards::shipyard_data)),
                shipyards::updated_at.eq(Utc::now()),
            ))
            .execute(&mut self.conn().await?)
            .await?;
        Ok(())
    }

    async fn insert_surveys(&self, surveys: &[KeyedSurvey]) -> Result<(), StoreError> {
        let now = Utc::now();
        let inserts = surveys
            .iter()
            .map(|s| {
                Ok(db_models::SurveyRow {
                    uuid: s.uuid,
                    survey: serde_json::to_value(&s.survey)?,
                    asteroid_symbol: s.survey.symbol.to_string(),
                    inserted_at: now,
                    expires_at: s.survey.expiration,
                })
            })
            .collect::<Result<Vec<_>, serde_json::Error>>()?;
        diesel::insert_into(surveys::table)
            .values(&inserts)
            .execute(&mut self.conn().await?)
            .await?;
        Ok(())
    }

    async fn load_surveys(&self, asteroid: &WaypointSymbol) -> Result<Vec<KeyedSurvey>, StoreError> {
        let rows: Vec<db_models::SurveyRow> = surveys::table
            .filter(surveys::asteroid_symbol.eq(asteroid.to_string()))
            .select(db_models::SurveyRow::as_select())
            .load(&mut self.conn().await?)
            .await?;
        rows.into_iter()
            .map(|r| {
                Ok(KeyedSurvey {
                    uuid: r.uuid,
                    survey: serde_json::from_value(r.survey)?,
                })
            })
            .collect::<Result<Vec<_>, serde_json::Error>>()
            .map_err(StoreError::from)
    }

    async fn remove_survey(&self, uuid: &uuid::Uuid) -> Result<(), StoreError> {
        diesel::delete(surveys::table.filter(surveys::uuid.eq(uuid)))
            .execute(&mut self.conn().await?)
            .await?;
        Ok(())
    }

    async fn record_trade_transaction(&self, transaction: &MarketTransaction) -> Result<(), StoreError> {
        let insert = db_models::NewTradeTransaction {
            waypoint_symbol: transaction.waypoint_symbol.to_string(),
            ship_symbol: transaction.ship_symbol.clone(),
            trade_symbol: transaction.trade_symbol.clone(),
            type_: transaction._type.clone(),
            units: transaction.units as i32,
            price_per_unit: transaction.price_per_unit as i32,
            total_price: transaction.total_price as i32,
            timestamp: transaction.timestamp,
        };
        diesel::insert_into(trade_transactions::table)
            .values(&insert)
            .execute(&mut self.conn().await?)
            .await?;
        Ok(())
    }
}
