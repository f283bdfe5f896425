pub mod api_models;

use crate::config::CONFIG;
use crate::error::GameApiError;
use crate::models::{
    Agent, Construction, Contract, Data, Faction, Market, MarketTransaction, PaginatedList, Ship,
    ShipCargo, ShipCooldown, ShipFlightMode, ShipFuel, ShipNav, Survey, SystemSymbol, Waypoint,
    WaypointSymbol, WithTimestamp,
};
use async_trait::async_trait;
use log::*;
use reqwest::{Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::json;
use std::sync::{Arc, RwLock};

const PAGE_SIZE: u32 = 20;

pub struct RegisterResult {
    pub token: String,
    pub agent: Agent,
    pub contract: Contract,
    pub ship: Ship,
    pub faction: Faction,
}

pub struct NavigateResult {
    pub nav: ShipNav,
    pub fuel: ShipFuel,
}

pub struct JumpResult {
    pub nav: ShipNav,
    pub cooldown: ShipCooldown,
}

pub struct RefuelResult {
    pub agent: Agent,
    pub fuel: ShipFuel,
    pub transaction: MarketTransaction,
}

pub struct ExtractResult {
    pub cooldown: ShipCooldown,
    pub resource: String,
    pub units: i64,
    pub cargo: ShipCargo,
}

pub struct SurveyResult {
    pub cooldown: ShipCooldown,
    pub surveys: Vec<Survey>,
}

pub struct TransactionResult {
    pub agent: Agent,
    pub cargo: ShipCargo,
    pub transaction: MarketTransaction,
}

pub struct ContractAcceptResult {
    pub contract: Contract,
    pub agent: Agent,
}

pub struct ContractDeliverResult {
    pub contract: Contract,
    pub cargo: ShipCargo,
}

pub struct ContractFulfillResult {
    pub contract: Contract,
    pub agent: Agent,
}

pub struct PurchaseShipResult {
    pub ship: Ship,
    pub agent: Agent,
}

pub struct ScanWaypointsResult {
    pub cooldown: ShipCooldown,
    pub waypoints: Vec<Waypoint>,
}

/// The remote game's narrow HTTP binding. Every method maps to one remote
/// call; failures surface as a typed [`GameApiError`] rather than a panic,
/// since handlers propagate them with `?` into `HandlerError`.
#[async_trait]
pub trait GameApi: Send + Sync {
    fn set_agent_token(&self, token: &str) -> Result<(), GameApiError>;
    fn agent_token(&self) -> Option<String>;

    async fn fetch_agent(&self) -> Result<Agent, GameApiError>;
    async fn register(
        &self,
        symbol: &str,
        faction: &str,
        email: Option<&str>,
    ) -> Result<RegisterResult, GameApiError>;

    async fn list_ships(&self) -> Result<Vec<Ship>, GameApiError>;
    async fn purchase_ship(
        &self,
        waypoint: &WaypointSymbol,
        ship_type: &str,
    ) -> Result<PurchaseShipResult, GameApiError>;
    async fn dock(&self, ship: &str) -> Result<ShipNav, GameApiError>;
    async fn orbit(&self, ship: &str) -> Result<ShipNav, GameApiError>;
    async fn navigate(
        &self,
        ship: &str,
        waypoint: &WaypointSymbol,
    ) -> Result<NavigateResult, GameApiError>;
    async fn patch_flight_mode(
        &self,
        ship: &str,
        mode: ShipFlightMode,
    ) -> Result<ShipNav, GameApiError>;
    async fn jump(&self, ship: &str, system: &SystemSymbol) -> Result<JumpResult, GameApiError>;
    async fn refuel(&self, ship: &str) -> Result<RefuelResult, GameApiError>;
    async fn extract(
        &self,
        ship: &str,
        survey: Option<&Survey>,
    ) -> Result<ExtractResult, GameApiError>;
    async fn survey(&self, ship: &str) -> Result<SurveyResult, GameApiError>;
    async fn sell(
        &self,
        ship: &str,
        resource: &str,
        units: i64,
    ) -> Result<TransactionResult, GameApiError>;
    async fn buy(
        &self,
        ship: &str,
        resource: &str,
        units: i64,
    ) -> Result<TransactionResult, GameApiError>;
    async fn jettison(
        &self,
        ship: &str,
        resource: &str,
        units: i64,
    ) -> Result<ShipCargo, GameApiError>;
    async fn chart(&self, ship: &str) -> Result<(), GameApiError>;
    async fn scan_waypoints(&self, ship: &str) -> Result<ScanWaypointsResult, GameApiError>;

    async fn list_contracts(&self) -> Result<Vec<Contract>, GameApiError>;
    async fn accept_contract(
        &self,
        contract_id: &str,
    ) -> Result<ContractAcceptResult, GameApiError>;
    async fn deliver_contract(
        &self,
        contract_id: &str,
        ship: &str,
        resource: &str,
        units: i64,
    ) -> Result<ContractDeliverResult, GameApiError>;
    async fn fulfill_contract(
        &self,
        contract_id: &str,
    ) -> Result<ContractFulfillResult, GameApiError>;

    async fn get_system(
        &self,
        system: &SystemSymbol,
    ) -> Result<crate::models::System, GameApiError>;
    async fn list_waypoints(&self, system: &SystemSymbol) -> Result<Vec<Waypoint>, GameApiError>;
    async fn get_waypoint(&self, waypoint: &WaypointSymbol) -> Result<Waypoint, GameApiError>;
    async fn get_market(&self, waypoint: &WaypointSymbol) -> Result<Market, GameApiError>;
    async fn get_shipyard(
        &self,
        waypoint: &WaypointSymbol,
    ) -> Result<crate::models::Shipyard, GameApiError>;
    async fn get_jump_gate(
        &self,
        waypoint: &WaypointSymbol,
    ) -> Result<Vec<WaypointSymbol>, GameApiError>;
    async fn get_construction(
        &self,
        waypoint: &WaypointSymbol,
    ) -> Result<WithTimestamp<Option<Construction>>, GameApiError>;
}

/// Concrete HTTP binding to the remote game, behind the [`GameApi`] port.
/// Request pacing is the worker's job, not this adapter's; the one
/// retry-on-429 here is a last-resort net for bursts the worker's own
/// pacing doesn't anticipate (e.g. concurrent `view`/`strategy` REPL
/// commands, which bypass the worker).
pub struct HttpGameApi {
    base_url: String,
    client: reqwest::Client,
    agent_token: Arc<RwLock<Option<String>>>,
}

impl HttpGameApi {
    pub fn new() -> Self {
        let user_agent = format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        let client = reqwest::ClientBuilder::new()
            .user_agent(user_agent)
            .timeout(std::time::Duration::from_secs(10))
            .redirect(reqwest::redirect::Policy::none())
            .https_only(true)
            .http1_only()
            .build()
            .expect("failed to build reqwest client");
        HttpGameApi {
            client,
            base_url: CONFIG.api_base_url.clone(),
            agent_token: Arc::new(RwLock::new(None)),
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, GameApiError> {
        self.request(Method::GET, path, None::<&()>).await
    }

    async fn post<T: DeserializeOwned, U: Serialize>(
        &self,
        path: &str,
        body: &U,
    ) -> Result<T, GameApiError> {
        self.request(Method::POST, path, Some(body)).await
    }

    async fn patch<T: DeserializeOwned, U: Serialize>(
        &self,
        path: &str,
        body: &U,
    ) -> Result<T, GameApiError> {
        self.request(Method::PATCH, path, Some(body)).await
    }

    async fn request<T: DeserializeOwned, U: Serialize>(
        &self,
        method: Method,
        path: &str,
        json_body: Option<&U>,
    ) -> Result<T, GameApiError> {
        let (status, body) = self.send_once(method.clone(), path, json_body).await?;
        let (status, body) = if status == StatusCode::TOO_MANY_REQUESTS {
            warn!("429 from {} {}, retrying once after Retry-After", method, path);
            self.send_once(method, path, json_body).await?
        } else {
            (status, body)
        };
        if !status.is_success() {
            return Err(GameApiError::Remote {
                status: status.as_u16(),
                body,
            });
        }
        let data: Data<T> = serde_json::from_str(&body)?;
        Ok(data.data)
    }

    async fn send_once<U: Serialize>(
        &self,
        method: Method,
        path: &str,
        json_body: Option<&U>,
    ) -> Result<(StatusCode, String), GameApiError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.request(method.clone(), &url);
        if let Some(body) = json_body {
            request = request.json(body);
        }
        if let Some(token) = self.agent_token() {
            request = request.header("Authorization", format!("Bearer {token}"));
        }
        let response = request.send().await?;
        let status = response.status();
        debug!("{} {} {}", status.as_u16(), method, path);
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());
        let body = response.text().await?;
        if status == StatusCode::TOO_MANY_REQUESTS {
            tokio::time::sleep(std::time::Duration::from_secs(retry_after.unwrap_or(1))).await;
        }
        Ok((status, body))
    }

    async fn get_all_pages<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, GameApiError> {
        let mut page = 1u32;
        let mut items = Vec::new();
        loop {
            let sep = if path.contains('?') { '&' } else { '?' };
            let paginated_path = format!("{path}{sep}page={page}&limit={PAGE_SIZE}");
            let (status, body) = self.send_once(Method::GET, &paginated_path, None::<&()>).await?;
            if !status.is_success() {
                return Err(GameApiError::Remote {
                    status: status.as_u16(),
                    body,
                });
            }
            let response: PaginatedList<T> = serde_json::from_str(&body)?;
            items.extend(response.data);
            if response.meta.page * PAGE_SIZE >= response.meta.total {
                break;
            }
            page += 1;
        }
        Ok(items)
    }
}

impl Default for HttpGameApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GameApi for HttpGameApi {
    fn set_agent_token(&self, token: &str) -> Result<(), GameApiError> {
        let mut agent_token = self.agent_token.write().unwrap();
        if agent_token.is_some() {
            return Err(GameApiError::TokenAlreadySet);
        }
        *agent_token = Some(token.to_string());
        Ok(())
    }

    fn agent_token(&self) -> Option<String> {
        self.agent_token.read().unwrap().clone()
    }

    async fn fetch_agent(&self) -> Result<Agent, GameApiError> {
        self.get("/my/agent").await
    }

    async fn register(
        &self,
        symbol: &str,
        faction: &str,
        email: Option<&str>,
    ) -> Result<RegisterResult, GameApiError> {
        let mut body = json!({ "symbol": symbol, "faction": faction });
        if let Some(email) = email {
            body["email"] = json!(email);
        }
        let data: api_models::RegisterResponseData = self.post("/register", &body).await?;
        Ok(RegisterResult {
            token: data.token,
            agent: data.agent,
            contract: data.contract,
            ship: data.ship,
            faction: data.faction,
        })
    }

    async fn list_ships(&self) -> Result<Vec<Ship>, GameApiError> {
        self.get_all_pages("/my/ships").await
    }

    async fn purchase_ship(
        &self,
        waypoint: &WaypointSymbol,
        ship_type: &str,
    ) -> Result<PurchaseShipResult, GameApiError> {
        let body = json!({ "shipType": ship_type, "waypointSymbol": waypoint.0 });
        let data: api_models::PurchaseShipData = self.post("/my/ships", &body).await?;
        Ok(PurchaseShipResult {
            ship: data.ship,
            agent: data.agent,
        })
    }

    async fn dock(&self, ship: &str) -> Result<ShipNav, GameApiError> {
        let data: api_models::NavResponseData =
            self.post(&format!("/my/ships/{ship}/dock"), &json!({})).await?;
        Ok(data.nav)
    }

    async fn orbit(&self, ship: &str) -> Result<ShipNav, GameApiError> {
        let data: api_models::NavResponseData = self
            .post(&format!("/my/ships/{ship}/orbit"), &json!({}))
            .await?;
        Ok(data.nav)
    }

    async fn navigate(
        &self,
        ship: &str,
        waypoint: &WaypointSymbol,
    ) -> Result<NavigateResult, GameApiError> {
        let body = json!({ "waypointSymbol": waypoint.0 });
        let data: api_models::NavResponseData = self
            .post(&format!("/my/ships/{ship}/navigate"), &body)
            .await?;
        Ok(NavigateResult {
            nav: data.nav,
            fuel: data.fuel,
        })
    }

    async fn patch_flight_mode(
        &self,
        ship: &str,
        mode: ShipFlightMode,
    ) -> Result<ShipNav, GameApiError> {
        let mode_str = match mode {
            ShipFlightMode::Cruise => "CRUISE",
            ShipFlightMode::Burn => "BURN",
            ShipFlightMode::Drift => "DRIFT",
            ShipFlightMode::Stealth => "STEALTH",
        };
        self.patch(
            &format!("/my/ships/{ship}/nav"),
            &json!({ "flightMode": mode_str }),
        )
        .await
    }

    async fn jump(&self, ship: &str, system: &SystemSymbol) -> Result<JumpResult, GameApiError> {
        let body = json!({ "systemSymbol": system.0 });
        let data: api_models::CooldownNavData = self
            .post(&format!("/my/ships/{ship}/jump"), &body)
            .await?;
        Ok(JumpResult {
            nav: data.nav,
            cooldown: data.cooldown,
        })
    }

    async fn refuel(&self, ship: &str) -> Result<RefuelResult, GameApiError> {
        let data: api_models::RefuelData = self
            .post(&format!("/my/ships/{ship}/refuel"), &json!({}))
            .await?;
        Ok(RefuelResult {
            agent: data.agent,
            fuel: data.fuel,
            transaction: data.transaction,
        })
    }

    async fn extract(
        &self,
        ship: &str,
        survey: Option<&Survey>,
    ) -> Result<ExtractResult, GameApiError> {
        let body = match survey {
            Some(survey) => json!({ "survey": survey }),
            None => json!({}),
        };
        let data: api_models::ExtractData = self
            .post(&format!("/my/ships/{ship}/extract"), &body)
            .await?;
        Ok(ExtractResult {
            cooldown: data.cooldown,
            resource: data.extraction.extraction_yield.symbol,
            units: data.extraction.extraction_yield.units,
            cargo: data.cargo,
        })
    }

    async fn survey(&self, ship: &str) -> Result<SurveyResult, GameApiError> {
        let data: api_models::SurveyData = self
            .post(&format!("/my/ships/{ship}/survey"), &json!({}))
            .await?;
        Ok(SurveyResult {
            cooldown: data.cooldown,
            surveys: data.surveys,
        })
    }

    async fn sell(
        &self,
        ship: &str,
        resource: &str,
        units: i64,
    ) -> Result<TransactionResult, GameApiError> {
        let body = json!({ "symbol": resource, "units": units });
        let data: api_models::MarketTransactionData = self
            .post(&format!("/my/ships/{ship}/sell"), &body)
            .await?;
        Ok(TransactionResult {
            agent: data.agent,
            cargo: data.cargo,
            transaction: data.transaction,
        })
    }

    async fn buy(
        &self,
        ship: &str,
        resource: &str,
        units: i64,
    ) -> Result<TransactionResult, GameApiError> {
        let body = json!({ "symbol": resource, "units": units });
        let data: api_models::MarketTransactionData = self
            .post(&format!("/my/ships/{ship}/purchase"), &body)
            .await?;
        Ok(TransactionResult {
            agent: data.agent,
            cargo: data.cargo,
            transaction: data.transaction,
        })
    }

    async fn jettison(
        &self,
        ship: &str,
        resource: &str,
        units: i64,
    ) -> Result<ShipCargo, GameApiError> {
        let body = json!({ "symbol": resource, "units": units });
        self.post(&format!("/my/ships/{ship}/jettison"), &body).await
    }

    async fn chart(&self, ship: &str) -> Result<(), GameApiError> {
        let _: serde_json::Value = self
            .post(&format!("/my/ships/{ship}/chart"), &json!({}))
            .await?;
        Ok(())
    }

    async fn scan_waypoints(&self, ship: &str) -> Result<ScanWaypointsResult, GameApiError> {
        let data: api_models::ScanWaypointsData = self
            .post(&format!("/my/ships/{ship}/scan/waypoints"), &json!({}))
            .await?;
        Ok(ScanWaypointsResult {
            cooldown: data.cooldown,
            waypoints: data.waypoints,
        })
    }

    async fn list_contracts(&self) -> Result<Vec<Contract>, GameApiError> {
        self.get_all_pages("/my/contracts").await
    }

    async fn accept_contract(
        &self,
        contract_id: &str,
    ) -> Result<ContractAcceptResult, GameApiError> {
        let data: api_models::ContractAcceptData = self
            .post(&format!("/my/contracts/{contract_id}/accept"), &json!({}))
            .await?;
        Ok(ContractAcceptResult {
            contract: data.contract,
            agent: data.agent,
        })
    }

    async fn deliver_contract(
        &self,
        contract_id: &str,
        ship: &str,
        resource: &str,
        units: i64,
    ) -> Result<ContractDeliverResult, GameApiError> {
        let body = json!({ "shipSymbol": ship, "tradeSymbol": resource, "units": units });
        let data: api_models::ContractDeliverData = self
            .post(&format!("/my/contracts/{contract_id}/deliver"), &body)
            .await?;
        Ok(ContractDeliverResult {
            contract: data.contract,
            cargo: data.cargo,
        })
    }

    async fn fulfill_contract(
        &self,
        contract_id: &str,
    ) -> Result<ContractFulfillResult, GameApiError> {
        let data: api_models::ContractFulfillData = self
            .post(&format!("/my/contracts/{contract_id}/fulfill"), &json!({}))
            .await?;
        Ok(ContractFulfillResult {
            contract: data.contract,
            agent: data.agent,
        })
    }

    async fn get_system(
        &self,
        system: &SystemSymbol,
    ) -> Result<crate::models::System, GameApiError> {
        let raw: api_models::RemoteSystem = self.get(&format!("/systems/{system}")).await?;
        let waypoints = raw
            .waypoints
            .into_iter()
            .map(|w| Waypoint {
                system_symbol: raw.symbol.clone(),
                symbol: w.symbol,
                waypoint_type: w.waypoint_type,
                x: w.x,
                y: w.y,
                traits: Vec::new(),
                is_under_construction: false,
            })
            .collect();
        Ok(crate::models::System {
            symbol: raw.symbol,
            system_type: raw.system_type,
            x: raw.x,
            y: raw.y,
            waypoints,
        })
    }

    async fn list_waypoints(&self, system: &SystemSymbol) -> Result<Vec<Waypoint>, GameApiError> {
        self.get_all_pages(&format!("/systems/{system}/waypoints")).await
    }

    async fn get_waypoint(&self, waypoint: &WaypointSymbol) -> Result<Waypoint, GameApiError> {
        self.get(&format!(
            "/systems/{}/waypoints/{}",
            waypoint.system(),
            waypoint
        ))
        .await
    }

    async fn get_market(&self, waypoint: &WaypointSymbol) -> Result<Market, GameApiError> {
        self.get(&format!(
            "/systems/{}/waypoints/{}/market",
            waypoint.system(),
            waypoint
        ))
        .await
    }

    async fn get_shipyard(
        &self,
        waypoint: &WaypointSymbol,
    ) -> Result<crate::models::Shipyard, GameApiError> {
        self.get(&format!(
            "/systems/{}/waypoints/{}/shipyard",
            waypoint.system(),
            waypoint
        ))
        .await
    }

    async fn get_jump_gate(
        &self,
        waypoint: &WaypointSymbol,
    ) -> Result<Vec<WaypointSymbol>, GameApiError> {
        let data: api_models::JumpGateData = self
            .get(&format!(
                "/systems/{}/waypoints/{}/jump-gate",
                waypoint.system(),
                waypoint
            ))
            .await?;
        Ok(data.connections)
    }

    async fn get_construction(
        &self,
        waypoint: &WaypointSymbol,
    ) -> Result<WithTimestamp<Option<Construction>>, GameApiError> {
        let path = format!(
            "/systems/{}/waypoints/{}/construction",
            waypoint.system(),
            waypoint
        );
        let (status, body) = self.send_once(Method::GET, &path, None::<&()>).await?;
        let construction = match status {
            StatusCode::OK => {
                let data: Data<Construction> = serde_json::from_str(&body)?;
                Some(data.data)
            }
            StatusCode::NOT_FOUND => None,
            _ => return Err(GameApiError::Remote { status: status.as_u16(), body }),
        };
        Ok(WithTimestamp {
            timestamp: chrono::Utc::now(),
            data: construction,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_set_agent_token_twice_errors() {
        let api = HttpGameApi::new();
        api.set_agent_token("t1").unwrap();
        assert!(matches!(
            api.set_agent_token("t2"),
            Err(GameApiError::TokenAlreadySet)
        ));
        assert_eq!(api.agent_token(), Some("t1".to_string()));
    }
}
