use crate::context::Context;
use crate::error::HandlerError;
use crate::event_queue::HandlerOutcome;
use crate::models::{is_reserved_item, KeyedSurvey, ShipFlightMode, ShipNavStatus, SystemSymbol, WaypointSymbol};
use log::*;
use uuid::Uuid;

fn missing(ship_symbol: &str) -> HandlerError {
    HandlerError::MissingShip(ship_symbol.to_string())
}

pub async fn dock(ctx: &Context, ship_symbol: &str) -> Result<HandlerOutcome, HandlerError> {
    let mut ship = ctx.state.get_ship(ship_symbol).ok_or_else(|| missing(ship_symbol))?;
    if ship.nav.status == ShipNavStatus::Docked {
        debug!("{ship_symbol} already docked, skipping");
        return Ok(HandlerOutcome::Skip);
    }
    ship.nav = ctx.game.dock(ship_symbol).await?;
    info!("[ok] {ship_symbol} docked at {}", ship.nav.waypoint_symbol);
    ctx.state.upsert_ship(ship);
    Ok(HandlerOutcome::Success)
}

pub async fn orbit(ctx: &Context, ship_symbol: &str) -> Result<HandlerOutcome, HandlerError> {
    let mut ship = ctx.state.get_ship(ship_symbol).ok_or_else(|| missing(ship_symbol))?;
    if ship.nav.status == ShipNavStatus::InOrbit {
        debug!("{ship_symbol} already in orbit, skipping");
        return Ok(HandlerOutcome::Skip);
    }
    ship.nav = ctx.game.orbit(ship_symbol).await?;
    info!("[ok] {ship_symbol} entered orbit at {}", ship.nav.waypoint_symbol);
    ctx.state.upsert_ship(ship);
    Ok(HandlerOutcome::Success)
}

/// Always executes, even if already at `waypoint` — remote semantics decide.
pub async fn navigate(
    ctx: &Context,
    ship_symbol: &str,
    waypoint: &WaypointSymbol,
) -> Result<HandlerOutcome, HandlerError> {
    let mut ship = ctx.state.get_ship(ship_symbol).ok_or_else(|| missing(ship_symbol))?;
    let result = ctx.game.navigate(ship_symbol, waypoint).await?;
    ship.nav = result.nav;
    ship.fuel = result.fuel;
    info!(
        "[ok] {ship_symbol} navigating to {waypoint}, arrival {}",
        ship.nav.route.arrival
    );
    ctx.state.upsert_ship(ship);
    Ok(HandlerOutcome::Success)
}

pub async fn refuel(ctx: &Context, ship_symbol: &str) -> Result<HandlerOutcome, HandlerError> {
    let mut ship = ctx.state.get_ship(ship_symbol).ok_or_else(|| missing(ship_symbol))?;
    if ship.fuel.current == ship.fuel.capacity {
        debug!("{ship_symbol} fuel already full, skipping refuel");
        return Ok(HandlerOutcome::Skip);
    }
    let result = ctx.game.refuel(ship_symbol).await?;
    ship.fuel = result.fuel;
    ctx.state.set_agent(result.agent);
    if let Err(e) = ctx.store.record_trade_transaction(&result.transaction).await {
        warn!("failed to record refuel transaction for {ship_symbol}: {e}");
    }
    info!("[ok] {ship_symbol} refueled to {}/{}", ship.fuel.current, ship.fuel.capacity);
    ctx.state.upsert_ship(ship);
    Ok(HandlerOutcome::Success)
}

/// If a signature is given, looks up a live survey at the ship's current
/// waypoint; an expired survey is silently dropped in favor of an
/// un-targeted extract rather than treated as an error.
pub async fn extract(
    ctx: &Context,
    ship_symbol: &str,
    survey_signature: Option<&str>,
) -> Result<HandlerOutcome, HandlerError> {
    let mut ship = ctx.state.get_ship(ship_symbol).ok_or_else(|| missing(ship_symbol))?;
    let survey = match survey_signature {
        Some(signature) => {
            let live = ctx.state.live_surveys(&ship.nav.waypoint_symbol, ctx.clock.now());
            live.into_iter().find(|s| s.survey.signature == signature).map(|s| s.survey)
        }
        None => None,
    };
    let result = ctx.game.extract(ship_symbol, survey.as_ref()).await?;
    ship.cooldown = result.cooldown;
    ship.cargo = result.cargo;
    info!("[ok] {ship_symbol} extracted {} {}", result.units, result.resource);
    ctx.state.upsert_ship(ship);
    Ok(HandlerOutcome::Success)
}

/// Stores returned surveys keyed by (asteroid_waypoint, signature); setting
/// cooldown; persistence to the `Store` port is best-effort (spec marks it
/// optional).
pub async fn survey(ctx: &Context, ship_symbol: &str) -> Result<HandlerOutcome, HandlerError> {
    let mut ship = ctx.state.get_ship(ship_symbol).ok_or_else(|| missing(ship_symbol))?;
    let result = ctx.game.survey(ship_symbol).await?;
    ship.cooldown = result.cooldown;
    let waypoint = ship.nav.waypoint_symbol.clone();
    let keyed: Vec<KeyedSurvey> = result
        .surveys
        .into_iter()
        .map(|survey| KeyedSurvey { uuid: Uuid::new_v4(), survey })
        .collect();
    ctx.state.insert_surveys(&waypoint, keyed.clone());
    if let Err(e) = ctx.store.insert_surveys(&keyed).await {
        warn!("failed to persist surveys at {waypoint}: {e}");
    }
    info!("[ok] {ship_symbol} surveyed {waypoint}, {} surveys returned", keyed.len());
    ctx.state.upsert_ship(ship);
    Ok(HandlerOutcome::Success)
}

/// `units == -1` means "sell all of this resource currently in inventory".
/// Hard-skips resources in the RESERVED set before even checking quantity.
pub async fn sell_cargo_item(
    ctx: &Context,
    ship_symbol: &str,
    resource: &str,
    units: i64,
) -> Result<HandlerOutcome, HandlerError> {
    if is_reserved_item(resource) {
        debug!("{resource} is reserved, hard-skipping sell for {ship_symbol}");
        return Ok(HandlerOutcome::Skip);
    }
    let mut ship = ctx.state.get_ship(ship_symbol).ok_or_else(|| missing(ship_symbol))?;
    let actual_units = if units == -1 { ship.cargo_units_of(resource) } else { units };
    if actual_units <= 0 {
        debug!("{ship_symbol} has nothing to sell for {resource}, skipping");
        return Ok(HandlerOutcome::Skip);
    }
    let result = ctx.game.sell(ship_symbol, resource, actual_units).await?;
    ship.cargo = result.cargo;
    ctx.state.set_agent(result.agent);
    if let Err(e) = ctx.store.record_trade_transaction(&result.transaction).await {
        warn!("failed to record sell transaction for {ship_symbol}: {e}");
    }
    info!("[ok] {ship_symbol} sold {actual_units} {resource}");
    ctx.state.upsert_ship(ship);
    Ok(HandlerOutcome::Success)
}

/// `units == -1` means "fill remaining cargo space" ≡ capacity minus the sum
/// of units already in inventory (reserved items included).
pub async fn buy_cargo_item(
    ctx: &Context,
    ship_symbol: &str,
    resource: &str,
    units: i64,
) -> Result<HandlerOutcome, HandlerError> {
    let mut ship = ctx.state.get_ship(ship_symbol).ok_or_else(|| missing(ship_symbol))?;
    let actual_units = if units == -1 {
        ship.cargo.capacity - ship.cargo.units
    } else {
        units
    };
    if actual_units <= 0 {
        debug!("{ship_symbol} has no room to buy {resource}, skipping");
        return Ok(HandlerOutcome::Skip);
    }
    let result = ctx.game.buy(ship_symbol, resource, actual_units).await?;
    ship.cargo = result.cargo;
    ctx.state.set_agent(result.agent);
    if let Err(e) = ctx.store.record_trade_transaction(&result.transaction).await {
        warn!("failed to record buy transaction for {ship_symbol}: {e}");
    }
    info!("[ok] {ship_symbol} bought {actual_units} {resource}");
    ctx.state.upsert_ship(ship);
    Ok(HandlerOutcome::Success)
}

/// Same `-1` semantics as `sell_cargo_item`, against currently held units.
pub async fn jettison_cargo_item(
    ctx: &Context,
    ship_symbol: &str,
    resource: &str,
    units: i64,
) -> Result<HandlerOutcome, HandlerError> {
    let mut ship = ctx.state.get_ship(ship_symbol).ok_or_else(|| missing(ship_symbol))?;
    let actual_units = if units == -1 { ship.cargo_units_of(resource) } else { units };
    if actual_units <= 0 {
        debug!("{ship_symbol} holds no {resource} to jettison, skipping");
        return Ok(HandlerOutcome::Skip);
    }
    ship.cargo = ctx.game.jettison(ship_symbol, resource, actual_units).await?;
    info!("[ok] {ship_symbol} jettisoned {actual_units} {resource}");
    ctx.state.upsert_ship(ship);
    Ok(HandlerOutcome::Success)
}

pub async fn purchase(
    ctx: &Context,
    waypoint: &WaypointSymbol,
    ship_type: &str,
) -> Result<HandlerOutcome, HandlerError> {
    let result = ctx.game.purchase_ship(waypoint, ship_type).await?;
    info!("[ok] purchased ship {} at {waypoint}", result.ship.symbol);
    ctx.state.set_agent(result.agent);
    ctx.state.upsert_ship(result.ship);
    Ok(HandlerOutcome::Success)
}

pub async fn jump(ctx: &Context, ship_symbol: &str, system: &SystemSymbol) -> Result<HandlerOutcome, HandlerError> {
    let mut ship = ctx.state.get_ship(ship_symbol).ok_or_else(|| missing(ship_symbol))?;
    let result = ctx.game.jump(ship_symbol, system).await?;
    ship.nav = result.nav;
    ship.cooldown = result.cooldown;
    info!("[ok] {ship_symbol} jumped to {system}");
    ctx.state.upsert_ship(ship);
    Ok(HandlerOutcome::Success)
}

pub async fn flight_mode(
    ctx: &Context,
    ship_symbol: &str,
    mode: ShipFlightMode,
) -> Result<HandlerOutcome, HandlerError> {
    let mut ship = ctx.state.get_ship(ship_symbol).ok_or_else(|| missing(ship_symbol))?;
    if ship.nav.flight_mode == mode {
        debug!("{ship_symbol} already in flight mode {mode:?}, skipping");
        return Ok(HandlerOutcome::Skip);
    }
    ship.nav = ctx.game.patch_flight_mode(ship_symbol, mode).await?;
    info!("[ok] {ship_symbol} flight mode set to {:?}", ship.nav.flight_mode);
    ctx.state.upsert_ship(ship);
    Ok(HandlerOutcome::Success)
}

pub async fn chart(ctx: &Context, ship_symbol: &str) -> Result<HandlerOutcome, HandlerError> {
    ctx.game.chart(ship_symbol).await?;
    info!("[ok] {ship_symbol} charted its current waypoint");
    Ok(HandlerOutcome::Success)
}

pub async fn scan_waypoints(ctx: &Context, ship_symbol: &str) -> Result<HandlerOutcome, HandlerError> {
    let mut ship = ctx.state.get_ship(ship_symbol).ok_or_else(|| missing(ship_symbol))?;
    let result = ctx.game.scan_waypoints(ship_symbol).await?;
    ship.cooldown = result.cooldown;
    let count = result.waypoints.len();
    for waypoint in result.waypoints {
        ctx.state.upsert_waypoint(waypoint);
    }
    info!("[ok] {ship_symbol} scanned {count} waypoints");
    ctx.state.upsert_ship(ship);
    Ok(HandlerOutcome::Success)
}

pub async fn fetch_all(ctx: &Context) -> Result<HandlerOutcome, HandlerError> {
    let ships = ctx.game.list_ships().await?;
    info!("[ok] fetched {} ships", ships.len());
    for ship in ships {
        ctx.state.upsert_ship(ship);
    }
    Ok(HandlerOutcome::Success)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::clock::{SystemClock, TestClock};
    use crate::event_queue::EventQueue;
    use crate::game_state::GameState;
    use crate::store::InMemoryStore;
    use chrono::Utc;
    use std::sync::Arc;

    #[test]
    fn test_missing_ship_error_names_ship() {
        let err = missing("S-1");
        assert!(err.to_string().contains("S-1"));
    }

    fn test_context() -> Context {
        let clock = Arc::new(TestClock::new(Utc::now()));
        Context {
            game: Arc::new(crate::api_client::HttpGameApi::new()),
            store: Arc::new(InMemoryStore::new()),
            state: Arc::new(GameState::new()),
            queue: Arc::new(EventQueue::new(clock.clone())),
            clock,
        }
    }

    #[tokio::test]
    async fn test_dock_on_missing_ship_errors() {
        let ctx = test_context();
        let result = dock(&ctx, "NOPE").await;
        assert!(matches!(result, Err(HandlerError::MissingShip(_))));
    }

    #[test]
    fn test_system_clock_placeholder() {
        // keeps SystemClock imported/exercised for completeness of the
        // Clock abstraction used by production contexts.
        let _ = SystemClock;
    }
}
