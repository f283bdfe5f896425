use crate::context::Context;
use crate::error::HandlerError;
use crate::event_queue::HandlerOutcome;
use crate::models::{SystemSymbol, WaypointSymbol};
use log::*;

const JUMP_GATE_TYPE: &str = "JUMP_GATE";

pub async fn system(ctx: &Context, system: &SystemSymbol) -> Result<HandlerOutcome, HandlerError> {
    let remote = ctx.game.get_system(system).await?;
    for waypoint in &remote.waypoints {
        ctx.state.upsert_waypoint(waypoint.clone());
    }
    if let Err(e) = ctx.store.save_system(&remote).await {
        warn!("failed to persist system {system}: {e}");
    }
    info!("[ok] fetched system {system}, {} waypoints", remote.waypoints.len());
    Ok(HandlerOutcome::Success)
}

/// Jump gates are waypoint-scoped on the remote API, so the system's gate
/// waypoint is resolved from its waypoint list before the remote call.
pub async fn jump_gate(ctx: &Context, system: &SystemSymbol) -> Result<HandlerOutcome, HandlerError> {
    let waypoints = ctx.game.list_waypoints(system).await?;
    let Some(gate) = waypoints.iter().find(|w| w.waypoint_type == JUMP_GATE_TYPE) else {
        warn!("{system} has no jump gate waypoint");
        return Ok(HandlerOutcome::Fail);
    };
    let connections = ctx.game.get_jump_gate(&gate.symbol).await?;
    for waypoint in waypoints.iter().cloned() {
        ctx.state.upsert_waypoint(waypoint);
    }
    info!(
        "[ok] jump gate at {} connects to {} systems",
        gate.symbol,
        connections.len()
    );
    Ok(HandlerOutcome::Success)
}

pub async fn waypoint(ctx: &Context, waypoint: &WaypointSymbol) -> Result<HandlerOutcome, HandlerError> {
    let wp = ctx.game.get_waypoint(waypoint).await?;
    ctx.state.upsert_waypoint(wp.clone());
    if let Err(e) = ctx.store.save_waypoint(&wp).await {
        warn!("failed to persist waypoint {waypoint}: {e}");
    }
    info!("[ok] fetched waypoint {waypoint}");
    Ok(HandlerOutcome::Success)
}

pub async fn system_waypoints(ctx: &Context, system: &SystemSymbol) -> Result<HandlerOutcome, HandlerError> {
    let waypoints = ctx.game.list_waypoints(system).await?;
    for wp in &waypoints {
        ctx.state.upsert_waypoint(wp.clone());
        if let Err(e) = ctx.store.save_waypoint(wp).await {
            warn!("failed to persist waypoint {}: {e}", wp.symbol);
        }
    }
    info!("[ok] fetched {} waypoints in {system}", waypoints.len());
    Ok(HandlerOutcome::Success)
}

pub async fn fetch_market(ctx: &Context, waypoint: &WaypointSymbol) -> Result<HandlerOutcome, HandlerError> {
    let market = ctx.game.get_market(waypoint).await?;
    ctx.state.upsert_market(market.clone());
    if let Err(e) = ctx.store.save_market(&market).await {
        warn!("failed to persist market {waypoint}: {e}");
    }
    info!(
        "[ok] fetched market at {waypoint}, {} trade goods",
        market.trade_goods.len()
    );
    Ok(HandlerOutcome::Success)
}

/// Shipyards aren't cached in `GameState` (only `Store`) — nothing else
/// reads shipyard data from the hot path today.
pub async fn shipyard(ctx: &Context, waypoint: &WaypointSymbol) -> Result<HandlerOutcome, HandlerError> {
    let shipyard = ctx.game.get_shipyard(waypoint).await?;
    if let Err(e) = ctx.store.save_shipyard(&shipyard).await {
        warn!("failed to persist shipyard {waypoint}: {e}");
    }
    info!(
        "[ok] fetched shipyard at {waypoint}, {} ships for sale",
        shipyard.ships.len()
    );
    Ok(HandlerOutcome::Success)
}
