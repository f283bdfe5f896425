use crate::context::Context;
use crate::error::HandlerError;
use crate::event_queue::HandlerOutcome;
use log::*;

fn missing(contract_id: &str) -> HandlerError {
    HandlerError::MissingContract(contract_id.to_string())
}

pub async fn fetch_all(ctx: &Context) -> Result<HandlerOutcome, HandlerError> {
    let contracts = ctx.game.list_contracts().await?;
    info!("[ok] fetched {} contracts", contracts.len());
    for contract in contracts {
        ctx.state.upsert_contract(contract);
    }
    Ok(HandlerOutcome::Success)
}

pub async fn accept(ctx: &Context, contract_id: &str) -> Result<HandlerOutcome, HandlerError> {
    ctx.state
        .get_contract(contract_id)
        .ok_or_else(|| missing(contract_id))?;
    let result = ctx.game.accept_contract(contract_id).await?;
    info!("[ok] accepted contract {contract_id}");
    ctx.state.set_agent(result.agent);
    ctx.state.upsert_contract(result.contract);
    Ok(HandlerOutcome::Success)
}

pub async fn deliver(
    ctx: &Context,
    contract_id: &str,
    ship_symbol: &str,
    resource: &str,
    units: i64,
) -> Result<HandlerOutcome, HandlerError> {
    let mut ship = ctx
        .state
        .get_ship(ship_symbol)
        .ok_or_else(|| HandlerError::MissingShip(ship_symbol.to_string()))?;
    let result = ctx.game.deliver_contract(contract_id, ship_symbol, resource, units).await?;
    ship.cargo = result.cargo;
    info!("[ok] {ship_symbol} delivered {units} {resource} to contract {contract_id}");
    ctx.state.upsert_ship(ship);
    ctx.state.upsert_contract(result.contract);
    Ok(HandlerOutcome::Success)
}

pub async fn fulfill(ctx: &Context, contract_id: &str) -> Result<HandlerOutcome, HandlerError> {
    ctx.state
        .get_contract(contract_id)
        .ok_or_else(|| missing(contract_id))?;
    let result = ctx.game.fulfill_contract(contract_id).await?;
    info!("[ok] fulfilled contract {contract_id}");
    ctx.state.set_agent(result.agent);
    ctx.state.upsert_contract(result.contract);
    Ok(HandlerOutcome::Success)
}
