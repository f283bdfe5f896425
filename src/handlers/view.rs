use crate::context::Context;
use crate::error::HandlerError;
use crate::event_queue::HandlerOutcome;
use crate::models::WaypointSymbol;

const OK_PREFIX: &str = "[ok] ";
const FAIL_PREFIX: &str = "[fail] ";
const INFO_PREFIX: &str = "[info] ";

/// These handlers only ever print cached `GameState`, the same as the
/// original console views — they never hit the remote game, so they always
/// resolve `Instant` and never consume worker pacing.
pub async fn ship(ctx: &Context, ship_symbol: &str) -> Result<HandlerOutcome, HandlerError> {
    match ctx.state.get_ship(ship_symbol) {
        Some(ship) => {
            println!(
                "{OK_PREFIX}{} at {} ({:?}) fuel {}/{} cargo {}/{}",
                ship.symbol,
                ship.nav.waypoint_symbol,
                ship.nav.status,
                ship.fuel.current,
                ship.fuel.capacity,
                ship.cargo.units,
                ship.cargo.capacity
            );
        }
        None => println!("{FAIL_PREFIX}no ship named {ship_symbol}"),
    }
    Ok(HandlerOutcome::Instant)
}

pub async fn ships(ctx: &Context) -> Result<HandlerOutcome, HandlerError> {
    let ships: Vec<_> = ctx.state.ships.iter().map(|e| e.value().clone()).collect();
    println!("{INFO_PREFIX}{} ships", ships.len());
    for ship in ships {
        println!("  {} {:?} at {}", ship.symbol, ship.nav.status, ship.nav.waypoint_symbol);
    }
    Ok(HandlerOutcome::Instant)
}

pub async fn agent(ctx: &Context) -> Result<HandlerOutcome, HandlerError> {
    match ctx.state.get_agent() {
        Some(agent) => println!("{OK_PREFIX}{} — {} credits", agent.symbol, agent.credits),
        None => println!("{FAIL_PREFIX}no agent loaded yet"),
    }
    Ok(HandlerOutcome::Instant)
}

pub async fn contracts(ctx: &Context) -> Result<HandlerOutcome, HandlerError> {
    let contracts: Vec<_> = ctx.state.contracts.iter().map(|e| e.value().clone()).collect();
    println!("{INFO_PREFIX}{} contracts", contracts.len());
    for contract in contracts {
        println!(
            "  {} accepted={} fulfilled={}",
            contract.id, contract.accepted, contract.fulfilled
        );
    }
    Ok(HandlerOutcome::Instant)
}

/// Unlike the other views, `market`/`shipyard` hit the remote directly
/// rather than printing a cached snapshot — same as the original console.
pub async fn market(ctx: &Context, waypoint: &WaypointSymbol) -> Result<HandlerOutcome, HandlerError> {
    match ctx.game.get_market(waypoint).await {
        Ok(market) => {
            println!("{OK_PREFIX}market at {waypoint}, {} trade goods", market.trade_goods.len());
            for good in &market.trade_goods {
                println!("  {} buy={} sell={}", good.symbol, good.purchase_price, good.sell_price);
            }
        }
        Err(err) => println!("{FAIL_PREFIX}failed to fetch market at {waypoint}: {err}"),
    }
    Ok(HandlerOutcome::Instant)
}

pub async fn shipyard(ctx: &Context, waypoint: &WaypointSymbol) -> Result<HandlerOutcome, HandlerError> {
    match ctx.game.get_shipyard(waypoint).await {
        Ok(shipyard) => {
            println!("{OK_PREFIX}shipyard at {waypoint}, {} ships for sale", shipyard.ships.len());
            for ship in &shipyard.ships {
                println!("  {} purchase_price={}", ship.ship_type, ship.purchase_price);
            }
        }
        Err(err) => println!("{FAIL_PREFIX}failed to fetch shipyard at {waypoint}: {err}"),
    }
    Ok(HandlerOutcome::Instant)
}

pub async fn surveys(ctx: &Context) -> Result<HandlerOutcome, HandlerError> {
    let total: usize = ctx.state.surveys.iter().map(|e| e.value().len()).sum();
    println!("{INFO_PREFIX}{total} surveys cached");
    for entry in ctx.state.surveys.iter() {
        for keyed in entry.value() {
            println!(
                "  {} at {} expires {}",
                keyed.survey.signature, keyed.survey.symbol, keyed.survey.expiration
            );
        }
    }
    Ok(HandlerOutcome::Instant)
}
