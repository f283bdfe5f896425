use crate::context::Context;
use crate::handlers::HandlerRegistry;
use crate::models::{EventPayload, ShipFlightMode, SystemSymbol, WaypointSymbol};
use log::*;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

/// Parses one REPL line of the form `<event_type> <event_name> <args…>`
/// into an [`EventPayload`]. Unknown combinations or malformed args are
/// reported as a single `String` so the caller can log and skip the line
/// rather than aborting the whole session.
fn parse_line(line: &str) -> Result<EventPayload, String> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let (event_type, rest) = words.split_first().ok_or("empty line")?;
    let (event_name, args) = rest.split_first().ok_or("missing event name")?;
    let args = *args;

    let arg = |i: usize| -> Result<String, String> {
        args.get(i).map(|s| s.to_string()).ok_or_else(|| format!("missing argument {i}"))
    };
    let opt_arg = |i: usize| -> Option<String> { args.get(i).map(|s| s.to_string()) };
    let units = |i: usize| -> Result<i64, String> {
        arg(i)?.parse::<i64>().map_err(|e| format!("bad units: {e}"))
    };
    let waypoint = |i: usize| -> Result<WaypointSymbol, String> { WaypointSymbol::new(&arg(i)?) };
    let system = |i: usize| -> Result<SystemSymbol, String> { Ok(SystemSymbol(arg(i)?)) };
    let flight_mode = |i: usize| -> Result<ShipFlightMode, String> {
        match arg(i)?.to_uppercase().as_str() {
            "CRUISE" => Ok(ShipFlightMode::Cruise),
            "BURN" => Ok(ShipFlightMode::Burn),
            "DRIFT" => Ok(ShipFlightMode::Drift),
            "STEALTH" => Ok(ShipFlightMode::Stealth),
            other => Err(format!("unknown flight mode {other}")),
        }
    };

    match (*event_type, *event_name) {
        ("ship" | "ships", "dock") => Ok(EventPayload::ShipDock { ship: arg(0)? }),
        ("ship" | "ships", "orbit") => Ok(EventPayload::ShipOrbit { ship: arg(0)? }),
        ("ship" | "ships", "navigate") => {
            Ok(EventPayload::ShipNavigate { ship: arg(0)?, waypoint: waypoint(1)? })
        }
        ("ship" | "ships", "refuel") => Ok(EventPayload::ShipRefuel { ship: arg(0)? }),
        ("ship" | "ships", "extract") => Ok(EventPayload::ShipExtract {
            ship: arg(0)?,
            survey_signature: opt_arg(1),
        }),
        ("ship" | "ships", "survey") => Ok(EventPayload::ShipSurvey { ship: arg(0)? }),
        ("ship" | "ships", "sell_cargo_item") => Ok(EventPayload::ShipSellCargoItem {
            ship: arg(0)?,
            resource: arg(1)?,
            units: units(2)?,
        }),
        ("ship" | "ships", "buy_cargo_item") => Ok(EventPayload::ShipBuyCargoItem {
            ship: arg(0)?,
            resource: arg(1)?,
            units: units(2)?,
        }),
        ("ship" | "ships", "jettison_cargo_item") => Ok(EventPayload::ShipJettisonCargoItem {
            ship: arg(0)?,
            resource: arg(1)?,
            units: units(2)?,
        }),
        ("ship" | "ships", "purchase") => {
            Ok(EventPayload::ShipPurchase { waypoint: waypoint(0)?, ship_type: arg(1)? })
        }
        ("ship" | "ships", "jump") => Ok(EventPayload::ShipJump { ship: arg(0)?, system: system(1)? }),
        ("ship" | "ships", "flight_mode") => {
            Ok(EventPayload::ShipFlightMode { ship: arg(0)?, mode: flight_mode(1)? })
        }
        ("ship" | "ships", "chart") => Ok(EventPayload::ShipChart { ship: arg(0)? }),
        ("ship" | "ships", "scan_waypoints") => Ok(EventPayload::ShipScanWaypoints { ship: arg(0)? }),
        ("ship" | "ships", "fetch_all") => Ok(EventPayload::ShipFetchAll),

        ("agent", "fetch") => Ok(EventPayload::AgentFetch),
        ("agent", "register") => Ok(EventPayload::AgentRegister {
            symbol: arg(0)?,
            faction: arg(1)?,
            email: opt_arg(2),
        }),

        ("contract" | "contracts", "fetch_all") => Ok(EventPayload::ContractFetchAll),
        ("contract" | "contracts", "accept") => Ok(EventPayload::ContractAccept { contract_id: arg(0)? }),
        ("contract" | "contracts", "deliver") => Ok(EventPayload::ContractDeliver {
            contract_id: arg(0)?,
            ship: arg(1)?,
            resource: arg(2)?,
            units: units(3)?,
        }),
        ("contract" | "contracts", "fulfill") => Ok(EventPayload::ContractFulfill { contract_id: arg(0)? }),
        ("contract" | "contracts", "strategy") => Ok(EventPayload::ContractStrategy {
            contract_id: arg(0)?,
            asteroid_waypoint: waypoint(1)?,
        }),
        ("contract" | "contracts", "assign_strategy_ship") => {
            Ok(EventPayload::ContractAssignStrategyShip { contract_id: arg(0)?, ship: arg(1)? })
        }
        ("contract" | "contracts", "assign_strategy_surveyor") => {
            Ok(EventPayload::ContractAssignStrategySurveyor { contract_id: arg(0)?, ship: arg(1)? })
        }
        ("contract" | "contracts", "assign_strategy_survey") => {
            Ok(EventPayload::ContractAssignStrategySurvey { contract_id: arg(0)?, signature: arg(1)? })
        }

        ("system", "system") => Ok(EventPayload::SystemSystem { system: system(0)? }),
        ("system", "jump_gate") => Ok(EventPayload::SystemJumpGate { system: system(0)? }),
        ("system", "waypoint") => Ok(EventPayload::SystemWaypoint { waypoint: waypoint(0)? }),
        ("system", "system_waypoints") => {
            Ok(EventPayload::SystemSystemWaypoints { system: system(0)? })
        }
        ("system", "fetch_market") => Ok(EventPayload::SystemFetchMarket { waypoint: waypoint(0)? }),
        ("system", "shipyard") => Ok(EventPayload::SystemShipyard { waypoint: waypoint(0)? }),

        ("view", "ship") => Ok(EventPayload::ViewShip { ship: arg(0)? }),
        ("view", "ships") => Ok(EventPayload::ViewShips),
        ("view", "agent") => Ok(EventPayload::ViewAgent),
        ("view", "contracts") => Ok(EventPayload::ViewContracts),
        ("view", "market") => Ok(EventPayload::ViewMarket { waypoint: waypoint(0)? }),
        ("view", "shipyard") => Ok(EventPayload::ViewShipyard { waypoint: waypoint(0)? }),
        ("view", "surveys") => Ok(EventPayload::ViewSurveys),

        ("strategy", "trade") => Ok(EventPayload::StrategyTrade { ship: arg(0)? }),
        ("strategy", "market_update") => {
            Ok(EventPayload::StrategyMarketUpdate { ship: arg(0)?, system: system(1)? })
        }
        ("strategy", "trade_routes") => Ok(EventPayload::StrategyTradeRoutes),

        ("default", "exit") => Ok(EventPayload::DefaultExit),

        (t, n) => Err(format!("no such event {t}.{n}")),
    }
}

/// `true` for the event types the spec says run synchronously on the
/// reader's own task instead of going through the worker's queue.
fn runs_inline(payload: &EventPayload) -> bool {
    matches!(payload.event_type(), crate::models::EventType::View | crate::models::EventType::Strategy)
}

async fn handle_line(ctx: &Context, handlers: &HandlerRegistry, line: &str) -> bool {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return true;
    }
    let payload = match parse_line(line) {
        Ok(payload) => payload,
        Err(err) => {
            warn!("repl: {err} (line: {line:?})");
            return true;
        }
    };

    if matches!(payload, EventPayload::DefaultExit) {
        ctx.queue.put(EventPayload::DefaultExit);
        return false;
    }

    if runs_inline(&payload) {
        let event = ctx.queue.new_event(payload);
        if let Err(err) = handlers.dispatch(ctx, &event).await {
            error!("{}.{} #{} failed: {err}", event.event_type(), event.event_name(), event.id);
        }
    } else {
        ctx.queue.put(payload);
    }
    true
}

/// Reads lines from stdin on its own task and forwards them over `tx`,
/// so the main REPL loop in [`run`] is free to also race a Ctrl-C signal.
async fn read_stdin_lines(tx: mpsc::Sender<String>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if tx.send(line).await.is_err() {
                    return;
                }
            }
            Ok(None) => return,
            Err(err) => {
                error!("repl: failed to read stdin: {err}");
                return;
            }
        }
    }
}

/// Loads `autorun_path` at startup (if present) and pushes each non-blank,
/// non-comment line onto the queue the same way a typed command would be,
/// then reads further commands from stdin until `default exit` or an
/// external interrupt, either of which enqueues `DEFAULT.exit` for the
/// worker before this task returns.
pub async fn run(ctx: Context, handlers: HandlerRegistry) {
    let autorun_path = &crate::config::CONFIG.autorun_path;
    if let Ok(contents) = std::fs::read_to_string(autorun_path) {
        for line in contents.lines() {
            if !handle_line(&ctx, &handlers, line).await {
                return;
            }
        }
    }

    let (tx, mut rx) = mpsc::channel(16);
    tokio::spawn(read_stdin_lines(tx));

    loop {
        tokio::select! {
            line = rx.recv() => {
                let Some(line) = line else { break };
                if !handle_line(&ctx, &handlers, &line).await {
                    break;
                }
            }
            result = tokio::signal::ctrl_c() => {
                if let Err(err) = result {
                    error!("repl: failed to listen for ctrl-c: {err}");
                } else {
                    info!("repl: interrupt received, shutting down");
                }
                ctx.queue.put(EventPayload::DefaultExit);
                break;
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_ship_navigate() {
        let payload = parse_line("ship navigate HERMES-1 X1-TZ26-A1").unwrap();
        match payload {
            EventPayload::ShipNavigate { ship, waypoint } => {
                assert_eq!(ship, "HERMES-1");
                assert_eq!(waypoint, WaypointSymbol::new("X1-TZ26-A1").unwrap());
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[test]
    fn test_parse_default_exit() {
        assert!(matches!(parse_line("default exit").unwrap(), EventPayload::DefaultExit));
    }

    #[test]
    fn test_parse_unknown_combination_errs() {
        assert!(parse_line("ship teleport X").is_err());
    }

    #[test]
    fn test_parse_missing_args_errs() {
        assert!(parse_line("ship dock").is_err());
    }

    #[test]
    fn test_parse_sell_cargo_item_units() {
        let payload = parse_line("ship sell_cargo_item HERMES-1 IRON_ORE -1").unwrap();
        match payload {
            EventPayload::ShipSellCargoItem { resource, units, .. } => {
                assert_eq!(resource, "IRON_ORE");
                assert_eq!(units, -1);
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[test]
    fn test_parse_malformed_waypoint_errs() {
        assert!(parse_line("system waypoint BADINPUT").is_err());
        assert!(parse_line("ship navigate HERMES-1 BADINPUT").is_err());
    }
}
