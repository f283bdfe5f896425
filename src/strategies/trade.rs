use crate::context::Context;
use crate::event_queue::EventType;
use crate::models::{is_reserved_item, Event, EventPayload, SystemSymbol, Waypoint, WaypointSymbol};
use log::*;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// Cargo units a trader is assumed to carry per trip when the planner
/// estimates margins — the real ship's capacity may differ, this is just
/// the planning heuristic.
const ASSUMED_CARGO: f64 = 60.0;
const AVG_FUEL_PRICE: f64 = 240.0;
const PRICE_THRESHOLD: f64 = 20.0 * ASSUMED_CARGO;

#[derive(Debug, Clone, PartialEq)]
struct TradeRoute {
    resource_symbol: String,
    source_waypoint: WaypointSymbol,
    target_waypoint: WaypointSymbol,
}

#[derive(Default)]
struct TradeState {
    target_system: Option<SystemSymbol>,
    target_waypoints: HashMap<WaypointSymbol, Waypoint>,
    waypoints_with_marketplace: Vec<WaypointSymbol>,
    visited_marketplaces: HashMap<WaypointSymbol, bool>,
    trade_routes: HashMap<String, TradeRoute>,
    pending_route_change: HashMap<String, TradeRoute>,
    pending_navigate_market: HashSet<u64>,
    pending_navigate_source: HashSet<u64>,
    pending_navigate_target: HashSet<u64>,
    pending_fetch_market: HashSet<u64>,
    halt_trade: bool,
    assigned_ships: HashSet<String>,
    scout_ship: Option<String>,
    best_route: Option<TradeRoute>,
}

/// In-system arbitrage: a scout ship tours every marketplace to keep price
/// data fresh, and a pool of trader ships loop buy-at-source/sell-at-target
/// on whatever route the planner currently favors. Grounded on
/// `strategies/in_system_trade.py`'s `SystemTradeStrategy`, extended with
/// the scout/planner machinery the source didn't show directly.
pub struct TradeStrategy {
    ctx: Context,
    state: Mutex<TradeState>,
}

fn euclidean(a: (i64, i64), b: (i64, i64)) -> f64 {
    (((a.0 - b.0).pow(2) + (a.1 - b.1).pow(2)) as f64).sqrt()
}

fn nearest_unvisited(
    from: (i64, i64),
    waypoints: &[WaypointSymbol],
    targets: &HashMap<WaypointSymbol, Waypoint>,
    visited: &HashMap<WaypointSymbol, bool>,
) -> Option<WaypointSymbol> {
    waypoints
        .iter()
        .filter(|w| !*visited.get(*w).unwrap_or(&false))
        .filter_map(|w| targets.get(w).map(|wp| (w.clone(), euclidean(from, (wp.x, wp.y)))))
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap())
        .map(|(w, _)| w)
}

impl TradeStrategy {
    pub fn new(ctx: Context) -> Arc<Self> {
        let strategy = Arc::new(TradeStrategy {
            ctx: ctx.clone(),
            state: Mutex::new(TradeState::default()),
        });

        let s = strategy.clone();
        ctx.queue
            .subscribe(EventType::Ship, "navigate", Box::new(move |event| s.on_navigate(event)));
        let s = strategy.clone();
        ctx.queue.subscribe(
            EventType::System,
            "fetch_market",
            Box::new(move |event| s.on_fetch_market(event)),
        );

        strategy
    }

    /// Adds `ship` to the trader pool. If a best route is already known it
    /// is applied immediately (restoration-on-assign, same idea as the
    /// contract strategy); otherwise the ship waits on standby for the next
    /// planner run.
    pub async fn assign_ship(&self, ship_symbol: String) {
        let route = {
            let mut state = self.state.lock().unwrap();
            state.assigned_ships.insert(ship_symbol.clone());
            state.best_route.clone()
        };
        if let Some(route) = route {
            self.apply_route(&ship_symbol, route);
        }
    }

    fn apply_route(&self, ship_symbol: &str, route: TradeRoute) {
        self.state.lock().unwrap().trade_routes.insert(ship_symbol.to_string(), route.clone());
        let Some(ship) = self.ctx.state.get_ship(ship_symbol) else {
            warn!("apply_route: no such ship {ship_symbol}");
            return;
        };
        if ship.nav.waypoint_symbol == route.source_waypoint {
            self.handle_source_arrival(ship_symbol, &route);
        } else {
            let id = self.ctx.queue.put(EventPayload::ShipNavigate {
                ship: ship_symbol.to_string(),
                waypoint: route.source_waypoint.clone(),
            });
            self.state.lock().unwrap().pending_navigate_source.insert(id);
        }
    }

    /// Sets up the scout: loads the system's waypoints from the durable
    /// store, resets visited state, and sends the ship off on BURN toward
    /// the nearest marketplace.
    pub async fn assign_market_updater(&self, ship_symbol: String, system: SystemSymbol) {
        let waypoints = match self.ctx.store.load_waypoints(&system).await {
            Ok(w) => w,
            Err(e) => {
                warn!("assign_market_updater: failed to load waypoints for {system}: {e}");
                Vec::new()
            }
        };
        let marketplaces: Vec<WaypointSymbol> = waypoints
            .iter()
            .filter(|w| w.is_marketplace())
            .map(|w| w.symbol.clone())
            .collect();
        let target_waypoints: HashMap<WaypointSymbol, Waypoint> =
            waypoints.into_iter().map(|w| (w.symbol.clone(), w)).collect();

        {
            let mut state = self.state.lock().unwrap();
            state.target_system = Some(system);
            state.target_waypoints = target_waypoints;
            state.waypoints_with_marketplace = marketplaces;
            state.visited_marketplaces.clear();
            state.scout_ship = Some(ship_symbol.clone());
        }

        let Some(ship) = self.ctx.state.get_ship(&ship_symbol) else {
            warn!("assign_market_updater: no such ship {ship_symbol}");
            return;
        };
        self.ctx.queue.put(EventPayload::ShipFlightMode {
            ship: ship_symbol.clone(),
            mode: crate::models::ShipFlightMode::Burn,
        });
        self.ctx.queue.put(EventPayload::ShipOrbit { ship: ship_symbol.clone() });

        let from = (ship.nav.route.destination.x, ship.nav.route.destination.y);
        let next = {
            let state = self.state.lock().unwrap();
            nearest_unvisited(from, &state.waypoints_with_marketplace, &state.target_waypoints, &state.visited_marketplaces)
        };
        if let Some(next) = next {
            let id = self.ctx.queue.put(EventPayload::ShipNavigate {
                ship: ship_symbol,
                waypoint: next,
            });
            self.state.lock().unwrap().pending_navigate_market.insert(id);
        }
    }

    /// Planner: for every resource traded by two or more known markets in
    /// the target system, pair the cheapest buy-side waypoints against the
    /// priciest sell-side waypoints positionally and keep the pairs that
    /// clear `trip_margin >= PRICE_THRESHOLD`. The best-margin route among
    /// survivors becomes `best_route`.
    pub fn build_trade_routes(&self) {
        let (target_waypoints, marketplaces): (HashMap<WaypointSymbol, Waypoint>, Vec<WaypointSymbol>) = {
            let state = self.state.lock().unwrap();
            (state.target_waypoints.clone(), state.waypoints_with_marketplace.clone())
        };

        // resource symbol -> (waypoint, purchase_price, sell_price)
        let mut by_resource: HashMap<String, Vec<(WaypointSymbol, i64, i64)>> = HashMap::new();
        for waypoint in &marketplaces {
            let Some(market) = self.ctx.state.get_market(waypoint) else { continue };
            for good in &market.trade_goods {
                by_resource
                    .entry(good.symbol.clone())
                    .or_default()
                    .push((waypoint.clone(), good.purchase_price, good.sell_price));
            }
        }

        let mut candidates: Vec<(f64, TradeRoute)> = Vec::new();
        for (resource, mut entries) in by_resource {
            let mut by_purchase = entries.clone();
            by_purchase.sort_by_key(|(_, purchase, _)| *purchase);
            entries.sort_by_key(|(_, _, sell)| std::cmp::Reverse(*sell));
            let by_sell = entries;

            for (buy, sell) in by_purchase.iter().zip(by_sell.iter()) {
                let (source, purchase_price, _) = buy;
                let (target, _, sell_price) = sell;
                if source == target {
                    continue;
                }
                let Some(source_wp) = target_waypoints.get(source) else { continue };
                let Some(target_wp) = target_waypoints.get(target) else { continue };
                let dist = euclidean((source_wp.x, source_wp.y), (target_wp.x, target_wp.y));
                let raw_margin = ASSUMED_CARGO * (*sell_price - *purchase_price) as f64;
                let fuel_cost = dist / 50.0 * AVG_FUEL_PRICE;
                let trip_margin = raw_margin - fuel_cost;
                if trip_margin >= PRICE_THRESHOLD {
                    candidates.push((
                        trip_margin,
                        TradeRoute {
                            resource_symbol: resource.clone(),
                            source_waypoint: source.clone(),
                            target_waypoint: target.clone(),
                        },
                    ));
                }
            }
        }

        candidates.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap());
        let new_best = candidates.into_iter().next().map(|(_, route)| route);

        let assigned: Vec<String> = {
            let mut state = self.state.lock().unwrap();
            if new_best.is_none() {
                state.halt_trade = true;
                return;
            }
            state.halt_trade = false;
            state.best_route = new_best.clone();
            state.assigned_ships.iter().cloned().collect()
        };

        let new_best = new_best.unwrap();
        for ship_symbol in assigned {
            let current = self.state.lock().unwrap().trade_routes.get(&ship_symbol).cloned();
            match current {
                None => self.apply_route(&ship_symbol, new_best.clone()),
                Some(route) if route != new_best => {
                    self.state.lock().unwrap().pending_route_change.insert(ship_symbol, new_best.clone());
                }
                Some(_) => {}
            }
        }
    }

    fn handle_target_arrival(&self, ship_symbol: &str, route: &TradeRoute) {
        let Some(ship) = self.ctx.state.get_ship(ship_symbol) else { return };
        let arrival = ship.nav.route.arrival + chrono::Duration::seconds(10);

        let mut payloads = vec![
            EventPayload::ShipDock { ship: ship_symbol.to_string() },
            EventPayload::ShipSellCargoItem {
                ship: ship_symbol.to_string(),
                resource: route.resource_symbol.clone(),
                units: -1,
            },
            EventPayload::ShipOrbit { ship: ship_symbol.to_string() },
        ];

        let pending_change = self.state.lock().unwrap().pending_route_change.remove(ship_symbol);
        let halt = self.state.lock().unwrap().halt_trade;

        match pending_change {
            Some(new_route) => {
                payloads.push(EventPayload::ShipRefuel { ship: ship_symbol.to_string() });
                self.state.lock().unwrap().trade_routes.insert(ship_symbol.to_string(), new_route.clone());
                if new_route.source_waypoint != route.target_waypoint {
                    payloads.push(EventPayload::ShipNavigate {
                        ship: ship_symbol.to_string(),
                        waypoint: new_route.source_waypoint.clone(),
                    });
                    let events = self.ctx.queue.new_events_from(payloads);
                    let nav_id = events.last().unwrap().id;
                    self.ctx.queue.schedule(arrival, events);
                    self.state.lock().unwrap().pending_navigate_source.insert(nav_id);
                } else {
                    let events = self.ctx.queue.new_events_from(payloads);
                    self.ctx.queue.schedule(arrival, events);
                    self.handle_source_arrival(ship_symbol, &new_route);
                }
            }
            None if halt => {
                let events = self.ctx.queue.new_events_from(payloads);
                self.ctx.queue.schedule(arrival, events);
            }
            None => {
                payloads.push(EventPayload::ShipNavigate {
                    ship: ship_symbol.to_string(),
                    waypoint: route.source_waypoint.clone(),
                });
                let events = self.ctx.queue.new_events_from(payloads);
                let nav_id = events.last().unwrap().id;
                self.ctx.queue.schedule(arrival, events);
                self.state.lock().unwrap().pending_navigate_source.insert(nav_id);
            }
        }
    }

    fn handle_source_arrival(&self, ship_symbol: &str, route: &TradeRoute) {
        let Some(ship) = self.ctx.state.get_ship(ship_symbol) else { return };
        let arrival = ship.nav.route.arrival + chrono::Duration::seconds(10);
        let Some(source_wp) = self.ctx.state.get_waypoint(&route.source_waypoint) else { return };
        let Some(target_wp) = self.ctx.state.get_waypoint(&route.target_waypoint) else { return };
        let dist = euclidean((source_wp.x, source_wp.y), (target_wp.x, target_wp.y));

        let mut payloads = vec![EventPayload::ShipDock { ship: ship_symbol.to_string() }];
        if 2.5 * dist >= ship.fuel.current as f64 {
            payloads.push(EventPayload::ShipRefuel { ship: ship_symbol.to_string() });
        }
        for item in &ship.cargo.inventory {
            if is_reserved_item(&item.symbol) || item.symbol == route.resource_symbol {
                continue;
            }
            payloads.push(EventPayload::ShipJettisonCargoItem {
                ship: ship_symbol.to_string(),
                resource: item.symbol.clone(),
                units: -1,
            });
        }
        payloads.push(EventPayload::ShipBuyCargoItem {
            ship: ship_symbol.to_string(),
            resource: route.resource_symbol.clone(),
            units: -1,
        });
        payloads.push(EventPayload::ShipOrbit { ship: ship_symbol.to_string() });
        payloads.push(EventPayload::ShipNavigate {
            ship: ship_symbol.to_string(),
            waypoint: route.target_waypoint.clone(),
        });

        let events = self.ctx.queue.new_events_from(payloads);
        let nav_id = events.last().unwrap().id;
        self.ctx.queue.schedule(arrival, events);
        self.state.lock().unwrap().pending_navigate_target.insert(nav_id);
    }

    fn on_navigate(&self, event: &Event) {
        let EventPayload::ShipNavigate { ship, .. } = &event.payload else { return };

        let is_market = self.state.lock().unwrap().pending_navigate_market.remove(&event.id);
        if is_market {
            let Some(ship_state) = self.ctx.state.get_ship(ship) else { return };
            let waypoint = ship_state.nav.waypoint_symbol.clone();
            let id = self.ctx.queue.put(EventPayload::SystemFetchMarket { waypoint });
            self.state.lock().unwrap().pending_fetch_market.insert(id);
            return;
        }

        let is_target = self.state.lock().unwrap().pending_navigate_target.remove(&event.id);
        if is_target {
            let route = self.state.lock().unwrap().trade_routes.get(ship).cloned();
            if let Some(route) = route {
                self.handle_target_arrival(ship, &route);
            }
            return;
        }

        let is_source = self.state.lock().unwrap().pending_navigate_source.remove(&event.id);
        if is_source {
            let route = self.state.lock().unwrap().trade_routes.get(ship).cloned();
            if let Some(route) = route {
                self.handle_source_arrival(ship, &route);
            }
        }
    }

    fn on_fetch_market(&self, event: &Event) {
        let EventPayload::SystemFetchMarket { waypoint } = &event.payload else { return };
        let was_pending = self.state.lock().unwrap().pending_fetch_market.remove(&event.id);
        if !was_pending {
            return;
        }

        self.state.lock().unwrap().visited_marketplaces.insert(waypoint.clone(), true);

        let Some(scout) = self.state.lock().unwrap().scout_ship.clone() else { return };
        let current = (
            self.state.lock().unwrap().target_waypoints.get(waypoint).map(|w| (w.x, w.y)),
        )
        .0;
        let Some(current) = current else { return };

        let next = {
            let state = self.state.lock().unwrap();
            nearest_unvisited(current, &state.waypoints_with_marketplace, &state.target_waypoints, &state.visited_marketplaces)
        };

        match next {
            Some(next) => {
                let id = self.ctx.queue.put(EventPayload::ShipNavigate {
                    ship: scout,
                    waypoint: next,
                });
                self.state.lock().unwrap().pending_navigate_market.insert(id);
            }
            None => {
                // every marketplace has been refreshed this lap; rebuild the
                // planner's picture, reset for the next lap, and slow the
                // scout down to a 30-minute refresh cadence.
                self.build_trade_routes();
                {
                    let mut state = self.state.lock().unwrap();
                    state.visited_marketplaces.clear();
                    state.visited_marketplaces.insert(waypoint.clone(), true);
                }
                let next_after_reset = {
                    let state = self.state.lock().unwrap();
                    nearest_unvisited(current, &state.waypoints_with_marketplace, &state.target_waypoints, &state.visited_marketplaces)
                };
                if let Some(next) = next_after_reset {
                    let when = self.ctx.clock.now() + chrono::Duration::minutes(30);
                    let nav_event = self.ctx.queue.new_event(EventPayload::ShipNavigate {
                        ship: scout,
                        waypoint: next,
                    });
                    let id = nav_event.id;
                    self.ctx.queue.schedule(when, vec![nav_event]);
                    self.state.lock().unwrap().pending_navigate_market.insert(id);
                }
            }
        }
    }
}
