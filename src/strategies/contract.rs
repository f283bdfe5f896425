use crate::context::Context;
use crate::event_queue::EventType;
use crate::models::{is_reserved_item, Event, EventPayload, WaypointSymbol};
use log::*;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// One resource this contract still owes, and where it has to land.
#[derive(Debug, Clone)]
struct RequiredResource {
    deliver_to: WaypointSymbol,
    units_remaining: i64,
}

/// Mirrors the source's `ContractDelivery` dataclass: a delivery in flight,
/// carried from the extract that produced it through to the navigate that
/// starts the return trip.
#[derive(Debug, Clone)]
struct ContractDelivery {
    waypoint: WaypointSymbol,
    symbol: String,
    units: i64,
    fulfill: bool,
}

#[derive(Default)]
struct ContractState {
    required_resources: HashMap<String, RequiredResource>,
    assigned_surveyor: Option<String>,
    survey_signature: Option<String>,
    pending_navigates: HashSet<u64>,
    pending_extracts: HashSet<u64>,
    pending_delivery_navigates: HashMap<u64, ContractDelivery>,
    contract_complete: bool,
}

/// Mining-for-delivery strategy, one instance per active contract. Ships
/// are routed to a single asteroid field; the assigned surveyor (if any)
/// keeps a survey alive, and extracted cargo that meets the contract's
/// resource list is ferried back for delivery. Grounded on
/// `strategies/base_contract.py`'s `BaseContractStrategy`.
pub struct ContractStrategy {
    ctx: Context,
    contract_id: String,
    asteroid_waypoint: WaypointSymbol,
    state: Mutex<ContractState>,
}

/// Delivery requires 80% of free cargo space to be filled with one resource
/// before a trip is worth making — keeps ships from shuttling half-empty.
const DELIVERY_FILL_FRACTION: f64 = 0.8;

fn cooldown_slack() -> chrono::Duration {
    chrono::Duration::seconds(5)
}

fn arrival_slack() -> chrono::Duration {
    chrono::Duration::seconds(10)
}

impl ContractStrategy {
    pub fn new(ctx: Context, contract_id: String, asteroid_waypoint: WaypointSymbol) -> Arc<Self> {
        let required_resources = ctx
            .state
            .get_contract(&contract_id)
            .map(|contract| {
                contract
                    .terms
                    .deliver
                    .iter()
                    .filter(|d| !d.is_fulfilled())
                    .map(|d| {
                        (
                            d.trade_symbol.clone(),
                            RequiredResource {
                                deliver_to: d.destination_symbol.clone(),
                                units_remaining: d.units_remaining(),
                            },
                        )
                    })
                    .collect()
            })
            .unwrap_or_else(|| {
                warn!("starting contract strategy for unknown contract {contract_id}");
                HashMap::new()
            });

        let strategy = Arc::new(ContractStrategy {
            ctx: ctx.clone(),
            contract_id,
            asteroid_waypoint,
            state: Mutex::new(ContractState {
                required_resources,
                ..Default::default()
            }),
        });

        let s = strategy.clone();
        ctx.queue
            .subscribe(EventType::Ship, "survey", Box::new(move |event| s.on_survey(event)));
        let s = strategy.clone();
        ctx.queue
            .subscribe(EventType::Ship, "extract", Box::new(move |event| s.on_extract(event)));
        let s = strategy.clone();
        ctx.queue
            .subscribe(EventType::Ship, "navigate", Box::new(move |event| s.on_navigate(event)));

        strategy
    }

    /// Restart-safety: if not at the asteroid, go there; if it's the
    /// surveyor with no live survey, orbit+survey; otherwise settle in and
    /// extract. Used both on first assignment and (conceptually) on any
    /// later re-assignment of the same ship.
    pub fn assign_ship(&self, ship_symbol: String) {
        let Some(ship) = self.ctx.state.get_ship(&ship_symbol) else {
            warn!("assign_ship: no such ship {ship_symbol}");
            return;
        };

        if ship.nav.waypoint_symbol != self.asteroid_waypoint {
            let id = self.ctx.queue.put(EventPayload::ShipNavigate {
                ship: ship_symbol.clone(),
                waypoint: self.asteroid_waypoint.clone(),
            });
            self.state.lock().unwrap().pending_navigates.insert(id);
            return;
        }

        let is_surveyor_without_survey = {
            let state = self.state.lock().unwrap();
            state.assigned_surveyor.as_deref() == Some(ship_symbol.as_str()) && state.survey_signature.is_none()
        };
        if is_surveyor_without_survey {
            self.ctx.queue.put(EventPayload::ShipOrbit { ship: ship_symbol.clone() });
            self.ctx.queue.put(EventPayload::ShipSurvey { ship: ship_symbol.clone() });
            return;
        }

        if ship.nav.status == crate::models::ShipNavStatus::InOrbit {
            self.ctx.queue.put(EventPayload::ShipDock { ship: ship_symbol.clone() });
        }
        if ship.fuel.current < ship.fuel.capacity {
            self.ctx.queue.put(EventPayload::ShipRefuel { ship: ship_symbol.clone() });
        }
        let survey_signature = self.state.lock().unwrap().survey_signature.clone();
        let id = self.ctx.queue.put(EventPayload::ShipExtract {
            ship: ship_symbol,
            survey_signature,
        });
        self.state.lock().unwrap().pending_extracts.insert(id);
    }

    pub fn assign_surveyor(&self, ship_symbol: String) {
        self.state.lock().unwrap().assigned_surveyor = Some(ship_symbol);
    }

    /// Validated against the live surveys at this contract's asteroid.
    pub fn assign_survey(&self, signature: String) {
        let live = self
            .ctx
            .state
            .live_surveys(&self.asteroid_waypoint, self.ctx.clock.now());
        if live.iter().any(|s| s.survey.signature == signature) {
            self.state.lock().unwrap().survey_signature = Some(signature);
        } else {
            warn!("assign_survey: {signature} is not a live survey at {}", self.asteroid_waypoint);
        }
    }

    fn on_survey(&self, event: &Event) {
        let EventPayload::ShipSurvey { ship } = &event.payload else { return };
        let is_surveyor = self.state.lock().unwrap().assigned_surveyor.as_deref() == Some(ship.as_str());
        if !is_surveyor {
            return;
        }
        let Some(ship_state) = self.ctx.state.get_ship(ship) else { return };
        let Some(expiration) = ship_state.cooldown.expiration else { return };

        let live = self
            .ctx
            .state
            .live_surveys(&self.asteroid_waypoint, self.ctx.clock.now());
        let required: HashSet<String> = self.state.lock().unwrap().required_resources.keys().cloned().collect();
        let found = live
            .iter()
            .find(|s| s.survey.deposits.iter().any(|d| required.contains(&d.symbol)));

        match found {
            Some(survey) => {
                self.state.lock().unwrap().survey_signature = Some(survey.survey.signature.clone());
                let when = expiration + cooldown_slack();
                let survey_signature = self.state.lock().unwrap().survey_signature.clone();
                let events = self.ctx.queue.new_events_from(vec![
                    EventPayload::ShipDock { ship: ship.clone() },
                    EventPayload::ShipExtract {
                        ship: ship.clone(),
                        survey_signature,
                    },
                ]);
                let extract_id = events[1].id;
                self.ctx.queue.schedule(when, events);
                self.state.lock().unwrap().pending_extracts.insert(extract_id);
            }
            None => {
                let event = self.ctx.queue.new_event(EventPayload::ShipSurvey { ship: ship.clone() });
                self.ctx.queue.schedule(expiration, vec![event]);
            }
        }
    }

    fn on_extract(&self, event: &Event) {
        let already_pending = {
            let mut state = self.state.lock().unwrap();
            state.pending_extracts.remove(&event.id)
        };
        if !already_pending {
            return;
        }
        let EventPayload::ShipExtract { ship, .. } = &event.payload else { return };
        let Some(ship_state) = self.ctx.state.get_ship(ship) else { return };
        let Some(expiration) = ship_state.cooldown.expiration else { return };

        let required_delivery_cargo = {
            let free = ship_state.cargo.capacity - ship_state.reserved_units();
            (free as f64 * DELIVERY_FILL_FRACTION).floor() as i64
        };

        let required_symbols: HashSet<String> = self.state.lock().unwrap().required_resources.keys().cloned().collect();
        let mut contract_items: HashMap<String, i64> = HashMap::new();
        for item in &ship_state.cargo.inventory {
            if is_reserved_item(&item.symbol) {
                continue;
            }
            if required_symbols.contains(&item.symbol) {
                contract_items.insert(item.symbol.clone(), item.units);
            } else {
                self.ctx.queue.put(EventPayload::ShipSellCargoItem {
                    ship: ship.clone(),
                    resource: item.symbol.clone(),
                    units: item.units,
                });
            }
        }

        let mut symbols: Vec<String> = {
            let state = self.state.lock().unwrap();
            state.required_resources.keys().cloned().collect()
        };
        symbols.sort();
        let mut picked: Option<(String, RequiredResource, i64)> = None;
        for symbol in symbols {
            let Some(&held) = contract_items.get(&symbol) else { continue };
            if held < required_delivery_cargo {
                continue;
            }
            let rr = {
                let state = self.state.lock().unwrap();
                state.required_resources.get(&symbol).cloned()
            };
            let Some(rr) = rr else { continue };
            let units = held.min(rr.units_remaining);
            picked = Some((symbol, rr, units));
            break;
        }

        let when = expiration + cooldown_slack();

        match picked {
            Some((symbol, rr, units)) => {
                let mut fulfill = false;
                {
                    let mut state = self.state.lock().unwrap();
                    if let Some(entry) = state.required_resources.get_mut(&symbol) {
                        entry.units_remaining -= units;
                        if entry.units_remaining <= 0 {
                            state.required_resources.remove(&symbol);
                        }
                    }
                    if state.required_resources.is_empty() {
                        state.contract_complete = true;
                        fulfill = true;
                    }
                }
                let delivery = ContractDelivery {
                    waypoint: rr.deliver_to,
                    symbol,
                    units,
                    fulfill,
                };
                let events = self.ctx.queue.new_events_from(vec![
                    EventPayload::ShipOrbit { ship: ship.clone() },
                    EventPayload::ShipNavigate {
                        ship: ship.clone(),
                        waypoint: delivery.waypoint.clone(),
                    },
                ]);
                let nav_id = events[1].id;
                self.ctx.queue.schedule(when, events);
                self.state.lock().unwrap().pending_delivery_navigates.insert(nav_id, delivery);
            }
            None => {
                let mut state = self.state.lock().unwrap();
                if state.contract_complete {
                    let event = self.ctx.queue.new_event(EventPayload::ShipExtract {
                        ship: ship.clone(),
                        survey_signature: None,
                    });
                    let id = event.id;
                    drop(state);
                    self.ctx.queue.schedule(when, vec![event]);
                    self.state.lock().unwrap().pending_extracts.insert(id);
                    return;
                }
                if let Some(sig) = state.survey_signature.clone() {
                    let live = self.ctx.state.live_surveys(&self.asteroid_waypoint, self.ctx.clock.now());
                    if !live.iter().any(|s| s.survey.signature == sig) {
                        state.survey_signature = None;
                    }
                }
                if state.assigned_surveyor.as_deref() == Some(ship.as_str()) {
                    let event = self.ctx.queue.new_event(EventPayload::ShipSurvey { ship: ship.clone() });
                    drop(state);
                    self.ctx.queue.schedule(when, vec![event]);
                } else {
                    let survey_signature = state.survey_signature.clone();
                    let event = self.ctx.queue.new_event(EventPayload::ShipExtract {
                        ship: ship.clone(),
                        survey_signature,
                    });
                    let id = event.id;
                    drop(state);
                    self.ctx.queue.schedule(when, vec![event]);
                    self.state.lock().unwrap().pending_extracts.insert(id);
                }
            }
        }
    }

    fn on_navigate(&self, event: &Event) {
        let EventPayload::ShipNavigate { ship, .. } = &event.payload else { return };

        let delivery = self.state.lock().unwrap().pending_delivery_navigates.remove(&event.id);
        if let Some(delivery) = delivery {
            let Some(ship_state) = self.ctx.state.get_ship(ship) else { return };
            let arrival = ship_state.nav.route.arrival + arrival_slack();
            let mut payloads = vec![
                EventPayload::ShipDock { ship: ship.clone() },
                EventPayload::ShipRefuel { ship: ship.clone() },
                EventPayload::ContractDeliver {
                    contract_id: self.contract_id.clone(),
                    ship: ship.clone(),
                    resource: delivery.symbol.clone(),
                    units: delivery.units,
                },
            ];
            if delivery.fulfill {
                payloads.push(EventPayload::ContractFulfill {
                    contract_id: self.contract_id.clone(),
                });
            }
            payloads.push(EventPayload::ShipOrbit { ship: ship.clone() });
            payloads.push(EventPayload::ShipNavigate {
                ship: ship.clone(),
                waypoint: self.asteroid_waypoint.clone(),
            });
            let events = self.ctx.queue.new_events_from(payloads);
            let return_nav_id = events.last().unwrap().id;
            self.ctx.queue.schedule(arrival, events);
            self.state.lock().unwrap().pending_navigates.insert(return_nav_id);
            return;
        }

        let was_pending = self.state.lock().unwrap().pending_navigates.remove(&event.id);
        if was_pending {
            let Some(ship_state) = self.ctx.state.get_ship(ship) else { return };
            let arrival = ship_state.nav.route.arrival + arrival_slack();
            let survey_signature = self.state.lock().unwrap().survey_signature.clone();
            let events = self.ctx.queue.new_events_from(vec![
                EventPayload::ShipDock { ship: ship.clone() },
                EventPayload::ShipRefuel { ship: ship.clone() },
                EventPayload::ShipExtract {
                    ship: ship.clone(),
                    survey_signature,
                },
            ]);
            let extract_id = events[2].id;
            self.ctx.queue.schedule(arrival, events);
            self.state.lock().unwrap().pending_extracts.insert(extract_id);
        }
    }
}
