use super::*;

#[test]
fn new_collector_without_planets_is_idle() {
    let content = test_content();
    let mut state = test_state(&content);
    let index = add_collector(&mut state, &content);
    assert_eq!(state.collectors[index].state, CollectorState::IdleNoPlanets);
    assert!(state.collectors[index].target_planet.is_none());
}

#[test]
fn new_collector_targets_first_available_planet() {
    let content = test_content();
    let mut state = test_state(&content);
    let empty = add_planet(&mut state, 0, Vec2::new(40.0, 20.0));
    let full = add_planet(&mut state, 500, Vec2::new(60.0, 20.0));
    let index = add_collector(&mut state, &content);

    let ship = &state.collectors[index];
    assert_eq!(ship.state, CollectorState::ReturningToSource);
    assert_eq!(ship.target_planet, Some(full));
    assert_ne!(ship.target_planet, Some(empty));
}

#[test]
fn idle_collector_picks_up_new_planet_next_frame() {
    let content = test_content();
    let mut state = test_state(&content);
    let mut rng = make_rng();
    let index = add_collector(&mut state, &content);

    advance(&mut state, &content, &mut rng, STEP_MS, &[]);
    assert_eq!(state.collectors[index].state, CollectorState::IdleNoPlanets);

    let planet = add_planet(&mut state, 100, NEAR_BASE);
    let events = advance(&mut state, &content, &mut rng, STEP_MS, &[]);
    assert_eq!(state.collectors[index].state, CollectorState::ReturningToSource);
    assert_eq!(state.collectors[index].target_planet, Some(planet));
    assert_eq!(
        count_events(&events, |e| matches!(
            e,
            Event::CollectorStateChanged {
                to: CollectorState::ReturningToSource,
                ..
            }
        )),
        1
    );
}

#[test]
fn collector_travels_then_mines() {
    let content = test_content();
    let mut state = test_state(&content);
    let mut rng = make_rng();
    add_planet(&mut state, 1_000, Vec2::new(50.0, 30.0));
    let index = add_collector(&mut state, &content);
    let start = state.collectors[index].position;

    advance(&mut state, &content, &mut rng, STEP_MS, &[]);
    advance(&mut state, &content, &mut rng, STEP_MS, &[]);
    let moved = state.collectors[index].position;
    assert_ne!(start, moved, "ship should be moving towards the planet");

    let mut reached = false;
    for _ in 0..500 {
        advance(&mut state, &content, &mut rng, STEP_MS, &[]);
        if state.collectors[index].state == CollectorState::Mining {
            reached = true;
            break;
        }
    }
    assert!(reached, "ship never reached the planet");
    assert_eq!(state.collectors[index].mining_started_ms, state.meta.now_ms);
}

#[test]
fn mining_progress_is_clamped_and_position_pinned() {
    let content = test_content();
    let mut state = test_state(&content);
    let mut rng = make_rng();
    let planet = add_planet(&mut state, 1_000, NEAR_BASE);
    let index = add_collector(&mut state, &content);
    {
        let ship = &mut state.collectors[index];
        ship.state = CollectorState::Mining;
        ship.target_planet = Some(planet);
        ship.mining_started_ms = 0;
    }

    advance(&mut state, &content, &mut rng, 2_500, &[]);
    let ship = &state.collectors[index];
    assert!((ship.mining_progress - 0.5).abs() < 1e-3);
    assert_eq!(ship.position, NEAR_BASE);
    assert_eq!(ship.state, CollectorState::Mining);

    let events = advance(&mut state, &content, &mut rng, 2_500, &[]);
    assert_eq!(state.collectors[index].state, CollectorState::ReturningToBase);
    assert_eq!(state.planets[0].resources, 999);
    assert_eq!(
        count_events(&events, |e| matches!(e, Event::MiningCompleted { amount: 1, .. })),
        1
    );
}

#[test]
fn planet_removed_mid_mining_sends_ship_home() {
    let content = test_content();
    let mut state = test_state(&content);
    let mut rng = make_rng();
    let planet = add_planet(&mut state, 1_000, NEAR_BASE);
    let index = add_collector(&mut state, &content);
    {
        let ship = &mut state.collectors[index];
        ship.state = CollectorState::Mining;
        ship.target_planet = Some(planet);
    }
    state.planets.clear();

    advance(&mut state, &content, &mut rng, STEP_MS, &[]);
    let ship = &state.collectors[index];
    assert_eq!(ship.state, CollectorState::ReturningToBase);
    assert!(ship.target_planet.is_none());
    assert_eq!(ship.cargo, 0);
}

#[test]
fn ship_whose_planet_vanished_docks_empty() {
    let content = test_content();
    let mut state = test_state(&content);
    let mut rng = make_rng();
    let planet = add_planet(&mut state, 1_000, NEAR_BASE);
    let index = add_collector(&mut state, &content);
    {
        let ship = &mut state.collectors[index];
        ship.state = CollectorState::Mining;
        ship.target_planet = Some(planet);
        ship.position = NEAR_BASE;
    }
    state.planets.clear();

    let mut events = Vec::new();
    for _ in 0..2_000 {
        events.extend(advance(&mut state, &content, &mut rng, STEP_MS, &[]));
        if state.collectors[index].state == CollectorState::IdleNoPlanets {
            break;
        }
    }

    assert!(events.iter().any(|e| matches!(
        e.event,
        Event::CollectorStateChanged {
            to: CollectorState::Delivering,
            ..
        }
    )));
    assert_eq!(state.ledger.ore_stored, 0);
    assert_eq!(state.ledger.score, 1_000);
    assert_eq!(
        count_events(&events, |e| matches!(e, Event::OreDelivered { .. })),
        0
    );
}

/// Two ships share a one-unit planet: only the ship that mined it is paid.
#[test]
fn shared_planet_depleted_by_one_ship_pays_only_the_miner() {
    let content = test_content();
    let mut state = test_state(&content);
    let mut rng = make_rng();
    let planet = add_planet(&mut state, 1, NEAR_BASE);
    let first = add_collector(&mut state, &content);
    let second = add_collector(&mut state, &content);
    for (index, started_ms) in [(first, 0), (second, 1_000)] {
        let ship = &mut state.collectors[index];
        ship.state = CollectorState::Mining;
        ship.target_planet = Some(planet);
        ship.position = NEAR_BASE;
        ship.mining_started_ms = started_ms;
    }

    let events = advance(&mut state, &content, &mut rng, 5_000, &[]);
    assert!(state.planets.is_empty());
    assert_eq!(
        count_events(&events, |e| matches!(e, Event::MiningCompleted { .. })),
        1
    );
    assert_eq!(state.collectors[first].cargo, 1);
    assert_eq!(state.collectors[second].cargo, 0);

    let mut delivered = Vec::new();
    for _ in 0..2_000 {
        let events = advance(&mut state, &content, &mut rng, STEP_MS, &[]);
        delivered.extend(events.into_iter().filter_map(|e| match e.event {
            Event::OreDelivered {
                collector_id,
                amount,
            } => Some((collector_id, amount)),
            _ => None,
        }));
        let docked = state.collectors.iter().all(|ship| {
            matches!(
                ship.state,
                CollectorState::IdleNoPlanets | CollectorState::ReturningToSource
            )
        });
        if docked {
            break;
        }
    }

    assert_eq!(delivered, vec![(state.collectors[first].id, 1)]);
    assert_eq!(state.ledger.ore_stored, 1);
    assert_eq!(state.ledger.score, 1_001);
}

#[test]
fn returning_ship_snaps_to_dock_and_delivers() {
    let content = test_content();
    let mut state = test_state(&content);
    let mut rng = make_rng();
    let index = add_collector(&mut state, &content);
    let dock = crate::geometry::dock_position(&content.layout, &content.constants, 0);
    {
        let ship = &mut state.collectors[index];
        ship.state = CollectorState::ReturningToBase;
        ship.position = Vec2::new(dock.x, dock.y - 0.5);
        ship.cargo = 1;
    }

    advance(&mut state, &content, &mut rng, STEP_MS, &[]);
    assert_eq!(state.collectors[index].state, CollectorState::Delivering);
    assert_eq!(state.collectors[index].position, dock);

    let events = advance(&mut state, &content, &mut rng, STEP_MS, &[]);
    assert_eq!(state.ledger.ore_stored, 1);
    assert_eq!(state.ledger.score, 1_001);
    assert_eq!(
        count_events(&events, |e| matches!(
            e,
            Event::FloatingAmount {
                kind: AmountKind::Ore,
                amount: 1,
                ..
            }
        )),
        1
    );
}

#[test]
fn delivery_within_capacity_credits_ore_and_score() {
    let content = test_content();
    let mut state = test_state(&content);
    let mut rng = make_rng();
    let index = add_collector(&mut state, &content);
    state.ledger.ore_stored = 95;
    ready_to_deliver(&mut state, &content, index, 5);

    advance(&mut state, &content, &mut rng, STEP_MS, &[]);
    assert_eq!(state.ledger.ore_stored, 100);
    assert_eq!(state.ledger.score, 1_005);
    assert_eq!(state.collectors[index].state, CollectorState::ReturningToSource);
    assert!(state.collectors[index].target_planet.is_none());
}

/// Storage holds 98 of 100; a load of 5 must wait rather than deliver 2.
#[test]
fn overflowing_delivery_is_deferred_not_partial() {
    let content = test_content();
    let mut state = test_state(&content);
    let mut rng = make_rng();
    let index = add_collector(&mut state, &content);
    state.ledger.ore_stored = 98;
    ready_to_deliver(&mut state, &content, index, 5);
    state.collectors[index].target_planet = Some(PlanetId(7));

    let events = advance(&mut state, &content, &mut rng, STEP_MS, &[]);
    assert_eq!(state.ledger.ore_stored, 98);
    assert_eq!(state.ledger.score, 1_000);
    assert_eq!(state.collectors[index].state, CollectorState::IdleNoPlanets);
    assert!(state.collectors[index].target_planet.is_none());
    assert_eq!(
        count_events(&events, |e| matches!(
            e,
            Event::DeliveryDeferred {
                amount: 5,
                ore_free: 2,
                ..
            }
        )),
        1
    );
}

/// A 100-resource planet mined 1 at a time lasts exactly 100 cycles.
#[test]
fn planet_depletes_after_exact_number_of_cycles() {
    let content = test_content();
    let mut state = test_state(&content);
    let mut rng = make_rng();
    let planet = add_planet(&mut state, 100, NEAR_BASE);
    add_collector(&mut state, &content);

    let mut cycles = 0;
    let mut depleted = false;
    for _ in 0..100_000 {
        let events = advance(&mut state, &content, &mut rng, STEP_MS, &[]);
        cycles += count_events(&events, |e| {
            matches!(e, Event::MiningCompleted { planet_id, .. } if *planet_id == planet)
        });
        if events
            .iter()
            .any(|e| matches!(e.event, Event::PlanetDepleted { planet_id } if planet_id == planet))
        {
            depleted = true;
            break;
        }
    }

    assert!(depleted, "planet never depleted");
    assert_eq!(cycles, 100);
    assert!(state.planets.iter().all(|p| p.id != planet));
    assert!(state.timers.is_scheduled(TimerKind::PlanetRespawn));
}

#[test]
fn yield_upgrade_applies_to_every_ship() {
    let content = test_content();
    let mut state = test_state(&content);
    let mut rng = make_rng();
    add_collector(&mut state, &content);
    add_collector(&mut state, &content);

    let cmd = command(&mut state, Command::UpgradeCollectorYield);
    advance(&mut state, &content, &mut rng, STEP_MS, &[cmd]);

    assert!((state.fleet.yield_multiplier - 1.5).abs() < 1e-9);
    assert!(state.collectors.iter().all(|ship| ship.delivery_amount == 2));

    let cmd = command(&mut state, Command::UpgradeCollectorYield);
    advance(&mut state, &content, &mut rng, STEP_MS, &[cmd]);
    assert!((state.fleet.yield_multiplier - 2.0).abs() < 1e-9);
    assert!(state.collectors.iter().all(|ship| ship.delivery_amount == 2));
}

#[test]
fn speed_upgrade_raises_fleet_base_speed() {
    let content = test_content();
    let mut state = test_state(&content);
    let mut rng = make_rng();
    let cmd = command(&mut state, Command::UpgradeCollectorSpeed);
    advance(&mut state, &content, &mut rng, STEP_MS, &[cmd]);
    assert!((state.fleet.base_speed - 0.6).abs() < 1e-9);
    assert_eq!(state.ledger.score, 980);
    assert_eq!(state.costs.collector_speed, 36);
}
