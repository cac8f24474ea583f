use super::*;
use crate::planets::{next_available, spawn_initial_set, spawn_planet};

#[test]
fn next_available_skips_depleted_in_insertion_order() {
    let content = test_content();
    let mut state = test_state(&content);
    add_planet(&mut state, 0, Vec2::new(10.0, 10.0));
    let second = add_planet(&mut state, 5, Vec2::new(20.0, 10.0));
    add_planet(&mut state, 50, Vec2::new(30.0, 10.0));
    assert_eq!(next_available(&state.planets), Some(second));
}

#[test]
fn next_available_on_empty_registry_is_none() {
    let content = test_content();
    let state = test_state(&content);
    assert_eq!(next_available(&state.planets), None);
}

#[test]
fn spawned_planets_stay_in_band_and_off_the_ui() {
    let content = test_content();
    let mut state = test_state(&content);
    let mut rng = make_rng();
    let mut events = Vec::new();
    for _ in 0..40 {
        spawn_planet(&mut state, &content, &mut rng, &mut events);
    }

    let constants = &content.constants;
    let half = constants.planet_size_percent / 2.0;
    for planet in &state.planets {
        assert!(planet.position.x >= half && planet.position.x <= 100.0 - half);
        assert!(planet.position.y >= constants.planet_spawn_top * 100.0 + half);
        assert!(planet.position.y <= constants.planet_spawn_bottom * 100.0 - half);
        assert!(planet.resources >= constants.planet_min_resources);
        assert!(planet.resources < constants.planet_max_resources);
        for zone in &content.layout.ui_exclusion_zones {
            assert!(
                !zone.overlaps_square(planet.position, constants.planet_size_percent),
                "planet {} overlaps a UI zone",
                planet.id
            );
        }
    }
    assert_eq!(
        count_events(&events, |e| matches!(e, Event::PlanetSpawned { .. })),
        40
    );
}

#[test]
fn fixed_resource_range_spawns_minimum() {
    let mut content = test_content();
    content.constants.planet_min_resources = 100;
    content.constants.planet_max_resources = 100;
    let mut state = test_state(&content);
    let mut rng = make_rng();
    let mut events = Vec::new();
    spawn_planet(&mut state, &content, &mut rng, &mut events);
    assert_eq!(state.planets[0].resources, 100);
}

#[test]
fn initial_set_replaces_registry() {
    let content = test_content();
    let mut state = test_state(&content);
    let mut rng = make_rng();
    let mut events = Vec::new();
    add_planet(&mut state, 10, NEAR_BASE);
    spawn_initial_set(&mut state, &content, &mut rng, &mut events);
    assert_eq!(state.planets.len(), 3);
    assert!(state.planets.iter().all(|p| p.resources > 0));
}

#[test]
fn last_planet_removal_schedules_single_respawn() {
    let content = test_content();
    let mut state = test_state(&content);
    let mut rng = make_rng();
    let planet = add_planet(&mut state, 1, NEAR_BASE);
    let a = add_collector(&mut state, &content);
    let b = add_collector(&mut state, &content);
    for index in [a, b] {
        let ship = &mut state.collectors[index];
        ship.state = CollectorState::Mining;
        ship.target_planet = Some(planet);
        ship.mining_started_ms = 0;
    }

    let events = advance(&mut state, &content, &mut rng, 5_000, &[]);
    assert!(state.planets.is_empty());
    assert_eq!(
        count_events(&events, |e| matches!(e, Event::PlanetDepleted { .. })),
        1
    );
    assert_eq!(
        count_events(&events, |e| matches!(e, Event::PlanetRespawnScheduled { .. })),
        1
    );
    assert_eq!(
        state.timers.due_at(TimerKind::PlanetRespawn),
        Some(5_000 + content.constants.planet_respawn_delay_ms)
    );
    // The second ship found the planet already gone.
    assert!(state
        .collectors
        .iter()
        .all(|ship| ship.state == CollectorState::ReturningToBase));
}

#[test]
fn respawn_fires_after_delay_and_reassigns_idle_ships() {
    let content = test_content();
    let mut state = test_state(&content);
    let mut rng = make_rng();
    let index = add_collector(&mut state, &content);
    state
        .timers
        .schedule(content.constants.planet_respawn_delay_ms, TimerKind::PlanetRespawn);

    advance(&mut state, &content, &mut rng, 2_000, &[]);
    assert!(state.planets.is_empty());
    assert_eq!(state.collectors[index].state, CollectorState::IdleNoPlanets);

    let events = advance(&mut state, &content, &mut rng, 1_000, &[]);
    assert_eq!(state.planets.len(), 3);
    assert!(!state.timers.is_scheduled(TimerKind::PlanetRespawn));
    assert_eq!(
        count_events(&events, |e| matches!(e, Event::PlanetSpawned { .. })),
        3
    );
    let ship = &state.collectors[index];
    assert_eq!(ship.target_planet, Some(state.planets[0].id));
    assert_ne!(ship.state, CollectorState::IdleNoPlanets);
}

#[test]
fn planet_resources_never_underflow() {
    let content = test_content();
    let mut state = test_state(&content);
    let mut rng = make_rng();
    let planet = add_planet(&mut state, 3, NEAR_BASE);
    let index = add_collector(&mut state, &content);
    {
        let ship = &mut state.collectors[index];
        ship.state = CollectorState::Mining;
        ship.target_planet = Some(planet);
        ship.delivery_amount = 10;
    }
    let events = advance(&mut state, &content, &mut rng, 5_000, &[]);
    assert!(events.iter().any(|e| matches!(
        e.event,
        Event::MiningCompleted {
            planet_remaining: 0,
            ..
        }
    )));
    assert!(state.planets.is_empty());
}
