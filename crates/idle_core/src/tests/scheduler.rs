use super::*;
use crate::planets::spawn_initial_set;

fn unlaid_state(content: &GameContent) -> GameState {
    GameState::new(content, 42)
}

#[test]
fn frame_without_viewport_only_applies_commands() {
    let content = test_content();
    let mut state = unlaid_state(&content);
    let mut rng = make_rng();
    add_planet(&mut state, 500, Vec2::new(50.0, 30.0));

    let cmd = command(&mut state, Command::BuyCollector);
    frame(&mut state, 0, &[cmd], &content, &mut rng, EventLevel::Normal);
    let start = state.collectors[0].position;
    frame(&mut state, 500, &[], &content, &mut rng, EventLevel::Normal);

    assert_eq!(state.ledger.score, 990);
    assert_eq!(state.collectors.len(), 1);
    assert_eq!(state.collectors[0].position, start);
    assert_eq!(state.meta.frame, 0);
    assert_eq!(state.meta.now_ms, 500);
}

#[test]
fn set_viewport_makes_the_same_frame_run() {
    let content = test_content();
    let mut state = unlaid_state(&content);
    let mut rng = make_rng();

    let cmd = command(
        &mut state,
        Command::SetViewport {
            width_px: 1_000.0,
            height_px: 800.0,
        },
    );
    let events = frame(&mut state, 0, &[cmd], &content, &mut rng, EventLevel::Normal);

    assert!(state.viewport.is_ready());
    assert!((state.viewport.game_unit_px - 5.0).abs() < f32::EPSILON);
    assert_eq!(state.meta.frame, 1);
    assert_eq!(
        count_events(&events, |e| matches!(e, Event::ViewportChanged { .. })),
        1
    );
}

#[test]
fn invalid_viewport_is_rejected() {
    let content = test_content();
    let mut state = test_state(&content);
    let mut rng = make_rng();
    let before = state.viewport;

    let cmd = command(
        &mut state,
        Command::SetViewport {
            width_px: f32::NAN,
            height_px: 800.0,
        },
    );
    let events = frame(&mut state, 0, &[cmd], &content, &mut rng, EventLevel::Debug);
    assert_eq!(state.viewport, before);
    assert_eq!(
        count_events(&events, |e| matches!(
            e,
            Event::CommandRejected {
                reason: RejectReason::InvalidViewport,
                ..
            }
        )),
        1
    );
}

#[test]
fn first_frame_has_zero_elapsed_time() {
    let content = test_content();
    let mut state = test_state(&content);
    let mut rng = make_rng();
    add_planet(&mut state, 500, Vec2::new(50.0, 30.0));
    let index = add_collector(&mut state, &content);
    let start = state.collectors[index].position;

    frame(&mut state, 5_000, &[], &content, &mut rng, EventLevel::Normal);
    assert_eq!(state.collectors[index].position, start);

    frame(&mut state, 5_050, &[], &content, &mut rng, EventLevel::Normal);
    assert_ne!(state.collectors[index].position, start);
}

#[test]
fn clock_never_runs_backwards() {
    let content = test_content();
    let mut state = test_state(&content);
    let mut rng = make_rng();
    frame(&mut state, 1_000, &[], &content, &mut rng, EventLevel::Normal);
    frame(&mut state, 400, &[], &content, &mut rng, EventLevel::Normal);
    assert_eq!(state.meta.now_ms, 1_000);
    assert_eq!(state.meta.frame, 2);
}

/// Commands land before entity updates, so a factory built this frame can
/// start from ore already stored.
#[test]
fn commands_apply_before_entity_updates() {
    let content = test_content();
    let mut state = test_state(&content);
    let mut rng = make_rng();
    state.ledger.ore_stored = 5;
    let cmd = command(&mut state, Command::BuildFactory { slot: 0 });
    let events = advance(&mut state, &content, &mut rng, STEP_MS, &[cmd]);

    let built = events
        .iter()
        .position(|e| matches!(e.event, Event::FactoryBuilt { .. }));
    let started = events
        .iter()
        .position(|e| matches!(e.event, Event::ProductionStarted { .. }));
    assert!(built.is_some());
    assert!(built < started);
}

#[test]
fn event_ids_are_unique_and_increasing() {
    let content = test_content();
    let mut state = test_state(&content);
    let mut rng = make_rng();
    let mut events = Vec::new();
    spawn_initial_set(&mut state, &content, &mut rng, &mut events);
    add_collector(&mut state, &content);

    let mut all = Vec::new();
    for _ in 0..500 {
        all.extend(advance(&mut state, &content, &mut rng, STEP_MS, &[]));
    }
    assert!(!all.is_empty());
    assert!(all.windows(2).all(|pair| pair[0].id < pair[1].id));
    assert!(all.windows(2).all(|pair| pair[0].frame <= pair[1].frame));
}

fn run_seeded(frames: u32) -> (String, usize) {
    let content = test_content();
    let mut state = test_state(&content);
    let mut rng = make_rng();
    let mut events = Vec::new();
    spawn_initial_set(&mut state, &content, &mut rng, &mut events);
    add_collector(&mut state, &content);
    add_collector(&mut state, &content);

    let mut total = 0;
    for step in 0..frames {
        let commands = match step {
            100 => vec![command(&mut state, Command::BuildFactory { slot: 0 })],
            200 => vec![command(&mut state, Command::BuildTradePost)],
            _ => Vec::new(),
        };
        total += advance(&mut state, &content, &mut rng, STEP_MS, &commands).len();
    }
    (serde_json::to_string(&state).unwrap(), total)
}

#[test]
fn same_seed_and_inputs_reproduce_the_same_world() {
    let (first, first_events) = run_seeded(3_000);
    let (second, second_events) = run_seeded(3_000);
    assert_eq!(first, second);
    assert_eq!(first_events, second_events);
}
