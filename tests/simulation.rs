use lane_runner::sim::{CollisionOutcome, Falling, GameMode, Simulation, Steer, TickDriver, DriverConfig};
use lane_runner::Tuning;
use proptest::prelude::*;

fn mode_strategy() -> impl Strategy<Value = GameMode> {
    prop_oneof![
        Just(GameMode::ButtonSlow),
        Just(GameMode::ButtonFast),
        Just(GameMode::Sensor),
    ]
}

fn action_strategy() -> impl Strategy<Value = Option<Steer>> {
    prop_oneof![
        4 => Just(None),
        1 => Just(Some(Steer::Left)),
        1 => Just(Some(Steer::Right)),
    ]
}

fn near_top_per_lane_at_most_one(entities: &[Falling], lanes: usize, near_top: f32) -> bool {
    (0..lanes).all(|lane| {
        entities
            .iter()
            .filter(|e| e.lane == lane && e.progress < near_top)
            .count()
            <= 1
    })
}

proptest! {
    #[test]
    fn tick_invariants_hold(
        seed in any::<u64>(),
        mode in mode_strategy(),
        multiplier in 0.5f32..=3.0,
        obstacle_chance in 0.0f32..=1.0,
        coin_chance in 0.0f32..=1.0,
        lanes in 1usize..=7,
        actions in prop::collection::vec(action_strategy(), 1..400),
    ) {
        let tuning = Tuning {
            lane_count: lanes,
            obstacle_spawn_chance: obstacle_chance,
            coin_spawn_chance: coin_chance,
            ..Default::default()
        };
        let mut sim = Simulation::new(tuning.clone(), mode, seed);
        sim.set_speed_multiplier(multiplier);

        for action in actions {
            if let Some(steer) = action {
                sim.steer(steer);
            }
            let before = sim.state().clone();

            sim.advance_tick();
            let collected = sim.collect_coin();
            let outcome = sim.resolve_collision();
            let state = sim.state();

            prop_assert!(state.car_lane < lanes);
            prop_assert!(sim.obstacles().len() <= tuning.max_obstacles);
            for e in sim.obstacles().iter().chain(state.coins.iter()) {
                prop_assert!((0.0..1.0).contains(&e.progress), "progress {} escaped", e.progress);
                prop_assert!(e.lane < lanes);
            }
            prop_assert!(near_top_per_lane_at_most_one(sim.obstacles(), lanes, tuning.near_top));
            prop_assert!(near_top_per_lane_at_most_one(&state.coins, lanes, tuning.near_top));

            prop_assert!(state.odometer >= before.odometer);
            prop_assert!(state.collected_coins == before.collected_coins + collected as u32);
            prop_assert!(state.lives <= before.lives);
            prop_assert!(!sim.detect_collision());

            match outcome {
                CollisionOutcome::NoCollision => prop_assert_eq!(state.lives, before.lives),
                CollisionOutcome::Collided { lives_left, game_over, .. } => {
                    prop_assert_eq!(state.lives, before.lives - 1);
                    prop_assert_eq!(lives_left, state.lives);
                    prop_assert_eq!(game_over, state.lives == 0);
                }
            }
            prop_assert_eq!(state.is_game_over, state.lives == 0);
            prop_assert_eq!(state.is_game_running, state.lives > 0);

            if !state.is_game_running {
                break;
            }
        }
    }

    #[test]
    fn same_seed_same_run(seed in any::<u64>(), mode in mode_strategy()) {
        let run = |seed| {
            let sim = Simulation::new(Tuning::default(), mode, seed);
            let mut driver = TickDriver::new(sim, DriverConfig::default());
            driver.run(lane_runner::sim::autopilot, Some(2_000))
        };
        prop_assert_eq!(run(seed), run(seed));
    }
}

#[test]
fn collision_scenario_from_the_rulebook() {
    let tuning = Tuning {
        obstacle_spawn_chance: 0.0,
        coin_spawn_chance: 0.0,
        ..Default::default()
    };
    let mut sim = Simulation::new(tuning, GameMode::ButtonSlow, 0);
    let car = sim.state().car_lane;
    sim.place_obstacle(car, 0.82).unwrap();
    sim.place_obstacle(car + 1, 0.82).unwrap();

    assert!(sim.detect_collision());
    let outcome = sim.resolve_collision();
    assert_eq!(
        outcome,
        CollisionOutcome::Collided { removed: 1, lives_left: 2, game_over: false }
    );
    assert_eq!(sim.state().lives, 2);
    assert_eq!(sim.obstacles(), &[Falling::new(car + 1, 0.82)]);
}

#[test]
fn coin_scenario_from_the_rulebook() {
    let tuning = Tuning {
        obstacle_spawn_chance: 0.0,
        coin_spawn_chance: 0.0,
        ..Default::default()
    };
    let mut sim = Simulation::new(tuning, GameMode::ButtonSlow, 0);
    let car = sim.state().car_lane;
    sim.place_coin(car, 0.81).unwrap();
    sim.place_coin(car, 0.5).unwrap();
    sim.place_coin(car + 1, 0.82).unwrap();

    assert_eq!(sim.collect_coin(), 1);
    assert_eq!(sim.state().collected_coins, 1);
    assert_eq!(sim.state().coins.len(), 2);
    assert!(!sim.state().coins.contains(&Falling::new(car, 0.81)));
}

#[test]
fn full_run_reaches_game_over() {
    let tuning = Tuning {
        lane_count: 2,
        ..Default::default()
    };
    let sim = Simulation::new(tuning, GameMode::ButtonFast, 2024);
    let mut driver = TickDriver::new(sim, DriverConfig::default());
    let summary = driver.run(|_| None, Some(1_000_000));

    assert!(summary.game_over);
    let state = driver.sim().state();
    assert_eq!(state.lives, 0);
    assert!(state.is_game_over);
    assert!(!state.is_game_running);
    assert!(summary.score > 0);
}
