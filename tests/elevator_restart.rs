mod support;

use std::sync::Arc;

use tower_dungeon::engine::commands::{self, StateMachineAction};
use tower_dungeon::engine::config::GameConfig;
use tower_dungeon::engine::state_machine::StateMachine;

/// Same fixture as `single_floor_config`, but with `highest_floor` pinned to
/// 1 by construction (a single floor entry) so going up the elevator once
/// immediately conquers the tower.
fn one_floor_config() -> Arc<GameConfig> {
    support::single_floor_config(0.5)
}

/// Reaching the top floor via the elevator reports both the floor-entry
/// line and the victory line, then auto-restarts back to `Start`.
#[test]
fn going_up_past_the_highest_floor_conquers_the_tower_and_restarts() {
    let config = one_floor_config();
    assert_eq!(config.highest_floor(), 1);
    let mut sm = StateMachine::new(config, "alice".to_string());
    sm.on_action(StateMachineAction::admin(commands::STARTED, Vec::new()));
    assert_eq!(sm.context().floor, 0);

    let entered = sm.on_action(StateMachineAction::admin(commands::ELEVATOR_EVENT, Vec::new()));
    assert_eq!(sm.current_state_name(), "ElevatorEvent");
    assert!(entered[0].contains("currently on 1F"));

    let responses = sm.on_action(StateMachineAction::user(commands::ACCEPTED, Vec::new()));

    assert_eq!(
        responses,
        vec![
            "You entered 2F.".to_string(),
            "You have conquered the Tower! Congratulations!".to_string(),
        ]
    );
    assert_eq!(sm.current_state_name(), "Start");
}
