mod support;

use tower_dungeon::engine::commands::{self, StateMachineAction};
use tower_dungeon::engine::state_machine::StateMachine;

/// With flee probability pinned to 1.0, fleeing a battle always succeeds —
/// `does_action_succeed` compares against `rng.gen::<f64>() < 1.0`, which
/// holds for every draw in `[0, 1)`. Drives the full approach phase first so
/// the `flee` command is actually legal from `BattlePlayerTurn`.
#[test]
fn fleeing_with_probability_one_always_succeeds() {
    let config = support::single_floor_config(1.0);
    let mut sm = StateMachine::new(config, "alice".to_string());
    sm.on_action(StateMachineAction::admin(commands::STARTED, Vec::new()));

    let entered = sm.on_action(StateMachineAction::admin(commands::BATTLE_EVENT, Vec::new()));
    assert_eq!(sm.current_state_name(), "BattlePreparePhase");
    assert!(entered.iter().any(|line| line.contains("You encountered LVL")));

    // DEFAULT_APPROACH_TURNS is 2: the first approach stays in the prepare
    // phase, the second clears it and hands control to the player.
    sm.on_action(StateMachineAction::user(commands::APPROACH, Vec::new()));
    assert_eq!(sm.current_state_name(), "BattlePreparePhase");
    sm.on_action(StateMachineAction::user(commands::APPROACH, Vec::new()));
    assert_eq!(sm.current_state_name(), "BattlePlayerTurn");
    assert!(sm.context().is_in_battle());

    let responses = sm.on_action(StateMachineAction::user(commands::FLEE, Vec::new()));

    assert_eq!(responses, vec!["You successfully fleed from the battle.".to_string()]);
    assert_eq!(sm.current_state_name(), "WaitForEvent");
    assert!(!sm.context().is_in_battle());
}
