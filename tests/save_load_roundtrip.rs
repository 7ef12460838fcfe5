mod support;

use tower_dungeon::engine::commands::{self, StateMachineAction};
use tower_dungeon::engine::state_machine::StateMachine;

/// `save`/`load` must reproduce player-visible state exactly: current
/// state, floor, inventory contents and familiar identity, even mid-battle
/// where `battle_context` is populated.
#[test]
fn save_then_load_preserves_state_mid_battle() {
    let config = support::single_floor_config(0.5);
    let mut sm = StateMachine::new(config.clone(), "alice".to_string());
    sm.on_action(StateMachineAction::admin(commands::STARTED, Vec::new()));
    sm.on_action(StateMachineAction::admin(commands::BATTLE_EVENT, Vec::new()));
    assert_eq!(sm.current_state_name(), "BattlePreparePhase");
    assert!(sm.context().is_in_battle());

    let saved = sm.save().expect("state serializes");
    let reloaded = StateMachine::load(config, &saved).expect("state deserializes");

    assert_eq!(reloaded.current_state_name(), sm.current_state_name());
    assert_eq!(reloaded.player_name(), sm.player_name());
    assert_eq!(reloaded.context().floor, sm.context().floor);
    assert_eq!(
        reloaded.context().inventory.item_names(),
        sm.context().inventory.item_names()
    );
    assert_eq!(reloaded.context().familiar().name, sm.context().familiar().name);
    assert!(reloaded.context().is_in_battle());
    assert_eq!(
        reloaded.context().battle_context.as_ref().unwrap().enemy.name,
        sm.context().battle_context.as_ref().unwrap().enemy.name
    );
}

/// Outside of battle, `battle_context` round-trips as `None`.
#[test]
fn save_then_load_preserves_no_battle_context_outside_combat() {
    let config = support::single_floor_config(0.5);
    let mut sm = StateMachine::new(config.clone(), "alice".to_string());
    sm.on_action(StateMachineAction::admin(commands::STARTED, Vec::new()));
    assert!(!sm.context().is_in_battle());

    let saved = sm.save().expect("state serializes");
    let reloaded = StateMachine::load(config, &saved).expect("state deserializes");

    assert!(!reloaded.context().is_in_battle());
    assert_eq!(reloaded.current_state_name(), "WaitForEvent");
}
