mod support;

use tower_dungeon::engine::commands::{self, StateMachineAction};
use tower_dungeon::engine::state_machine::StateMachine;

/// A brand-new player's admin `started` action should run the whole
/// `Start -> Initialize -> EnterTower -> WaitForEvent` chain in one call,
/// granting the starting familiar and the two starter items along the way.
#[test]
fn started_auto_chains_through_initialize_to_wait_for_event() {
    let config = support::single_floor_config(0.5);
    let mut sm = StateMachine::new(config, "alice".to_string());
    assert_eq!(sm.current_state_name(), "Start");

    let responses = sm.on_action(StateMachineAction::admin(commands::STARTED, Vec::new()));

    assert_eq!(sm.current_state_name(), "WaitForEvent");
    assert!(responses.iter().any(|line| line.contains("newborn Dunop")));
    assert!(responses.iter().any(|line| line.contains("Use 'help'")));
    assert_eq!(sm.context().floor, 0);
    assert_eq!(sm.context().inventory.item_names(), vec!["Pita", "Medicinal Herb"]);
}

/// The tutorial line only fires once; a later `started` (after a manual
/// reset back to `Start`) must not repeat it.
#[test]
fn tutorial_line_does_not_repeat_across_restarts() {
    let config = support::single_floor_config(0.5);
    let mut sm = StateMachine::new(config, "alice".to_string());
    sm.on_action(StateMachineAction::admin(commands::STARTED, Vec::new()));

    sm.on_action(StateMachineAction::admin(commands::RESTART, Vec::new()));
    assert_eq!(sm.current_state_name(), "Start");
    let responses = sm.on_action(StateMachineAction::admin(commands::STARTED, Vec::new()));

    assert!(!responses.iter().any(|line| line.contains("Use 'help'")));
}
