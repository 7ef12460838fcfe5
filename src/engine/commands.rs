//! Command-string vocabulary exchanged between frontends, the controller and
//! the state machine. Kept as plain string constants (rather than an enum)
//! because arbitrary unrecognized commands must flow through to the
//! transition table lookup and fail there, not at parse time.

pub const STARTED: &str = "started";
pub const INITIALIZED: &str = "initialized";
pub const ENTERED_TOWER: &str = "entered_tower";
pub const GENERATE_EVENT: &str = "generate_event";
pub const EVENT_GENERATED: &str = "event_generated";

pub const BATTLE_EVENT: &str = "battle_event";
pub const ITEM_EVENT: &str = "item_event";
pub const TRAP_EVENT: &str = "trap_event";
pub const ELEVATOR_EVENT: &str = "elevator_event";
pub const CHARACTER_EVENT: &str = "character_event";
pub const FAMILIAR_EVENT: &str = "familiar_event";

pub const START_BATTLE: &str = "start_battle";
pub const BATTLE_PREPARE_PHASE: &str = "battle_prepare_phase";
pub const APPROACH: &str = "approach";
pub const BATTLE_PREPARE_PHASE_ACTION_PERFORMED: &str = "battle_prepare_phase_action_performed";
pub const BATTLE_PREPARE_PHASE_FINISHED: &str = "battle_prepare_phase_finished";
pub const PLAYER_TURN: &str = "player_turn";
pub const ATTACK: &str = "attack";
pub const USE_SPELL: &str = "use_spell";
pub const CANNOT_USE_SPELL: &str = "cannot_use_spell";
pub const USE_ITEM: &str = "use_item";
pub const CANNOT_USE_ITEM_PREPARE_PHASE: &str = "cannot_use_item_prepare_phase";
pub const CANNOT_USE_ITEM_BATTLE_PHASE: &str = "cannot_use_item_battle_phase";
pub const FLEE: &str = "flee";
pub const CANNOT_FLEE: &str = "cannot_flee";
pub const BATTLE_ACTION_PERFORMED: &str = "battle_action_performed";
pub const ENEMY_TURN: &str = "enemy_turn";
pub const YOU_DIED: &str = "you_died";

pub const START_ITEM_TRADE: &str = "start_item_trade";
pub const TRADE_ITEM: &str = "yes";
pub const START_FAMILIAR_TRADE: &str = "start_familiar_trade";
pub const EVOLVE_FAMILIAR: &str = "evolve_familiar";
pub const ACCEPTED: &str = "yes";
pub const REJECTED: &str = "no";
pub const IGNORE: &str = "ignore";

pub const ITEM_PICKED_UP: &str = "item_picked_up";
pub const DROP_ITEM: &str = "drop_item";

pub const GO_UP: &str = "go_up";
pub const ENTERED_NEXT_FLOOR: &str = "entered_next_floor";

pub const FUSE: &str = "fuse";
pub const REPLACE: &str = "replace";

pub const EVENT_FINISHED: &str = "event_finished";
pub const RESTART: &str = "restart";

pub const HELP: &str = "help";
pub const SHOW_FAMILIAR_STATS: &str = "fam_stats";
pub const SHOW_INVENTORY: &str = "inventory";
pub const SHOW_FLOOR: &str = "floor";
pub const SHOW_STATE: &str = "state";
pub const GIVE_ITEM: &str = "give_item";
pub const RESTORE_HP: &str = "restore_hp";
pub const RESTORE_MP: &str = "restore_mp";

pub const GENERIC_COMMANDS: &[&str] = &[
    HELP,
    RESTART,
    SHOW_FAMILIAR_STATS,
    SHOW_INVENTORY,
    SHOW_FLOOR,
    SHOW_STATE,
    GIVE_ITEM,
    RESTORE_HP,
    RESTORE_MP,
];

/// A single action dispatched into a player's state machine.
#[derive(Debug, Clone)]
pub struct StateMachineAction {
    pub command: String,
    pub args: Vec<String>,
    pub is_given_by_admin: bool,
}

impl StateMachineAction {
    pub fn user(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
            is_given_by_admin: false,
        }
    }

    pub fn admin(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
            is_given_by_admin: true,
        }
    }
}
