use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::engine::commands::{self, StateMachineAction};
use crate::engine::config::GameConfig;
use crate::engine::context::Context;
use crate::engine::errors::{GameError, GameResult};
use crate::engine::inventory::ItemKind;
use crate::engine::states::{self, GameState};
use std::sync::Arc;

/// Safety cap on auto-chained transitions per external action, per the
/// engine's bounded-recursion contract. No real transition graph gets close.
const MAX_CHAIN_DEPTH: usize = 64;

/// Whether a transition requires the triggering action to be admin-issued.
/// `User` transitions accept either a user or an admin action, matching the
/// reference implementation's `Transition.by_user` (an always-true guard).
enum Guard {
    Admin,
    User,
}

/// Looks up `(state name, command)` in the transition table. Returns the
/// target state's stable name and the guard it's registered under.
fn lookup_transition(state_name: &str, command: &str) -> Option<(&'static str, Guard)> {
    use Guard::{Admin, User};
    Some(match (state_name, command) {
        ("Start", c) if c == commands::STARTED => ("Initialize", Admin),
        ("Initialize", c) if c == commands::INITIALIZED => ("EnterTower", Admin),
        ("EnterTower", c) if c == commands::ENTERED_TOWER => ("WaitForEvent", Admin),

        ("WaitForEvent", c) if c == commands::BATTLE_EVENT => ("BattleEvent", Admin),
        ("WaitForEvent", c) if c == commands::ITEM_EVENT => ("ItemEvent", Admin),
        ("WaitForEvent", c) if c == commands::TRAP_EVENT => ("TrapEvent", Admin),
        ("WaitForEvent", c) if c == commands::CHARACTER_EVENT => ("CharacterEvent", Admin),
        ("WaitForEvent", c) if c == commands::ELEVATOR_EVENT => ("ElevatorEvent", Admin),
        ("WaitForEvent", c) if c == commands::FAMILIAR_EVENT => ("FamiliarEvent", Admin),
        ("WaitForEvent", c) if c == commands::GENERATE_EVENT => ("GenerateEvent", Admin),

        // `GenerateEvent` picks its own concrete event family and
        // auto-generates that family's command; these mirror
        // `WaitForEvent`'s own event arms so the chained action lands on
        // the right concrete event state.
        ("GenerateEvent", c) if c == commands::BATTLE_EVENT => ("BattleEvent", Admin),
        ("GenerateEvent", c) if c == commands::ITEM_EVENT => ("ItemEvent", Admin),
        ("GenerateEvent", c) if c == commands::TRAP_EVENT => ("TrapEvent", Admin),
        ("GenerateEvent", c) if c == commands::CHARACTER_EVENT => ("CharacterEvent", Admin),
        ("GenerateEvent", c) if c == commands::ELEVATOR_EVENT => ("ElevatorEvent", Admin),
        ("GenerateEvent", c) if c == commands::FAMILIAR_EVENT => ("FamiliarEvent", Admin),

        ("BattleEvent", c) if c == commands::START_BATTLE => ("StartBattle", Admin),
        ("StartBattle", c) if c == commands::BATTLE_PREPARE_PHASE => ("BattlePreparePhase", Admin),
        ("BattlePreparePhase", c) if c == commands::USE_ITEM => ("BattleUseItem", User),
        ("BattlePreparePhase", c) if c == commands::APPROACH => ("BattleApproach", User),
        ("BattlePreparePhase", c) if c == commands::BATTLE_PREPARE_PHASE_FINISHED => ("BattlePhase", Admin),
        ("BattleApproach", c) if c == commands::BATTLE_PREPARE_PHASE_FINISHED => ("BattlePhase", Admin),
        ("BattleApproach", c) if c == commands::BATTLE_PREPARE_PHASE => ("BattlePreparePhase", Admin),
        ("BattlePhase", c) if c == commands::PLAYER_TURN => ("BattlePlayerTurn", Admin),
        ("BattlePhase", c) if c == commands::ENEMY_TURN => ("BattleEnemyTurn", Admin),
        ("BattlePhase", c) if c == commands::EVENT_FINISHED => ("WaitForEvent", Admin),
        ("BattlePhase", c) if c == commands::YOU_DIED => ("GameOver", Admin),
        ("BattlePlayerTurn", c) if c == commands::ATTACK => ("BattleAttack", User),
        ("BattlePlayerTurn", c) if c == commands::USE_SPELL => ("BattleUseSpell", User),
        ("BattlePlayerTurn", c) if c == commands::USE_ITEM => ("BattleUseItem", User),
        ("BattlePlayerTurn", c) if c == commands::FLEE => ("BattleTryToFlee", User),
        ("BattleAttack", c) if c == commands::BATTLE_ACTION_PERFORMED => ("BattlePhase", Admin),
        ("BattleUseSpell", c) if c == commands::BATTLE_ACTION_PERFORMED => ("BattlePhase", Admin),
        ("BattleUseSpell", c) if c == commands::CANNOT_USE_SPELL => ("BattlePlayerTurn", Admin),
        ("BattleUseItem", c) if c == commands::BATTLE_PREPARE_PHASE_ACTION_PERFORMED => {
            ("BattlePreparePhase", Admin)
        }
        ("BattleUseItem", c) if c == commands::BATTLE_ACTION_PERFORMED => ("BattlePhase", Admin),
        ("BattleUseItem", c) if c == commands::CANNOT_USE_ITEM_PREPARE_PHASE => {
            ("BattlePreparePhase", Admin)
        }
        ("BattleUseItem", c) if c == commands::CANNOT_USE_ITEM_BATTLE_PHASE => {
            ("BattlePlayerTurn", Admin)
        }
        ("BattleTryToFlee", c) if c == commands::CANNOT_FLEE => ("BattlePlayerTurn", Admin),
        ("BattleTryToFlee", c) if c == commands::BATTLE_ACTION_PERFORMED => ("BattlePhase", Admin),
        ("BattleTryToFlee", c) if c == commands::EVENT_FINISHED => ("WaitForEvent", Admin),
        ("BattleEnemyTurn", c) if c == commands::BATTLE_ACTION_PERFORMED => ("BattlePhase", Admin),

        ("ItemEvent", c) if c == commands::ACCEPTED => ("ItemPickUp", User),
        ("ItemEvent", c) if c == commands::REJECTED => ("ItemEventFinished", User),
        ("ItemPickUp", c) if c == commands::ITEM_PICKED_UP => ("ItemEventFinished", Admin),
        ("ItemPickUp", c) if c == commands::DROP_ITEM => ("ItemPickUpFullInventory", User),
        ("ItemPickUp", c) if c == commands::IGNORE => ("ItemPickUpIgnored", User),
        ("ItemPickUpFullInventory", c) if c == commands::ITEM_PICKED_UP => ("ItemEventFinished", Admin),
        ("ItemPickUpIgnored", c) if c == commands::EVENT_FINISHED => ("ItemEventFinished", Admin),
        ("ItemEventFinished", c) if c == commands::EVENT_FINISHED => ("WaitForEvent", Admin),

        ("TrapEvent", c) if c == commands::GO_UP => ("GoUp", Admin),
        ("TrapEvent", c) if c == commands::EVENT_FINISHED => ("WaitForEvent", Admin),

        ("ElevatorEvent", c) if c == commands::ACCEPTED => ("GoUp", User),
        ("ElevatorEvent", c) if c == commands::REJECTED => ("ElevatorOmitted", User),
        ("GoUp", c) if c == commands::ENTERED_NEXT_FLOOR => ("NextFloor", Admin),
        ("ElevatorOmitted", c) if c == commands::EVENT_FINISHED => ("WaitForEvent", Admin),
        ("NextFloor", c) if c == commands::EVENT_FINISHED => ("WaitForEvent", Admin),
        ("NextFloor", c) if c == commands::RESTART => ("Start", Admin),

        ("CharacterEvent", c) if c == commands::START_ITEM_TRADE => ("ItemTrade", Admin),
        ("CharacterEvent", c) if c == commands::START_FAMILIAR_TRADE => ("FamiliarTrade", Admin),
        ("CharacterEvent", c) if c == commands::START_BATTLE => ("StartBattle", Admin),
        ("CharacterEvent", c) if c == commands::EVENT_FINISHED => ("WaitForEvent", Admin),
        ("ItemTrade", c) if c == commands::TRADE_ITEM => ("ItemTradeAccepted", User),
        ("ItemTrade", c) if c == commands::REJECTED => ("ItemTradeRejected", User),
        ("ItemTradeAccepted", c) if c == commands::EVENT_FINISHED => ("WaitForEvent", Admin),
        ("ItemTradeRejected", c) if c == commands::EVENT_FINISHED => ("WaitForEvent", Admin),
        ("FamiliarTrade", c) if c == commands::ACCEPTED => ("FamiliarTradeAccepted", User),
        ("FamiliarTrade", c) if c == commands::REJECTED => ("FamiliarTradeRejected", User),
        ("FamiliarTradeAccepted", c) if c == commands::EVENT_FINISHED => ("WaitForEvent", Admin),
        ("FamiliarTradeRejected", c) if c == commands::EVENT_FINISHED => ("WaitForEvent", Admin),

        ("FamiliarEvent", c) if c == commands::IGNORE => ("MetFamiliarIgnore", User),
        ("FamiliarEvent", c) if c == commands::FUSE => ("FamiliarFusion", User),
        ("FamiliarEvent", c) if c == commands::REPLACE => ("FamiliarReplacement", User),
        ("MetFamiliarIgnore", c) if c == commands::EVENT_FINISHED => ("WaitForEvent", Admin),
        ("FamiliarFusion", c) if c == commands::EVENT_FINISHED => ("WaitForEvent", Admin),
        ("FamiliarReplacement", c) if c == commands::EVENT_FINISHED => ("WaitForEvent", Admin),

        ("GameOver", c) if c == commands::RESTART => ("Start", Admin),

        _ => return None,
    })
}

/// Dispatches `on_enter` for a freshly constructed state, routing to the
/// per-state-family free functions rather than a trait-object hierarchy.
fn enter_state(ctx: &mut Context, state: &GameState) -> GameResult<()> {
    match state {
        GameState::Start => states::core::on_enter_start(ctx),
        GameState::Initialize { familiar_name } => {
            states::core::on_enter_initialize(ctx, familiar_name.as_deref())
        }
        GameState::EnterTower => states::core::on_enter_enter_tower(ctx),
        GameState::WaitForEvent => states::core::on_enter_wait_for_event(ctx),
        GameState::GenerateEvent => states::core::on_enter_generate_event(ctx),
        GameState::GameOver => states::core::on_enter_game_over(ctx),

        GameState::BattleEvent => states::battle::on_enter_battle_event(ctx),
        GameState::StartBattle => states::battle::on_enter_start_battle(ctx),
        GameState::BattlePreparePhase => states::battle::on_enter_battle_prepare_phase(ctx),
        GameState::BattleApproach => states::battle::on_enter_battle_approach(ctx),
        GameState::BattlePhase => states::battle::on_enter_battle_phase(ctx),
        GameState::BattlePlayerTurn => states::battle::on_enter_battle_player_turn(ctx),
        GameState::BattleAttack => states::battle::on_enter_battle_attack(ctx),
        GameState::BattleUseSpell => states::battle::on_enter_battle_use_spell(ctx),
        GameState::BattleUseItem { item_index } => {
            states::battle::on_enter_battle_use_item(ctx, *item_index)
        }
        GameState::BattleTryToFlee => states::battle::on_enter_battle_try_to_flee(ctx),
        GameState::BattleEnemyTurn => states::battle::on_enter_battle_enemy_turn(ctx),

        GameState::ItemEvent { forced_item } => {
            states::item::on_enter_item_event(ctx, forced_item.as_deref())
        }
        GameState::ItemPickUp => states::item::on_enter_item_pick_up(ctx),
        GameState::ItemPickUpFullInventory { item_index } => {
            states::item::on_enter_item_pick_up_full_inventory(ctx, *item_index)
        }
        GameState::ItemPickUpIgnored => states::item::on_enter_item_pick_up_ignored(ctx),
        GameState::ItemEventFinished => states::item::on_enter_item_event_finished(ctx),

        GameState::TrapEvent { forced_trap } => {
            states::trap::on_enter_trap_event(ctx, forced_trap.as_deref())
        }

        GameState::ElevatorEvent => states::elevator::on_enter_elevator_event(ctx),
        GameState::GoUp => states::elevator::on_enter_go_up(ctx),
        GameState::ElevatorOmitted => states::elevator::on_enter_elevator_omitted(ctx),
        GameState::NextFloor => states::elevator::on_enter_next_floor(ctx),

        GameState::CharacterEvent { forced_character } => {
            states::character::on_enter_character_event(ctx, forced_character.as_deref())
        }
        GameState::ItemTrade => states::character::on_enter_item_trade(ctx),
        GameState::ItemTradeAccepted { item_index } => {
            states::character::on_enter_item_trade_accepted(ctx, *item_index)
        }
        GameState::ItemTradeRejected => states::character::on_enter_item_trade_rejected(ctx),
        GameState::FamiliarTrade => states::character::on_enter_familiar_trade(ctx),
        GameState::FamiliarTradeAccepted => states::character::on_enter_familiar_trade_accepted(ctx),
        GameState::FamiliarTradeRejected => states::character::on_enter_familiar_trade_rejected(ctx),

        GameState::FamiliarEvent { forced_monster } => {
            states::familiar::on_enter_familiar_event(ctx, forced_monster.as_deref())
        }
        GameState::MetFamiliarIgnore => states::familiar::on_enter_met_familiar_ignore(ctx),
        GameState::FamiliarFusion => states::familiar::on_enter_familiar_fusion(ctx),
        GameState::FamiliarReplacement => states::familiar::on_enter_familiar_replacement(ctx),
    }
}

/// Per-player JSON persistence envelope. `version` gates forward
/// compatibility; an unrecognized value is refused rather than guessed at.
#[derive(Serialize, Deserialize)]
struct PersistedStateMachine {
    version: u32,
    player: String,
    context: PersistedContextShim,
    state: PersistedState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    event_selection_penalty_end: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize)]
struct PersistedState {
    name: String,
    args: Vec<String>,
}

/// `Context` itself is `Serialize`/`Deserialize` (it skips the handful of
/// fields that can't round-trip); this shim exists only so `serde_json`
/// can defer parsing the nested value while the envelope's shape is fixed.
type PersistedContextShim = serde_json::Value;

const PERSISTENCE_VERSION: u32 = 1;

/// One player's event-driven state machine: current `GameState` plus the
/// `Context` it mutates. Owns no I/O; the controller drives persistence.
pub struct StateMachine {
    context: Context,
    state: GameState,
    /// Set when this player is picked by the event timer; while in the
    /// future it reduces the player's weight in the next selection round.
    /// Cleared lazily on read, per spec: expired penalties don't linger.
    event_selection_penalty_end: Option<DateTime<Utc>>,
}

impl StateMachine {
    pub fn new(game_config: Arc<GameConfig>, player_name: String) -> Self {
        Self {
            context: Context::new(game_config, player_name),
            state: GameState::Start,
            event_selection_penalty_end: None,
        }
    }

    /// True if this player was recently selected for an event and the
    /// penalty window hasn't elapsed yet. Clears the field if it has.
    pub fn has_event_selection_penalty(&mut self) -> bool {
        match self.event_selection_penalty_end {
            Some(end) if end > Utc::now() => true,
            Some(_) => {
                self.event_selection_penalty_end = None;
                false
            }
            None => false,
        }
    }

    pub fn clear_event_selection_penalty(&mut self) {
        self.event_selection_penalty_end = None;
    }

    pub fn set_event_selection_penalty(&mut self, seconds: i64) {
        self.event_selection_penalty_end = Some(Utc::now() + Duration::seconds(seconds));
    }

    pub fn player_name(&self) -> &str {
        &self.context.player_name
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn current_state_name(&self) -> &'static str {
        self.state.name()
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, GameState::GameOver)
    }

    /// False only in the initial `Start` state, before the first `started`
    /// admin action has ever been dispatched.
    pub fn is_started(&self) -> bool {
        !matches!(self.state, GameState::Start)
    }

    pub fn is_waiting_for_event(&self) -> bool {
        matches!(self.state, GameState::WaitForEvent)
    }

    /// Dispatches one external action, following any auto-chained admin
    /// actions the entered states generate, and returns the drained,
    /// unprefixed response lines. Prefixing with `"{player}: "` is the
    /// controller's job, not the state machine's — see the module-level
    /// comment in `controller.rs`.
    pub fn on_action(&mut self, action: StateMachineAction) -> Vec<String> {
        match self.dispatch(action, 0) {
            Ok(()) => {}
            Err(GameError::InvalidOperation(reason)) | Err(GameError::ArgsParseError(reason)) => {
                self.context.add_response(reason);
            }
            Err(other) => {
                self.context.add_response(other.to_string());
            }
        }
        self.context.take_responses()
    }

    fn dispatch(&mut self, action: StateMachineAction, depth: usize) -> GameResult<()> {
        if depth >= MAX_CHAIN_DEPTH {
            return Err(GameError::InvalidOperation(
                "Action chain exceeded safety limit".to_string(),
            ));
        }
        if self.handle_generic_action(&action)? {
            return Ok(());
        }
        self.handle_non_generic_action(action, depth)
    }

    fn handle_generic_action(&mut self, action: &StateMachineAction) -> GameResult<bool> {
        match action.command.as_str() {
            commands::HELP => {
                self.show_available_actions();
                Ok(true)
            }
            commands::RESTART => {
                if action.is_given_by_admin {
                    self.state = GameState::Start;
                    self.event_selection_penalty_end = None;
                }
                Ok(true)
            }
            commands::SHOW_FAMILIAR_STATS => {
                let stats = self.context.familiar().stats_to_string();
                self.context.add_response(format!("{stats}."));
                Ok(true)
            }
            commands::SHOW_INVENTORY => {
                let items = self.context.inventory.item_names().join(", ");
                self.context.add_response(format!("You have: {items}."));
                Ok(true)
            }
            commands::SHOW_FLOOR => {
                self.context
                    .add_response(format!("You are on {}F.", self.context.floor + 1));
                Ok(true)
            }
            commands::SHOW_STATE => {
                self.context.add_response(format!("State: {}.", self.state.name()));
                Ok(true)
            }
            commands::GIVE_ITEM => {
                if action.is_given_by_admin {
                    self.handle_give_item(&action.args)?;
                }
                Ok(true)
            }
            commands::RESTORE_HP => {
                if action.is_given_by_admin {
                    self.context.familiar_mut().restore_hp();
                    self.context.add_response("Familiar HP fully restored.");
                }
                Ok(true)
            }
            commands::RESTORE_MP => {
                if action.is_given_by_admin {
                    self.context.familiar_mut().restore_mp();
                    self.context.add_response("Familiar MP fully restored.");
                }
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn handle_give_item(&mut self, args: &[String]) -> GameResult<()> {
        let name = args.first().ok_or_else(|| {
            GameError::ArgsParseError("give_item requires an item name".to_string())
        })?;
        let item = ItemKind::ALL
            .iter()
            .find(|item| item.matches_prefix(name))
            .copied()
            .ok_or_else(|| GameError::ArgsParseError(format!("Unknown item \"{name}\"")))?;
        self.context.inventory.add_item(item)?;
        self.context.add_response(format!("Gave {}.", item.name()));
        Ok(())
    }

    fn show_available_actions(&mut self) {
        let state_specific: Vec<&str> = commands_for_state(self.state.name());
        self.context.add_response(format!(
            "Specific commands: {}.",
            state_specific.join(", ")
        ));
        self.context.add_response(format!(
            "Generic commands: {}.",
            commands::GENERIC_COMMANDS.join(", ")
        ));
    }

    fn handle_non_generic_action(&mut self, action: StateMachineAction, depth: usize) -> GameResult<()> {
        let state_name = self.state.name();
        let Some((target_name, guard)) = lookup_transition(state_name, &action.command) else {
            warn!(
                state = state_name,
                command = %action.command,
                "no transition registered for this state/command pair"
            );
            return Ok(());
        };
        let guard_passes = match guard {
            Guard::Admin => action.is_given_by_admin,
            Guard::User => true,
        };
        if !guard_passes {
            warn!(
                state = state_name,
                command = %action.command,
                "action failed its admin guard"
            );
            return Ok(());
        }
        let next_state = GameState::from_name_args(target_name, &action.args)?;
        self.state = next_state;
        info!(player = %self.context.player_name, state = self.state.name(), "transitioned");
        enter_state(&mut self.context, &self.state)?;
        if self.context.has_action() {
            let chained = self
                .context
                .take_action()
                .expect("has_action just returned true");
            self.dispatch(chained, depth + 1)?;
        }
        Ok(())
    }

    pub fn save(&self) -> GameResult<String> {
        let context_value = serde_json::to_value(&self.context)
            .map_err(|err| GameError::InvalidOperation(format!("failed to serialize context: {err}")))?;
        let envelope = PersistedStateMachine {
            version: PERSISTENCE_VERSION,
            player: self.context.player_name.clone(),
            context: context_value,
            state: PersistedState {
                name: self.state.name().to_string(),
                args: self.state.args(),
            },
            event_selection_penalty_end: self.event_selection_penalty_end,
        };
        serde_json::to_string_pretty(&envelope)
            .map_err(|err| GameError::InvalidOperation(format!("failed to serialize state: {err}")))
    }

    pub fn load(game_config: Arc<GameConfig>, json: &str) -> GameResult<Self> {
        let envelope: PersistedStateMachine = serde_json::from_str(json)
            .map_err(|err| GameError::InvalidOperation(format!("failed to parse save file: {err}")))?;
        if envelope.version != PERSISTENCE_VERSION {
            return Err(GameError::InvalidOperation(format!(
                "unsupported save version {}",
                envelope.version
            )));
        }
        let mut context: Context = serde_json::from_value(envelope.context)
            .map_err(|err| GameError::InvalidOperation(format!("failed to parse context: {err}")))?;
        context.game_config = game_config;
        let state = GameState::from_name_args(&envelope.state.name, &envelope.state.args)?;
        Ok(Self {
            context,
            state,
            event_selection_penalty_end: envelope.event_selection_penalty_end,
        })
    }
}

/// Commands valid from the given state name, for the `help` response.
/// Mirrors `_current_state_transition_table().keys()` in the reference
/// implementation, but driven off the same match arms `lookup_transition`
/// uses instead of a second hand-maintained table.
fn commands_for_state(state_name: &str) -> Vec<&'static str> {
    const ALL_COMMANDS: &[&str] = &[
        commands::STARTED,
        commands::INITIALIZED,
        commands::ENTERED_TOWER,
        commands::GENERATE_EVENT,
        commands::BATTLE_EVENT,
        commands::ITEM_EVENT,
        commands::TRAP_EVENT,
        commands::CHARACTER_EVENT,
        commands::ELEVATOR_EVENT,
        commands::FAMILIAR_EVENT,
        commands::START_BATTLE,
        commands::BATTLE_PREPARE_PHASE,
        commands::USE_ITEM,
        commands::APPROACH,
        commands::BATTLE_PREPARE_PHASE_FINISHED,
        commands::PLAYER_TURN,
        commands::ENEMY_TURN,
        commands::EVENT_FINISHED,
        commands::YOU_DIED,
        commands::ATTACK,
        commands::USE_SPELL,
        commands::FLEE,
        commands::BATTLE_ACTION_PERFORMED,
        commands::CANNOT_USE_SPELL,
        commands::CANNOT_USE_ITEM_PREPARE_PHASE,
        commands::CANNOT_USE_ITEM_BATTLE_PHASE,
        commands::CANNOT_FLEE,
        commands::ACCEPTED,
        commands::REJECTED,
        commands::ITEM_PICKED_UP,
        commands::DROP_ITEM,
        commands::IGNORE,
        commands::GO_UP,
        commands::ENTERED_NEXT_FLOOR,
        commands::RESTART,
        commands::START_ITEM_TRADE,
        commands::START_FAMILIAR_TRADE,
        commands::TRADE_ITEM,
        commands::FUSE,
        commands::REPLACE,
    ];
    ALL_COMMANDS
        .iter()
        .filter(|command| lookup_transition(state_name, command).is_some())
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::traits::{Genus, Talents, UnitTraits};

    fn test_config() -> Arc<GameConfig> {
        let json = r#"{
            "probabilities": {"flee": 0.5},
            "experience_per_level": [10, 20, 30],
            "monsters": [
                {"name": "Dunop", "base_hp": 100, "hp_growth": 10, "base_mp": 20, "mp_growth": 2,
                 "base_attack": 15, "attack_growth": 3, "base_defense": 5, "defense_growth": 1,
                 "base_luck": 4, "luck_growth": 1, "base_exp": 10, "exp_growth": 2, "element": "None"}
            ],
            "special_units": {
                "ghosh": {"name": "Ghosh", "base_hp": 500, "hp_growth": 0, "base_mp": 0, "mp_growth": 0,
                          "base_attack": 50, "attack_growth": 0, "base_defense": 50, "defense_growth": 0,
                          "base_luck": 10, "luck_growth": 0, "base_exp": 0, "exp_growth": 0, "element": "None"}
            },
            "floors": [[{"monster": "Dunop", "level": 1, "weight": 1}]],
            "timers": {"event_interval": 30},
            "player_selection_weights": {"with_penalty": 1, "without_penalty": 3},
            "events_weights": {"battle": 1, "character": 0, "elevator": 0, "item": 0, "trap": 0, "familiar": 0},
            "found_items_weights": {"Pita": 1}
        }"#;
        Arc::new(GameConfig::from_json_str(json).expect("fixture config parses"))
    }

    fn dunop_traits() -> UnitTraits {
        UnitTraits {
            name: "Dunop".into(),
            base_hp: 100,
            hp_growth: 10,
            base_mp: 20,
            mp_growth: 2,
            base_attack: 15,
            attack_growth: 3,
            base_defense: 5,
            defense_growth: 1,
            base_luck: 4,
            luck_growth: 1,
            base_exp_given: 10,
            exp_given_growth: 2,
            native_genus: Genus::Empty,
            native_spell_traits: None,
            talents: Talents::EMPTY,
            is_evolved: false,
        }
    }

    #[test]
    fn started_action_drives_the_machine_into_wait_for_event() {
        let mut sm = StateMachine::new(test_config(), "alice".to_string());
        let responses = sm.on_action(StateMachineAction::admin(commands::STARTED, Vec::new()));
        assert!(!responses.is_empty());
        assert!(sm.is_waiting_for_event());
    }

    #[test]
    fn user_issued_admin_only_command_is_ignored() {
        let mut sm = StateMachine::new(test_config(), "alice".to_string());
        sm.on_action(StateMachineAction::user(commands::STARTED, Vec::new()));
        assert_eq!(sm.current_state_name(), "Start");
    }

    #[test]
    fn save_and_load_round_trips_state_and_context() {
        let config = test_config();
        let mut sm = StateMachine::new(config.clone(), "alice".to_string());
        sm.on_action(StateMachineAction::admin(commands::STARTED, Vec::new()));
        let saved = sm.save().unwrap();
        let loaded = StateMachine::load(config, &saved).unwrap();
        assert_eq!(loaded.current_state_name(), sm.current_state_name());
        assert_eq!(loaded.player_name(), "alice");
    }

    #[test]
    fn restart_from_game_over_returns_to_start() {
        let mut sm = StateMachine::new(test_config(), "alice".to_string());
        sm.state = GameState::GameOver;
        assert!(sm.is_finished());
        sm.on_action(StateMachineAction::admin(commands::RESTART, Vec::new()));
        assert_eq!(sm.current_state_name(), "Start");
        assert!(!sm.is_finished());
    }

    #[test]
    fn generate_event_command_picks_weighted_family_and_dispatches_it() {
        let mut sm = StateMachine::new(test_config(), "alice".to_string());
        sm.on_action(StateMachineAction::admin(commands::STARTED, Vec::new()));
        assert!(sm.is_waiting_for_event());
        // test_config weights all of battle in, so this always lands on BattleEvent.
        let responses =
            sm.on_action(StateMachineAction::admin(commands::GENERATE_EVENT, Vec::new()));
        assert!(!responses.is_empty());
        assert_eq!(sm.current_state_name(), "StartBattle");
    }

    #[test]
    fn event_selection_penalty_expires() {
        let mut sm = StateMachine::new(test_config(), "alice".to_string());
        assert!(!sm.has_event_selection_penalty());
        sm.set_event_selection_penalty(30);
        assert!(sm.has_event_selection_penalty());
        sm.event_selection_penalty_end = Some(chrono::Utc::now() - chrono::Duration::seconds(1));
        assert!(!sm.has_event_selection_penalty());
    }

    #[test]
    fn give_item_admin_command_adds_to_inventory() {
        let mut sm = StateMachine::new(test_config(), "alice".to_string());
        let traits = dunop_traits();
        sm.context.familiar = Some(crate::engine::unit::UnitCreator::new(&traits, 10).create(1));
        sm.on_action(StateMachineAction::admin(
            commands::GIVE_ITEM,
            vec!["Pita".to_string()],
        ));
        assert_eq!(sm.context.inventory.size(), 1);
    }
}
