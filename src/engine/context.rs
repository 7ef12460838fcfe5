use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::engine::commands::StateMachineAction;
use crate::engine::config::GameConfig;
use crate::engine::errors::{GameError, GameResult};
use crate::engine::inventory::{Inventory, ItemKind};
use crate::engine::unit::{Unit, UnitCreator};

/// Sentinel inserted into the response queue; the controller slices outbound
/// messages at this marker instead of emitting one chat line per response.
pub const RESPONSE_LINE_BREAK: &str = "\u{0}";

/// Mutable per-battle state. Created by `start_battle`, destroyed by
/// `finish_battle`/`clear_battle_context`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattleContext {
    pub enemy: Unit,
    prepare_phase_counter: i64,
    holy_scroll_counter: i64,
    pub is_player_turn: bool,
    finished: bool,
}

impl BattleContext {
    pub fn new(enemy: Unit) -> Self {
        Self {
            enemy,
            prepare_phase_counter: 0,
            holy_scroll_counter: 0,
            is_player_turn: false,
            finished: false,
        }
    }

    pub fn start_prepare_phase(&mut self, counter: i64) {
        self.prepare_phase_counter = counter;
    }

    pub fn is_prepare_phase(&self) -> bool {
        self.prepare_phase_counter > 0
    }

    pub fn dec_prepare_phase_counter(&mut self) {
        self.prepare_phase_counter -= 1;
    }

    pub fn finish_prepare_phase(&mut self) {
        self.prepare_phase_counter = 0;
    }

    pub fn is_holy_scroll_active(&self) -> bool {
        self.holy_scroll_counter > 0
    }

    pub fn dec_holy_scroll_counter(&mut self) {
        self.holy_scroll_counter -= 1;
    }

    pub fn set_holy_scroll_counter(&mut self, counter: i64) {
        self.holy_scroll_counter = counter;
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn finish_battle(&mut self) {
        self.finished = true;
    }
}

/// Per-player mutable state threaded through every state's `on_enter`.
#[derive(Serialize, Deserialize)]
pub struct Context {
    #[serde(skip, default = "GameConfig::empty_shared")]
    pub game_config: Arc<GameConfig>,
    pub player_name: String,
    pub floor: i64,
    pub familiar: Option<Unit>,
    pub inventory: Inventory,
    pub battle_context: Option<BattleContext>,
    item_buffer: Option<ItemKind>,
    unit_buffer: Option<Unit>,
    pub is_tutorial_done: bool,
    #[serde(skip, default = "default_rng")]
    rng: StdRng,
    #[serde(skip)]
    responses: Vec<String>,
    #[serde(skip)]
    generated_action: Option<StateMachineAction>,
}

fn default_rng() -> StdRng {
    StdRng::from_entropy()
}

impl Context {
    pub fn new(game_config: Arc<GameConfig>, player_name: String) -> Self {
        Self {
            game_config,
            player_name,
            floor: 0,
            familiar: None,
            inventory: Inventory::new(20),
            battle_context: None,
            item_buffer: None,
            unit_buffer: None,
            is_tutorial_done: false,
            rng: default_rng(),
            responses: Vec::new(),
            generated_action: None,
        }
    }

    pub fn familiar(&self) -> &Unit {
        self.familiar.as_ref().expect("familiar not initialized")
    }

    pub fn familiar_mut(&mut self) -> &mut Unit {
        self.familiar.as_mut().expect("familiar not initialized")
    }

    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    pub fn does_action_succeed(&mut self, success_chance: f64) -> bool {
        self.rng.gen::<f64>() < success_chance
    }

    pub fn clear_item_buffer(&mut self) {
        self.item_buffer = None;
    }

    pub fn buffer_item(&mut self, item: ItemKind) -> GameResult<()> {
        if let Some(buffered) = self.item_buffer {
            return Err(GameError::InvalidOperation(format!(
                "Item already buffered - {}",
                buffered.name()
            )));
        }
        self.item_buffer = Some(item);
        Ok(())
    }

    pub fn peek_buffered_item(&self) -> Option<ItemKind> {
        self.item_buffer
    }

    pub fn take_buffered_item(&mut self) -> Option<ItemKind> {
        let item = self.item_buffer;
        self.clear_item_buffer();
        item
    }

    pub fn clear_unit_buffer(&mut self) {
        self.unit_buffer = None;
    }

    pub fn buffer_unit(&mut self, unit: Unit) -> GameResult<()> {
        if self.unit_buffer.is_some() {
            return Err(GameError::InvalidOperation(
                "Unit already buffered".to_string(),
            ));
        }
        self.unit_buffer = Some(unit);
        Ok(())
    }

    pub fn peek_buffered_unit(&self) -> Option<&Unit> {
        self.unit_buffer.as_ref()
    }

    pub fn take_buffered_unit(&mut self) -> Option<Unit> {
        self.unit_buffer.take()
    }

    pub fn is_in_battle(&self) -> bool {
        self.battle_context.is_some()
    }

    pub fn clear_battle_context(&mut self) {
        self.battle_context = None;
    }

    pub fn start_battle(&mut self, enemy: Unit) -> GameResult<()> {
        if self.is_in_battle() {
            return Err(GameError::InvalidOperation(format!(
                "Battle already started - {}",
                enemy.name
            )));
        }
        self.battle_context = Some(BattleContext::new(enemy));
        Ok(())
    }

    pub fn finish_battle(&mut self) -> GameResult<()> {
        if !self.is_in_battle() {
            return Err(GameError::InvalidOperation("Battle not started".to_string()));
        }
        self.clear_battle_context();
        Ok(())
    }

    pub fn generate_monster(&mut self, floor: i64, level_increase: i64) -> GameResult<Unit> {
        let highest_floor = self.game_config.highest_floor();
        if floor > highest_floor {
            return Err(GameError::InvalidOperation(format!(
                "Highest floor is {highest_floor}"
            )));
        }
        let floor_descriptor = &self.game_config.floors[floor as usize];
        let entry = floor_descriptor.pick_weighted(&mut self.rng);
        let traits = self
            .game_config
            .monster_traits(&entry.monster)
            .expect("floor validation guarantees monster traits exist");
        let max_level = self.game_config.levels.max_level();
        let level = (entry.level + level_increase).min(max_level);
        Ok(UnitCreator::new(traits, max_level).create(level))
    }

    pub fn generate_action(&mut self, action: StateMachineAction) -> GameResult<()> {
        if self.generated_action.is_some() {
            return Err(GameError::InvalidOperation(format!(
                "Already generated - {}",
                self.generated_action.as_ref().unwrap().command
            )));
        }
        self.generated_action = Some(action);
        Ok(())
    }

    pub fn generate_admin_action(&mut self, command: &str, args: Vec<String>) -> GameResult<()> {
        self.generate_action(StateMachineAction::admin(command, args))
    }

    pub fn has_action(&self) -> bool {
        self.generated_action.is_some()
    }

    pub fn take_action(&mut self) -> Option<StateMachineAction> {
        self.generated_action.take()
    }

    pub fn add_response(&mut self, response: impl Into<String>) {
        self.responses.push(response.into());
    }

    pub fn add_response_line_break(&mut self) {
        self.responses.push(RESPONSE_LINE_BREAK.to_string());
    }

    pub fn take_responses(&mut self) -> Vec<String> {
        std::mem::take(&mut self.responses)
    }
}
