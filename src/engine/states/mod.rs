pub mod battle;
pub mod character;
pub mod core;
pub mod elevator;
pub mod familiar;
pub mod item;
pub mod trap;

use serde::{Deserialize, Serialize};

use crate::engine::errors::{GameError, GameResult};

/// Every reachable state, named and carrying only the data persistence
/// needs to reconstruct it without re-running `on_enter`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameState {
    Start,
    Initialize { familiar_name: Option<String> },
    EnterTower,
    WaitForEvent,
    GenerateEvent,
    GameOver,

    BattleEvent,
    StartBattle,
    BattlePreparePhase,
    BattleApproach,
    BattlePhase,
    BattlePlayerTurn,
    BattleAttack,
    BattleUseSpell,
    BattleUseItem { item_index: usize },
    BattleTryToFlee,
    BattleEnemyTurn,

    ItemEvent { forced_item: Option<String> },
    ItemPickUp,
    ItemPickUpFullInventory { item_index: usize },
    ItemPickUpIgnored,
    ItemEventFinished,

    TrapEvent { forced_trap: Option<String> },

    ElevatorEvent,
    GoUp,
    ElevatorOmitted,
    NextFloor,

    CharacterEvent { forced_character: Option<String> },
    ItemTrade,
    ItemTradeAccepted { item_index: usize },
    ItemTradeRejected,
    FamiliarTrade,
    FamiliarTradeAccepted,
    FamiliarTradeRejected,

    FamiliarEvent { forced_monster: Option<String> },
    MetFamiliarIgnore,
    FamiliarFusion,
    FamiliarReplacement,
}

fn args_parse_error(reason: impl Into<String>) -> GameError {
    GameError::ArgsParseError(reason.into())
}

impl GameState {
    pub fn name(&self) -> &'static str {
        match self {
            GameState::Start => "Start",
            GameState::Initialize { .. } => "Initialize",
            GameState::EnterTower => "EnterTower",
            GameState::WaitForEvent => "WaitForEvent",
            GameState::GenerateEvent => "GenerateEvent",
            GameState::GameOver => "GameOver",
            GameState::BattleEvent => "BattleEvent",
            GameState::StartBattle => "StartBattle",
            GameState::BattlePreparePhase => "BattlePreparePhase",
            GameState::BattleApproach => "BattleApproach",
            GameState::BattlePhase => "BattlePhase",
            GameState::BattlePlayerTurn => "BattlePlayerTurn",
            GameState::BattleAttack => "BattleAttack",
            GameState::BattleUseSpell => "BattleUseSpell",
            GameState::BattleUseItem { .. } => "BattleUseItem",
            GameState::BattleTryToFlee => "BattleTryToFlee",
            GameState::BattleEnemyTurn => "BattleEnemyTurn",
            GameState::ItemEvent { .. } => "ItemEvent",
            GameState::ItemPickUp => "ItemPickUp",
            GameState::ItemPickUpFullInventory { .. } => "ItemPickUpFullInventory",
            GameState::ItemPickUpIgnored => "ItemPickUpIgnored",
            GameState::ItemEventFinished => "ItemEventFinished",
            GameState::TrapEvent { .. } => "TrapEvent",
            GameState::ElevatorEvent => "ElevatorEvent",
            GameState::GoUp => "GoUp",
            GameState::ElevatorOmitted => "ElevatorOmitted",
            GameState::NextFloor => "NextFloor",
            GameState::CharacterEvent { .. } => "CharacterEvent",
            GameState::ItemTrade => "ItemTrade",
            GameState::ItemTradeAccepted { .. } => "ItemTradeAccepted",
            GameState::ItemTradeRejected => "ItemTradeRejected",
            GameState::FamiliarTrade => "FamiliarTrade",
            GameState::FamiliarTradeAccepted => "FamiliarTradeAccepted",
            GameState::FamiliarTradeRejected => "FamiliarTradeRejected",
            GameState::FamiliarEvent { .. } => "FamiliarEvent",
            GameState::MetFamiliarIgnore => "MetFamiliarIgnore",
            GameState::FamiliarFusion => "FamiliarFusion",
            GameState::FamiliarReplacement => "FamiliarReplacement",
        }
    }

    /// Positional constructor arguments, round-tripped through persistence.
    pub fn args(&self) -> Vec<String> {
        match self {
            GameState::Initialize { familiar_name } => opt_arg(familiar_name),
            GameState::BattleUseItem { item_index } => vec![item_index.to_string()],
            GameState::ItemEvent { forced_item } => opt_arg(forced_item),
            GameState::ItemPickUpFullInventory { item_index } => vec![item_index.to_string()],
            GameState::TrapEvent { forced_trap } => opt_arg(forced_trap),
            GameState::CharacterEvent { forced_character } => opt_arg(forced_character),
            GameState::ItemTradeAccepted { item_index } => vec![item_index.to_string()],
            GameState::FamiliarEvent { forced_monster } => opt_arg(forced_monster),
            _ => Vec::new(),
        }
    }

    pub fn from_name_args(name: &str, args: &[String]) -> GameResult<GameState> {
        Ok(match name {
            "Start" => GameState::Start,
            "Initialize" => GameState::Initialize {
                familiar_name: args.first().cloned(),
            },
            "EnterTower" => GameState::EnterTower,
            "WaitForEvent" => GameState::WaitForEvent,
            "GenerateEvent" => GameState::GenerateEvent,
            "GameOver" => GameState::GameOver,
            "BattleEvent" => GameState::BattleEvent,
            "StartBattle" => GameState::StartBattle,
            "BattlePreparePhase" => GameState::BattlePreparePhase,
            "BattleApproach" => GameState::BattleApproach,
            "BattlePhase" => GameState::BattlePhase,
            "BattlePlayerTurn" => GameState::BattlePlayerTurn,
            "BattleAttack" => GameState::BattleAttack,
            "BattleUseSpell" => GameState::BattleUseSpell,
            "BattleUseItem" => GameState::BattleUseItem {
                item_index: parse_index(args)?,
            },
            "BattleTryToFlee" => GameState::BattleTryToFlee,
            "BattleEnemyTurn" => GameState::BattleEnemyTurn,
            "ItemEvent" => GameState::ItemEvent {
                forced_item: args.first().cloned(),
            },
            "ItemPickUp" => GameState::ItemPickUp,
            "ItemPickUpFullInventory" => GameState::ItemPickUpFullInventory {
                item_index: parse_index(args)?,
            },
            "ItemPickUpIgnored" => GameState::ItemPickUpIgnored,
            "ItemEventFinished" => GameState::ItemEventFinished,
            "TrapEvent" => GameState::TrapEvent {
                forced_trap: args.first().cloned(),
            },
            "ElevatorEvent" => GameState::ElevatorEvent,
            "GoUp" => GameState::GoUp,
            "ElevatorOmitted" => GameState::ElevatorOmitted,
            "NextFloor" => GameState::NextFloor,
            "CharacterEvent" => GameState::CharacterEvent {
                forced_character: args.first().cloned(),
            },
            "ItemTrade" => GameState::ItemTrade,
            "ItemTradeAccepted" => GameState::ItemTradeAccepted {
                item_index: parse_index(args)?,
            },
            "ItemTradeRejected" => GameState::ItemTradeRejected,
            "FamiliarTrade" => GameState::FamiliarTrade,
            "FamiliarTradeAccepted" => GameState::FamiliarTradeAccepted,
            "FamiliarTradeRejected" => GameState::FamiliarTradeRejected,
            "FamiliarEvent" => GameState::FamiliarEvent {
                forced_monster: args.first().cloned(),
            },
            "MetFamiliarIgnore" => GameState::MetFamiliarIgnore,
            "FamiliarFusion" => GameState::FamiliarFusion,
            "FamiliarReplacement" => GameState::FamiliarReplacement,
            other => return Err(args_parse_error(format!("Unknown state \"{other}\""))),
        })
    }
}

fn opt_arg(value: &Option<String>) -> Vec<String> {
    value.iter().cloned().collect()
}

fn parse_index(args: &[String]) -> GameResult<usize> {
    args.first()
        .ok_or_else(|| args_parse_error("missing item index"))?
        .parse()
        .map_err(|_| args_parse_error("item index is not a number"))
}
