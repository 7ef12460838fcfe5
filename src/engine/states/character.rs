use rand::Rng;

use crate::engine::commands;
use crate::engine::context::Context;
use crate::engine::errors::{GameError, GameResult};
use crate::engine::inventory::ItemKind;
use crate::engine::unit::{StatusFlags, UnitCreator};

const ENCOUNTERS: &[&str] = &[
    "Cherrl", "Nico", "Patty", "Fur", "Selfi", "Mia", "Vivianne", "Ghosh", "Beldo",
];

pub fn on_enter_character_event(ctx: &mut Context, forced_character: Option<&str>) -> GameResult<()> {
    let character = match forced_character {
        Some(name) => {
            let canonical = ENCOUNTERS
                .iter()
                .find(|c| c.eq_ignore_ascii_case(name))
                .ok_or_else(|| GameError::ArgsParseError("Unknown character".to_string()))?;
            *canonical
        }
        None => {
            let index = ctx.rng().gen_range(0..ENCOUNTERS.len());
            ENCOUNTERS[index]
        }
    };

    let response = match character {
        "Cherrl" => {
            ctx.familiar_mut().restore_hp();
            ctx.familiar_mut().restore_mp();
            ctx.generate_admin_action(commands::EVENT_FINISHED, Vec::new())?;
            "You are fully healed.".to_string()
        }
        "Nico" => {
            ctx.generate_admin_action(commands::EVENT_FINISHED, Vec::new())?;
            "You are cultured.".to_string()
        }
        "Patty" => {
            ctx.familiar_mut().set_status(StatusFlags::STATS_BOOST);
            ctx.generate_admin_action(commands::EVENT_FINISHED, Vec::new())?;
            "You catch the scent of an amazing curry and gobble it without hesitation. \
You feel much stronger and ready for the next battle."
                .to_string()
        }
        "Fur" => handle_fur(ctx)?,
        "Selfi" => handle_selfi(ctx)?,
        "Mia" => {
            ctx.generate_admin_action(commands::EVENT_FINISHED, Vec::new())?;
            "She gazes upon you while mumbling. You leave her alone...".to_string()
        }
        "Vivianne" => {
            ctx.generate_admin_action(commands::EVENT_FINISHED, Vec::new())?;
            "She started dancing. After a while you leave.".to_string()
        }
        "Ghosh" => handle_ghosh(ctx)?,
        "Beldo" => handle_beldo(ctx)?,
        _ => unreachable!("character selection only yields names from ENCOUNTERS"),
    };

    ctx.add_response(format!("You met {character}. {response}"));
    Ok(())
}

fn handle_fur(ctx: &mut Context) -> GameResult<String> {
    if ctx.inventory.is_empty() {
        ctx.generate_admin_action(commands::EVENT_FINISHED, Vec::new())?;
        return Ok(
            "She wanted to offer you an item exchange, but you don't have any items... \
She finds you very uninteresting and leaves with a grumpy face."
                .to_string(),
        );
    }
    let index = ctx.rng().gen_range(0..ItemKind::ALL.len());
    let item = ItemKind::ALL[index];
    ctx.buffer_item(item)?;
    ctx.generate_admin_action(commands::START_ITEM_TRADE, Vec::new())?;
    Ok("She offers you an item exchange.".to_string())
}

fn handle_selfi(ctx: &mut Context) -> GameResult<String> {
    let current_name = ctx.familiar().traits_name.clone();
    let candidates: Vec<String> = ctx
        .game_config
        .monsters_traits
        .keys()
        .filter(|name| **name != current_name)
        .cloned()
        .collect();
    if candidates.is_empty() {
        ctx.generate_admin_action(commands::EVENT_FINISHED, Vec::new())?;
        return Ok("She couldn't find anyone willing to trade and leaves.".to_string());
    }
    let index = ctx.rng().gen_range(0..candidates.len());
    let traits_name = candidates[index].clone();
    let traits = ctx
        .game_config
        .monster_traits(&traits_name)
        .cloned()
        .expect("name drawn from monsters_traits keys");
    let level = ctx.familiar().level;
    let exp = ctx.familiar().exp;
    let max_level = ctx.game_config.levels.max_level();
    let mut offered = UnitCreator::new(&traits, max_level).create(level);
    offered.exp = exp;
    ctx.buffer_unit(offered)?;
    ctx.generate_admin_action(commands::START_FAMILIAR_TRADE, Vec::new())?;
    Ok("She offers you a familiar trade.".to_string())
}

fn handle_ghosh(ctx: &mut Context) -> GameResult<String> {
    let level = ctx.familiar().level;
    let max_level = ctx.game_config.levels.max_level();
    let traits = ctx.game_config.ghosh_traits.clone();
    let ghosh = UnitCreator::new(&traits, max_level).create(level);
    ctx.buffer_unit(ghosh)?;
    ctx.generate_admin_action(commands::START_BATTLE, Vec::new())?;
    Ok("He wants to fight you!".to_string())
}

fn handle_beldo(ctx: &mut Context) -> GameResult<String> {
    let floor = (ctx.floor + 1).min(ctx.game_config.highest_floor());
    let monster = ctx.generate_monster(floor, 1)?;
    ctx.buffer_unit(monster)?;
    ctx.generate_admin_action(commands::START_BATTLE, Vec::new())?;
    Ok("He is accompanied by a strong monster, which takes an interest in you... \
Beldo leaves laughing maniacally."
        .to_string())
}

pub fn on_enter_item_trade(ctx: &mut Context) -> GameResult<()> {
    let item = ctx
        .peek_buffered_item()
        .ok_or_else(|| GameError::InvalidOperation("No item buffered".to_string()))?;
    let inventory_string = ctx.inventory.item_names().join(", ");
    ctx.add_response(format!(
        "You have: {inventory_string}. Fur offers {}. Do you want to trade?",
        item.name()
    ));
    Ok(())
}

pub fn on_enter_item_trade_accepted(ctx: &mut Context, item_index: usize) -> GameResult<()> {
    ctx.inventory.take_item(item_index)?;
    let offered = ctx
        .take_buffered_item()
        .ok_or_else(|| GameError::InvalidOperation("No item buffered".to_string()))?;
    ctx.inventory.add_item(offered)?;
    ctx.add_response(
        "Fur is very happy with what she got. She leaves with a smug smile on her face. \
Maybe you made a mistake...",
    );
    ctx.generate_admin_action(commands::EVENT_FINISHED, Vec::new())
}

pub fn on_enter_item_trade_rejected(ctx: &mut Context) -> GameResult<()> {
    ctx.clear_item_buffer();
    ctx.add_response("Fur leaves looking a bit mad. Maybe you made a mistake...");
    ctx.generate_admin_action(commands::EVENT_FINISHED, Vec::new())
}

pub fn on_enter_familiar_trade(ctx: &mut Context) -> GameResult<()> {
    let offered_description = ctx
        .peek_buffered_unit()
        .ok_or_else(|| GameError::InvalidOperation("No familiar buffered".to_string()))?
        .to_display_string();
    let familiar_description = ctx.familiar().to_display_string();
    ctx.add_response(format!(
        "You have: {familiar_description}. Selfi offers {offered_description}. Do you want to trade?"
    ));
    Ok(())
}

pub fn on_enter_familiar_trade_accepted(ctx: &mut Context) -> GameResult<()> {
    let offered = ctx
        .take_buffered_unit()
        .ok_or_else(|| GameError::InvalidOperation("No familiar buffered".to_string()))?;
    ctx.familiar = Some(offered);
    ctx.add_response("Selfi happily says \"Thank you!\" and quickly walks away with your familiar.");
    ctx.generate_admin_action(commands::EVENT_FINISHED, Vec::new())
}

pub fn on_enter_familiar_trade_rejected(ctx: &mut Context) -> GameResult<()> {
    ctx.clear_unit_buffer();
    ctx.add_response("Selfi turns around and leaves immediately, muttering to herself.");
    ctx.generate_admin_action(commands::EVENT_FINISHED, Vec::new())
}
