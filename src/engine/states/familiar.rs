use rand::Rng;

use crate::engine::commands;
use crate::engine::context::Context;
use crate::engine::errors::{GameError, GameResult};
use crate::engine::unit::UnitCreator;

pub fn on_enter_familiar_event(ctx: &mut Context, forced_monster: Option<&str>) -> GameResult<()> {
    let traits_name = match forced_monster {
        Some(name) => name.to_string(),
        None => {
            let names: Vec<String> = ctx.game_config.monsters_traits.keys().cloned().collect();
            let index = ctx.rng().gen_range(0..names.len());
            names[index].clone()
        }
    };
    let traits = ctx
        .game_config
        .monster_traits(&traits_name)
        .cloned()
        .ok_or_else(|| GameError::ArgsParseError(format!("Unknown monster \"{traits_name}\"")))?;
    let level = ctx.familiar().level;
    let max_level = ctx.game_config.levels.max_level();
    let met = UnitCreator::new(&traits, max_level).create(level);
    let description = met.to_display_string();
    ctx.buffer_unit(met)?;
    ctx.add_response(format!(
        "You come across a lonely {description}. It looks like it wants to join you. \
But you already have a familiar..."
    ));
    Ok(())
}

pub fn on_enter_met_familiar_ignore(ctx: &mut Context) -> GameResult<()> {
    let met = ctx
        .take_buffered_unit()
        .ok_or_else(|| GameError::InvalidOperation("No familiar buffered".to_string()))?;
    ctx.add_response(format!(
        "As you are walking away you can see {}'s sad face.",
        met.name
    ));
    ctx.generate_admin_action(commands::EVENT_FINISHED, Vec::new())
}

pub fn on_enter_familiar_fusion(ctx: &mut Context) -> GameResult<()> {
    let met = ctx
        .take_buffered_unit()
        .ok_or_else(|| GameError::InvalidOperation("No familiar buffered".to_string()))?;
    let met_name = met.name.clone();
    ctx.familiar_mut().fuse(met);
    let result_description = ctx.familiar().to_display_string();
    ctx.add_response(format!(
        "Fusion of your familiar and {met_name} results in {result_description}."
    ));
    ctx.generate_admin_action(commands::EVENT_FINISHED, Vec::new())
}

pub fn on_enter_familiar_replacement(ctx: &mut Context) -> GameResult<()> {
    let met = ctx
        .take_buffered_unit()
        .ok_or_else(|| GameError::InvalidOperation("No familiar buffered".to_string()))?;
    let left_behind = ctx.familiar().name.clone();
    let met_name = met.name.clone();
    ctx.familiar = Some(met);
    ctx.add_response(format!(
        "You took {met_name} with you, leaving sad {left_behind} behind."
    ));
    ctx.generate_admin_action(commands::EVENT_FINISHED, Vec::new())
}
