use rand::Rng;

use crate::engine::commands;
use crate::engine::context::Context;
use crate::engine::errors::GameResult;
use crate::engine::inventory::ItemKind;
use crate::engine::unit::UnitCreator;

/// `Start` accepts only admin `started` and has no effect of its own.
pub fn on_enter_start(_ctx: &mut Context) -> GameResult<()> {
    Ok(())
}

pub fn on_enter_initialize(ctx: &mut Context, familiar_name: Option<&str>) -> GameResult<()> {
    ctx.floor = 0;
    let traits_name = match familiar_name {
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
        .ok_or_else(|| {
            crate::engine::errors::GameError::InvalidOperation(format!(
                "Unknown familiar traits \"{traits_name}\""
            ))
        })?;
    let max_level = ctx.game_config.levels.max_level();
    ctx.familiar = Some(UnitCreator::new(&traits, max_level).create(1));
    ctx.add_response(format!(
        "You entered the Monster Tower and you found a newborn {traits_name}. \
It smiles at you and wants to join you in your adventure."
    ));

    ctx.inventory.clear();
    ctx.inventory.add_item(ItemKind::Pita)?;
    ctx.inventory.add_item(ItemKind::MedicinalHerb)?;

    if !ctx.is_tutorial_done {
        ctx.add_response(
            "Welcome! Use 'help' at any time to see what you can do. Good luck on your climb.",
        );
        ctx.is_tutorial_done = true;
    }

    ctx.generate_admin_action(commands::INITIALIZED, Vec::new())
}

/// Transient: exists only to carry the `initialized -> entered_tower`
/// narration step, matching spec.md's `Initialize -> EnterTower ->
/// WaitForEvent` chain.
pub fn on_enter_enter_tower(ctx: &mut Context) -> GameResult<()> {
    ctx.generate_admin_action(commands::ENTERED_TOWER, Vec::new())
}

pub fn on_enter_wait_for_event(_ctx: &mut Context) -> GameResult<()> {
    Ok(())
}

/// Transient: weighted-picks one of the six event families and immediately
/// auto-generates its admin `_event` command.
pub fn on_enter_generate_event(ctx: &mut Context) -> GameResult<()> {
    let command = pick_event_command(ctx);
    ctx.generate_admin_action(command, Vec::new())
}

fn pick_event_command(ctx: &mut Context) -> &'static str {
    let entries = ctx.game_config.events_weights.weighted_entries();
    let total: u32 = entries.iter().map(|(_, weight)| weight).sum();
    let mut pick = ctx.rng().gen_range(0..total.max(1));
    for (family, weight) in &entries {
        if pick < *weight {
            return event_family_command(family);
        }
        pick = pick.saturating_sub(*weight);
    }
    event_family_command(entries.last().expect("events_weights validated non-empty").0)
}

/// Maps an `events_weights` table key to the admin command that starts
/// that event family.
fn event_family_command(family: &str) -> &'static str {
    match family {
        "battle" => commands::BATTLE_EVENT,
        "character" => commands::CHARACTER_EVENT,
        "elevator" => commands::ELEVATOR_EVENT,
        "item" => commands::ITEM_EVENT,
        "trap" => commands::TRAP_EVENT,
        "familiar" => commands::FAMILIAR_EVENT,
        other => unreachable!("weighted_entries only yields known family names, got {other}"),
    }
}

pub fn on_enter_game_over(ctx: &mut Context) -> GameResult<()> {
    ctx.generate_admin_action(commands::RESTART, Vec::new())
}
