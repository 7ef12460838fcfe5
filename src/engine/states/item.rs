use rand::Rng;

use crate::engine::commands;
use crate::engine::context::Context;
use crate::engine::errors::{GameError, GameResult};
use crate::engine::inventory::ItemKind;

pub fn on_enter_item_event(ctx: &mut Context, forced_item: Option<&str>) -> GameResult<()> {
    let item = select_item(ctx, forced_item)?;
    ctx.buffer_item(item)?;
    ctx.add_response(format!(
        "You come across {}. Do you want to pick it up?",
        item.name()
    ));
    Ok(())
}

fn select_item(ctx: &mut Context, forced_item: Option<&str>) -> GameResult<ItemKind> {
    if let Some(name) = forced_item {
        return ItemKind::ALL
            .iter()
            .find(|item| item.matches_prefix(name))
            .copied()
            .ok_or_else(|| GameError::ArgsParseError("Unknown item".to_string()));
    }
    let weights: Vec<(ItemKind, u32)> = ItemKind::ALL
        .iter()
        .map(|item| {
            let weight = ctx
                .game_config
                .found_items_weights
                .get(item.name())
                .copied()
                .unwrap_or(0);
            (*item, weight)
        })
        .collect();
    let total: u32 = weights.iter().map(|(_, w)| w).sum();
    let mut pick = ctx.rng().gen_range(0..total.max(1));
    for (item, weight) in &weights {
        if pick < *weight {
            return Ok(*item);
        }
        pick = pick.saturating_sub(*weight);
    }
    Ok(weights.last().expect("catalog is non-empty").0)
}

pub fn on_enter_item_pick_up(ctx: &mut Context) -> GameResult<()> {
    if !ctx.inventory.is_full() {
        let item = ctx
            .take_buffered_item()
            .ok_or_else(|| GameError::InvalidOperation("No item buffered".to_string()))?;
        ctx.inventory.add_item(item)?;
        ctx.add_response(format!("You picked up {}.", item.name()));
        ctx.generate_admin_action(commands::ITEM_PICKED_UP, Vec::new())
    } else {
        let items = ctx.inventory.item_names().join(", ");
        ctx.add_response(format!(
            "Your inventory is full. You need to drop one of your current items first. You have: {items}."
        ));
        Ok(())
    }
}

pub fn on_enter_item_pick_up_full_inventory(ctx: &mut Context, item_index: usize) -> GameResult<()> {
    let dropped = ctx.inventory.take_item(item_index)?;
    let picked_up = ctx
        .take_buffered_item()
        .ok_or_else(|| GameError::InvalidOperation("No item buffered".to_string()))?;
    ctx.inventory.add_item(picked_up)?;
    ctx.add_response(format!(
        "You dropped {} and picked up {}.",
        dropped.name(),
        picked_up.name()
    ));
    ctx.generate_admin_action(commands::ITEM_PICKED_UP, Vec::new())
}

pub fn on_enter_item_pick_up_ignored(ctx: &mut Context) -> GameResult<()> {
    let item = ctx
        .take_buffered_item()
        .ok_or_else(|| GameError::InvalidOperation("No item buffered".to_string()))?;
    ctx.add_response(format!("You left {} behind and went away.", item.name()));
    ctx.generate_admin_action(commands::EVENT_FINISHED, Vec::new())
}

pub fn on_enter_item_event_finished(ctx: &mut Context) -> GameResult<()> {
    ctx.clear_item_buffer();
    ctx.generate_admin_action(commands::EVENT_FINISHED, Vec::new())
}
