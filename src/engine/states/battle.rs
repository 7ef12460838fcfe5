use crate::engine::commands;
use crate::engine::context::Context;
use crate::engine::damage::{self, DamageRoll, RelativeHeight};
use crate::engine::errors::{GameError, GameResult};
use crate::engine::items;
use crate::engine::stats::StatsCalculator;

/// Prepare-phase approach countdown seeded when a battle starts. Not
/// configured per floor; every encounter gives the same two turns to use an
/// out-of-combat item before the enemy closes in.
const DEFAULT_APPROACH_TURNS: i64 = 2;

pub fn on_enter_battle_event(ctx: &mut Context) -> GameResult<()> {
    let monster = ctx.generate_monster(ctx.floor, 0)?;
    ctx.buffer_unit(monster)?;
    ctx.generate_admin_action(commands::START_BATTLE, Vec::new())
}

pub fn on_enter_start_battle(ctx: &mut Context) -> GameResult<()> {
    let enemy = ctx
        .take_buffered_unit()
        .ok_or_else(|| GameError::InvalidOperation("No enemy buffered".to_string()))?;
    ctx.add_response(format!(
        "You encountered LVL {} {} ({} HP).",
        enemy.level, enemy.name, enemy.hp
    ));
    ctx.start_battle(enemy)?;
    ctx.battle_context
        .as_mut()
        .expect("just started")
        .start_prepare_phase(DEFAULT_APPROACH_TURNS);
    ctx.generate_admin_action(commands::BATTLE_PREPARE_PHASE, Vec::new())
}

pub fn on_enter_battle_prepare_phase(ctx: &mut Context) -> GameResult<()> {
    let is_prepare_phase = ctx
        .battle_context
        .as_ref()
        .expect("in battle")
        .is_prepare_phase();
    if is_prepare_phase {
        ctx.add_response("The enemy is approaching. You can 'approach' or use an item.");
        Ok(())
    } else {
        ctx.generate_admin_action(commands::BATTLE_PREPARE_PHASE_FINISHED, Vec::new())
    }
}

pub fn on_enter_battle_approach(ctx: &mut Context) -> GameResult<()> {
    let battle = ctx.battle_context.as_mut().expect("in battle");
    battle.dec_prepare_phase_counter();
    if battle.is_prepare_phase() {
        ctx.add_response("You approach carefully.");
        ctx.generate_admin_action(commands::BATTLE_PREPARE_PHASE, Vec::new())
    } else {
        battle.finish_prepare_phase();
        ctx.add_response("The enemy is now within striking range.");
        ctx.generate_admin_action(commands::BATTLE_PREPARE_PHASE_FINISHED, Vec::new())
    }
}

pub fn on_enter_battle_phase(ctx: &mut Context) -> GameResult<()> {
    let enemy_dead = ctx.battle_context.as_ref().expect("in battle").enemy.is_dead();
    let familiar_dead = ctx.familiar().is_dead();
    if enemy_dead || familiar_dead {
        if enemy_dead {
            award_victory(ctx)?;
            ctx.add_response("You defeated a monster!".to_string());
            ctx.finish_battle()?;
            ctx.generate_admin_action(commands::EVENT_FINISHED, Vec::new())
        } else {
            ctx.add_response("You died...");
            ctx.finish_battle()?;
            ctx.generate_admin_action(commands::YOU_DIED, Vec::new())
        }
    } else {
        let battle = ctx.battle_context.as_mut().expect("in battle");
        battle.is_player_turn = !battle.is_player_turn;
        let is_player_turn = battle.is_player_turn;
        if is_player_turn {
            ctx.generate_admin_action(commands::PLAYER_TURN, Vec::new())
        } else {
            ctx.generate_admin_action(commands::ENEMY_TURN, Vec::new())
        }
    }
}

fn award_victory(ctx: &mut Context) -> GameResult<()> {
    if ctx.familiar().is_max_level() {
        return Ok(());
    }
    let (enemy_level, enemy_name) = {
        let battle = ctx.battle_context.as_ref().expect("in battle");
        (battle.enemy.level, battle.enemy.name.clone())
    };
    let traits = ctx
        .game_config
        .unit_traits(&enemy_name)
        .cloned()
        .ok_or_else(|| GameError::InvalidOperation(format!("Unknown unit traits \"{enemy_name}\"")))?;
    let mut given_exp = StatsCalculator::new(&traits).given_experience(enemy_level);
    if enemy_level > ctx.familiar().level {
        given_exp *= 2;
    }
    let levels = ctx.game_config.levels.clone();
    ctx.familiar_mut()
        .gain_exp(given_exp, |level| levels.experience_for_next_level(level));
    ctx.add_response(format!("You gained {given_exp} EXP."));
    Ok(())
}

pub fn on_enter_battle_player_turn(ctx: &mut Context) -> GameResult<()> {
    ctx.add_response("Your turn.");
    Ok(())
}

pub fn on_enter_battle_attack(ctx: &mut Context) -> GameResult<()> {
    let rng = ctx.rng();
    let roll = DamageRoll::sample(rng);
    let familiar = ctx.familiar().clone();
    let hits = damage::does_hit(&familiar, ctx.rng());
    if !hits {
        ctx.add_response("You attack, but miss.");
        return ctx.generate_admin_action(commands::BATTLE_ACTION_PERFORMED, Vec::new());
    }
    let critical = damage::is_critical(&familiar, ctx.rng());
    let enemy = ctx.battle_context.as_ref().expect("in battle").enemy.clone();
    let damage = damage::physical_damage(&familiar, &enemy, roll, RelativeHeight::Same, critical);
    let battle = ctx.battle_context.as_mut().expect("in battle");
    battle.enemy.deal_damage(damage);
    let (enemy_name, enemy_hp) = (battle.enemy.name.clone(), battle.enemy.hp);
    ctx.add_response(format!(
        "You dealt {damage} damage. {enemy_name} has {enemy_hp} HP left."
    ));
    ctx.generate_admin_action(commands::BATTLE_ACTION_PERFORMED, Vec::new())
}

pub fn on_enter_battle_use_spell(ctx: &mut Context) -> GameResult<()> {
    if !ctx.familiar().has_enough_mp_for_spell() {
        ctx.add_response("You don't have enough MP to cast your spell.");
        return ctx.generate_admin_action(commands::CANNOT_USE_SPELL, Vec::new());
    }
    let familiar = ctx.familiar().clone();
    let enemy = ctx.battle_context.as_ref().expect("in battle").enemy.clone();
    let damage = damage::spell_damage(&familiar, &enemy);
    let mp_cost = familiar.spell_mp_cost();
    ctx.familiar_mut().use_mp(mp_cost);
    let battle = ctx.battle_context.as_mut().expect("in battle");
    battle.enemy.deal_damage(damage);
    let (enemy_name, enemy_hp) = (battle.enemy.name.clone(), battle.enemy.hp);
    ctx.add_response(format!(
        "Your spell dealt {damage} damage. {enemy_name} has {enemy_hp} HP left."
    ));
    ctx.generate_admin_action(commands::BATTLE_ACTION_PERFORMED, Vec::new())
}

pub fn on_enter_battle_use_item(ctx: &mut Context, item_index: usize) -> GameResult<()> {
    let is_prepare_phase = ctx
        .battle_context
        .as_ref()
        .expect("in battle")
        .is_prepare_phase();
    let item = ctx.inventory.peek_item(item_index)?;
    if is_prepare_phase && item.is_battle_only() {
        ctx.add_response(format!(
            "You cannot use {} while the enemy is still approaching.",
            item.name()
        ));
        return ctx.generate_admin_action(commands::CANNOT_USE_ITEM_PREPARE_PHASE, Vec::new());
    }
    match items::use_item(ctx, item) {
        Ok(effect) => {
            ctx.inventory.take_item(item_index)?;
            ctx.add_response(format!("You used {}. {effect}", item.name()));
            if is_prepare_phase {
                ctx.generate_admin_action(commands::BATTLE_PREPARE_PHASE_ACTION_PERFORMED, Vec::new())
            } else {
                ctx.generate_admin_action(commands::BATTLE_ACTION_PERFORMED, Vec::new())
            }
        }
        Err(GameError::InvalidOperation(reason)) => {
            ctx.add_response(reason);
            if is_prepare_phase {
                ctx.generate_admin_action(commands::CANNOT_USE_ITEM_PREPARE_PHASE, Vec::new())
            } else {
                ctx.generate_admin_action(commands::CANNOT_USE_ITEM_BATTLE_PHASE, Vec::new())
            }
        }
        Err(other) => Err(other),
    }
}

pub fn on_enter_battle_try_to_flee(ctx: &mut Context) -> GameResult<()> {
    let flee_chance = ctx.game_config.probabilities.flee;
    if ctx.does_action_succeed(flee_chance) {
        ctx.add_response("You successfully fleed from the battle.");
        ctx.finish_battle()?;
        ctx.generate_admin_action(commands::EVENT_FINISHED, Vec::new())
    } else {
        ctx.add_response("You attempted to flee from the battle, but the monster caught up with you.");
        ctx.generate_admin_action(commands::BATTLE_ACTION_PERFORMED, Vec::new())
    }
}

pub fn on_enter_battle_enemy_turn(ctx: &mut Context) -> GameResult<()> {
    let enemy = ctx.battle_context.as_ref().expect("in battle").enemy.clone();
    let rng = ctx.rng();
    let roll = DamageRoll::sample(rng);
    let hits = damage::does_hit(&enemy, ctx.rng());
    if !hits {
        ctx.add_response(format!("{} attacks, but misses.", enemy.name));
        return ctx.generate_admin_action(commands::BATTLE_ACTION_PERFORMED, Vec::new());
    }
    let critical = damage::is_critical(&enemy, ctx.rng());
    let familiar = ctx.familiar().clone();
    let damage = damage::physical_damage(&enemy, &familiar, roll, RelativeHeight::Same, critical);
    ctx.familiar_mut().deal_damage(damage);
    let familiar_hp = ctx.familiar().hp;
    ctx.add_response(format!(
        "{} dealt {damage} damage. You have {familiar_hp} HP left.",
        enemy.name
    ));
    ctx.generate_admin_action(commands::BATTLE_ACTION_PERFORMED, Vec::new())
}
