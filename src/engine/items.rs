use crate::engine::context::Context;
use crate::engine::errors::{GameError, GameResult};
use crate::engine::inventory::ItemKind;

/// Returns `Err(reason)` when the item cannot be used right now.
pub fn can_use(ctx: &Context, item: ItemKind) -> Result<(), &'static str> {
    match item {
        ItemKind::Pita => {
            if ctx.familiar().is_mp_at_max() {
                Err("Your MP is already at max.")
            } else {
                Ok(())
            }
        }
        ItemKind::MedicinalHerb => {
            if ctx.familiar().is_hp_at_max() {
                Err("Your HP is already at max.")
            } else {
                Ok(())
            }
        }
        ItemKind::WaterBall => {
            let familiar = ctx.familiar();
            if familiar.is_hp_at_max() && familiar.is_mp_at_max() {
                Err("Your HP and MP is already at max.")
            } else {
                Ok(())
            }
        }
        ItemKind::CureAllHerb => {
            // No negative-status tracking is read back anywhere yet, so this
            // item can never actually be used.
            Err("You do not have any negative statuses.")
        }
        ItemKind::Oleem | ItemKind::HolyScroll | ItemKind::FireBall => {
            if !ctx.is_in_battle() {
                Err("You are not in battle.")
            } else {
                Ok(())
            }
        }
    }
}

/// Applies the item's effect and returns the response fragment describing
/// it (without the leading "You used X." prefix, added by the caller).
pub fn use_item(ctx: &mut Context, item: ItemKind) -> GameResult<String> {
    if let Err(reason) = can_use(ctx, item) {
        return Err(GameError::InvalidOperation(format!(
            "Cannot use {}. {reason}",
            item.name()
        )));
    }
    Ok(match item {
        ItemKind::Pita => {
            ctx.familiar_mut().restore_mp();
            "Your MP has been restored to max.".to_string()
        }
        ItemKind::MedicinalHerb => {
            ctx.familiar_mut().restore_hp();
            "Your HP has been restored to max.".to_string()
        }
        ItemKind::WaterBall => {
            ctx.familiar_mut().restore_hp();
            ctx.familiar_mut().restore_mp();
            "Your HP and MP and has been restored to max.".to_string()
        }
        ItemKind::CureAllHerb => "You no longer have any negative statuses.".to_string(),
        ItemKind::Oleem => {
            ctx.battle_context
                .as_mut()
                .expect("can_use checked is_in_battle")
                .finish_battle();
            "Monster disappeared.".to_string()
        }
        ItemKind::HolyScroll => {
            ctx.battle_context
                .as_mut()
                .expect("can_use checked is_in_battle")
                .set_holy_scroll_counter(3);
            "You are invulnerable for next 3 turns.".to_string()
        }
        ItemKind::FireBall => {
            let battle = ctx
                .battle_context
                .as_mut()
                .expect("can_use checked is_in_battle");
            let damage = battle.enemy.max_hp / 2;
            battle.enemy.deal_damage(damage);
            format!(
                "Flames of Fire Ball dealt {damage} damage. {} has {} HP left.",
                battle.enemy.name, battle.enemy.hp
            )
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::GameConfig;
    use crate::engine::unit::UnitCreator;
    use crate::engine::traits::{Genus, Talents, UnitTraits};

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

    fn fresh_context() -> Context {
        let mut ctx = Context::new(GameConfig::empty_shared(), "alice".to_string());
        let traits = dunop_traits();
        ctx.familiar = Some(UnitCreator::new(&traits, 10).create(1));
        ctx
    }

    #[test]
    fn pita_refuses_at_max_mp() {
        let ctx = fresh_context();
        assert!(can_use(&ctx, ItemKind::Pita).is_err());
    }

    #[test]
    fn medicinal_herb_restores_hp() {
        let mut ctx = fresh_context();
        ctx.familiar_mut().deal_damage(50);
        let effect = use_item(&mut ctx, ItemKind::MedicinalHerb).unwrap();
        assert!(ctx.familiar().is_hp_at_max());
        assert!(effect.contains("restored"));
    }

    #[test]
    fn cure_all_herb_is_never_usable() {
        let ctx = fresh_context();
        assert!(can_use(&ctx, ItemKind::CureAllHerb).is_err());
    }

    #[test]
    fn fire_ball_requires_battle() {
        let mut ctx = fresh_context();
        let err = use_item(&mut ctx, ItemKind::FireBall).unwrap_err();
        assert!(matches!(err, GameError::InvalidOperation(_)));
    }

    #[test]
    fn fire_ball_deals_half_max_hp_in_battle() {
        let mut ctx = fresh_context();
        let traits = dunop_traits();
        let enemy = UnitCreator::new(&traits, 10).create(1);
        let enemy_max_hp = enemy.max_hp;
        ctx.start_battle(enemy).unwrap();
        let before = ctx.battle_context.as_ref().unwrap().enemy.hp;
        use_item(&mut ctx, ItemKind::FireBall).unwrap();
        let after = ctx.battle_context.as_ref().unwrap().enemy.hp;
        assert_eq!(before - after, enemy_max_hp / 2);
    }
}
