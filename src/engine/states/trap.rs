use rand::Rng;

use crate::engine::commands;
use crate::engine::context::Context;
use crate::engine::errors::{GameError, GameResult};
use crate::engine::unit::StatusFlags;

const TRAPS: &[&str] = &[
    "Poison", "Sleep", "Upheaval", "Crack", "Go up", "Paralyze", "Blinder",
];

pub fn on_enter_trap_event(ctx: &mut Context, forced_trap: Option<&str>) -> GameResult<()> {
    let trap = match forced_trap {
        Some(name) => {
            let canonical = TRAPS
                .iter()
                .find(|t| t.eq_ignore_ascii_case(name))
                .ok_or_else(|| GameError::ArgsParseError("Unknown trap".to_string()))?;
            *canonical
        }
        None => {
            let index = ctx.rng().gen_range(0..TRAPS.len());
            TRAPS[index]
        }
    };

    let (command, response) = match trap {
        "Poison" => {
            let hp = ctx.familiar().hp;
            let lost_hp = ((hp as f64 * 0.2) as i64).max(1).min(hp - 1).max(0);
            ctx.familiar_mut().deal_damage(lost_hp);
            (commands::EVENT_FINISHED, format!("You lose {lost_hp} HP."))
        }
        "Sleep" => {
            ctx.familiar_mut().set_status(StatusFlags::SLEEP);
            (commands::EVENT_FINISHED, "You feel a bit drowsy.".to_string())
        }
        "Upheaval" => {
            ctx.familiar_mut().set_status(StatusFlags::UPHEAVAL);
            (commands::EVENT_FINISHED, "Suddenly the ground raises.".to_string())
        }
        "Crack" => {
            ctx.familiar_mut().set_status(StatusFlags::CRACK);
            (commands::EVENT_FINISHED, "Suddenly the ground lowers down.".to_string())
        }
        "Go up" => (
            commands::GO_UP,
            "A giant spring shoots you up to the next floor.".to_string(),
        ),
        "Paralyze" => {
            ctx.familiar_mut().set_status(StatusFlags::PARALYZE);
            (commands::EVENT_FINISHED, "Your movement is affected.".to_string())
        }
        "Blinder" => {
            ctx.familiar_mut().set_status(StatusFlags::BLIND);
            (commands::EVENT_FINISHED, "You cannot see clearly.".to_string())
        }
        _ => unreachable!("trap selection only yields names from TRAPS"),
    };

    ctx.add_response(format!("You stepped on a {trap} trap. {response}"));
    ctx.generate_admin_action(command, Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::GameConfig;
    use crate::engine::traits::{Genus, Talents, UnitTraits};
    use crate::engine::unit::UnitCreator;

    fn fresh_context() -> Context {
        let mut ctx = Context::new(GameConfig::empty_shared(), "alice".to_string());
        let traits = UnitTraits {
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
        };
        ctx.familiar = Some(UnitCreator::new(&traits, 10).create(1));
        ctx
    }

    #[test]
    fn poison_trap_never_kills() {
        let mut ctx = fresh_context();
        on_enter_trap_event(&mut ctx, Some("Poison")).unwrap();
        assert!(ctx.familiar().hp >= 1);
    }

    #[test]
    fn sleep_trap_sets_status() {
        let mut ctx = fresh_context();
        on_enter_trap_event(&mut ctx, Some("Sleep")).unwrap();
        assert!(ctx.familiar().status.has(StatusFlags::SLEEP));
    }

    #[test]
    fn go_up_trap_generates_go_up_action() {
        let mut ctx = fresh_context();
        on_enter_trap_event(&mut ctx, Some("Go up")).unwrap();
        assert!(ctx.has_action());
    }
}
