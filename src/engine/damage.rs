use rand::Rng;

use crate::engine::traits::Genus;
use crate::engine::unit::Unit;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageRoll {
    Low,
    Normal,
    High,
}

impl DamageRoll {
    /// Weighted 1:2:1 sample, matching the reference's roll distribution.
    pub fn sample(rng: &mut impl Rng) -> DamageRoll {
        match rng.gen_range(0..4) {
            0 => DamageRoll::Low,
            1 | 2 => DamageRoll::Normal,
            _ => DamageRoll::High,
        }
    }

    fn factor(self) -> f64 {
        match self {
            DamageRoll::Low => 0.875,
            DamageRoll::Normal => 1.0,
            DamageRoll::High => 1.125,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelativeHeight {
    Lower,
    Same,
    Higher,
}

impl RelativeHeight {
    fn factor(self) -> f64 {
        match self {
            RelativeHeight::Lower => 0.875,
            RelativeHeight::Same => 1.0,
            RelativeHeight::Higher => 1.125,
        }
    }
}

/// Bernoulli hit/crit sampling driven by the attacker's luck stat.
pub fn does_hit(attacker: &Unit, rng: &mut impl Rng) -> bool {
    if attacker.luck <= 0 {
        return false;
    }
    let hit_chance = (attacker.luck - 1) as f64 / attacker.luck as f64;
    rng.gen::<f64>() < hit_chance
}

pub fn is_critical(attacker: &Unit, rng: &mut impl Rng) -> bool {
    let crit_chance = (attacker.luck / 64 + 1) as f64 / 128.0;
    rng.gen::<f64>() < crit_chance
}

/// Physical damage: attack minus half defense, scaled by roll and relative
/// height, doubled and defense-ignoring on a critical. Always at least 1.
pub fn physical_damage(
    attacker: &Unit,
    defender: &Unit,
    roll: DamageRoll,
    height: RelativeHeight,
    is_critical: bool,
) -> i64 {
    let base = if is_critical {
        attacker.attack as f64
    } else {
        (attacker.attack as f64 - defender.defense as f64 / 2.0).max(1.0)
    };
    let mut damage = base * roll.factor() * height.factor();
    if is_critical {
        damage *= 2.0;
    }
    damage.round().max(1.0) as i64
}

/// Spell damage: `base_damage * level + attack/2 - defense/2`, scaled by the
/// genus advantage table. Does not deduct MP; callers do that separately.
pub fn spell_damage(attacker: &Unit, defender: &Unit) -> i64 {
    let spell = attacker.spell.as_ref().expect("caller checked has_spell");
    let base = spell.traits.base_damage as f64 * spell.level as f64
        + attacker.attack as f64 / 2.0
        - defender.defense as f64 / 2.0;
    let advantage = Genus::advantage_multiplier(spell.traits.genus, defender.genus);
    (base * advantage).round().max(1.0) as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::traits::{Genus, Talents, UnitTraits};
    use crate::engine::unit::UnitCreator;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

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
    fn physical_damage_is_never_below_one() {
        let traits = dunop_traits();
        let weak = UnitCreator::new(&traits, 10).create(1);
        let mut tank_traits = dunop_traits();
        tank_traits.base_defense = 1000;
        let tank = UnitCreator::new(&tank_traits, 10).create(1);
        let damage = physical_damage(&weak, &tank, DamageRoll::Low, RelativeHeight::Lower, false);
        assert!(damage >= 1);
    }

    #[test]
    fn critical_hit_ignores_defense() {
        let traits = dunop_traits();
        let attacker = UnitCreator::new(&traits, 10).create(1);
        let mut defender_traits = dunop_traits();
        defender_traits.base_defense = 1000;
        let defender = UnitCreator::new(&defender_traits, 10).create(1);
        let normal = physical_damage(&attacker, &defender, DamageRoll::Normal, RelativeHeight::Same, false);
        let crit = physical_damage(&attacker, &defender, DamageRoll::Normal, RelativeHeight::Same, true);
        assert!(crit > normal);
    }

    #[test]
    fn zero_luck_never_hits() {
        let mut traits = dunop_traits();
        traits.base_luck = 0;
        traits.luck_growth = 0;
        let attacker = UnitCreator::new(&traits, 10).create(1);
        let mut rng = StdRng::seed_from_u64(1);
        assert!(!does_hit(&attacker, &mut rng));
    }
}
