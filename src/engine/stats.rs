use crate::engine::traits::UnitTraits;

/// Pure base+growth·(level-1) stat formulas for a set of `UnitTraits`.
pub struct StatsCalculator<'a> {
    traits: &'a UnitTraits,
}

impl<'a> StatsCalculator<'a> {
    pub fn new(traits: &'a UnitTraits) -> Self {
        Self { traits }
    }

    pub fn hp(&self, level: i64) -> i64 {
        self.traits.base_hp + self.traits.hp_growth * (level - 1)
    }

    pub fn mp(&self, level: i64) -> i64 {
        self.traits.base_mp + self.traits.mp_growth * (level - 1)
    }

    pub fn attack(&self, level: i64) -> i64 {
        self.traits.base_attack + self.traits.attack_growth * (level - 1)
    }

    pub fn defense(&self, level: i64) -> i64 {
        self.traits.base_defense + self.traits.defense_growth * (level - 1)
    }

    pub fn luck(&self, level: i64) -> i64 {
        self.traits.base_luck + self.traits.luck_growth * (level - 1)
    }

    pub fn given_experience(&self, level: i64) -> i64 {
        self.traits.base_exp_given + self.traits.exp_given_growth * (level - 1)
    }

    pub fn hp_increase(&self, level: i64) -> i64 {
        self.hp(level) - self.hp(level - 1)
    }

    pub fn mp_increase(&self, level: i64) -> i64 {
        self.mp(level) - self.mp(level - 1)
    }

    pub fn attack_increase(&self, level: i64) -> i64 {
        self.attack(level) - self.attack(level - 1)
    }

    pub fn defense_increase(&self, level: i64) -> i64 {
        self.defense(level) - self.defense(level - 1)
    }

    pub fn luck_increase(&self, level: i64) -> i64 {
        self.luck(level) - self.luck(level - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::traits::{Genus, Talents};

    fn traits() -> UnitTraits {
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
    fn stats_grow_linearly_with_level() {
        let traits = traits();
        let calc = StatsCalculator::new(&traits);
        assert_eq!(calc.hp(1), 100);
        assert_eq!(calc.hp(3), 120);
        assert_eq!(calc.hp_increase(3), 10);
        assert_eq!(calc.given_experience(1), 10);
        assert_eq!(calc.given_experience(2), 12);
    }
}
