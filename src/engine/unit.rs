use serde::{Deserialize, Serialize};

use crate::engine::stats::StatsCalculator;
use crate::engine::traits::{Genus, SpellTraits, Talents, UnitTraits};

/// Status effects a familiar can carry. Per the open design question on
/// status-effect stubs, these are interface-only: nothing in combat or
/// item resolution reads them back out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatusFlags(u32);

impl StatusFlags {
    pub const NONE: StatusFlags = StatusFlags(0);
    pub const SLEEP: StatusFlags = StatusFlags(1 << 0);
    pub const UPHEAVAL: StatusFlags = StatusFlags(1 << 1);
    pub const CRACK: StatusFlags = StatusFlags(1 << 2);
    pub const PARALYZE: StatusFlags = StatusFlags(1 << 3);
    pub const BLIND: StatusFlags = StatusFlags(1 << 4);
    pub const STATS_BOOST: StatusFlags = StatusFlags(1 << 5);

    pub fn set(&mut self, flag: StatusFlags) {
        self.0 |= flag.0;
    }

    pub fn has(&self, flag: StatusFlags) -> bool {
        (self.0 & flag.0) == flag.0
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spell {
    pub level: i64,
    pub traits: SpellTraits,
}

/// A live entity: either a player's familiar or a monster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    pub traits_name: String,
    pub name: String,
    pub genus: Genus,
    pub level: i64,
    pub max_level: i64,
    pub talents: Talents,
    pub max_hp: i64,
    pub hp: i64,
    pub max_mp: i64,
    pub mp: i64,
    pub attack: i64,
    pub defense: i64,
    pub luck: i64,
    pub spell: Option<Spell>,
    pub exp: i64,
    pub status: StatusFlags,
    // Growth rates copied from `UnitTraits` at creation time so level-up
    // math works from an owned `Unit` without re-resolving traits by name.
    pub hp_growth: i64,
    pub mp_growth: i64,
    pub attack_growth: i64,
    pub defense_growth: i64,
    pub luck_growth: i64,
}

impl Unit {
    pub fn is_max_level(&self) -> bool {
        self.level >= self.max_level
    }

    pub fn is_hp_at_max(&self) -> bool {
        self.hp >= self.max_hp
    }

    pub fn is_mp_at_max(&self) -> bool {
        self.mp >= self.max_mp
    }

    pub fn is_dead(&self) -> bool {
        self.hp <= 0
    }

    pub fn restore_hp(&mut self) {
        self.hp = self.max_hp;
    }

    pub fn restore_mp(&mut self) {
        self.mp = self.max_mp;
    }

    pub fn deal_damage(&mut self, damage: i64) {
        self.hp = (self.hp - damage).max(0);
    }

    pub fn use_mp(&mut self, mp_usage: i64) {
        self.mp = (self.mp - mp_usage).max(0);
    }

    pub fn has_spell(&self) -> bool {
        self.spell.is_some()
    }

    pub fn spell_mp_cost(&self) -> i64 {
        self.spell.as_ref().map(|s| s.traits.mp_cost).unwrap_or(0)
    }

    pub fn has_enough_mp_for_spell(&self) -> bool {
        self.has_spell() && self.mp >= self.spell_mp_cost()
    }

    pub fn set_status(&mut self, flag: StatusFlags) {
        self.status.set(flag);
    }

    /// Grants experience, applying as many level-ups as the gained amount
    /// covers. Returns whether at least one level-up occurred.
    pub fn gain_exp(&mut self, gained_exp: i64, experience_for_next_level: impl Fn(i64) -> i64) -> bool {
        if self.is_max_level() {
            return false;
        }
        let mut leveled_up = false;
        self.exp += gained_exp;
        while !self.is_max_level() && self.exp >= experience_for_next_level(self.level) {
            leveled_up = true;
            self.level_up(&experience_for_next_level);
        }
        leveled_up
    }

    fn level_up(&mut self, _experience_for_next_level: &impl Fn(i64) -> i64) {
        self.level += 1;
        self.increase_hp_on_level_up();
        self.increase_mp_on_level_up();
        self.increase_attack_on_level_up();
        self.increase_defense_on_level_up();
        self.increase_luck_on_level_up();
        self.increase_spell_level_on_level_up();
    }

    fn increase_hp_on_level_up(&mut self) {
        let mut increase = self.hp_growth;
        if self.talents.has(Talents::HP_INCREASED) {
            increase *= 2;
        }
        self.max_hp += increase;
        self.hp += increase;
    }

    fn increase_mp_on_level_up(&mut self) {
        let mut increase = self.mp_growth;
        if self.talents.has(Talents::MP_INCREASED) {
            increase *= 2;
        }
        self.max_mp += increase;
        self.mp += increase;
    }

    fn increase_attack_on_level_up(&mut self) {
        let mut increase = self.attack_growth;
        if self.talents.has(Talents::STRENGTH_INCREASED) {
            increase *= 2;
        }
        self.attack += increase;
    }

    fn increase_defense_on_level_up(&mut self) {
        let mut increase = self.defense_growth;
        if self.talents.has(Talents::HARD) {
            increase *= 2;
        }
        self.defense += increase;
    }

    fn increase_luck_on_level_up(&mut self) {
        self.luck += self.luck_growth;
    }

    fn increase_spell_level_on_level_up(&mut self) {
        let Some(spell) = self.spell.as_mut() else {
            return;
        };
        if spell.traits.genus != self.genus {
            return;
        }
        let mut increase = 1;
        if self.talents.has(Talents::MAGIC_ATTACK_INCREASED) {
            increase *= 2;
        }
        spell.level = (spell.level + increase).min(self.level);
    }

    pub fn to_display_string(&self) -> String {
        format!("{} - {}", self.name, self.stats_to_string())
    }

    pub fn stats_to_string(&self) -> String {
        let mut s = format!(
            "genus: {}, talents: {}, LVL: {}, HP: {}/{}, MP: {}/{}, ATK: {}, DEF: {}, LUCK: {}",
            self.genus.name(),
            self.talents.to_display_string(),
            self.level,
            self.hp,
            self.max_hp,
            self.mp,
            self.max_mp,
            self.attack,
            self.defense,
            self.luck
        );
        if let Some(spell) = &self.spell {
            s.push_str(&format!(
                ", spell: LVL {} {} (MP cost: {})",
                spell.level, spell.traits.name, spell.traits.mp_cost
            ));
        }
        s.push_str(&format!(", EXP: {}", self.exp));
        s
    }

    /// Combine with a met wild familiar, per fusion talent rules: a unit
    /// carrying `DoesNotSurviveFusion` is replaced outright by the met
    /// familiar's stats; `SurvivesFusion` keeps the current unit and only
    /// raises its stats.
    pub fn fuse(&mut self, met: Unit) {
        if self.talents.has(Talents::DOES_NOT_SURVIVE_FUSION) {
            let name = self.name.clone();
            *self = met;
            self.name = name;
            return;
        }
        self.max_hp += met.max_hp / 2;
        self.hp = self.max_hp;
        self.max_mp += met.max_mp / 2;
        self.mp = self.max_mp;
        self.attack += met.attack / 2;
        self.defense += met.defense / 2;
        self.luck += met.luck / 2;
    }
}

/// Builds a `Unit` instance from an immutable `UnitTraits` blueprint at a
/// given level, applying the stats calculator's formulas.
pub struct UnitCreator<'a> {
    traits: &'a UnitTraits,
    max_level: i64,
}

impl<'a> UnitCreator<'a> {
    pub fn new(traits: &'a UnitTraits, max_level: i64) -> Self {
        Self { traits, max_level }
    }

    pub fn create(&self, level: i64) -> Unit {
        let calc = StatsCalculator::new(self.traits);
        let spell = self.traits.native_spell_traits.clone().map(|traits| Spell {
            level: level.min(self.max_level),
            traits,
        });
        Unit {
            traits_name: self.traits.name.clone(),
            name: self.traits.name.clone(),
            genus: self.traits.native_genus,
            level,
            max_level: self.max_level,
            talents: self.traits.talents,
            max_hp: calc.hp(level),
            hp: calc.hp(level),
            max_mp: calc.mp(level),
            mp: calc.mp(level),
            attack: calc.attack(level),
            defense: calc.defense(level),
            luck: calc.luck(level),
            spell,
            exp: 0,
            status: StatusFlags::NONE,
            hp_growth: self.traits.hp_growth,
            mp_growth: self.traits.mp_growth,
            attack_growth: self.traits.attack_growth,
            defense_growth: self.traits.defense_growth,
            luck_growth: self.traits.luck_growth,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::traits::Genus;

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
    fn gain_exp_levels_up_while_threshold_met() {
        let traits = dunop_traits();
        let mut unit = UnitCreator::new(&traits, 10).create(1);
        let table = [0, 10, 30, 60];
        let leveled_up = unit.gain_exp(35, |level| table[level as usize]);
        assert!(leveled_up);
        assert_eq!(unit.level, 3);
        assert_eq!(unit.max_hp, 120);
        assert_eq!(unit.exp, 35);
    }

    #[test]
    fn dead_unit_has_zero_hp() {
        let traits = dunop_traits();
        let mut unit = UnitCreator::new(&traits, 10).create(1);
        unit.deal_damage(1000);
        assert_eq!(unit.hp, 0);
        assert!(unit.is_dead());
    }

    #[test]
    fn fuse_averages_stats_without_survives_fusion_talent() {
        let traits = dunop_traits();
        let familiar = UnitCreator::new(&traits, 10).create(1);
        let met = UnitCreator::new(&traits, 10).create(1);
        let mut familiar = familiar;
        let max_hp_before = familiar.max_hp;
        familiar.fuse(met);
        assert!(familiar.max_hp > max_hp_before);
    }
}
