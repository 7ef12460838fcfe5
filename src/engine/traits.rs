use serde::{Deserialize, Serialize};

/// Elemental affinity. Participates in spell-damage advantage (see
/// `damage::spell_damage`) and is otherwise inert data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Genus {
    Empty,
    Fire,
    Water,
    Wind,
    Earth,
    Electricity,
    Ice,
}

impl Genus {
    pub fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "None" => Genus::Empty,
            "Fire" => Genus::Fire,
            "Water" => Genus::Water,
            "Wind" => Genus::Wind,
            "Earth" => Genus::Earth,
            "Electricity" => Genus::Electricity,
            "Ice" => Genus::Ice,
            _ => return None,
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Genus::Empty => "-",
            Genus::Fire => "Fire",
            Genus::Water => "Water",
            Genus::Wind => "Wind",
            Genus::Earth => "Earth",
            Genus::Electricity => "Electricity",
            Genus::Ice => "Ice",
        }
    }

    /// Attack-genus advantage multiplier over a defending genus.
    /// Fire > Wind > Earth > Water > Fire; Electricity > Water, Ice > Wind.
    pub fn advantage_multiplier(attacker: Genus, defender: Genus) -> f64 {
        use Genus::*;
        let beats = matches!(
            (attacker, defender),
            (Fire, Wind) | (Wind, Earth) | (Earth, Water) | (Water, Fire) | (Electricity, Water) | (Ice, Wind)
        );
        let beaten_by = matches!(
            (attacker, defender),
            (Wind, Fire) | (Earth, Wind) | (Water, Earth) | (Fire, Water) | (Water, Electricity) | (Wind, Ice)
        );
        if beats {
            1.5
        } else if beaten_by {
            0.75
        } else {
            1.0
        }
    }
}

/// Talent bit-flags. Values are unique bits rather than a copy of the
/// original numeric layout (see DESIGN.md) — callers only ever test named
/// flags, never serialize the raw integer across implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Talents(u32);

impl Talents {
    pub const EMPTY: Talents = Talents(0);
    pub const QUICK: Talents = Talents(1 << 0);
    pub const HP_INCREASED: Talents = Talents(1 << 1);
    pub const MP_INCREASED: Talents = Talents(1 << 2);
    pub const STRENGTH_INCREASED: Talents = Talents(1 << 3);
    pub const HARD: Talents = Talents(1 << 4);
    pub const GROWTH_PROMOTED: Talents = Talents(1 << 5);
    pub const MAGIC_ATTACK_INCREASED: Talents = Talents(1 << 6);
    pub const MP_CONSUMPTION_DECREASED: Talents = Talents(1 << 7);
    pub const ELECTRIC_SHOCK: Talents = Talents(1 << 8);
    pub const DOES_NOT_SURVIVE_FUSION: Talents = Talents(1 << 9);
    pub const SURVIVES_FUSION: Talents = Talents(1 << 10);

    const ALL: &'static [(Talents, &'static str)] = &[
        (Talents::QUICK, "Quick"),
        (Talents::HP_INCREASED, "HpIncreased"),
        (Talents::MP_INCREASED, "MpIncreased"),
        (Talents::STRENGTH_INCREASED, "StrengthIncreased"),
        (Talents::HARD, "Hard"),
        (Talents::GROWTH_PROMOTED, "GrowthPromoted"),
        (Talents::MAGIC_ATTACK_INCREASED, "MagicAttackIncreased"),
        (Talents::MP_CONSUMPTION_DECREASED, "MpConsumptionDecreased"),
        (Talents::ELECTRIC_SHOCK, "ElectricShock"),
        (Talents::DOES_NOT_SURVIVE_FUSION, "DoesNotSurviveFusion"),
        (Talents::SURVIVES_FUSION, "SurvivesFusion"),
    ];

    pub fn has(&self, other: Talents) -> bool {
        (self.0 & other.0) == other.0
    }

    pub fn union(self, other: Talents) -> Talents {
        Talents(self.0 | other.0)
    }

    pub fn parse(name: &str) -> Option<Talents> {
        Self::ALL.iter().find(|(_, n)| *n == name).map(|(t, _)| *t)
    }

    pub fn parse_list(talents_string: Option<&str>) -> Result<Talents, String> {
        let Some(talents_string) = talents_string else {
            return Ok(Talents::EMPTY);
        };
        let mut talents = Talents::EMPTY;
        for name in talents_string.split(',') {
            let name = name.trim();
            let talent =
                Talents::parse(name).ok_or_else(|| format!("Unknown talent \"{name}\""))?;
            talents = talents.union(talent);
        }
        Ok(talents)
    }

    pub fn to_display_string(&self) -> String {
        if *self == Talents::EMPTY {
            return "-".to_string();
        }
        Self::ALL
            .iter()
            .filter(|(t, _)| self.has(*t))
            .map(|(_, name)| *name)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Name, base damage, genus and MP cost of a spell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpellTraits {
    pub name: String,
    pub base_damage: i64,
    pub genus: Genus,
    pub mp_cost: i64,
}

impl SpellTraits {
    /// The reference implementation hardcodes a five-spell table rather than
    /// reading spell stats from config; carried forward unchanged.
    pub fn by_name(name: &str) -> Result<SpellTraits, String> {
        let (base_damage, genus, mp_cost) = match name {
            "Brid" => (10, Genus::Fire, 10),
            "Breath" => (16, Genus::Fire, 12),
            "Sled" => (8, Genus::Fire, 8),
            "Rise" => (19, Genus::Fire, 16),
            "DeHeal" => (10, Genus::Water, 10),
            _ => return Err(format!("Unknown spell name \"{name}\"")),
        };
        Ok(SpellTraits {
            name: name.to_string(),
            base_damage,
            genus,
            mp_cost,
        })
    }
}

/// Immutable blueprint a `Unit` is created from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitTraits {
    pub name: String,
    pub base_hp: i64,
    pub hp_growth: i64,
    pub base_mp: i64,
    pub mp_growth: i64,
    pub base_attack: i64,
    pub attack_growth: i64,
    pub base_defense: i64,
    pub defense_growth: i64,
    pub base_luck: i64,
    pub luck_growth: i64,
    pub base_exp_given: i64,
    pub exp_given_growth: i64,
    pub native_genus: Genus,
    pub native_spell_traits: Option<SpellTraits>,
    pub talents: Talents,
    pub is_evolved: bool,
}
