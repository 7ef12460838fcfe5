use std::collections::HashMap;
use std::sync::Arc;

use rand::Rng;
use serde_json::Value;

use crate::engine::errors::GameError;
use crate::engine::traits::{Genus, SpellTraits, Talents, UnitTraits};

fn invalid_config(reason: impl Into<String>) -> GameError {
    GameError::InvalidConfig(reason.into())
}

#[derive(Debug, Clone)]
pub struct Probabilities {
    pub flee: f64,
}

/// Strictly-increasing experience thresholds; `max_level` is derived from
/// how many entries were configured, one level per entry.
#[derive(Debug, Clone)]
pub struct Levels {
    experience_per_level: Vec<i64>,
}

impl Levels {
    pub fn max_level(&self) -> i64 {
        self.experience_per_level.len() as i64
    }

    /// Experience needed to advance from `level` to `level + 1`.
    pub fn experience_for_next_level(&self, level: i64) -> i64 {
        self.experience_per_level[(level - 1) as usize]
    }
}

#[derive(Debug, Clone)]
pub struct Timers {
    pub event_interval_secs: u64,
}

#[derive(Debug, Clone)]
pub struct PlayerSelectionWeights {
    pub with_penalty: u32,
    pub without_penalty: u32,
}

#[derive(Debug, Clone)]
pub struct EventsWeights {
    pub battle: u32,
    pub character: u32,
    pub elevator: u32,
    pub item: u32,
    pub trap: u32,
    pub familiar: u32,
}

impl EventsWeights {
    pub fn weighted_entries(&self) -> Vec<(&'static str, u32)> {
        vec![
            ("battle", self.battle),
            ("character", self.character),
            ("elevator", self.elevator),
            ("item", self.item),
            ("trap", self.trap),
            ("familiar", self.familiar),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct Monster {
    pub monster: String,
    pub level: i64,
}

#[derive(Debug, Clone, Default)]
pub struct FloorDescriptor {
    entries: Vec<(Monster, u32)>,
}

impl FloorDescriptor {
    pub fn add_monster(&mut self, monster: Monster, weight: u32) {
        self.entries.push((monster, weight));
    }

    pub fn monsters(&self) -> impl Iterator<Item = &Monster> {
        self.entries.iter().map(|(m, _)| m)
    }

    pub fn pick_weighted(&self, rng: &mut impl Rng) -> Monster {
        let total: u32 = self.entries.iter().map(|(_, w)| w).sum();
        let mut pick = rng.gen_range(0..total.max(1));
        for (monster, weight) in &self.entries {
            if pick < *weight {
                return monster.clone();
            }
            pick = pick.saturating_sub(*weight);
        }
        self.entries
            .last()
            .expect("floor has at least one monster")
            .0
            .clone()
    }
}

/// The full, validated game-balance configuration, loaded once at process
/// startup and shared read-only by every player's `Context`.
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub probabilities: Probabilities,
    pub levels: Levels,
    pub monsters_traits: HashMap<String, UnitTraits>,
    pub ghosh_traits: UnitTraits,
    pub floors: Vec<FloorDescriptor>,
    pub timers: Timers,
    pub player_selection_weights: PlayerSelectionWeights,
    pub events_weights: EventsWeights,
    pub found_items_weights: HashMap<String, u32>,
}

impl GameConfig {
    pub fn highest_floor(&self) -> i64 {
        self.floors.len() as i64
    }

    pub fn monster_traits(&self, name: &str) -> Option<&UnitTraits> {
        self.monsters_traits.get(name)
    }

    /// Looks a unit's traits up by name across both the regular monster
    /// roster and the special Ghosh unit.
    pub fn unit_traits(&self, name: &str) -> Option<&UnitTraits> {
        if self.ghosh_traits.name == name {
            Some(&self.ghosh_traits)
        } else {
            self.monsters_traits.get(name)
        }
    }

    pub fn from_json_str(json: &str) -> Result<GameConfig, GameError> {
        let value: Value = serde_json::from_str(json)
            .map_err(|exc| invalid_config(format!("Invalid JSON: {exc}")))?;
        Self::from_value(&value)
    }

    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<GameConfig, GameError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|exc| {
            invalid_config(format!("could not read config file {}: {exc}", path.display()))
        })?;
        Self::from_json_str(&contents)
    }

    fn from_value(value: &Value) -> Result<GameConfig, GameError> {
        let probabilities = Self::read_probabilities(field(value, "probabilities")?)?;
        let levels = Self::read_levels(field(value, "experience_per_level")?)?;
        let monsters_traits = Self::read_monsters_traits(field(value, "monsters")?)?;
        let ghosh_traits = Self::read_ghosh_traits(field(value, "special_units")?)?;
        let floors = Self::read_floors(field(value, "floors")?)?;
        let timers = Self::read_timers(field(value, "timers")?)?;
        let player_selection_weights =
            Self::read_player_selection_weights(field(value, "player_selection_weights")?)?;
        let events_weights = Self::read_events_weights(field(value, "events_weights")?)?;
        let found_items_weights =
            Self::read_found_items_weights(field(value, "found_items_weights")?)?;

        let config = GameConfig {
            probabilities,
            levels,
            monsters_traits,
            ghosh_traits,
            floors,
            timers,
            player_selection_weights,
            events_weights,
            found_items_weights,
        };
        config.validate()?;
        Ok(config)
    }

    fn read_probabilities(value: &Value) -> Result<Probabilities, GameError> {
        let flee = number(value, "flee")?;
        Ok(Probabilities { flee })
    }

    fn read_levels(value: &Value) -> Result<Levels, GameError> {
        let array = value
            .as_array()
            .ok_or_else(|| invalid_config("experience_per_level must be an array"))?;
        let mut experience_per_level = Vec::with_capacity(array.len());
        let mut experience_for_prev_level = -1i64;
        for (index, entry) in array.iter().enumerate() {
            let experience = entry.as_i64().ok_or_else(|| {
                invalid_config(format!("experience_per_level[{index}] is not an integer"))
            })?;
            if experience <= experience_for_prev_level {
                return Err(invalid_config(format!(
                    "Experience required for LVL {} is not greater than for LVL {}",
                    index + 1,
                    index
                )));
            }
            experience_per_level.push(experience);
            experience_for_prev_level = experience;
        }
        Ok(Levels {
            experience_per_level,
        })
    }

    fn read_monsters_traits(value: &Value) -> Result<HashMap<String, UnitTraits>, GameError> {
        let array = value
            .as_array()
            .ok_or_else(|| invalid_config("monsters must be an array"))?;
        let mut monsters_traits = HashMap::new();
        for entry in array {
            let traits = Self::read_unit_traits(entry)?;
            if monsters_traits.contains_key(&traits.name) {
                return Err(invalid_config(format!(
                    "Double entry for monster '{}' traits",
                    traits.name
                )));
            }
            monsters_traits.insert(traits.name.clone(), traits);
        }
        Ok(monsters_traits)
    }

    fn read_unit_traits(value: &Value) -> Result<UnitTraits, GameError> {
        let name = string(value, "name")?;
        let talents = match value.get("talents").and_then(Value::as_str) {
            Some(s) => Talents::parse_list(Some(s)).map_err(invalid_config)?,
            None => Talents::EMPTY,
        };
        let spell = match value.get("spell").and_then(Value::as_str) {
            Some(s) => Some(SpellTraits::by_name(s).map_err(invalid_config)?),
            None => None,
        };
        let element = string(value, "element")?;
        Ok(UnitTraits {
            name,
            base_hp: integer(value, "base_hp")?,
            hp_growth: integer(value, "hp_growth")?,
            base_mp: integer(value, "base_mp")?,
            mp_growth: integer(value, "mp_growth")?,
            base_attack: integer(value, "base_attack")?,
            attack_growth: integer(value, "attack_growth")?,
            base_defense: integer(value, "base_defense")?,
            defense_growth: integer(value, "defense_growth")?,
            base_luck: integer(value, "base_luck")?,
            luck_growth: integer(value, "luck_growth")?,
            base_exp_given: integer(value, "base_exp")?,
            exp_given_growth: integer(value, "exp_growth")?,
            native_genus: Genus::parse(&element)
                .ok_or_else(|| invalid_config(format!("Unknown genus \"{element}\"")))?,
            native_spell_traits: spell,
            talents,
            is_evolved: value
                .get("is_evolved")
                .and_then(Value::as_bool)
                .unwrap_or(false),
        })
    }

    fn read_ghosh_traits(value: &Value) -> Result<UnitTraits, GameError> {
        Self::read_unit_traits(field(value, "ghosh")?)
    }

    fn read_floors(value: &Value) -> Result<Vec<FloorDescriptor>, GameError> {
        let array = value
            .as_array()
            .ok_or_else(|| invalid_config("floors must be an array"))?;
        array.iter().map(Self::read_floor).collect()
    }

    fn read_floor(value: &Value) -> Result<FloorDescriptor, GameError> {
        let array = value
            .as_array()
            .ok_or_else(|| invalid_config("floor must be an array"))?;
        let mut floor = FloorDescriptor::default();
        for entry in array {
            let monster = string(entry, "monster")?;
            let level = integer(entry, "level")?;
            let weight = integer(entry, "weight")? as u32;
            floor.add_monster(Monster { monster, level }, weight);
        }
        Ok(floor)
    }

    fn read_timers(value: &Value) -> Result<Timers, GameError> {
        Ok(Timers {
            event_interval_secs: integer(value, "event_interval")? as u64,
        })
    }

    fn read_player_selection_weights(value: &Value) -> Result<PlayerSelectionWeights, GameError> {
        Ok(PlayerSelectionWeights {
            with_penalty: integer(value, "with_penalty")? as u32,
            without_penalty: integer(value, "without_penalty")? as u32,
        })
    }

    fn read_events_weights(value: &Value) -> Result<EventsWeights, GameError> {
        Ok(EventsWeights {
            battle: integer(value, "battle")? as u32,
            character: integer(value, "character")? as u32,
            elevator: integer(value, "elevator")? as u32,
            item: integer(value, "item")? as u32,
            trap: integer(value, "trap")? as u32,
            familiar: integer(value, "familiar")? as u32,
        })
    }

    fn read_found_items_weights(value: &Value) -> Result<HashMap<String, u32>, GameError> {
        let object = value
            .as_object()
            .ok_or_else(|| invalid_config("found_items_weights must be an object"))?;
        let mut weights = HashMap::new();
        for (key, weight) in object {
            let weight = weight.as_i64().ok_or_else(|| {
                invalid_config(format!("found_items_weights[{key}] is not a number"))
            })?;
            weights.insert(key.clone(), weight as u32);
        }
        Ok(weights)
    }

    fn validate(&self) -> Result<(), GameError> {
        self.validate_probabilities()?;
        self.validate_experience_per_level()?;
        self.validate_floors()?;
        self.validate_weights("events_weights", self.events_weights.weighted_entries().iter().map(|(_, w)| *w))?;
        self.validate_weights(
            "player_selection_weights",
            [
                self.player_selection_weights.with_penalty,
                self.player_selection_weights.without_penalty,
            ]
            .into_iter(),
        )?;
        self.validate_weights("found_items_weights", self.found_items_weights.values().copied())?;
        Ok(())
    }

    /// All weights in a weighted-choice table must be representable (they
    /// are, being unsigned) and at least one must be positive, or sampling
    /// has nothing to pick from.
    fn validate_weights(&self, table_name: &str, weights: impl Iterator<Item = u32>) -> Result<(), GameError> {
        if weights.filter(|w| *w > 0).count() == 0 {
            return Err(invalid_config(format!(
                "\"{table_name}\" needs at least one weight greater than zero"
            )));
        }
        Ok(())
    }

    fn validate_probabilities(&self) -> Result<(), GameError> {
        Self::validate_probability("flee", self.probabilities.flee)
    }

    fn validate_probability(name: &str, probability: f64) -> Result<(), GameError> {
        if !(0.0..=1.0).contains(&probability) {
            return Err(invalid_config(format!(
                "Probability \"{name}\"={probability} is outside range [0-1]"
            )));
        }
        Ok(())
    }

    fn validate_experience_per_level(&self) -> Result<(), GameError> {
        if self.levels.max_level() == 0 {
            return Err(invalid_config("No levels defined"));
        }
        Ok(())
    }

    fn validate_floors(&self) -> Result<(), GameError> {
        if self.highest_floor() == 0 {
            return Err(invalid_config("No floors specified"));
        }
        for (index, floor) in self.floors.iter().enumerate() {
            if floor.entries.is_empty() {
                return Err(invalid_config(format!(
                    "Floor at index {index} has no monsters"
                )));
            }
            for monster in floor.monsters() {
                if !self.monsters_traits.contains_key(&monster.monster) {
                    return Err(invalid_config(format!(
                        "Floor at index {index} has unknown monster \"{}\"",
                        monster.monster
                    )));
                }
            }
        }
        Ok(())
    }

    /// Placeholder used only as the serde default for `Context::game_config`
    /// during deserialization; `StateMachine::load` immediately replaces it
    /// with the live, validated config.
    pub fn empty_shared() -> Arc<GameConfig> {
        Arc::new(GameConfig {
            probabilities: Probabilities { flee: 0.0 },
            levels: Levels {
                experience_per_level: vec![1],
            },
            monsters_traits: HashMap::new(),
            ghosh_traits: UnitTraits {
                name: String::new(),
                base_hp: 0,
                hp_growth: 0,
                base_mp: 0,
                mp_growth: 0,
                base_attack: 0,
                attack_growth: 0,
                base_defense: 0,
                defense_growth: 0,
                base_luck: 0,
                luck_growth: 0,
                base_exp_given: 0,
                exp_given_growth: 0,
                native_genus: Genus::Empty,
                native_spell_traits: None,
                talents: Talents::EMPTY,
                is_evolved: false,
            },
            floors: vec![FloorDescriptor::default()],
            timers: Timers {
                event_interval_secs: 60,
            },
            player_selection_weights: PlayerSelectionWeights {
                with_penalty: 1,
                without_penalty: 1,
            },
            events_weights: EventsWeights {
                battle: 1,
                character: 1,
                elevator: 1,
                item: 1,
                trap: 1,
                familiar: 1,
            },
            found_items_weights: HashMap::new(),
        })
    }
}

fn field<'a>(value: &'a Value, key: &str) -> Result<&'a Value, GameError> {
    value
        .get(key)
        .ok_or_else(|| invalid_config(format!("Missing key: '{key}'")))
}

fn string(value: &Value, key: &str) -> Result<String, GameError> {
    field(value, key)?
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| invalid_config(format!("'{key}' must be a string")))
}

fn integer(value: &Value, key: &str) -> Result<i64, GameError> {
    field(value, key)?
        .as_i64()
        .ok_or_else(|| invalid_config(format!("'{key}' must be an integer")))
}

fn number(value: &Value, key: &str) -> Result<f64, GameError> {
    field(value, key)?
        .as_f64()
        .ok_or_else(|| invalid_config(format!("'{key}' must be a number")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_config_json() -> &'static str {
        r#"{
            "probabilities": {"flee": 0.65},
            "experience_per_level": [10, 30, 60],
            "monsters": [
                {"name": "Dunop", "base_hp": 100, "hp_growth": 10, "base_mp": 20, "mp_growth": 2,
                 "base_attack": 15, "attack_growth": 3, "base_defense": 5, "defense_growth": 1,
                 "base_luck": 4, "luck_growth": 1, "base_exp": 10, "exp_growth": 2, "element": "None"}
            ],
            "special_units": {
                "ghosh": {"name": "Ghosh", "base_hp": 200, "hp_growth": 20, "base_mp": 0, "mp_growth": 0,
                          "base_attack": 30, "attack_growth": 5, "base_defense": 10, "defense_growth": 2,
                          "base_luck": 8, "luck_growth": 2, "base_exp": 50, "exp_growth": 5, "element": "Fire"}
            },
            "floors": [[{"monster": "Dunop", "level": 1, "weight": 1}]],
            "timers": {"event_interval": 30},
            "player_selection_weights": {"with_penalty": 1, "without_penalty": 3},
            "events_weights": {"battle": 3, "character": 1, "elevator": 1, "item": 2, "trap": 1, "familiar": 1},
            "found_items_weights": {"Pita": 1}
        }"#
    }

    #[test]
    fn parses_and_validates_reference_config() {
        let config = GameConfig::from_json_str(reference_config_json()).unwrap();
        assert_eq!(config.highest_floor(), 1);
        assert_eq!(config.levels.max_level(), 3);
        assert!(config.monsters_traits.contains_key("Dunop"));
    }

    #[test]
    fn rejects_floor_referencing_unknown_monster() {
        let broken =
            reference_config_json().replace("\"Dunop\", \"level\": 1", "\"Ghost\", \"level\": 1");
        let err = GameConfig::from_json_str(&broken).unwrap_err();
        assert!(matches!(err, GameError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_non_increasing_experience_levels() {
        let broken = reference_config_json().replace("[10, 30, 60]", "[10, 5, 60]");
        let err = GameConfig::from_json_str(&broken).unwrap_err();
        assert!(matches!(err, GameError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_out_of_range_probability() {
        let broken = reference_config_json().replace("0.65", "1.5");
        let err = GameConfig::from_json_str(&broken).unwrap_err();
        assert!(matches!(err, GameError::InvalidConfig(_)));
    }
}
