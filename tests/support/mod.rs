use std::sync::Arc;

use tower_dungeon::engine::config::GameConfig;

/// A single-monster, single-floor config with every weighted table pinned
/// down to one live entry, so monster/familiar generation and event
/// selection never depend on the RNG draw, only on whether it runs at all.
pub fn single_floor_config(flee_probability: f64) -> Arc<GameConfig> {
    let json = format!(
        r#"{{
            "probabilities": {{"flee": {flee_probability}}},
            "experience_per_level": [10, 20, 30],
            "monsters": [
                {{"name": "Dunop", "base_hp": 100, "hp_growth": 10, "base_mp": 20, "mp_growth": 2,
                 "base_attack": 15, "attack_growth": 3, "base_defense": 5, "defense_growth": 1,
                 "base_luck": 4, "luck_growth": 1, "base_exp": 10, "exp_growth": 2, "element": "None"}}
            ],
            "special_units": {{
                "ghosh": {{"name": "Ghosh", "base_hp": 500, "hp_growth": 0, "base_mp": 0, "mp_growth": 0,
                          "base_attack": 50, "attack_growth": 0, "base_defense": 50, "defense_growth": 0,
                          "base_luck": 10, "luck_growth": 0, "base_exp": 0, "exp_growth": 0, "element": "None"}}
            }},
            "floors": [[{{"monster": "Dunop", "level": 1, "weight": 1}}]],
            "timers": {{"event_interval": 30}},
            "player_selection_weights": {{"with_penalty": 1, "without_penalty": 3}},
            "events_weights": {{"battle": 1, "character": 0, "elevator": 0, "item": 0, "trap": 0, "familiar": 0}},
            "found_items_weights": {{"Pita": 1}}
        }}"#
    );
    Arc::new(GameConfig::from_json_str(&json).expect("fixture config parses"))
}
