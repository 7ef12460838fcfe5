use serde::{Deserialize, Serialize};

use crate::engine::errors::{GameError, GameResult};

/// One of the seven catalog items. Effects are resolved against the engine's
/// `Context` (imported lazily to avoid a cycle — see `items::use_item`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    Pita,
    Oleem,
    HolyScroll,
    MedicinalHerb,
    CureAllHerb,
    FireBall,
    WaterBall,
}

impl ItemKind {
    pub const ALL: [ItemKind; 7] = [
        ItemKind::Pita,
        ItemKind::Oleem,
        ItemKind::HolyScroll,
        ItemKind::MedicinalHerb,
        ItemKind::CureAllHerb,
        ItemKind::FireBall,
        ItemKind::WaterBall,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ItemKind::Pita => "Pita",
            ItemKind::Oleem => "Oleem",
            ItemKind::HolyScroll => "Holy Scroll",
            ItemKind::MedicinalHerb => "Medicinal Herb",
            ItemKind::CureAllHerb => "Cure-All Herb",
            ItemKind::FireBall => "Fire Ball",
            ItemKind::WaterBall => "Water Ball",
        }
    }

    /// Only usable during an active battle.
    pub fn is_battle_only(&self) -> bool {
        matches!(
            self,
            ItemKind::Oleem | ItemKind::HolyScroll | ItemKind::FireBall
        )
    }

    fn normalize(name: &str) -> String {
        name.chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_lowercase()
    }

    pub fn matches_prefix(&self, query: &str) -> bool {
        Self::normalize(self.name()).starts_with(&Self::normalize(query))
    }
}

fn invalid_operation(reason: impl Into<String>) -> GameError {
    GameError::InvalidOperation(reason.into())
}

/// Fixed-capacity ordered collection of items. `find_item` matches by
/// lowercased, whitespace-stripped name prefix, exactly as the reference
/// implementation's `Inventory.find_item`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inventory {
    capacity: usize,
    items: Vec<ItemKind>,
}

impl Default for Inventory {
    fn default() -> Self {
        Self::new(20)
    }
}

impl Inventory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            items: Vec::new(),
        }
    }

    pub fn size(&self) -> usize {
        self.items.len()
    }

    pub fn items(&self) -> &[ItemKind] {
        &self.items
    }

    pub fn item_names(&self) -> Vec<&'static str> {
        self.items.iter().map(|i| i.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn add_item(&mut self, item: ItemKind) -> GameResult<()> {
        if self.is_full() {
            return Err(invalid_operation(format!(
                "Inventory is full. Cannot add {}.",
                item.name()
            )));
        }
        self.items.push(item);
        Ok(())
    }

    pub fn find_item(&self, query: &str) -> Option<(usize, ItemKind)> {
        self.items
            .iter()
            .enumerate()
            .find(|(_, item)| item.matches_prefix(query))
            .map(|(i, item)| (i, *item))
    }

    pub fn peek_item(&self, index: usize) -> GameResult<ItemKind> {
        self.items.get(index).copied().ok_or_else(|| {
            invalid_operation(format!(
                "No item at index {index}. Inventory size: {}.",
                self.size()
            ))
        })
    }

    pub fn take_item(&mut self, index: usize) -> GameResult<ItemKind> {
        let item = self.peek_item(index)?;
        self.items.remove(index);
        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_item_on_full_inventory_is_invalid_operation() {
        let mut inventory = Inventory::new(1);
        inventory.add_item(ItemKind::Pita).unwrap();
        let err = inventory.add_item(ItemKind::Oleem).unwrap_err();
        assert!(matches!(err, GameError::InvalidOperation(_)));
    }

    #[test]
    fn find_item_matches_case_insensitive_prefix_ignoring_spaces() {
        let mut inventory = Inventory::new(5);
        inventory.add_item(ItemKind::HolyScroll).unwrap();
        let (index, item) = inventory.find_item("holyscr").unwrap();
        assert_eq!(index, 0);
        assert_eq!(item, ItemKind::HolyScroll);
    }

    #[test]
    fn find_item_absent_returns_none() {
        let inventory = Inventory::new(5);
        assert!(inventory.find_item("pita").is_none());
    }
}
