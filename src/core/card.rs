//! Card data model.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Card rarity tier, derived 1:1 from the shop cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardRarity {
    OneCost,
    TwoCost,
    ThreeCost,
    FourCost,
    FiveCost,
    Unknown,
}

impl CardRarity {
    /// Map a shop cost to its rarity tier. Anything outside 1..=5 is Unknown.
    pub fn from_cost(cost: u8) -> Self {
        match cost {
            1 => Self::OneCost,
            2 => Self::TwoCost,
            3 => Self::ThreeCost,
            4 => Self::FourCost,
            5 => Self::FiveCost,
            _ => Self::Unknown,
        }
    }

    pub fn cost(self) -> u8 {
        match self {
            Self::OneCost => 1,
            Self::TwoCost => 2,
            Self::ThreeCost => 3,
            Self::FourCost => 4,
            Self::FiveCost => 5,
            Self::Unknown => 0,
        }
    }
}

impl fmt::Display for CardRarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::OneCost => "1-cost",
            Self::TwoCost => "2-cost",
            Self::ThreeCost => "3-cost",
            Self::FourCost => "4-cost",
            Self::FiveCost => "5-cost",
            Self::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// A single recognized shop card.
///
/// Equality and hashing are defined by `name` alone: two cards with the same
/// name but different cost or confidence compare equal. Priority-list and
/// target-composition membership depend on this.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
    pub name: String,
    pub cost: u8,
    pub rarity: CardRarity,
    pub classes: Vec<String>,
    pub confidence: f32,
    pub position: (u32, u32),
    pub shop_index: Option<usize>,
    pub selected: bool,
}

impl Card {
    pub fn new(name: impl Into<String>, cost: u8) -> Self {
        Self {
            name: name.into(),
            cost,
            rarity: CardRarity::from_cost(cost),
            classes: Vec::new(),
            confidence: 0.0,
            position: (0, 0),
            shop_index: None,
            selected: false,
        }
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn with_classes(mut self, classes: Vec<String>) -> Self {
        self.classes = classes;
        self
    }

    pub fn with_shop_index(mut self, index: usize) -> Self {
        self.shop_index = Some(index);
        self
    }

    pub fn set_position(&mut self, x: u32, y: u32) {
        self.position = (x, y);
    }

    pub fn select(&mut self) {
        self.selected = true;
    }

    pub fn deselect(&mut self) {
        self.selected = false;
    }

    /// Whether this card appears in a priority name list.
    pub fn matches_priority(&self, priorities: &[String]) -> bool {
        priorities.iter().any(|p| p == &self.name)
    }

    /// Case-insensitive class-tag membership test.
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c.eq_ignore_ascii_case(class))
    }
}

impl PartialEq for Card {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Card {}

impl Hash for Card {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.rarity, self.name)?;
        if !self.classes.is_empty() {
            write!(f, " ({})", self.classes.join("/"))?;
        }
        Ok(())
    }
}
