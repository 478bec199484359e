// Core domain types: cards, game state, and the selection-strategy family.

pub mod card;
pub mod game_state;
pub mod strategy;

pub use card::{Card, CardRarity};
pub use game_state::{GamePhase, GameState};
pub use strategy::{
    CostWeightedStrategy, PriorityStrategy, StrategyKind, StrategyManager, TargetCompStrategy,
};
