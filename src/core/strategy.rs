//! Card selection strategies.
//!
//! Each strategy is an explicit variant with its own configuration surface;
//! the manager dispatches on [`StrategyKind`] rather than probing instances
//! for capabilities. Selection is pure: candidates are never mutated, and
//! only the automation controller marks the eventually picked card.

use std::collections::{HashMap, HashSet};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::core::card::Card;
use crate::core::game_state::GameState;

/// Bonus per cost point when the priority strategy prefers higher-cost cards.
const COST_BONUS: i64 = 10;

/// Weight applied to confidence as a tie-breaker in cost-weighted scoring.
const CONFIDENCE_WEIGHT: f32 = 0.1;

/// Tag identifying one strategy variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Priority,
    CostWeighted,
    TargetComp,
}

impl StrategyKind {
    pub fn id(self) -> &'static str {
        match self {
            Self::Priority => "priority",
            Self::CostWeighted => "cost_weighted",
            Self::TargetComp => "target_comp",
        }
    }
}

/// Picks the highest-ranked card from an externally supplied priority list.
#[derive(Debug, Clone)]
pub struct PriorityStrategy {
    priority_list: Vec<String>,
    max_cost: u8,
    prefer_higher_cost: bool,
}

impl Default for PriorityStrategy {
    fn default() -> Self {
        Self {
            priority_list: Vec::new(),
            max_cost: 5,
            prefer_higher_cost: true,
        }
    }
}

impl PriorityStrategy {
    pub fn new(priority_list: Vec<String>, max_cost: u8, prefer_higher_cost: bool) -> Self {
        Self {
            priority_list,
            max_cost,
            prefer_higher_cost,
        }
    }

    pub fn set_priority_list(&mut self, priority_list: Vec<String>) {
        info!("priority list updated, {} entries", priority_list.len());
        self.priority_list = priority_list;
    }

    pub fn set_max_cost(&mut self, max_cost: u8) {
        self.max_cost = max_cost;
    }

    pub fn set_prefer_higher_cost(&mut self, prefer: bool) {
        self.prefer_higher_cost = prefer;
    }

    pub fn priority_list(&self) -> &[String] {
        &self.priority_list
    }

    fn rank(&self, name: &str) -> Option<usize> {
        self.priority_list.iter().position(|p| p == name)
    }

    /// Candidates above `max_cost` are excluded before scoring. Among equal
    /// maximum scores the first candidate in iteration order wins; callers
    /// rely on that ordering, do not change it.
    pub fn select<'a>(&self, candidates: &'a [Card], _state: &GameState) -> Option<&'a Card> {
        let mut best: Option<(&Card, i64)> = None;
        for card in candidates.iter().filter(|c| c.cost <= self.max_cost) {
            let Some(rank) = self.rank(&card.name) else {
                continue;
            };
            let mut score = (self.priority_list.len() - rank) as i64;
            if self.prefer_higher_cost {
                score += i64::from(card.cost) * COST_BONUS;
            }
            if best.is_none_or(|(_, top)| score > top) {
                best = Some((card, score));
            }
        }
        if let Some((card, score)) = best {
            debug!("priority strategy chose {} (score {score})", card.name);
        }
        best.map(|(card, _)| card)
    }
}

/// Scores every candidate by a per-cost weight plus a confidence tie-breaker.
#[derive(Debug, Clone, Default)]
pub struct CostWeightedStrategy {
    weights: HashMap<u8, f32>,
}

impl CostWeightedStrategy {
    pub fn new(weights: HashMap<u8, f32>) -> Self {
        Self { weights }
    }

    pub fn set_weights(&mut self, weights: HashMap<u8, f32>) {
        self.weights = weights;
    }

    fn weight(&self, cost: u8) -> f32 {
        self.weights.get(&cost).copied().unwrap_or(1.0)
    }

    pub fn select<'a>(&self, candidates: &'a [Card], _state: &GameState) -> Option<&'a Card> {
        let mut best: Option<(&Card, f32)> = None;
        for card in candidates {
            let score = self.weight(card.cost) + card.confidence * CONFIDENCE_WEIGHT;
            if best.is_none_or(|(_, top)| score > top) {
                best = Some((card, score));
            }
        }
        best.map(|(card, _)| card)
    }
}

/// Returns the first candidate, in slot order, that the target composition
/// needs. No scoring.
#[derive(Debug, Clone, Default)]
pub struct TargetCompStrategy {
    target: HashSet<String>,
}

impl TargetCompStrategy {
    pub fn new(target: impl IntoIterator<Item = String>) -> Self {
        Self {
            target: target.into_iter().collect(),
        }
    }

    pub fn set_target_comp(&mut self, target: impl IntoIterator<Item = String>) {
        self.target = target.into_iter().collect();
        info!("target composition updated, {} entries", self.target.len());
    }

    pub fn select<'a>(&self, candidates: &'a [Card], _state: &GameState) -> Option<&'a Card> {
        candidates.iter().find(|c| self.target.contains(&c.name))
    }
}

/// Owns one configured instance of every strategy variant and dispatches
/// selection to the active one.
#[derive(Debug, Clone)]
pub struct StrategyManager {
    priority: PriorityStrategy,
    cost_weighted: CostWeightedStrategy,
    target_comp: TargetCompStrategy,
    active: StrategyKind,
}

impl Default for StrategyManager {
    fn default() -> Self {
        Self {
            priority: PriorityStrategy::default(),
            cost_weighted: CostWeightedStrategy::default(),
            target_comp: TargetCompStrategy::default(),
            active: StrategyKind::Priority,
        }
    }
}

impl StrategyManager {
    pub fn new(active: StrategyKind) -> Self {
        Self {
            active,
            ..Self::default()
        }
    }

    pub fn active(&self) -> StrategyKind {
        self.active
    }

    pub fn active_id(&self) -> &'static str {
        self.active.id()
    }

    pub fn set_active(&mut self, kind: StrategyKind) {
        if self.active != kind {
            info!("strategy switched: {} -> {}", self.active.id(), kind.id());
            self.active = kind;
        }
    }

    pub fn set_priority_list(&mut self, list: Vec<String>) {
        self.priority.set_priority_list(list);
    }

    pub fn set_max_cost(&mut self, max_cost: u8) {
        self.priority.set_max_cost(max_cost);
    }

    pub fn set_prefer_higher_cost(&mut self, prefer: bool) {
        self.priority.set_prefer_higher_cost(prefer);
    }

    pub fn set_cost_weights(&mut self, weights: HashMap<u8, f32>) {
        self.cost_weighted.set_weights(weights);
    }

    pub fn set_target_comp(&mut self, target: Vec<String>) {
        self.target_comp.set_target_comp(target);
    }

    pub fn select<'a>(&self, candidates: &'a [Card], state: &GameState) -> Option<&'a Card> {
        if candidates.is_empty() {
            return None;
        }
        match self.active {
            StrategyKind::Priority => self.priority.select(candidates, state),
            StrategyKind::CostWeighted => self.cost_weighted.select(candidates, state),
            StrategyKind::TargetComp => self.target_comp.select(candidates, state),
        }
    }
}
