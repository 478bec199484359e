//! Types and enums for the automation controller.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use crate::core::card::Card;
use crate::core::game_state::GamePhase;
use crate::core::strategy::StrategyKind;

/// Controller lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerState {
    Stopped,
    Running,
    Paused,
}

impl PickerState {
    pub fn name(self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Running => "running",
            Self::Paused => "paused",
        }
    }
}

impl fmt::Display for PickerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Configuration changes delivered to the loop as polled signals; each takes
/// effect at the top of the next tick, never mid-tick.
#[derive(Debug, Clone)]
pub enum PickerCommand {
    SetStrategy(StrategyKind),
    SetPriorityList(Vec<String>),
    SetCostWeights(HashMap<u8, f32>),
    SetTargetComp(Vec<String>),
    SetDetectInterval(Duration),
    SetPickCooldown(Duration),
    SetSeason(String),
    ResetSession,
}

/// Observable loop output.
#[derive(Debug, Clone)]
pub enum PickerEvent {
    StateChanged(PickerState),
    CardsRecognized(Vec<Card>),
    CardPicked(Card),
    Error(String),
}

/// Point-in-time statistics snapshot.
#[derive(Debug, Clone)]
pub struct Statistics {
    pub total_picks: u64,
    pub session_picks: u64,
    pub state: PickerState,
    pub strategy: &'static str,
    pub phase: GamePhase,
    pub recognized_cards: usize,
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "picks={} (session {}), state={}, strategy={}, phase={}, cards={}",
            self.total_picks,
            self.session_picks,
            self.state,
            self.strategy,
            self.phase,
            self.recognized_cards
        )
    }
}
