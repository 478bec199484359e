//! Game phase tracking and per-session state.

use std::fmt;
use std::time::Instant;

use log::info;
use serde::{Deserialize, Serialize};

use crate::core::card::Card;

/// Coarse game phase derived from screen contents.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Unknown = 0,
    Lobby = 1,
    Shopping = 2,
    Picking = 3,
    Battling = 4,
    GameOver = 5,
    Paused = 6,
}

impl GamePhase {
    /// Inverse of the `repr(u8)` discriminant; used when the phase travels
    /// through an atomic.
    pub fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::Lobby,
            2 => Self::Shopping,
            3 => Self::Picking,
            4 => Self::Battling,
            5 => Self::GameOver,
            6 => Self::Paused,
            _ => Self::Unknown,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Lobby => "lobby",
            Self::Shopping => "shopping",
            Self::Picking => "picking",
            Self::Battling => "battling",
            Self::GameOver => "game_over",
            Self::Paused => "paused",
        }
    }
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Aggregate recognition state for one session.
///
/// The card list is replaced wholesale on every detection cycle: there is no
/// cross-frame identity tracking, so stale cards vanish and selected flags do
/// not persist across cycles.
#[derive(Debug)]
pub struct GameState {
    pub phase: GamePhase,
    pub cards: Vec<Card>,
    pub active: bool,
    last_phase_change: Option<Instant>,
}

impl GameState {
    pub fn new() -> Self {
        Self {
            phase: GamePhase::Unknown,
            cards: Vec::new(),
            active: false,
            last_phase_change: None,
        }
    }

    pub fn update_phase(&mut self, new_phase: GamePhase) {
        if self.phase != new_phase {
            info!("game phase changed: {} -> {}", self.phase, new_phase);
            self.phase = new_phase;
            self.last_phase_change = Some(Instant::now());
        }
    }

    pub fn set_shop_phase(&mut self) {
        self.update_phase(GamePhase::Shopping);
        self.active = true;
    }

    pub fn set_lobby_phase(&mut self) {
        self.update_phase(GamePhase::Lobby);
        self.active = false;
    }

    pub fn set_battle_phase(&mut self) {
        self.update_phase(GamePhase::Battling);
        self.active = false;
    }

    pub fn last_phase_change(&self) -> Option<Instant> {
        self.last_phase_change
    }

    /// Flag the named card as selected in the current list.
    pub fn mark_selected(&mut self, name: &str) -> bool {
        match self.cards.iter_mut().find(|c| c.name == name) {
            Some(card) => {
                card.select();
                true
            }
            None => false,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
        info!("game state reset");
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "GameState(phase={}, cards={}, active={})",
            self.phase,
            self.cards.len(),
            self.active
        )
    }
}
