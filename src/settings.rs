//! Runtime settings with serde-backed defaults.
//!
//! Every field has a default so a partial (or absent) JSON file is fine;
//! unknown sections are ignored. Persistence of priority lists and deck
//! presets is left to the embedding application.

use std::path::{Path, PathBuf};
use std::time::Duration;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::core::strategy::StrategyKind;
use crate::error::{PickerError, PickerResult};
use crate::recognition::region::{Region, default_phase_region, default_shop_slots};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub automation: AutomationSettings,
    pub recognition: RecognitionSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AutomationSettings {
    /// Sleep between detect→select→act ticks.
    pub detect_interval_ms: u64,
    /// Minimum elapsed time between two dispatched picks.
    pub pick_cooldown_ms: u64,
    /// Uniform random offset (± pixels) applied to pick clicks.
    pub offset_range: i32,
    /// Strategy active at startup.
    pub strategy: StrategyKind,
}

impl Default for AutomationSettings {
    fn default() -> Self {
        Self {
            detect_interval_ms: 300,
            pick_cooldown_ms: 500,
            offset_range: 10,
            strategy: StrategyKind::Priority,
        }
    }
}

impl AutomationSettings {
    pub fn detect_interval(&self) -> Duration {
        Duration::from_millis(self.detect_interval_ms)
    }

    pub fn pick_cooldown(&self) -> Duration {
        Duration::from_millis(self.pick_cooldown_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionSettings {
    /// Root directory holding `<season>/<cost>/` template folders.
    pub templates_dir: PathBuf,
    /// Active season grouping of templates.
    pub season: String,
    /// Per-slot match acceptance threshold.
    pub slot_threshold: f32,
    /// Default correlation threshold of the matcher itself.
    pub match_threshold: f32,
    /// Fraction of currency-colored pixels that flags the shop phase.
    pub gold_ratio: f32,
    /// One region per shop slot, in slot order.
    pub shop_slots: Vec<Region>,
    /// Region scanned by the phase heuristic.
    pub phase_region: Region,
}

impl Default for RecognitionSettings {
    fn default() -> Self {
        Self {
            templates_dir: PathBuf::from("resources/cards"),
            season: "s13".to_string(),
            slot_threshold: 0.7,
            match_threshold: 0.8,
            gold_ratio: 0.02,
            shop_slots: default_shop_slots(),
            phase_region: default_phase_region(),
        }
    }
}

impl Settings {
    /// Load settings from a JSON file.
    pub fn load(path: &Path) -> PickerResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| PickerError::SettingsRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| PickerError::SettingsParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load settings, falling back to defaults on any failure.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(settings) => settings,
            Err(err) => {
                warn!("using default settings: {err}");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let settings = Settings::default();
        assert_eq!(settings.automation.detect_interval(), Duration::from_millis(300));
        assert_eq!(settings.automation.pick_cooldown(), Duration::from_millis(500));
        assert_eq!(settings.automation.offset_range, 10);
        assert_eq!(settings.recognition.shop_slots.len(), 5);
        assert_eq!(settings.recognition.season, "s13");
    }

    #[test]
    fn partial_json_keeps_remaining_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"automation": {"pick_cooldown_ms": 900}}"#).unwrap();
        assert_eq!(settings.automation.pick_cooldown_ms, 900);
        assert_eq!(settings.automation.detect_interval_ms, 300);
        assert_eq!(settings.recognition.slot_threshold, 0.7);
    }

    #[test]
    fn strategy_names_round_trip() {
        let settings: Settings =
            serde_json::from_str(r#"{"automation": {"strategy": "cost_weighted"}}"#).unwrap();
        assert_eq!(settings.automation.strategy, StrategyKind::CostWeighted);
    }
}
