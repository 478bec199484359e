//! Shop-card recognition and auto-pick automation.
//!
//! Pipeline per tick: a [`ScreenSource`](recognition::ScreenSource) snapshot
//! feeds the [`CardRecognizer`](recognition::CardRecognizer), the active
//! selection strategy chooses one candidate, and the
//! [`AutoPicker`](automation::AutoPicker) dispatches it to an
//! [`Actuator`](automation::Actuator) under cooldown control.

pub mod automation;
pub mod core;
pub mod error;
pub mod recognition;
pub mod settings;

pub use crate::core::{Card, CardRarity, GamePhase, GameState, StrategyKind, StrategyManager};
pub use automation::{Actuator, AutoPicker, LogActuator, PickerEvent, PickerState, Statistics};
pub use error::{PickerError, PickerResult};
pub use recognition::{
    CardRecognizer, Frame, MatchResult, Region, ScreenSource, StillImageSource, Template,
    TemplateLibrary, TemplateMatcher,
};
pub use settings::Settings;
