// Automation: the pointer seam and the detect→select→act controller.

pub mod actuator;
pub mod controller;
pub mod types;

pub use actuator::{Actuator, LogActuator};
pub use controller::AutoPicker;
pub use types::{PickerCommand, PickerEvent, PickerState, Statistics};
