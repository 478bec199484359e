//! Image recognition: screen capture seams, template storage, correlation
//! matching, and the per-slot card recognition pipeline.

pub mod capture;
pub mod matcher;
pub mod recognizer;
pub mod region;
pub mod template;

#[cfg(test)]
mod tests;

pub use capture::{Frame, ScreenSource, StillImageSource};
pub use matcher::{MatchResult, TemplateMatcher};
pub use recognizer::CardRecognizer;
pub use region::Region;
pub use template::{Template, TemplateLibrary};
