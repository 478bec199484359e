//! Stateless normalized cross-correlation engine.
//!
//! Cost is proportional to template count × source pixel count, which stays
//! cheap only because callers hand in small per-slot crops, never full
//! screenshots.

use std::collections::HashMap;

use image::GrayImage;
use imageproc::template_matching::{MatchTemplateMethod, match_template};

use crate::recognition::template::{Template, TemplateLibrary};

/// Default correlation score required to accept a match.
pub const DEFAULT_THRESHOLD: f32 = 0.8;

/// One accepted match location.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub confidence: f32,
}

impl MatchResult {
    pub fn center(&self) -> (u32, u32) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }
}

/// Correlation matcher with a configurable acceptance threshold.
#[derive(Debug, Clone)]
pub struct TemplateMatcher {
    default_threshold: f32,
}

impl Default for TemplateMatcher {
    fn default() -> Self {
        Self {
            default_threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl TemplateMatcher {
    pub fn new(default_threshold: f32) -> Self {
        Self { default_threshold }
    }

    pub fn default_threshold(&self) -> f32 {
        self.default_threshold
    }

    /// Every location in `source` where the template correlates at or above
    /// the threshold. An empty or zero-area source, or a template larger
    /// than the source, yields an empty result rather than an error.
    pub fn matches(
        &self,
        source: &GrayImage,
        template: &Template,
        threshold: Option<f32>,
    ) -> Vec<MatchResult> {
        let threshold = threshold.unwrap_or(self.default_threshold);
        let (sw, sh) = source.dimensions();
        let (tw, th) = (template.width(), template.height());

        if sw == 0 || sh == 0 || tw == 0 || th == 0 || tw > sw || th > sh {
            return Vec::new();
        }

        let surface = match_template(
            source,
            &template.image,
            MatchTemplateMethod::CrossCorrelationNormalized,
        );

        let mut results = Vec::new();
        for (x, y, pixel) in surface.enumerate_pixels() {
            let confidence = pixel[0];
            if confidence >= threshold {
                results.push(MatchResult {
                    x,
                    y,
                    width: tw,
                    height: th,
                    confidence,
                });
            }
        }
        results
    }

    /// Match every library template against the source, keeping only
    /// templates that produced at least one match.
    pub fn match_all(
        &self,
        source: &GrayImage,
        library: &TemplateLibrary,
        threshold: Option<f32>,
    ) -> HashMap<String, Vec<MatchResult>> {
        let mut results = HashMap::new();
        for template in library.iter() {
            let matches = self.matches(source, template, threshold);
            if !matches.is_empty() {
                results.insert(template.name.clone(), matches);
            }
        }
        results
    }

    /// The argmax-confidence match for one template, if any cleared the
    /// threshold.
    pub fn find_best(
        &self,
        source: &GrayImage,
        template: &Template,
        threshold: Option<f32>,
    ) -> Option<MatchResult> {
        self.matches(source, template, threshold)
            .into_iter()
            .max_by(|a, b| {
                a.confidence
                    .partial_cmp(&b.confidence)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    }
}
