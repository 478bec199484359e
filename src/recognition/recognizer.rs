//! Per-slot card recognition pipeline.

use std::path::PathBuf;

use image::GrayImage;
use log::{debug, info, warn};

use crate::core::card::Card;
use crate::core::game_state::{GamePhase, GameState};
use crate::error::{PickerError, PickerResult};
use crate::recognition::capture::{Frame, ScreenSource};
use crate::recognition::matcher::TemplateMatcher;
use crate::recognition::region::Region;
use crate::recognition::template::TemplateLibrary;
use crate::settings::RecognitionSettings;

/// An inclusive HSV band: hue in degrees (0..360), saturation and value in
/// [0, 1].
struct HsvBand {
    hue: (f32, f32),
    sat: (f32, f32),
    val: (f32, f32),
}

impl HsvBand {
    const fn new(hue: (f32, f32), sat: (f32, f32), val: (f32, f32)) -> Self {
        Self { hue, sat, val }
    }

    fn contains(&self, h: f32, s: f32, v: f32) -> bool {
        h >= self.hue.0
            && h <= self.hue.1
            && s >= self.sat.0
            && s <= self.sat.1
            && v >= self.val.0
            && v <= self.val.1
    }
}

/// Currency-gold band used by the shop-phase heuristic.
const GOLD_BAND: HsvBand = HsvBand::new((40.0, 80.0), (0.39, 1.0), (0.78, 1.0));

/// One disjoint color band per cost tier, keyed by the tier it votes for.
/// Tier 5 is the near-white prismatic frame, matched on low saturation.
const COST_BANDS: [(u8, HsvBand); 5] = [
    (1, HsvBand::new((80.0, 100.0), (0.78, 1.0), (0.78, 1.0))),
    (2, HsvBand::new((40.0, 60.0), (0.59, 1.0), (0.78, 1.0))),
    (3, HsvBand::new((0.0, 20.0), (0.39, 0.78), (0.78, 1.0))),
    (4, HsvBand::new((240.0, 280.0), (0.39, 1.0), (0.78, 1.0))),
    (5, HsvBand::new((0.0, 360.0), (0.0, 0.196), (0.78, 1.0))),
];

fn rgb_to_hsv(r: u8, g: u8, b: u8) -> (f32, f32, f32) {
    let r = f32::from(r) / 255.0;
    let g = f32::from(g) / 255.0;
    let b = f32::from(b) / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let h = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * (((g - b) / delta).rem_euclid(6.0))
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };
    let s = if max == 0.0 { 0.0 } else { delta / max };

    (h, s, max)
}

/// Fraction of frame pixels inside a band.
fn band_ratio(frame: &Frame, band: &HsvBand) -> f32 {
    let total = frame.width() as u64 * frame.height() as u64;
    if total == 0 {
        return 0.0;
    }
    let mut hits = 0u64;
    for pixel in frame.pixels() {
        let (h, s, v) = rgb_to_hsv(pixel[0], pixel[1], pixel[2]);
        if band.contains(h, s, v) {
            hits += 1;
        }
    }
    hits as f32 / total as f32
}

/// Recognizes shop cards from screen snapshots and maintains the aggregate
/// game state.
pub struct CardRecognizer {
    screen: Box<dyn ScreenSource>,
    library: TemplateLibrary,
    matcher: TemplateMatcher,
    game_state: GameState,
    shop_slots: Vec<Region>,
    phase_region: Region,
    templates_dir: PathBuf,
    season: String,
    slot_threshold: f32,
    gold_ratio: f32,
}

impl CardRecognizer {
    pub fn new(screen: Box<dyn ScreenSource>, settings: &RecognitionSettings) -> Self {
        let mut recognizer = Self {
            screen,
            library: TemplateLibrary::new(),
            matcher: TemplateMatcher::new(settings.match_threshold),
            game_state: GameState::new(),
            shop_slots: settings.shop_slots.clone(),
            phase_region: settings.phase_region.clone(),
            templates_dir: settings.templates_dir.clone(),
            season: settings.season.clone(),
            slot_threshold: settings.slot_threshold,
            gold_ratio: settings.gold_ratio,
        };
        recognizer.load_season_templates();
        recognizer
    }

    /// Load the active season's per-cost template directories plus the
    /// season-independent `general` directory. Missing directories are
    /// normal (a fresh install has none); unreadable files are skipped by
    /// the library.
    fn load_season_templates(&mut self) {
        for cost in 1..=5u8 {
            let dir = self.templates_dir.join(&self.season).join(cost.to_string());
            if !dir.is_dir() {
                continue;
            }
            let category = format!("{}-cost{}", self.season, cost);
            if let Err(err) = self.library.load_dir(&dir, &category) {
                warn!("season template load failed: {err}");
            }
        }
        let general = self.templates_dir.join("general");
        if general.is_dir()
            && let Err(err) = self.library.load_dir(&general, "general")
        {
            warn!("general template load failed: {err}");
        }
        info!(
            "season '{}' active with {} templates",
            self.season,
            self.library.len()
        );
    }

    /// Switch seasons: the library is fully cleared and reloaded.
    pub fn set_season(&mut self, season: &str) {
        self.season = season.to_string();
        self.library.clear();
        self.load_season_templates();
    }

    pub fn season(&self) -> &str {
        &self.season
    }

    pub fn set_shop_slots(&mut self, slots: Vec<Region>) {
        info!("shop layout updated, {} slots", slots.len());
        self.shop_slots = slots;
    }

    pub fn library(&self) -> &TemplateLibrary {
        &self.library
    }

    pub fn library_mut(&mut self) -> &mut TemplateLibrary {
        &mut self.library
    }

    pub fn state(&self) -> &GameState {
        &self.game_state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.game_state
    }

    /// Cheap shop-phase heuristic: the fraction of currency-colored pixels
    /// in the phase region.
    pub fn detect_shop_phase(&mut self) -> PickerResult<bool> {
        let frame = self.screen.capture(&self.phase_region);
        if frame.width() == 0 || frame.height() == 0 {
            return Err(PickerError::EmptyCapture {
                what: "phase region",
            });
        }

        let ratio = band_ratio(&frame, &GOLD_BAND);
        let shopping = ratio > self.gold_ratio;
        if shopping {
            self.game_state.set_shop_phase();
            debug!("shop phase detected (gold ratio {ratio:.3})");
        } else {
            self.game_state.set_lobby_phase();
        }
        Ok(shopping)
    }

    /// Recognize every shop slot and replace the game state's card list
    /// wholesale. Slots without a confident match are simply absent.
    pub fn recognize_cards(&mut self) -> Vec<Card> {
        let mut cards = Vec::new();

        for (index, region) in self.shop_slots.iter().enumerate() {
            let crop = self.screen.capture(region);
            if crop.width() == 0 || crop.height() == 0 {
                continue;
            }
            if let Some(mut card) = self.recognize_slot(&crop, index) {
                let (cx, cy) = region.center();
                card.set_position(cx, cy);
                cards.push(card);
            }
        }

        info!("recognized {} cards", cards.len());
        self.game_state.cards = cards.clone();
        cards
    }

    /// Label one slot crop with the best-matching template above the slot
    /// threshold.
    fn recognize_slot(&self, crop: &Frame, index: usize) -> Option<Card> {
        let gray: GrayImage = image::imageops::grayscale(crop);
        let results = self
            .matcher
            .match_all(&gray, &self.library, Some(self.slot_threshold));

        let mut best: Option<(&str, f32)> = None;
        for (name, matches) in &results {
            for m in matches {
                if best.is_none_or(|(_, top)| m.confidence > top) {
                    best = Some((name.as_str(), m.confidence));
                }
            }
        }

        let (name, confidence) = best?;
        debug!("slot {index}: {name} ({confidence:.3})");
        Some(
            Card::new(name, Self::estimate_cost(crop))
                .with_confidence(confidence)
                .with_shop_index(index),
        )
    }

    /// Estimate the cost tier from the slot's dominant frame color.
    ///
    /// Best-effort: independent of which template matched, so it can
    /// disagree with the card's true cost. Each tier's band votes with its
    /// pixel count; the largest band wins, ties to the lowest tier, and an
    /// all-miss crop defaults to 1.
    pub(crate) fn estimate_cost(crop: &Frame) -> u8 {
        let mut counts = [0u64; COST_BANDS.len()];
        for pixel in crop.pixels() {
            let (h, s, v) = rgb_to_hsv(pixel[0], pixel[1], pixel[2]);
            for (i, (_, band)) in COST_BANDS.iter().enumerate() {
                if band.contains(h, s, v) {
                    counts[i] += 1;
                }
            }
        }

        let mut best_cost = 1u8;
        let mut best_count = 0u64;
        for (i, (cost, _)) in COST_BANDS.iter().enumerate() {
            if counts[i] > best_count {
                best_count = counts[i];
                best_cost = *cost;
            }
        }
        best_cost
    }

    /// One full detection cycle: phase first, slots only while shopping.
    pub fn refresh_and_recognize(&mut self) -> PickerResult<Vec<Card>> {
        self.detect_shop_phase()?;
        if self.game_state.phase == GamePhase::Shopping {
            Ok(self.recognize_cards())
        } else {
            Ok(Vec::new())
        }
    }

    /// Resolve the click point for a card: its stored position, else the
    /// center of its shop slot.
    pub fn card_position(&self, card: &Card) -> Option<(u32, u32)> {
        if card.position != (0, 0) {
            return Some(card.position);
        }
        card.shop_index
            .and_then(|i| self.shop_slots.get(i))
            .map(Region::center)
    }
}
