//! Tests for the recognition pipeline: matching, template storage, and the
//! per-slot recognizer, all against synthetic in-memory images.

use std::path::PathBuf;

use image::{GrayImage, Luma, Rgb, RgbImage};

use crate::recognition::capture::{ScreenSource, StillImageSource};
use crate::recognition::matcher::TemplateMatcher;
use crate::recognition::recognizer::CardRecognizer;
use crate::recognition::region::Region;
use crate::recognition::template::{Template, TemplateLibrary};
use crate::settings::RecognitionSettings;

const SCREEN_W: u32 = 1280;
const SCREEN_H: u32 = 800;

/// Cost-tier band colors (RGB) used to paint synthetic crops.
const COST1_GREEN: Rgb<u8> = Rgb([128, 255, 0]);
const COST2_GOLD: Rgb<u8> = Rgb([255, 255, 0]);
const COST3_RED: Rgb<u8> = Rgb([230, 115, 92]);
const COST4_PURPLE: Rgb<u8> = Rgb([107, 46, 229]);
const COST5_WHITE: Rgb<u8> = Rgb([250, 250, 250]);

fn solid_rgb(width: u32, height: u32, color: Rgb<u8>) -> RgbImage {
    RgbImage::from_pixel(width, height, color)
}

fn fill_region(frame: &mut RgbImage, region: &Region, color: Rgb<u8>) {
    for y in region.top..region.top + region.height {
        for x in region.left..region.left + region.width {
            frame.put_pixel(x, y, color);
        }
    }
}

/// A dark-dominant marker with a small bright square. Low mean-to-rms ratio,
/// so plain normalized cross-correlation cannot fake a match against flat
/// crops.
fn paint_marker(frame: &mut RgbImage, left: u32, top: u32) {
    fill_region(frame, &Region::new(left, top, 100, 100), Rgb([0, 0, 0]));
    fill_region(frame, &Region::new(left + 10, top + 10, 30, 30), Rgb([255, 255, 255]));
}

/// A shopping-phase screen: gold-saturated shop strip, slot 0 carrying a
/// 4-cost card frame with a recognizable marker, remaining slots flat gold.
fn shop_screen() -> RgbImage {
    let mut frame = solid_rgb(SCREEN_W, SCREEN_H, Rgb([10, 10, 12]));
    fill_region(
        &mut frame,
        &crate::recognition::region::default_phase_region(),
        COST2_GOLD,
    );
    let slot0 = Region::new(200, 500, 150, 200);
    fill_region(&mut frame, &slot0, COST4_PURPLE);
    paint_marker(&mut frame, slot0.left, slot0.top);
    frame
}

/// Grayscale copy of the marker as it appears in slot 0.
fn marker_template(screen: &RgbImage) -> Template {
    let crop = image::imageops::crop_imm(screen, 200, 500, 100, 100).to_image();
    Template::new("draven", "test", image::imageops::grayscale(&crop))
}

fn recognizer_settings() -> RecognitionSettings {
    RecognitionSettings {
        templates_dir: PathBuf::from("does-not-exist"),
        ..RecognitionSettings::default()
    }
}

fn shop_recognizer() -> CardRecognizer {
    let screen = shop_screen();
    let template = marker_template(&screen);
    let mut recognizer = CardRecognizer::new(
        Box::new(StillImageSource::new(screen)),
        &recognizer_settings(),
    );
    recognizer.library_mut().insert(template);
    recognizer
}

// -- TemplateMatcher --------------------------------------------------------

#[test]
fn zero_size_source_yields_no_matches_for_any_template() {
    let mut library = TemplateLibrary::new();
    library.insert(Template::new("a", "test", GrayImage::from_pixel(8, 8, Luma([100]))));
    library.insert(Template::new("b", "test", GrayImage::from_pixel(4, 4, Luma([200]))));

    let matcher = TemplateMatcher::default();
    let empty = GrayImage::new(0, 0);

    assert!(matcher.match_all(&empty, &library, None).is_empty());
    for template in library.iter() {
        assert!(matcher.matches(&empty, template, None).is_empty());
    }
}

#[test]
fn oversized_template_yields_no_matches() {
    let matcher = TemplateMatcher::default();
    let source = GrayImage::from_pixel(10, 10, Luma([100]));
    let template = Template::new("big", "test", GrayImage::from_pixel(20, 20, Luma([100])));
    assert!(matcher.matches(&source, &template, None).is_empty());
}

#[test]
fn exact_subimage_matches_at_its_location() {
    let screen = shop_screen();
    let gray = image::imageops::grayscale(&screen);
    let slot = image::imageops::crop_imm(&gray, 200, 500, 150, 200).to_image();
    let template = marker_template(&screen);

    let matcher = TemplateMatcher::default();
    let best = matcher.find_best(&slot, &template, None).expect("match");
    assert!(best.confidence > 0.99);
    assert_eq!((best.x, best.y), (0, 0));
    assert_eq!((best.width, best.height), (100, 100));
    assert_eq!(best.center(), (50, 50));
}

#[test]
fn threshold_is_overridable_per_call() {
    let matcher = TemplateMatcher::default();
    // Dark-dominant template against a flat source: weak correlation.
    let mut template_img = GrayImage::from_pixel(20, 20, Luma([0]));
    for y in 0..6 {
        for x in 0..6 {
            template_img.put_pixel(x, y, Luma([255]));
        }
    }
    let template = Template::new("marker", "test", template_img);
    let source = GrayImage::from_pixel(40, 40, Luma([180]));

    assert!(matcher.matches(&source, &template, None).is_empty());
    assert!(!matcher.matches(&source, &template, Some(0.1)).is_empty());
}

#[test]
fn match_all_keeps_only_templates_that_matched() {
    let screen = shop_screen();
    let gray = image::imageops::grayscale(&screen);
    let slot = image::imageops::crop_imm(&gray, 200, 500, 150, 200).to_image();

    let mut library = TemplateLibrary::new();
    library.insert(marker_template(&screen));
    // Dark-dominant pattern absent from the slot.
    let mut absent = GrayImage::from_pixel(60, 60, Luma([0]));
    for y in 30..50 {
        for x in 0..20 {
            absent.put_pixel(x, y, Luma([255]));
        }
    }
    library.insert(Template::new("absent", "test", absent));

    let matcher = TemplateMatcher::default();
    let results = matcher.match_all(&slot, &library, Some(0.7));
    assert!(results.contains_key("draven"));
    assert!(!results.contains_key("absent"));
}

// -- TemplateLibrary --------------------------------------------------------

fn scratch_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("tft-auto-pick-{}-{}", tag, std::process::id()));
    std::fs::create_dir_all(&dir).expect("create scratch dir");
    dir
}

#[test]
fn load_dir_round_trips_names_and_dimensions() {
    let dir = scratch_dir("load-dir");
    GrayImage::from_pixel(12, 34, Luma([50]))
        .save(dir.join("alpha.png"))
        .expect("save alpha");
    GrayImage::from_pixel(56, 7, Luma([150]))
        .save(dir.join("beta.png"))
        .expect("save beta");
    // An unreadable file and an unsupported extension are both skipped.
    std::fs::write(dir.join("broken.png"), b"not an image").expect("write broken");
    std::fs::write(dir.join("notes.txt"), b"ignore me").expect("write notes");

    let mut library = TemplateLibrary::new();
    let loaded = library.load_dir(&dir, "season-test").expect("load dir");
    assert_eq!(loaded, 2);
    assert_eq!(library.len(), 2);

    let alpha = library.get("alpha").expect("alpha loaded");
    assert_eq!((alpha.width(), alpha.height()), (12, 34));
    assert_eq!(alpha.category, "season-test");
    let beta = library.get("beta").expect("beta loaded");
    assert_eq!((beta.width(), beta.height()), (56, 7));

    let mut names = library.names_in_category("season-test");
    names.sort_unstable();
    assert_eq!(names, vec!["alpha", "beta"]);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn load_dir_errors_on_missing_directory() {
    let mut library = TemplateLibrary::new();
    assert!(library.load_dir(&PathBuf::from("no/such/dir"), "x").is_err());
}

#[test]
fn same_name_load_silently_overwrites() {
    let mut library = TemplateLibrary::new();
    library.insert(Template::new("x", "old", GrayImage::new(10, 10)));
    library.insert(Template::new("x", "new", GrayImage::new(20, 20)));
    assert_eq!(library.len(), 1);
    let kept = library.get("x").expect("x present");
    assert_eq!(kept.width(), 20);
    assert_eq!(kept.category, "new");
}

#[test]
fn clear_empties_the_library() {
    let mut library = TemplateLibrary::new();
    library.insert(Template::new("x", "c", GrayImage::new(5, 5)));
    assert!(!library.is_empty());
    library.clear();
    assert!(library.is_empty());
}

// -- StillImageSource -------------------------------------------------------

#[test]
fn capture_outside_frame_returns_empty() {
    let mut source = StillImageSource::new(solid_rgb(100, 50, Rgb([0, 0, 0])));
    let frame = source.capture(&Region::new(90, 40, 20, 20));
    assert_eq!(frame.dimensions(), (0, 0));

    let ok = source.capture(&Region::new(10, 10, 20, 20));
    assert_eq!(ok.dimensions(), (20, 20));
    assert_eq!(source.size(), (100, 50));
}

// -- CardRecognizer ---------------------------------------------------------

#[test]
fn gold_saturated_region_flags_shopping_phase() {
    let mut recognizer = shop_recognizer();
    assert!(recognizer.detect_shop_phase().expect("capture ok"));
    assert_eq!(
        recognizer.state().phase,
        crate::core::game_state::GamePhase::Shopping
    );
    assert!(recognizer.state().active);
}

#[test]
fn dark_frame_flags_lobby_phase() {
    let screen = solid_rgb(SCREEN_W, SCREEN_H, Rgb([10, 10, 12]));
    let mut recognizer = CardRecognizer::new(
        Box::new(StillImageSource::new(screen)),
        &recognizer_settings(),
    );
    assert!(!recognizer.detect_shop_phase().expect("capture ok"));
    assert_eq!(
        recognizer.state().phase,
        crate::core::game_state::GamePhase::Lobby
    );
    assert!(!recognizer.state().active);

    // Recognition is short-circuited outside the shop phase.
    let cards = recognizer.refresh_and_recognize().expect("cycle ok");
    assert!(cards.is_empty());
}

#[test]
fn empty_capture_is_a_recognition_failure() {
    // Frame far smaller than the phase region: the capture comes back empty.
    let mut recognizer = CardRecognizer::new(
        Box::new(StillImageSource::new(solid_rgb(100, 50, Rgb([0, 0, 0])))),
        &recognizer_settings(),
    );
    assert!(recognizer.detect_shop_phase().is_err());
}

#[test]
fn recognizes_slot_with_loaded_template() {
    let mut recognizer = shop_recognizer();
    let cards = recognizer.refresh_and_recognize().expect("cycle ok");

    assert_eq!(cards.len(), 1);
    let card = &cards[0];
    assert_eq!(card.name, "draven");
    assert_eq!(card.shop_index, Some(0));
    assert!(card.confidence > 0.9);
    // 4-cost frame color dominates the slot crop.
    assert_eq!(card.cost, 4);
    // Position is the slot center.
    assert_eq!(card.position, (275, 600));
    // Recognized list is mirrored into the game state wholesale.
    assert_eq!(recognizer.state().cards, cards);
}

#[test]
fn recognition_replaces_card_list_wholesale() {
    let mut recognizer = shop_recognizer();
    recognizer.state_mut().cards = vec![crate::core::card::Card::new("stale", 1)];
    let cards = recognizer.refresh_and_recognize().expect("cycle ok");
    assert_eq!(recognizer.state().cards, cards);
    assert!(!recognizer.state().cards.iter().any(|c| c.name == "stale"));
}

#[test]
fn cost_bands_vote_for_their_tier() {
    let cases = [
        (COST1_GREEN, 1u8),
        (COST2_GOLD, 2),
        (COST3_RED, 3),
        (COST4_PURPLE, 4),
        (COST5_WHITE, 5),
    ];
    for (color, expected) in cases {
        let crop = solid_rgb(40, 40, color);
        assert_eq!(CardRecognizer::estimate_cost(&crop), expected);
    }

    // A crop hitting no band falls back to the lowest tier.
    let dark = solid_rgb(40, 40, Rgb([10, 10, 10]));
    assert_eq!(CardRecognizer::estimate_cost(&dark), 1);
}

#[test]
fn card_position_falls_back_to_slot_center() {
    let recognizer = shop_recognizer();

    let mut explicit = crate::core::card::Card::new("a", 1);
    explicit.set_position(42, 43);
    assert_eq!(recognizer.card_position(&explicit), Some((42, 43)));

    let slotted = crate::core::card::Card::new("b", 1).with_shop_index(2);
    assert_eq!(recognizer.card_position(&slotted), Some((675, 600)));

    let unplaced = crate::core::card::Card::new("c", 1);
    assert_eq!(recognizer.card_position(&unplaced), None);
}

#[test]
fn season_switch_clears_and_reloads_library() {
    let mut recognizer = shop_recognizer();
    assert_eq!(recognizer.library().len(), 1);
    // No template directories exist for the new season, so the reload
    // leaves the library empty.
    recognizer.set_season("s99");
    assert_eq!(recognizer.season(), "s99");
    assert!(recognizer.library().is_empty());
}
