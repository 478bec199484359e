use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tft_auto_pick::automation::{AutoPicker, LogActuator, PickerEvent};
use tft_auto_pick::recognition::{CardRecognizer, StillImageSource};
use tft_auto_pick::settings::Settings;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();

    // Defaults
    let mut mode: Option<Mode> = None;
    let mut config_path: Option<PathBuf> = None;
    let mut season: Option<String> = None;
    let mut seconds: u64 = 5;

    // Parse all flags (skip program name)
    for arg in args.iter().skip(1) {
        if arg == "--help" || arg == "-h" {
            print_help();
            return;
        } else if arg == "--version" || arg == "-v" {
            println!("tft-auto-pick v{}", env!("CARGO_PKG_VERSION"));
            return;
        } else if let Some(rest) = arg.strip_prefix("--recognize=") {
            mode = Some(Mode::Recognize(PathBuf::from(rest)));
        } else if let Some(rest) = arg.strip_prefix("--dry-run=") {
            mode = Some(Mode::DryRun(PathBuf::from(rest)));
        } else if let Some(rest) = arg.strip_prefix("--config=") {
            config_path = Some(PathBuf::from(rest));
        } else if let Some(rest) = arg.strip_prefix("--season=") {
            season = Some(rest.to_string());
        } else if let Some(rest) = arg.strip_prefix("--seconds=") {
            match rest.parse::<u64>() {
                Ok(value) => seconds = value.max(1),
                Err(_) => {
                    println!("❌ Invalid --seconds value: {rest}");
                    return;
                }
            }
        } else {
            println!("❌ Unknown argument: {arg}");
            print_help();
            return;
        }
    }

    let mut settings = match &config_path {
        Some(path) => Settings::load_or_default(path),
        None => Settings::default(),
    };
    if let Some(season) = season {
        settings.recognition.season = season;
    }

    match mode {
        Some(Mode::Recognize(path)) => recognize(&path, &settings),
        Some(Mode::DryRun(path)) => dry_run(&path, &settings, seconds),
        None => print_help(),
    }
}

enum Mode {
    Recognize(PathBuf),
    DryRun(PathBuf),
}

/// Run one recognition pass over a screenshot file and print the result.
fn recognize(path: &Path, settings: &Settings) {
    let source = match StillImageSource::from_file(path) {
        Ok(source) => source,
        Err(err) => {
            println!("❌ {err}");
            return;
        }
    };

    let mut recognizer = CardRecognizer::new(Box::new(source), &settings.recognition);
    if recognizer.library().is_empty() {
        println!(
            "⚠️ No templates under {:?} for season '{}', nothing can match",
            settings.recognition.templates_dir,
            recognizer.season()
        );
    }

    match recognizer.refresh_and_recognize() {
        Ok(cards) => {
            println!("🎮 Phase: {}", recognizer.state().phase);
            if cards.is_empty() {
                println!("👀 No cards recognized");
            }
            for card in &cards {
                println!(
                    "🃏 Slot {}: {} (confidence {:.3}) at ({}, {})",
                    card.shop_index.map_or_else(|| "?".to_string(), |i| i.to_string()),
                    card,
                    card.confidence,
                    card.position.0,
                    card.position.1
                );
            }
        }
        Err(err) => println!("❌ Recognition failed: {err}"),
    }
}

/// Drive the full controller against a still screenshot with the logging
/// actuator, then print the statistics snapshot.
fn dry_run(path: &Path, settings: &Settings, seconds: u64) {
    let source = match StillImageSource::from_file(path) {
        Ok(source) => source,
        Err(err) => {
            println!("❌ {err}");
            return;
        }
    };
    let (width, height) = {
        use tft_auto_pick::recognition::ScreenSource;
        source.size()
    };

    let recognizer = CardRecognizer::new(Box::new(source), &settings.recognition);
    let actuator = LogActuator::new(width, height);
    let (mut picker, mut events) = AutoPicker::new(recognizer, Box::new(actuator), &settings.automation);

    println!("🚀 Dry run for {seconds}s against {path:?} ({width}x{height})");
    let rt = tokio::runtime::Runtime::new().unwrap();
    rt.block_on(async move {
        if !picker.start() {
            println!("❌ Controller failed to start");
            return;
        }

        let deadline = tokio::time::Instant::now() + Duration::from_secs(seconds);
        loop {
            let event = tokio::select! {
                event = events.recv() => event,
                _ = tokio::time::sleep_until(deadline) => break,
            };
            match event {
                Some(PickerEvent::StateChanged(state)) => println!("🎛️ State: {state}"),
                Some(PickerEvent::CardsRecognized(cards)) => {
                    println!("👀 Recognized {} cards", cards.len());
                }
                Some(PickerEvent::CardPicked(card)) => println!("🎯 Picked {card}"),
                Some(PickerEvent::Error(err)) => println!("⚠️ {err}"),
                None => break,
            }
        }

        picker.stop().await;
        println!("📊 {}", picker.statistics());
    });
}

fn print_help() {
    println!("🃏 TFT Auto Pick");
    println!();
    println!("USAGE:");
    println!("    tft-auto-pick [FLAGS]");
    println!();
    println!("FLAGS:");
    println!("    --recognize=<png>   Run one recognition pass over a screenshot file");
    println!("    --dry-run=<png>     Run the full pick loop against a screenshot file");
    println!("                        with the logging actuator (no real clicks)");
    println!("    --seconds=<n>       Dry-run duration in seconds (default: 5)");
    println!("    --config=<json>     Settings file (defaults used on any failure)");
    println!("    --season=<id>       Override the active template season");
    println!("    --help, -h          Show this help message");
    println!("    --version, -v       Show version information");
    println!();
    println!("EXAMPLES:");
    println!("    tft-auto-pick --recognize=shop.png");
    println!("    tft-auto-pick --recognize=shop.png --season=s13");
    println!("    tft-auto-pick --dry-run=shop.png --seconds=10 --config=settings.json");
}
