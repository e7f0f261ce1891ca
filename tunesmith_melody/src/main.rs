// Tunesmith melody generator: CLI entry point.
//
// Parses a note sequence, generates a melody in the chosen mode, prints the
// note names, and optionally renders them to a MIDI file.
//
// Usage:
//   cargo run -p tunesmith_melody --bin generate -- [--notes "C4 E4 G4 ..."]
//     [--input FILE] [--config FILE] [--mode pattern|random|default]
//     [--length N] [--order N] [--seed N] [--tempo BPM] [--volume 0-100]
//     [--instrument sine|square|sawtooth|triangle] [--midi OUT.mid]
//     [--dump-model] [--frequencies]
//
// Flags override values from --config. Without --notes or --input, a short
// built-in phrase is used. Set RUST_LOG=debug for engine diagnostics.

use std::path::Path;

use tunesmith_melody::chain::TransitionModel;
use tunesmith_melody::config::{GenerationConfig, Instrument};
use tunesmith_melody::frequency::FrequencyIndex;
use tunesmith_melody::midi::write_midi;
use tunesmith_melody::mode::generate_by_name;
use tunesmith_melody::note::names_to_strings;
use tunesmith_melody::parse::parse_text;
use tunesmith_prng::MelodyRng;

const DEMO_PHRASE: &str = "C4 E4 G4 C5 G4 E4 C4 D4 F4 A4 F4 D4 E4 G4 B4 G4 E4 C4";

fn main() {
    env_logger::init();
    let args: Vec<String> = std::env::args().collect();

    let mut config = match parse_flag::<String>(&args, "--config") {
        Some(path) => match GenerationConfig::load(Path::new(&path)) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("{e}");
                std::process::exit(1);
            }
        },
        None => GenerationConfig::default(),
    };
    apply_overrides(&mut config, &args);
    let mode_name: String =
        parse_flag(&args, "--mode").unwrap_or_else(|| config.mode.as_str().to_string());

    let input = match parse_flag::<String>(&args, "--input") {
        Some(path) => match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                eprintln!("Failed to read {path}: {e}");
                std::process::exit(1);
            }
        },
        None => parse_flag(&args, "--notes").unwrap_or_else(|| DEMO_PHRASE.to_string()),
    };

    let parsed = parse_text(&input);
    if !parsed.is_clean() {
        eprintln!("{} token(s) skipped:", parsed.errors.len());
        for err in &parsed.errors {
            eprintln!("  {err}");
        }
    }

    let (mut rng, seed) = match config.seed {
        Some(seed) => (MelodyRng::new(seed), seed),
        None => match MelodyRng::from_entropy() {
            Ok(pair) => pair,
            Err(e) => {
                eprintln!("Failed to seed RNG: {e}");
                std::process::exit(1);
            }
        },
    };
    log::info!(
        "mode={mode_name} length={} order={} seed={seed} training notes={}",
        config.length,
        config.order,
        parsed.notes.len()
    );

    if args.iter().any(|a| a == "--dump-model") {
        let model = TransitionModel::train(&parsed.notes, config.order);
        match serde_json::to_string_pretty(&model) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("Failed to serialize model: {e}"),
        }
    }

    let melody = generate_by_name(
        &mode_name,
        &parsed.notes,
        config.length,
        config.order,
        &mut rng,
    );
    println!("{}", names_to_strings(&melody).join(" "));

    if args.iter().any(|a| a == "--frequencies") {
        let index = FrequencyIndex::from_notes(&parsed.notes);
        for name in &melody {
            match index.get(name) {
                Some(hz) => println!("{name}\t{hz:.2}"),
                None => println!("{name}\t?"),
            }
        }
    }

    if let Some(path) = parse_flag::<String>(&args, "--midi") {
        if let Err(e) = write_midi(&melody, &config.playback, Path::new(&path)) {
            eprintln!("{e}");
            std::process::exit(1);
        }
        eprintln!("Wrote {} notes to {path}", melody.len());
    }
}

fn apply_overrides(config: &mut GenerationConfig, args: &[String]) {
    if let Some(length) = parse_flag(args, "--length") {
        config.length = length;
    }
    if let Some(order) = parse_flag(args, "--order") {
        config.order = order;
    }
    if let Some(seed) = parse_flag(args, "--seed") {
        config.seed = Some(seed);
    }
    if let Some(tempo) = parse_flag(args, "--tempo") {
        config.playback.tempo_bpm = tempo;
    }
    if let Some(volume) = parse_flag(args, "--volume") {
        config.playback.volume = volume;
    }
    if let Some(name) = parse_flag::<String>(args, "--instrument") {
        match name.parse::<Instrument>() {
            Ok(instrument) => config.playback.instrument = instrument,
            Err(e) => eprintln!("{e}; keeping {}", config.playback.instrument.as_str()),
        }
    }
}

fn parse_flag<T: std::str::FromStr>(args: &[String], flag: &str) -> Option<T> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|v| v.parse().ok())
}
