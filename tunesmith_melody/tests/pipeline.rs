// End-to-end tests for the text -> notes -> melody -> MIDI pipeline.
//
// These go through the public API only, the same way the `generate` binary
// does: parse free text, dispatch by mode name with a seeded `MelodyRng`,
// then render or serialize the result.

use tunesmith_melody::config::GenerationConfig;
use tunesmith_melody::midi::{render_midi, write_midi};
use tunesmith_melody::{
    Context, FrequencyIndex, GenerationMode, MelodyRng, NoteName, TransitionCounts,
    TransitionModel, generate, generate_by_name, names_to_strings, parse_text,
};

const PHRASE: &str = "C4 E4 G4 C5 G4 E4 C4 D4 F4 A4 F4 D4 E4 G4 B4 G4 E4 C4";

#[test]
fn text_with_typos_still_generates() {
    let parsed = parse_text("c4 e4 x9 g4 c4 E#4 e4 g4 c4");
    assert_eq!(
        parsed.error_messages(),
        vec![
            "Invalid note letter 'X' in token 2",
            "Unknown note 'E#' at token 5",
        ]
    );
    assert_eq!(parsed.notes.len(), 7);

    let mut rng = MelodyRng::new(99);
    let melody = generate_by_name("pattern", &parsed.notes, 12, 1, &mut rng);
    assert_eq!(melody.len(), 12);
}

#[test]
fn every_mode_is_reproducible_from_seed() {
    let parsed = parse_text(PHRASE);
    for mode in GenerationMode::ALL {
        for order in 1..=3 {
            let a = generate(mode, &parsed.notes, 24, order, &mut MelodyRng::new(5));
            let b = generate(mode, &parsed.notes, 24, order, &mut MelodyRng::new(5));
            assert_eq!(a, b, "mode {mode} order {order}");
        }
    }
}

#[test]
fn pattern_output_only_uses_training_notes() {
    let parsed = parse_text(PHRASE);
    let training: Vec<NoteName> = parsed.notes.iter().map(|n| n.name()).collect();
    for seed in 0..25 {
        let mut rng = MelodyRng::new(seed);
        let melody = generate_by_name("pattern", &parsed.notes, 64, 2, &mut rng);
        assert_eq!(melody.len(), 64);
        assert!(melody.iter().all(|n| training.contains(n)));
    }
}

#[test]
fn pattern_transitions_follow_the_model_outside_dead_ends() {
    let parsed = parse_text(PHRASE);
    let model = TransitionModel::train(&parsed.notes, 1);
    let mut rng = MelodyRng::new(2024);
    let melody = tunesmith_melody::generate::generate_pattern(&model, 200, &mut rng);
    for pair in melody.windows(2) {
        let context = Context::new([pair[0]]);
        if model.outcomes(&context).is_some() {
            assert!(
                model.probability(&context, &pair[1]) > 0.0,
                "{} -> {} was never observed",
                pair[0],
                pair[1]
            );
        }
    }
}

#[test]
fn counts_expose_raw_model_before_normalizing() {
    let parsed = parse_text("C4 E4 C4 G4 C4 E4");
    let counts = TransitionCounts::build(&parsed.notes, 1);
    let c4: Context = "C4".parse().unwrap();
    let e4: NoteName = "E4".parse().unwrap();
    assert_eq!(counts.count(&c4, &e4), 2);

    let model = counts.normalize();
    assert!((model.probability(&c4, &e4) - 2.0 / 3.0).abs() < 1e-12);
}

#[test]
fn model_json_dump_is_readable() {
    let parsed = parse_text("C4 E4 G4 C4 E4 G4");
    let model = TransitionModel::train(&parsed.notes, 1);
    let json = serde_json::to_string(&model).unwrap();
    assert_eq!(
        json,
        r#"{"order":1,"contexts":{"C4":{"E4":1.0},"E4":{"G4":1.0},"G4":{"C4":1.0}}}"#
    );
}

#[test]
fn frequencies_cover_generated_names() {
    let parsed = parse_text(PHRASE);
    let index = FrequencyIndex::from_notes(&parsed.notes);
    let mut rng = MelodyRng::new(17);
    let melody = generate_by_name("random", &parsed.notes, 30, 1, &mut rng);
    for name in &melody {
        let hz = index.get(name).unwrap();
        assert!((hz - name.frequency()).abs() < 1e-9);
    }
    assert!((index.get_str("A4").unwrap() - 440.0).abs() < 1e-9);
}

#[test]
fn config_file_drives_generation_and_midi() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("melody.json");
    std::fs::write(
        &config_path,
        r#"{"mode": "default", "length": 4, "seed": 1, "playback": {"tempo_bpm": 100}}"#,
    )
    .unwrap();

    let config = GenerationConfig::load(&config_path).unwrap();
    let parsed = parse_text(PHRASE);
    let mut rng = MelodyRng::new(config.seed.unwrap());
    let melody = generate(
        config.mode,
        &parsed.notes,
        config.length,
        config.order,
        &mut rng,
    );
    assert_eq!(names_to_strings(&melody), vec!["C4", "E4", "G4", "C5"]);

    let midi_path = dir.path().join("melody.mid");
    write_midi(&melody, &config.playback, &midi_path).unwrap();
    let on_disk = std::fs::read(&midi_path).unwrap();
    assert_eq!(on_disk, render_midi(&melody, &config.playback).unwrap());
    assert_eq!(&on_disk[..4], b"MThd");
}
