//! Persistence round-trip and corruption handling.

use ramnet::{EngineError, Wisard, WisardConfig};

fn trained_model() -> (Wisard, Vec<Vec<u8>>) {
    let mut model = Wisard::with_config(WisardConfig {
        input_bits: 32,
        ram_bits: 4,
        classes: 3,
        seed: 2024,
    })
    .unwrap();

    let patterns = ramnet::data::class_patterns(99, 3, 32);
    for (class, pattern) in patterns.iter().enumerate() {
        for _ in 0..(class + 1) * 3 {
            model.learn(pattern, class).unwrap();
        }
    }
    (model, patterns)
}

#[test]
fn export_then_import_reconstructs_the_model_exactly() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.wsd");

    let (mut original, patterns) = trained_model();
    original.export_to(&path).unwrap();

    let mut restored = Wisard::load(&path).unwrap();
    assert_eq!(restored.classes().unwrap(), original.classes().unwrap());
    assert_eq!(restored.ram_bits().unwrap(), original.ram_bits().unwrap());
    assert_eq!(restored.input_bits().unwrap(), original.input_bits().unwrap());

    // Identical mappings and counters: every readout agrees on every
    // pattern, trained or noisy.
    for pattern in &patterns {
        assert_eq!(
            original.read_counts(pattern).unwrap(),
            restored.read_counts(pattern).unwrap()
        );
        for class in 0..3 {
            assert_eq!(
                original.excitation(class).unwrap(),
                restored.excitation(class).unwrap()
            );
        }

        let noisy = ramnet::data::noisy_copy(pattern, 4, 7);
        assert_eq!(
            original.read_bleaching(&noisy).unwrap(),
            restored.read_bleaching(&noisy).unwrap()
        );
        assert_eq!(
            original.confidence().unwrap(),
            restored.confidence().unwrap()
        );
    }
}

#[test]
fn import_round_trips_twice_to_identical_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first.wsd");
    let second = dir.path().join("second.wsd");

    let (model, _) = trained_model();
    model.export_to(&first).unwrap();

    let restored = Wisard::load(&first).unwrap();
    restored.export_to(&second).unwrap();

    assert_eq!(
        std::fs::read(&first).unwrap(),
        std::fs::read(&second).unwrap()
    );
}

#[test]
fn truncated_file_is_rejected_without_a_half_built_model() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.wsd");

    let (model, _) = trained_model();
    model.export_to(&path).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    std::fs::write(&path, &bytes[..bytes.len() / 2]).unwrap();

    assert!(matches!(
        Wisard::load(&path),
        Err(EngineError::Corrupted(_))
    ));
}

#[test]
fn out_of_range_header_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.wsd");

    // input_bits = -5: nonsense header.
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&(-5i32).to_le_bytes());
    bytes.extend_from_slice(&4i32.to_le_bytes());
    bytes.extend_from_slice(&2i32.to_le_bytes());
    std::fs::write(&path, &bytes).unwrap();

    assert!(matches!(
        Wisard::load(&path),
        Err(EngineError::Corrupted(_))
    ));
}

#[test]
fn trailing_garbage_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.wsd");

    let (model, _) = trained_model();
    model.export_to(&path).unwrap();

    let mut bytes = std::fs::read(&path).unwrap();
    bytes.push(0xFF);
    std::fs::write(&path, &bytes).unwrap();

    assert!(matches!(
        Wisard::load(&path),
        Err(EngineError::Corrupted(_))
    ));
}

#[test]
fn missing_file_surfaces_an_io_error() {
    assert!(matches!(
        Wisard::load("/definitely/not/a/model.wsd"),
        Err(EngineError::Io(_))
    ));
}

#[test]
fn export_fails_on_an_unwritable_path() {
    let (model, _) = trained_model();
    assert!(matches!(
        model.export_to("/definitely/not/a/dir/model.wsd"),
        Err(EngineError::Io(_))
    ));
}

#[test]
fn export_after_close_is_refused() {
    let (mut model, _) = trained_model();
    model.close().unwrap();
    assert!(matches!(
        model.export_to("anywhere.wsd"),
        Err(EngineError::ClosedResource)
    ));
}
