use lstm::{Config, Lstm, LstmError, Parameters, TensorKind, Vocab, persistence};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tempfile::tempdir;

#[test]
fn test_save_then_load_is_bit_identical() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("weights.txt");

    let mut rng = StdRng::seed_from_u64(21);
    let params = Parameters::random(5, 9, 1.0, &mut rng).unwrap();
    persistence::save(&params, &path).unwrap();
    let loaded = persistence::load(&path, 5, 9).unwrap();

    for kind in TensorKind::ALL {
        let a: Vec<u64> = params.tensor(kind).iter().map(|x| x.to_bits()).collect();
        let b: Vec<u64> = loaded.tensor(kind).iter().map(|x| x.to_bits()).collect();
        assert_eq!(a, b, "{kind}");
    }
}

#[test]
fn test_file_has_fourteen_crlf_lines_in_fixed_order() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("weights.txt");
    persistence::save(&Parameters::zeros(2, 3), &path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let names: Vec<&str> = text
        .split_terminator("\r\n")
        .map(|line| line.split('\t').next().unwrap())
        .collect();
    let expected: Vec<String> = TensorKind::ALL.iter().map(|k| k.name()).collect();
    assert_eq!(names, expected);
}

#[test]
fn test_model_round_trip_through_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("model.txt");
    let vocab = Vocab::from_text("the quick brown fox");
    let config = Config {
        hidden_size: 6,
        seed: Some(2),
        ..Config::default()
    };

    let model = Lstm::new(config.clone(), &vocab).unwrap();
    model.save(&path).unwrap();
    let loaded = Lstm::load(&path, config, &vocab).unwrap();

    assert_eq!(loaded.params, model.params);
}

#[test]
fn test_load_rejects_mismatched_vocabulary_or_hidden_size() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("model.txt");
    let vocab = Vocab::from_text("abc");
    let config = Config {
        hidden_size: 4,
        ..Config::default()
    };
    Lstm::new(config.clone(), &vocab).unwrap().save(&path).unwrap();

    // Same file, bigger alphabet
    let wider = Vocab::from_text("abcd");
    assert!(matches!(
        Lstm::load(&path, config.clone(), &wider),
        Err(LstmError::ParameterMismatch(_))
    ));

    // Same file, different hidden size
    let config = Config {
        hidden_size: 5,
        ..config
    };
    assert!(matches!(
        Lstm::load(&path, config, &vocab),
        Err(LstmError::ParameterMismatch(_))
    ));
}

#[test]
fn test_missing_file_is_an_io_error() {
    let dir = tempdir().unwrap();
    let result = persistence::load(dir.path().join("absent.txt"), 2, 2);
    assert!(matches!(result, Err(LstmError::Io { .. })));
}
