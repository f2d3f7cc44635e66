use lstm::{Config, Lstm, LstmState, Parameters, SoftmaxMode, Vocab, cell};
use ndarray::Array1;
use rand::SeedableRng;
use rand::rngs::StdRng;

#[test]
fn test_distribution_sums_to_one_for_every_input() {
    let mut rng = StdRng::seed_from_u64(17);
    let params = Parameters::random(8, 6, 1.0, &mut rng).unwrap();

    for mode in [SoftmaxMode::Raw, SoftmaxMode::Stabilized] {
        for symbol in 0..6 {
            let mut input = Array1::zeros(6);
            input[symbol] = 1.0;

            // Zero state, as at the start of every window
            let step = cell::forward(&params, &input, &LstmState::zeros(8), mode).unwrap();

            assert!((step.probabilities.sum() - 1.0).abs() < 1e-9);
            assert!(step.probabilities.iter().all(|&p| p >= 0.0));
        }
    }
}

#[test]
fn test_forward_output_shapes() {
    let mut rng = StdRng::seed_from_u64(3);
    let params = Parameters::random(5, 7, 0.5, &mut rng).unwrap();
    let mut input = Array1::zeros(7);
    input[2] = 1.0;

    let step = cell::forward(&params, &input, &LstmState::zeros(5), SoftmaxMode::Stabilized).unwrap();

    for gate in [&step.candidate, &step.input_gate, &step.forget_gate, &step.output_gate] {
        assert_eq!(gate.len(), 5);
    }
    assert_eq!(step.cell.len(), 5);
    assert_eq!(step.hidden.len(), 5);
    assert_eq!(step.probabilities.len(), 7);

    // Sigmoid gates live in (0, 1), the candidate in (-1, 1)
    assert!(step.input_gate.iter().all(|&g| g > 0.0 && g < 1.0));
    assert!(step.candidate.iter().all(|&a| a > -1.0 && a < 1.0));
}

#[test]
fn test_state_threads_through_feedforward() {
    let vocab = Vocab::from_text("hello world");
    let config = Config {
        hidden_size: 4,
        seed: Some(9),
        ..Config::default()
    };
    let model = Lstm::new(config, &vocab).unwrap();

    let mut state = model.reset();
    assert_eq!(state, LstmState::zeros(4));

    let first = model.feedforward(&vocab, 'h', &state).unwrap();
    state = first.state();
    let second = model.feedforward(&vocab, 'h', &state).unwrap();

    // Same symbol, different history: the recurrent state changes the output
    assert_ne!(first.hidden, second.hidden);
    // A fresh reset reproduces the first step exactly
    assert_eq!(model.feedforward(&vocab, 'h', &model.reset()).unwrap(), first);
}

#[test]
fn test_feedforward_rejects_foreign_vocabulary() {
    let vocab = Vocab::from_text("abc");
    let model = Lstm::new(Config { hidden_size: 3, ..Config::default() }, &vocab).unwrap();

    let other = Vocab::from_text("abcd");
    assert!(model.feedforward(&other, 'a', &model.reset()).is_err());
    assert!(model.feedforward(&vocab, 'z', &model.reset()).is_err());
}
