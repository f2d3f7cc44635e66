use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;

use lstm::generate::DEFAULT_SEED;
use lstm::{
    Config, EPOCHS, GRAD_CLIP, HIDDEN_SIZE, INIT_RANGE, LEARNING_RATE, LOG_EVERY, LOOKBACK, Lstm,
    NUM_STEPS, SamplingPolicy, SoftmaxMode, Trainer, Vocab,
};

/// Character-level LSTM: train on a text file, then generate from it.
#[derive(Parser)]
#[command(name = "lstm", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Train on a text file, saving the parameters after every epoch
    Train(TrainArgs),
    /// Extend a seed text with a trained model
    Generate(GenerateArgs),
}

#[derive(Args)]
struct ModelArgs {
    /// Text the vocabulary is built from (the training file)
    #[arg(long)]
    input: PathBuf,
    /// Parameter file
    #[arg(long, default_value = "weights.txt")]
    weights: PathBuf,
    #[arg(long, default_value_t = HIDDEN_SIZE)]
    hidden_size: usize,
    #[arg(long, default_value_t = SoftmaxMode::default())]
    softmax: SoftmaxMode,
}

#[derive(Args)]
struct TrainArgs {
    #[command(flatten)]
    model: ModelArgs,
    #[arg(long, default_value_t = LEARNING_RATE)]
    learning_rate: f64,
    #[arg(long, default_value_t = EPOCHS)]
    epochs: usize,
    /// Timesteps per training window
    #[arg(long, default_value_t = NUM_STEPS)]
    num_steps: usize,
    /// Timesteps of each window that receive gradient
    #[arg(long, default_value_t = LOOKBACK)]
    lookback: usize,
    #[arg(long, default_value_t = GRAD_CLIP)]
    clip: f64,
    #[arg(long, default_value_t = INIT_RANGE)]
    init_range: f64,
    /// Seed for parameter initialisation
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, default_value_t = LOG_EVERY)]
    log_every: usize,
    /// Continue from the parameters already in --weights
    #[arg(long)]
    resume: bool,
}

#[derive(Args)]
struct GenerateArgs {
    #[command(flatten)]
    model: ModelArgs,
    #[arg(long, default_value = DEFAULT_SEED)]
    seed_text: String,
    /// Characters to generate
    #[arg(long, default_value_t = 500)]
    length: usize,
    #[arg(long, default_value_t = SamplingPolicy::default())]
    sampling: SamplingPolicy,
    /// Seed for weighted sampling
    #[arg(long)]
    rng_seed: Option<u64>,
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn train(args: TrainArgs) -> Result<()> {
    let text = read_text(&args.model.input)?;
    let vocab = Vocab::from_text(&text);

    let config = Config {
        hidden_size: args.model.hidden_size,
        learning_rate: args.learning_rate,
        epochs: args.epochs,
        num_steps: args.num_steps,
        lookback: args.lookback,
        clip_threshold: args.clip,
        init_range: args.init_range,
        softmax: args.model.softmax,
        seed: args.seed,
        log_every: args.log_every,
        ..Config::default()
    };

    let mut model = if args.resume {
        Lstm::load(&args.model.weights, config, &vocab)?
    } else {
        Lstm::new(config, &vocab)?
    };

    // === Print model information ===
    println!("\n=== MODEL INFORMATION ===");
    println!("Network architecture: {}", model.network_description());
    println!("Vocabulary: {} symbols from {}", vocab.len(), args.model.input.display());
    println!("Total parameters: {}", model.total_parameters());

    println!("\n=== TRAINING ===");
    let weights = args.model.weights.clone();
    let mut trainer = Trainer::new(&vocab, &text)?;
    let reports = trainer.train(&mut model, |model, report| {
        model.save(&weights)?;
        println!(
            "Epoch {}/{}. State saved to {}. Loss: {:.6}",
            report.epoch,
            model.config.epochs,
            weights.display(),
            report.mean_loss
        );
        Ok(())
    })?;

    if reports.is_empty() {
        model.save(&weights)?;
    }
    Ok(())
}

fn generate(args: GenerateArgs) -> Result<()> {
    let text = read_text(&args.model.input)?;
    let vocab = Vocab::from_text(&text);

    let config = Config {
        hidden_size: args.model.hidden_size,
        softmax: args.model.softmax,
        sampling: args.sampling,
        ..Config::default()
    };
    let model = Lstm::load(&args.model.weights, config, &vocab)
        .with_context(|| format!("loading {}", args.model.weights.display()))?;

    let mut rng = StdRng::seed_from_u64(args.rng_seed.unwrap_or_else(rand::random));
    let output = lstm::generate(&model, &vocab, &args.seed_text, args.length, &mut rng)?;
    println!("{output}");
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Command::Train(args) => train(args),
        Command::Generate(args) => generate(args),
    }
}
