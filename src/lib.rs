pub mod activations;
pub mod bptt;
pub mod cell;
pub mod config;
pub mod error;
pub mod generate;
pub mod model;
pub mod params;
pub mod persistence;
pub mod sampling;
pub mod train;
pub mod trajectory;
pub mod vocab;
// Re-export key structs for easier access
pub use activations::SoftmaxMode;
pub use cell::{LstmState, Step};
pub use config::Config;
pub use error::{LstmError, LstmResult};
pub use generate::generate;
pub use model::Lstm;
pub use params::{Gate, GateParams, Parameters, TensorKind};
pub use sampling::SamplingPolicy;
pub use train::{EpochReport, Trainer};
pub use trajectory::Trajectory;
pub use vocab::Vocab;

// Defaults
pub const HIDDEN_SIZE: usize = 100;
pub const LEARNING_RATE: f64 = 0.01;
pub const EPOCHS: usize = 10;
pub const NUM_STEPS: usize = 50;
pub const LOOKBACK: usize = 25;
pub const GRAD_CLIP: f64 = 10.0;
pub const INIT_RANGE: f64 = 1.0;
pub const LOG_EVERY: usize = 1000;
