//! Price-range inference: preprocessing transform + classifier

pub mod classifier;
pub mod predictor;
pub mod transform;

pub use predictor::{ModelInfo, Predictor};
