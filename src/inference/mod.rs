pub mod aggregation;
pub mod backend;
pub mod backends;
pub mod scores;

// Re-export commonly used types
pub use backend::{
    run_blocking, ModelLoader, RawEntity, ScoreActivation, SequenceClassifier, TokenClassifier,
    TokenPrediction,
};
