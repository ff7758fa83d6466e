pub mod defaults;
pub mod loader;
pub mod settings;

pub use settings::{Config, InferenceConfig, LoggingConfig, ModelSource, ModelsConfig, ServerConfig};
