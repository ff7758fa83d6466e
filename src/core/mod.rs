pub mod cache;
pub mod diagnostics;
pub mod dispatcher;
pub mod registry;

pub use cache::ModelCache;
pub use dispatcher::dispatch;
pub use registry::ModelRegistry;
