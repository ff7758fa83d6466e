pub mod check;
pub mod predict;
pub mod serve;
pub mod show_config;

pub use check::check;
pub use predict::predict;
pub use serve::serve;
pub use show_config::show_config;
