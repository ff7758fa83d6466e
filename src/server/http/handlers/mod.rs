pub mod health;
pub mod index;
pub mod models;
pub mod predict;

pub use health::health;
pub use index::index;
pub use models::list_models;
pub use predict::predict;
