//! 具体后端实现

pub mod assets;
pub mod candle;

pub use assets::{AssetResolver, ModelFiles};
pub use candle::{BertSequenceClassifier, BertTokenClassifier, CandleLoader};
