pub mod labels;

pub use labels::{relation_label, translate_entity_group, translate_sentiment, RELATION_CLASS_COUNT};
