//! 预测器
//!
//! 每个任务一个预测函数：从注册表获取模型能力，执行推理并整理成统一的结果结构。

pub mod ner;
pub mod relation;
pub mod sentiment;

pub use ner::predict_ner;
pub use relation::predict_relation;
pub use sentiment::predict_sentiment;

/// 日志中显示的文本前缀
pub(crate) fn preview(text: &str) -> String {
    const PREVIEW_CHARS: usize = 50;
    let mut preview: String = text.chars().take(PREVIEW_CHARS).collect();
    if text.chars().count() > PREVIEW_CHARS {
        preview.push_str("...");
    }
    preview
}
