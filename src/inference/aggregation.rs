//! Token 聚合
//!
//! 把逐 token 的 BIO 标签合并成实体片段：
//! - 跳过特殊 token
//! - 相邻且标签相同的 token 合并，遇到 `B-` 前缀时开始新实体
//! - 实体得分取 token 得分的平均值
//! - 丢弃 `O` 组

use crate::Result;
use crate::inference::backend::{RawEntity, TokenPrediction};

/// 非实体标签
pub const OUTSIDE_LABEL: &str = "O";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bio {
    Begin,
    Inside,
}

/// 拆分 `B-CORP` / `I-CORP` / `CORP`
fn split_tag(label: &str) -> (Bio, &str) {
    if let Some(tag) = label.strip_prefix("B-") {
        (Bio::Begin, tag)
    } else if let Some(tag) = label.strip_prefix("I-") {
        (Bio::Inside, tag)
    } else {
        (Bio::Inside, label)
    }
}

/// 按 simple 策略聚合 token
///
/// `decode` 把一组 token id 还原为文本（跳过特殊 token）。
pub fn aggregate_simple<D>(tokens: &[TokenPrediction], decode: D) -> Result<Vec<RawEntity>>
where
    D: Fn(&[u32]) -> Result<String>,
{
    let mut groups: Vec<Vec<&TokenPrediction>> = Vec::new();

    for token in tokens.iter().filter(|t| !t.special) {
        let (bio, tag) = split_tag(&token.label);
        if groups.last().is_some_and(|group| continues(group, bio, tag)) {
            if let Some(group) = groups.last_mut() {
                group.push(token);
                continue;
            }
        }
        groups.push(vec![token]);
    }

    let mut entities = Vec::new();
    for group in groups {
        let (_, tag) = split_tag(&group[0].label);
        if tag == OUTSIDE_LABEL {
            continue;
        }
        let ids: Vec<u32> = group.iter().map(|t| t.id).collect();
        let score = group.iter().map(|t| t.score).sum::<f32>() / group.len() as f32;
        entities.push(RawEntity {
            entity_group: tag.to_string(),
            score,
            start: group[0].start,
            end: group[group.len() - 1].end,
            word: decode(&ids)?,
        });
    }

    Ok(entities)
}

fn continues(group: &[&TokenPrediction], bio: Bio, tag: &str) -> bool {
    match group.last() {
        Some(prev) => {
            let (_, prev_tag) = split_tag(&prev.label);
            prev_tag == tag && bio != Bio::Begin
        }
        None => false,
    }
}
