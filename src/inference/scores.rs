//! 得分计算
//!
//! 把模型的 `f32` logits 转换成可直接序列化的 `f64` 概率。

use crate::inference::backend::ScoreActivation;

/// 数值稳定的 softmax
pub fn softmax(logits: &[f32]) -> Vec<f64> {
    if logits.is_empty() {
        return Vec::new();
    }
    let max = logits
        .iter()
        .map(|&x| x as f64)
        .fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = logits.iter().map(|&x| (x as f64 - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| finite(e / sum)).collect()
}

/// 逐元素 sigmoid
pub fn sigmoid(logits: &[f32]) -> Vec<f64> {
    logits
        .iter()
        .map(|&x| finite(1.0 / (1.0 + (-(x as f64)).exp())))
        .collect()
}

/// 按激活方式计算得分
pub fn activate(logits: &[f32], activation: ScoreActivation) -> Vec<f64> {
    match activation {
        ScoreActivation::Softmax => softmax(logits),
        ScoreActivation::Sigmoid => sigmoid(logits),
    }
}

/// 最大值的索引，空输入返回 `None`
///
/// 相同的最大值取第一个。
pub fn argmax<T: PartialOrd + Copy>(values: &[T]) -> Option<usize> {
    let mut best: Option<(usize, T)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, b)) if v > b => best = Some((i, v)),
            None => best = Some((i, v)),
            _ => {}
        }
    }
    best.map(|(i, _)| i)
}

/// 非有限值（NaN、无穷）归零
pub fn finite(x: f64) -> f64 {
    if x.is_finite() {
        x
    } else {
        0.0
    }
}
