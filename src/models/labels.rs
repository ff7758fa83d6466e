//! 标签表
//!
//! 情感与实体类型的法语翻译，以及关系抽取的固定类别表。

/// 关系类别数量
pub const RELATION_CLASS_COUNT: usize = 29;

/// 关系类别表，下标即类别 id
pub const RELATION_LABELS: [&str; RELATION_CLASS_COUNT] = [
    "owner of",
    "product/material produced",
    "headquarters location",
    "location of formation",
    "industry",
    "stock exchange",
    "manufacturer",
    "chairperson",
    "owned by",
    "brand",
    "employer",
    "developer",
    "subsidiary",
    "parent organization",
    "position held",
    "founded by",
    "original broadcaster",
    "legal form",
    "currency",
    "operator",
    "platform",
    "distribution format",
    "business division",
    "chief executive officer",
    "creator",
    "distributed by",
    "director/manager",
    "member of",
    "publisher",
];

/// 情感标签翻译，未知标签原样返回
pub fn translate_sentiment(label: &str) -> &str {
    match label {
        "Negative" => "Négatif",
        "Positive" => "Positif",
        "Neutral" => "Neutre",
        other => other,
    }
}

/// 实体类型翻译，未知类型原样返回
pub fn translate_entity_group(group: &str) -> &str {
    match group {
        "CORP" => "Entreprise",
        "CW" => "Crypto-monnaie",
        "DATE" => "Date",
        "MONEY" => "Montant",
        "PERCENT" => "Pourcentage",
        "PERSON" => "Personne",
        "PRODUCT" => "Produit",
        other => other,
    }
}

/// 关系类别 id 对应的标签
pub fn relation_label(class_id: usize) -> String {
    match RELATION_LABELS.get(class_id) {
        Some(label) => (*label).to_string(),
        None => format!("unknown relation ({})", class_id),
    }
}
