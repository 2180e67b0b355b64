//! Bilingual (English/Chinese) category alias table used for rule-score
//! category-alias hits.

/// `(canonical category, synonyms including bilingual variants)`.
pub static CATEGORY_ALIASES: &[(&str, &[&str])] = &[
    ("product", &["product", "products", "产品", "产品展示", "商品", "商品展示"]),
    ("model", &["model", "models", "模特", "试穿", "模特试穿"]),
    ("scene", &["scene", "scenery", "场景", "风景"]),
    ("nature", &["nature", "outdoor", "自然", "户外", "风景"]),
    ("food", &["food", "cuisine", "美食", "食物"]),
    ("fashion", &["fashion", "clothing", "apparel", "时尚", "服装"]),
    ("tech", &["tech", "technology", "gadget", "科技", "数码"]),
    ("people", &["people", "person", "portrait", "人物", "人像"]),
    ("sports", &["sports", "fitness", "体育", "运动"]),
    ("travel", &["travel", "trip", "旅行", "旅游"]),
];

/// Find every alias group whose synonym list contains `term` (case
/// sensitive for CJK terms, case-insensitive for ASCII).
pub fn category_matches(term: &str) -> impl Iterator<Item = &'static (&'static str, &'static [&'static str])> {
    let term = term.to_string();
    CATEGORY_ALIASES.iter().filter(move |(_, synonyms)| {
        synonyms.iter().any(|s| s.eq_ignore_ascii_case(&term) || *s == term)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_chinese_synonym_for_product_category() {
        let matches: Vec<_> = category_matches("产品展示").collect();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].0, "product");
    }

    #[test]
    fn finds_english_synonym_case_insensitively() {
        let matches: Vec<_> = category_matches("FASHION").collect();
        assert_eq!(matches[0].0, "fashion");
    }

    #[test]
    fn unknown_term_has_no_matches() {
        assert_eq!(category_matches("xyzzy").count(), 0);
    }
}
