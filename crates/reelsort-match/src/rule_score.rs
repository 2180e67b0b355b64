//! Rule-based folder scoring: keyword, category-alias, and color/material
//! hits against a candidate folder's display name.

use reelsort_core::AnalysisResult;

use crate::alias::{category_matches, CATEGORY_ALIASES};

const TOP_N_SCENES: usize = 3;
const TOP_N_OBJECTS: usize = 5;

const KEYWORD_HIT_WEIGHT: f64 = 0.3;
const CATEGORY_ALIAS_WEIGHT: f64 = 0.4;
const COLOR_MATERIAL_WEIGHT: f64 = 0.2;

const COLORS_AND_MATERIALS: &[&str] = &[
    "red", "blue", "green", "yellow", "black", "white", "gray", "grey", "orange", "purple", "pink", "brown", "gold",
    "silver", "wood", "wooden", "metal", "metallic", "leather", "cotton", "silk", "plastic", "glass", "ceramic",
    "红", "蓝", "绿", "黄", "黑", "白", "灰", "金", "银", "木", "金属", "皮革", "棉", "丝", "塑料", "玻璃",
];

/// A content description built from an `AnalysisResult`, used as input to
/// both rule scoring and the semantic-match prompt.
pub fn content_description(analysis: &AnalysisResult) -> String {
    let mut parts = Vec::new();
    if !analysis.summary.description.is_empty() {
        parts.push(analysis.summary.description.clone());
    }
    parts.extend(analysis.summary.keywords.iter().cloned());
    parts.extend(analysis.summary.topics.iter().cloned());
    parts.extend(
        analysis
            .scenes
            .iter()
            .take(TOP_N_SCENES)
            .filter_map(|s| s.description.clone().or_else(|| Some(s.name.clone()))),
    );
    parts.extend(analysis.objects.iter().take(TOP_N_OBJECTS).map(|o| o.name.clone()));
    if let Some(features) = &analysis.product_features {
        parts.extend(features.iter().cloned());
    }
    parts.join(" ")
}

/// Tokens drawn from the content description and category, lowercased for
/// ASCII comparison but left as-is for CJK terms (which have no case).
fn tokens(description: &str, category: &str) -> Vec<String> {
    let mut tokens: Vec<String> = description
        .split_whitespace()
        .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric() && !is_cjk(c)))
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
        .collect();
    if !category.is_empty() {
        tokens.push(category.to_string());
    }
    tokens
}

fn is_cjk(c: char) -> bool {
    ('\u{4e00}'..='\u{9fff}').contains(&c)
}

/// Rule score for one folder's display name, capped at 1.0, with the list
/// of human-readable reasons that contributed to it.
pub fn rule_score(analysis: &AnalysisResult, folder_display_name: &str) -> (f64, Vec<String>) {
    let description = content_description(analysis);
    let candidate_tokens = tokens(&description, &analysis.summary.category);

    let mut score = 0.0;
    let mut reasons = Vec::new();
    let folder_lower = folder_display_name.to_lowercase();

    for token in &candidate_tokens {
        let token_lower = token.to_lowercase();
        if !token_lower.is_empty() && (folder_lower.contains(&token_lower) || folder_display_name.contains(token.as_str())) {
            score += KEYWORD_HIT_WEIGHT;
            reasons.push(format!("keyword '{}' matches folder name", token));
            break;
        }
    }

    for (canonical, _synonyms) in category_matches(&analysis.summary.category) {
        if folder_display_name.contains(canonical) || category_matches_folder(canonical, folder_display_name) {
            score += CATEGORY_ALIAS_WEIGHT;
            reasons.push(format!("category alias '{}' matches folder name", canonical));
            break;
        }
    }
    // The category string itself may already be the bilingual term (e.g. "产品展示");
    // also check whether any alias group's synonyms appear directly in the folder name.
    if reasons.iter().all(|r| !r.contains("category alias")) {
        if let Some((canonical, _)) = crate::alias::CATEGORY_ALIASES
            .iter()
            .find(|(_, synonyms)| synonyms.iter().any(|s| folder_display_name.contains(s)))
        {
            score += CATEGORY_ALIAS_WEIGHT;
            reasons.push(format!("category alias '{}' matches folder name", canonical));
        }
    }

    for cm in COLORS_AND_MATERIALS {
        if description.to_lowercase().contains(&cm.to_lowercase()) && folder_display_name.to_lowercase().contains(&cm.to_lowercase()) {
            score += COLOR_MATERIAL_WEIGHT;
            reasons.push(format!("color/material '{}' matches folder name", cm));
            break;
        }
    }

    (score.min(1.0), reasons)
}

fn category_matches_folder(canonical: &str, folder_display_name: &str) -> bool {
    CATEGORY_ALIASES
        .iter()
        .find(|(c, _)| *c == canonical)
        .map(|(_, synonyms)| synonyms.iter().any(|s| folder_display_name.contains(s)))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelsort_core::{ObjectEntry, SceneEntry, Summary};

    fn sample_analysis(category: &str, description: &str) -> AnalysisResult {
        let mut a = AnalysisResult::new("seg1", "model-a", "fp1");
        a.summary = Summary {
            description: description.to_string(),
            keywords: vec![],
            topics: vec![],
            mood: String::new(),
            category: category.to_string(),
        };
        a.scenes.push(SceneEntry { start_time: 0.0, name: "intro".into(), description: None });
        a.objects.push(ObjectEntry { start_time: 0.0, name: "shoe".into(), confidence: Some(0.9) });
        a
    }

    #[test]
    fn chinese_category_alias_matches_folder_name() {
        let a = sample_analysis("产品展示", "a product showcase");
        let (score, reasons) = rule_score(&a, "产品展示");
        assert!(score >= 0.4);
        assert!(reasons.iter().any(|r| r.contains("category alias")));
    }

    #[test]
    fn keyword_hit_contributes_weight() {
        let a = sample_analysis("misc", "a red shoe on display");
        let (score, _reasons) = rule_score(&a, "shoe_collection");
        assert!(score >= 0.3);
    }

    #[test]
    fn score_is_capped_at_one() {
        let mut a = sample_analysis("product", "red wood product showcase");
        a.summary.keywords = vec!["product".into()];
        let (score, _) = rule_score(&a, "red_wood_product");
        assert!(score <= 1.0);
    }
}
