// ==========================================
// 珠宝成本预估系统 - 耳饰识别引擎
// ==========================================
// 职责: 从商品自由文本识别耳饰类型(成对佩戴 → 金属成本双倍)
// 红线: 模式检查顺序固定,首个命中生效;不得调整顺序或叠加命中
// ==========================================

use crate::domain::product::ProductRecord;
use crate::domain::types::EarringType;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// 耳饰识别结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarringDetection {
    pub is_earring: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub earring_type: Option<EarringType>,
    pub note: String,
}

// 模式按声明顺序逐一检查,首个命中即返回
// 文本先整体小写,模式按小写书写
static EARRING_PATTERNS: Lazy<Vec<(EarringType, Regex)>> = Lazy::new(|| {
    vec![
        (EarringType::Studs, Regex::new(r"\bstud(s)?\b").unwrap()),
        (EarringType::Earrings, Regex::new(r"\bearring(s)?\b").unwrap()),
        (EarringType::Hoops, Regex::new(r"\bhoop(s)?\b").unwrap()),
        (
            EarringType::PushBackings,
            Regex::new(r"\bpush\s*back(ing)?s?\b").unwrap(),
        ),
    ]
});

/// 从商品文本字段识别耳饰类型
///
/// 检查 title / description / category / product_type / name 五个字段
/// 拼接后的小写文本。无商品数据时视为非耳饰(不阻断计算)。
pub fn detect_earring_type(product: Option<&ProductRecord>) -> EarringDetection {
    let product = match product {
        Some(p) => p,
        None => {
            return EarringDetection {
                is_earring: false,
                earring_type: None,
                note: "No product data available for earring detection".to_string(),
            }
        }
    };

    let text = [
        product.title.as_deref(),
        product.description.as_deref(),
        product.category.as_deref(),
        product.product_type.as_deref(),
        product.name.as_deref(),
    ]
    .iter()
    .flatten()
    .copied()
    .collect::<Vec<&str>>()
    .join(" ")
    .to_lowercase();

    for (earring_type, pattern) in EARRING_PATTERNS.iter() {
        if pattern.is_match(&text) {
            return EarringDetection {
                is_earring: true,
                earring_type: Some(*earring_type),
                note: format!(
                    "Earring type detected: {}. Metal cost will be doubled for pair.",
                    earring_type
                ),
            };
        }
    }

    EarringDetection {
        is_earring: false,
        earring_type: None,
        note: "Not an earring-related product".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product_with_title(title: &str) -> ProductRecord {
        ProductRecord {
            sku: "T-1".to_string(),
            title: Some(title.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_detects_each_pattern() {
        let cases = [
            ("Diamond Stud 14K", EarringType::Studs),
            ("Classic Earrings Gold", EarringType::Earrings),
            ("Large Hoop", EarringType::Hoops),
            ("Replacement Push Backings", EarringType::PushBackings),
            ("pushback pair", EarringType::PushBackings),
        ];
        for (title, expected) in cases {
            let detection = detect_earring_type(Some(&product_with_title(title)));
            assert!(detection.is_earring, "expected earring for {:?}", title);
            assert_eq!(detection.earring_type, Some(expected));
        }
    }

    #[test]
    fn test_studs_wins_over_later_patterns() {
        // 同一文本含多个模式时,按声明顺序首个命中
        let detection =
            detect_earring_type(Some(&product_with_title("Stud Hoop Earrings Combo")));
        assert_eq!(detection.earring_type, Some(EarringType::Studs));
    }

    #[test]
    fn test_word_boundary_respected() {
        // "studio" / "hooped" 不应误判
        let detection = detect_earring_type(Some(&product_with_title("Studio Collection Ring")));
        assert!(!detection.is_earring);
        assert_eq!(detection.note, "Not an earring-related product");
    }

    #[test]
    fn test_scans_secondary_fields() {
        let product = ProductRecord {
            sku: "T-2".to_string(),
            category: Some("Jewelry > Earrings".to_string()),
            ..Default::default()
        };
        let detection = detect_earring_type(Some(&product));
        assert_eq!(detection.earring_type, Some(EarringType::Earrings));
    }

    #[test]
    fn test_missing_product() {
        let detection = detect_earring_type(None);
        assert!(!detection.is_earring);
        assert_eq!(
            detection.note,
            "No product data available for earring detection"
        );
    }
}
