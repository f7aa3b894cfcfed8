// ==========================================
// 珠宝成本预估系统 - 领域类型定义
// ==========================================
// 职责: 查找匹配类型 / 计算方式 / 供应商分类 / 金属纯度 等核心枚举
// 红线: 供应商分派必须是枚举分派,不允许字符串分支散落各处
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 匹配类型 (Match Type)
// ==========================================
// 多级查找算法的终态,下游诊断展示依赖该值
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    Exact,           // 精确匹配
    Progressive,     // 渐进截断匹配
    Substring,       // 子串匹配
    MultipleMatches, // 多个候选,歧义
    NoMatch,         // 无匹配
    NotProvided,     // 未提供查找键
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchType::Exact => write!(f, "exact"),
            MatchType::Progressive => write!(f, "progressive"),
            MatchType::Substring => write!(f, "substring"),
            MatchType::MultipleMatches => write!(f, "multiple_matches"),
            MatchType::NoMatch => write!(f, "no_match"),
            MatchType::NotProvided => write!(f, "not_provided"),
        }
    }
}

// ==========================================
// 计算方式 (Calculation Method)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationMethod {
    Standard,         // 标准纯度×重量计算
    SupplierSpecific, // 供应商专有表计算
    StandardFallback, // 供应商计算失败后的标准回退
}

impl fmt::Display for CalculationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalculationMethod::Standard => write!(f, "standard"),
            CalculationMethod::SupplierSpecific => write!(f, "supplier_specific"),
            CalculationMethod::StandardFallback => write!(f, "standard_fallback"),
        }
    }
}

// ==========================================
// 供应商分类 (Supplier Kind)
// ==========================================
// 分派规则: 供应商名称小写去空格后按别名集合匹配,
// 未知/空白 → Standard(直接标准计算,无回退链)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SupplierKind {
    Lees,     // Lee's Manufacturing
    Iksan,    // IKSAN Jewelry Cooperative
    Standard, // 其他/未指定
}

impl SupplierKind {
    /// 从供应商名称分类(一次性纯函数分派)
    pub fn classify(supplier_name: Option<&str>) -> Self {
        let name = supplier_name.unwrap_or("").trim().to_lowercase();
        match name.as_str() {
            "lee's manufacturing" | "lees manufacturing" | "lee's" | "lees" => SupplierKind::Lees,
            "iksan jewelry cooperative" | "iksan" => SupplierKind::Iksan,
            _ => SupplierKind::Standard,
        }
    }

    /// 结果中展示的供应商标签
    pub fn label(&self) -> &'static str {
        match self {
            SupplierKind::Lees => "Lee's Manufacturing",
            SupplierKind::Iksan => "IKSAN Jewelry Cooperative",
            SupplierKind::Standard => "Standard Calculation",
        }
    }
}

impl fmt::Display for SupplierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ==========================================
// 耳饰类型 (Earring Type)
// ==========================================
// 成对佩戴商品,金属成本按双倍计
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EarringType {
    Studs,
    Earrings,
    Hoops,
    PushBackings,
}

impl fmt::Display for EarringType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EarringType::Studs => write!(f, "studs"),
            EarringType::Earrings => write!(f, "earrings"),
            EarringType::Hoops => write!(f, "hoops"),
            EarringType::PushBackings => write!(f, "push_backings"),
        }
    }
}

// ==========================================
// 金属纯度 (Metal Purity)
// ==========================================
// 规范键: 10k / 14k / 18k / 950(铂金)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetalPurity {
    K10,
    K14,
    K18,
    Pt950,
}

impl MetalPurity {
    /// 从自由文本纯度归一化
    ///
    /// 检查顺序固定: 10k → 14k → 18k → 950/platinum,首个命中生效。
    /// 输入先小写并去除全部空白(如 "14KT Yellow" → "14ktyellow")。
    pub fn normalize(purity: &str) -> Option<Self> {
        let p: String = purity.to_lowercase().split_whitespace().collect();
        if p.contains("10k") {
            Some(MetalPurity::K10)
        } else if p.contains("14k") {
            Some(MetalPurity::K14)
        } else if p.contains("18k") {
            Some(MetalPurity::K18)
        } else if p.contains("950") || p.contains("platinum") {
            Some(MetalPurity::Pt950)
        } else {
            None
        }
    }

    /// 费率表查找键
    pub fn rate_key(&self) -> &'static str {
        match self {
            MetalPurity::K10 => "10k",
            MetalPurity::K14 => "14k",
            MetalPurity::K18 => "18k",
            MetalPurity::Pt950 => "950",
        }
    }

    /// 内置标准费率(美元/克),快照无该键时回退使用
    pub fn standard_rate(&self) -> f64 {
        match self {
            MetalPurity::K10 => 43.0,
            MetalPurity::K14 => 60.0,
            MetalPurity::K18 => 80.0,
            MetalPurity::Pt950 => 32.0,
        }
    }
}

impl fmt::Display for MetalPurity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.rate_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supplier_classify_aliases() {
        assert_eq!(
            SupplierKind::classify(Some("Lee's Manufacturing")),
            SupplierKind::Lees
        );
        assert_eq!(SupplierKind::classify(Some("  LEES ")), SupplierKind::Lees);
        assert_eq!(SupplierKind::classify(Some("IKSAN")), SupplierKind::Iksan);
        assert_eq!(
            SupplierKind::classify(Some("iksan jewelry cooperative")),
            SupplierKind::Iksan
        );
        assert_eq!(
            SupplierKind::classify(Some("Acme Jewels")),
            SupplierKind::Standard
        );
        assert_eq!(SupplierKind::classify(Some("")), SupplierKind::Standard);
        assert_eq!(SupplierKind::classify(None), SupplierKind::Standard);
    }

    #[test]
    fn test_purity_normalize_order() {
        assert_eq!(MetalPurity::normalize("14KT Yellow"), Some(MetalPurity::K14));
        assert_eq!(MetalPurity::normalize("10 K White"), Some(MetalPurity::K10)); // 空白剥离后含 "10k"
        assert_eq!(MetalPurity::normalize("10kt"), Some(MetalPurity::K10));
        assert_eq!(MetalPurity::normalize("Platinum 950"), Some(MetalPurity::Pt950));
        assert_eq!(MetalPurity::normalize("18kt rose"), Some(MetalPurity::K18));
        assert_eq!(MetalPurity::normalize("Sterling Silver"), None);
    }

    #[test]
    fn test_standard_rates() {
        assert_eq!(MetalPurity::K10.standard_rate(), 43.0);
        assert_eq!(MetalPurity::K14.standard_rate(), 60.0);
        assert_eq!(MetalPurity::K18.standard_rate(), 80.0);
        assert_eq!(MetalPurity::Pt950.standard_rate(), 32.0);
    }
}
