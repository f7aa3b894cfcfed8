// ==========================================
// 珠宝成本预估系统 - 商品领域实体
// ==========================================
// 职责: 批量输入项 / 原始商品记录 / 规格化后的商品规格
// 上游: ProductDataSource 提供原始记录, ProductEnrichment 提供规格
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// SkuInput - 批量输入项
// ==========================================
/// 一条批量预测输入: SKU + 预测数量
///
/// 由用户上传的批量文件创建,创建后不可变。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkuInput {
    pub sku: String,
    pub quantity: u32,
}

impl SkuInput {
    pub fn new(sku: impl Into<String>, quantity: u32) -> Self {
        Self {
            sku: sku.into(),
            quantity,
        }
    }
}

// ==========================================
// SupplierData - 商品上的供应商字段
// ==========================================
/// 商品记录中与供应商计价相关的三个字段
///
/// MFG & Part # 与 Part #2 是两个独立计价的部件号,分别查表后求和。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierData {
    pub supplier_name: Option<String>,
    pub mfg_part: Option<String>,
    pub part2: Option<String>,
}

impl SupplierData {
    /// 去空格后的 MFG & Part #,缺失归空串
    pub fn mfg_part_trimmed(&self) -> &str {
        self.mfg_part.as_deref().unwrap_or("").trim()
    }

    /// 去空格后的 Part #2,缺失归空串
    pub fn part2_trimmed(&self) -> &str {
        self.part2.as_deref().unwrap_or("").trim()
    }
}

// ==========================================
// ProductRecord - 原始商品记录
// ==========================================
/// 外部商品数据源返回的扁平化记录
///
/// 自由文本字段(title/description/category/product_type/name)用于耳饰识别,
/// supplier 字段用于金属成本分派。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub sku: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub product_type: Option<String>,
    pub name: Option<String>,
    pub supplier: SupplierData,
}

// ==========================================
// 石头规格(规格化输出的一部分)
// ==========================================

/// 单条钻石规格
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiamondSpec {
    /// Natural / Lab 等
    pub diamond_type: Option<String>,
    /// 价格表查找键,缺失时该条无法计价
    pub product_id: Option<String>,
    pub carat_value: Option<f64>,
    pub quantity: u32,
}

/// 单条宝石规格
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GemstoneSpec {
    pub gemstone_type: Option<String>,
    pub product_id: Option<String>,
    pub shape: Option<String>,
    pub size: Option<String>,
    pub quantity: u32,
}

// ==========================================
// ProductSpecifications - 规格化商品规格
// ==========================================
/// 上游规格化服务的输出
///
/// 核心信任其结构,但在使用前校验 metal_purity / metal_weight
/// (二者是标准金属成本计算的必要输入)。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductSpecifications {
    pub metal_purity: Option<String>,
    pub metal_weight: Option<f64>,
    pub diamond_details: Option<Vec<DiamondSpec>>,
    pub gemstone_details: Option<Vec<GemstoneSpec>>,
}

impl ProductSpecifications {
    /// 规格校验: purity 非空字符串且 weight 为正数
    ///
    /// 返回全部违规项(空 Vec 即校验通过),与解析层保持一致的错误措辞。
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        match &self.metal_purity {
            Some(p) if !p.trim().is_empty() => {}
            _ => errors.push("Metal purity is required and must be a string".to_string()),
        }

        match self.metal_weight {
            Some(w) if w.is_finite() && w > 0.0 => {}
            Some(_) => errors.push("Metal weight must be a valid positive number".to_string()),
            None => errors.push("Metal weight is required".to_string()),
        }

        errors
    }

    /// 批内全部石头数量(人工费按颗计)
    pub fn stone_count(&self) -> u32 {
        let diamonds: u32 = self
            .diamond_details
            .iter()
            .flatten()
            .map(|d| d.quantity)
            .sum();
        let gemstones: u32 = self
            .gemstone_details
            .iter()
            .flatten()
            .map(|g| g.quantity)
            .sum();
        diamonds + gemstones
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_requires_purity_and_weight() {
        let empty = ProductSpecifications::default();
        let errors = empty.validate();
        assert_eq!(errors.len(), 2);

        let ok = ProductSpecifications {
            metal_purity: Some("14K Yellow".to_string()),
            metal_weight: Some(2.0),
            ..Default::default()
        };
        assert!(ok.validate().is_empty());
    }

    #[test]
    fn test_validate_rejects_non_positive_weight() {
        let specs = ProductSpecifications {
            metal_purity: Some("14K".to_string()),
            metal_weight: Some(0.0),
            ..Default::default()
        };
        let errors = specs.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("positive"));
    }

    #[test]
    fn test_stone_count_sums_all_details() {
        let specs = ProductSpecifications {
            metal_purity: Some("14K".to_string()),
            metal_weight: Some(1.0),
            diamond_details: Some(vec![
                DiamondSpec {
                    diamond_type: Some("Natural".to_string()),
                    product_id: None,
                    carat_value: Some(0.01),
                    quantity: 12,
                },
                DiamondSpec {
                    diamond_type: Some("Lab".to_string()),
                    product_id: None,
                    carat_value: None,
                    quantity: 3,
                },
            ]),
            gemstone_details: Some(vec![GemstoneSpec {
                gemstone_type: Some("Ruby".to_string()),
                product_id: None,
                shape: None,
                size: None,
                quantity: 2,
            }]),
        };
        assert_eq!(specs.stone_count(), 17);
    }
}
