// ==========================================
// 珠宝成本预估系统 - 成本结果与诊断结构
// ==========================================
// 职责: 查找结果 / 金属成本计算结果 / 单SKU成本分解 / 批量预测分析
// 红线: 诊断走结构化侧通道,不得把诊断编码进格式化字符串后丢失结构
// 红线: 所有失败必须保留完整的查找轨迹(attempts/match_type),供人工审计
// ==========================================

use crate::domain::pricing::GoldPricingDisplay;
use crate::domain::product::ProductSpecifications;
use crate::domain::types::{CalculationMethod, EarringType, MatchType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// LookupResult - 多级查找结果
// ==========================================
/// 一次部件号查找的完整结果(命中或失败均携带诊断轨迹)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LookupResult<T> {
    /// 命中的价格/记录,失败为 None
    pub record: Option<T>,
    pub match_type: MatchType,
    /// 实际命中的键(渐进截断后),失败时为去空格的原始键
    pub processed: String,
    /// 已执行的查找次数,单调递增
    pub attempts: u32,
    pub error: Option<String>,
}

impl<T> LookupResult<T> {
    pub fn is_hit(&self) -> bool {
        self.record.is_some()
    }
}

// ==========================================
// 部件查找诊断
// ==========================================
/// 单个部件号字段的查找诊断(Lee's 价格形 / IKSAN 记录形共用)
///
/// Lee's 填 per_piece_price;IKSAN 填 matched_sku 起的成本分解字段。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartLookupDiagnostics {
    pub original: String,
    pub processed: String,
    pub match_type: Option<MatchType>,
    pub attempts: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_piece_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_sku: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metal_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labor_fee: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labor_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_cost: Option<f64>,
}

// ==========================================
// 耳饰规则诊断
// ==========================================
/// 耳饰双倍规则的应用记录,随计算结果一起返回供追溯
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EarringLogic {
    pub detected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub earring_type: Option<EarringType>,
    pub note: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiplier: Option<u32>,
    /// 供应商策略: 逐字段双倍后的 MFG 价
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doubled_mfg_price: Option<f64>,
    /// 供应商策略: 逐字段双倍后的 Part #2 价
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doubled_part2_price: Option<f64>,
    /// 标准策略: 整体双倍后的成本
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doubled_cost: Option<f64>,
}

// ==========================================
// 计算分解诊断
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalculationBreakdown {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mfg_part_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part2_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_cost: Option<f64>,
    pub earring_logic: EarringLogic,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_cost: Option<f64>,
    /// 人类可读的逐步分解(IKSAN/失败场景)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown_text: Option<String>,
}

/// 标准策略的纯度归一化诊断
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PurityDiagnostics {
    pub original: String,
    /// 归一化后的费率键,未识别为 None
    pub processed: Option<String>,
    pub applicable_rate: Option<f64>,
}

// ==========================================
// MetalCostDiagnostics - 金属成本诊断侧通道
// ==========================================
/// 结构化诊断,由展示层负责渲染(核心不关心排版)
///
/// 回退链场景下 supplier_attempt / fallback_calculation 嵌套保存两次尝试。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetalCostDiagnostics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mfg_and_part: Option<PartLookupDiagnostics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part_2: Option<PartLookupDiagnostics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gold_pricing: Option<GoldPricingDisplay>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purity: Option<PurityDiagnostics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calculation: Option<CalculationBreakdown>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier_attempt: Option<Box<MetalCostDiagnostics>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_calculation: Option<Box<MetalCostDiagnostics>>,
}

// ==========================================
// CalculationResult - 金属成本计算结果
// ==========================================
/// 金属成本解析器的唯一输出类型
///
/// 不变量: `is_success == metal_cost.is_some()`。
/// "可诊断的零成本"场景返回 `Some(0.0)` + errors,仍视为成功
/// (刻意设计,防止回退链用泛化的标准费率覆盖逐字段诊断)。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub supplier: String,
    pub metal_cost: Option<f64>,
    pub calculation_method: CalculationMethod,
    pub details: MetalCostDiagnostics,
    pub errors: Vec<String>,
    pub is_success: bool,
}

impl CalculationResult {
    pub fn success(
        supplier: impl Into<String>,
        metal_cost: f64,
        method: CalculationMethod,
        details: MetalCostDiagnostics,
        warnings: Vec<String>,
    ) -> Self {
        Self {
            supplier: supplier.into(),
            metal_cost: Some(metal_cost),
            calculation_method: method,
            details,
            errors: warnings,
            is_success: true,
        }
    }

    pub fn failure(
        supplier: impl Into<String>,
        errors: Vec<String>,
        method: CalculationMethod,
        details: MetalCostDiagnostics,
    ) -> Self {
        Self {
            supplier: supplier.into(),
            metal_cost: None,
            calculation_method: method,
            details,
            errors,
            is_success: false,
        }
    }

    /// 诊断中的 Part #2 价格(制造分解用)
    pub fn part2_price(&self) -> Option<f64> {
        self.details.calculation.as_ref()?.part2_price
    }

    /// 诊断中的 MFG & Part # 价格(制造分解用)
    pub fn mfg_part_price(&self) -> Option<f64> {
        self.details.calculation.as_ref()?.mfg_part_price
    }
}

// ==========================================
// 石头账单(钻石/宝石共用)
// ==========================================

/// 账单行: 一条石头规格的计价结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoneBillLine {
    /// 类型键(byDiamondType/byGemstoneType 分解用),缺失归 "Unknown"
    pub stone_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    pub quantity: u32,
    pub unit_price: f64,
    pub total_price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_type: Option<MatchType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoneBill {
    pub lines: Vec<StoneBillLine>,
    pub total_cost: f64,
    /// 数据质量问题(未命中/歧义),从不致命
    pub errors: Vec<String>,
}

// ==========================================
// 人工费明细
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LaborCostDetails {
    pub stone_count: u32,
    pub setting_cost_per_stone: f64,
    pub fixed_labor_cost: f64,
    pub total_cost: f64,
}

// ==========================================
// CostEstimation - 单SKU成本估算
// ==========================================
/// 单件成本的完整分解(数量缩放由聚合器负责)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostEstimation {
    pub total_cost: f64,
    pub metal_cost: f64,
    pub diamond_cost: f64,
    pub gemstone_cost: f64,
    pub labor_cost: f64,
    pub metal_details: CalculationResult,
    pub diamond_bill: StoneBill,
    pub gemstone_bill: StoneBill,
    pub labor_details: LaborCostDetails,
}

// ==========================================
// SkuCostBreakdown - 分解快捷视图
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkuCostBreakdown {
    pub diamond: f64,
    pub gemstone: f64,
    pub metal: f64,
    pub labor: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part2: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part3: Option<f64>,
}

// ==========================================
// ProcessedSkuResult - 单SKU处理结果
// ==========================================
/// 批量中一条输入的处理结果
///
/// 生命周期: 由单SKU管线创建,创建后不再变更,被聚合器恰好消费一次。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedSkuResult {
    pub sku: String,
    pub quantity: u32,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specifications: Option<ProductSpecifications>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_estimation: Option<CostEstimation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<SkuCostBreakdown>,
}

impl ProcessedSkuResult {
    /// 失败行: 仅保留错误消息,不贡献任何成本
    pub fn failed(sku: impl Into<String>, quantity: u32, error: impl Into<String>) -> Self {
        Self {
            sku: sku.into(),
            quantity,
            success: false,
            error: Some(error.into()),
            specifications: None,
            cost_estimation: None,
            breakdown: None,
        }
    }
}

// ==========================================
// 批量预测分析
// ==========================================

/// 跨SKU汇总
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastSummary {
    pub total_skus: usize,
    pub successful_skus: usize,
    pub failed_skus: usize,
    pub total_quantity: u64,
    pub total_estimated_cost: f64,
    pub total_diamond_cost: f64,
    pub total_gemstone_cost: f64,
    pub total_metal_cost: f64,
    pub total_labor_cost: f64,
    pub total_part2_cost: f64,
    pub total_part3_cost: f64,
    pub average_cost_per_unit: f64,
    /// 仅在提供增长率时计算,等于 total_estimated_cost * (1 + g/100)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projected_cost_with_growth: Option<f64>,
}

/// 按类型分解项(数量 + 成本)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeBreakdown {
    pub quantity: u64,
    pub cost: f64,
}

/// 金属分解项(重量 + 成本)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetalTypeBreakdown {
    pub weight: f64,
    pub cost: f64,
}

/// 制造端分解
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ManufacturingBreakdown {
    pub part2: f64,
    pub part3: f64,
    pub labor: f64,
}

/// 类型化分解集合(BTreeMap 保证序列化顺序稳定)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastBreakdowns {
    pub by_diamond_type: BTreeMap<String, TypeBreakdown>,
    pub by_gemstone_type: BTreeMap<String, TypeBreakdown>,
    pub by_metal_type: BTreeMap<String, MetalTypeBreakdown>,
    pub by_manufacturing: ManufacturingBreakdown,
}

// ==========================================
// ForecastAnalysis - 批量预测分析结果
// ==========================================
/// 一次批量请求的最终产出,构建后只读
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastAnalysis {
    pub batch_id: String,
    pub generated_at: DateTime<Utc>,
    pub processed_skus: Vec<ProcessedSkuResult>,
    pub summary: ForecastSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub growth_percentage: Option<f64>,
    pub breakdowns: ForecastBreakdowns,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculation_result_invariant() {
        let ok = CalculationResult::success(
            "Standard Calculation",
            120.0,
            CalculationMethod::Standard,
            MetalCostDiagnostics::default(),
            vec![],
        );
        assert!(ok.is_success);
        assert_eq!(ok.metal_cost, Some(120.0));

        let zero = CalculationResult::success(
            "Lee's Manufacturing",
            0.0,
            CalculationMethod::SupplierSpecific,
            MetalCostDiagnostics::default(),
            vec!["Error in cost calculation".to_string()],
        );
        // 可诊断的零成本仍是成功态
        assert!(zero.is_success);
        assert_eq!(zero.metal_cost, Some(0.0));

        let fail = CalculationResult::failure(
            "Unknown",
            vec!["Invalid product specifications provided".to_string()],
            CalculationMethod::Standard,
            MetalCostDiagnostics::default(),
        );
        assert!(!fail.is_success);
        assert_eq!(fail.metal_cost, None);
    }

    #[test]
    fn test_part_price_accessors() {
        let mut details = MetalCostDiagnostics::default();
        details.calculation = Some(CalculationBreakdown {
            mfg_part_price: Some(10.0),
            part2_price: Some(4.5),
            ..Default::default()
        });
        let result = CalculationResult::success(
            "Lee's Manufacturing",
            14.5,
            CalculationMethod::SupplierSpecific,
            details,
            vec![],
        );
        assert_eq!(result.mfg_part_price(), Some(10.0));
        assert_eq!(result.part2_price(), Some(4.5));
    }

    #[test]
    fn test_diagnostics_serialize_skips_empty_sections() {
        let diag = MetalCostDiagnostics::default();
        let json = serde_json::to_value(&diag).unwrap();
        assert_eq!(json, serde_json::json!({}));
    }
}
